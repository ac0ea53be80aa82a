use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod health;
pub mod projects;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(health::router())
        .merge(projects::router())
        .merge(users::router());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
