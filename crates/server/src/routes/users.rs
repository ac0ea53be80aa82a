use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::user::User;
use serde::Deserialize;
use services::services::users::list_users;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub limit: Option<String>,
}

/// GET /api/users
/// Assignee choices for the project form
pub async fn get_users(
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<ResponseJson<Vec<User>>, ApiError> {
    let users = list_users(&state.db().pool, query.limit.as_deref()).await?;
    Ok(ResponseJson(users))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(get_users))
}
