use std::sync::Arc;

use axum::http::HeaderMap;
use db::{DBService, models::user::User};
use services::services::{
    identity::{IdentityError, IdentityProvider},
    projects::ProjectService,
    revalidation::Revalidator,
};

pub use utils::headers::USER_HEADER;

#[derive(Clone)]
pub struct AppState {
    db: DBService,
    projects: ProjectService,
    identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(
        db: DBService,
        identity: Arc<dyn IdentityProvider>,
        revalidator: Revalidator,
    ) -> Self {
        let projects = ProjectService::new(db.clone(), revalidator);
        Self {
            db,
            projects,
            identity,
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn projects(&self) -> &ProjectService {
        &self.projects
    }

    /// Resolve the calling user from request headers; `None` for anonymous callers
    pub async fn caller(&self, headers: &HeaderMap) -> Result<Option<User>, IdentityError> {
        let credential = headers.get(USER_HEADER).and_then(|v| v.to_str().ok());
        self.identity.resolve(credential).await
    }
}
