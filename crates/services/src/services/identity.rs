//! Resolution of the calling user for write requests.

use async_trait::async_trait;
use db::models::user::User;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Maps a request credential to the user making the request.
///
/// `Ok(None)` means the caller is anonymous: reads are still allowed, writes
/// are rejected.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, credential: Option<&str>) -> Result<Option<User>, IdentityError>;
}

/// Trusts the credential as a user email and looks it up in the store.
#[derive(Clone)]
pub struct EmailIdentityProvider {
    pool: SqlitePool,
}

impl EmailIdentityProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for EmailIdentityProvider {
    async fn resolve(&self, credential: Option<&str>) -> Result<Option<User>, IdentityError> {
        let Some(email) = credential.map(str::trim).filter(|e| !e.is_empty()) else {
            return Ok(None);
        };

        let user = User::find_by_email(&self.pool, email).await?;
        if user.is_none() {
            debug!(email, "Identity: no user for credential");
        }
        Ok(user)
    }
}
