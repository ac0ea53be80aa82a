use db::models::user::User;
use sqlx::SqlitePool;

use super::limits::{DEFAULT_USER_LIMIT, resolve_limit};

/// Users offered as assignee choices
pub async fn list_users(pool: &SqlitePool, raw_limit: Option<&str>) -> Result<Vec<User>, sqlx::Error> {
    User::find_all(pool, resolve_limit(raw_limit, DEFAULT_USER_LIMIT)).await
}
