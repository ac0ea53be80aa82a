use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub async fn find_all(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, created_at, updated_at
               FROM users
               ORDER BY created_at DESC
               LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, created_at, updated_at
               FROM users
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, created_at, updated_at
               FROM users
               WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Resolve `ids` to users, preserving the caller's order. Ids with no
    /// matching row are simply absent from the result.
    pub async fn find_by_ids(pool: &SqlitePool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = Self::find_by_id(pool, *id).await? {
                users.push(user);
            }
        }
        Ok(users)
    }

    pub async fn create<'e, E>(
        executor: E,
        id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, name, email)
               VALUES ($1, $2, $3)
               RETURNING id, name, email, created_at, updated_at"#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_one(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn test_seeded_admin_is_found_by_email() {
        let db = DBService::new_in_memory().await.unwrap();

        let admin = User::find_by_email(&db.pool, "demo-author@example.com")
            .await
            .unwrap()
            .expect("seeded admin");
        assert_eq!(admin.name, "Demo Admin");

        let by_id = User::find_by_id(&db.pool, admin.id).await.unwrap();
        assert_eq!(by_id, Some(admin));
    }

    #[tokio::test]
    async fn test_find_by_ids_keeps_order_and_skips_unknown() {
        let db = DBService::new_in_memory().await.unwrap();
        let ada = User::create(&db.pool, Uuid::new_v4(), "Ada", "ada@example.com")
            .await
            .unwrap();
        let bob = User::create(&db.pool, Uuid::new_v4(), "Bob", "bob@example.com")
            .await
            .unwrap();

        let found = User::find_by_ids(&db.pool, &[bob.id, Uuid::new_v4(), ada.id])
            .await
            .unwrap();

        let names: Vec<_> = found.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Ada"]);
    }

    #[tokio::test]
    async fn test_find_all_respects_limit() {
        let db = DBService::new_in_memory().await.unwrap();
        for i in 0..4 {
            User::create(
                &db.pool,
                Uuid::new_v4(),
                &format!("User {i}"),
                &format!("user{i}@example.com"),
            )
            .await
            .unwrap();
        }

        let users = User::find_all(&db.pool, 3).await.unwrap();
        assert_eq!(users.len(), 3);
    }
}
