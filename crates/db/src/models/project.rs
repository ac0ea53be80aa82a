use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::user::User;

#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    TS,
    EnumString,
    Display,
    Default,
)]
#[sqlx(type_name = "project_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [Self::Planned, Self::InProgress, Self::Completed];
}

/// Whether a project is visible to anonymous readers
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "publication_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PublicationState {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: ProjectStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub budget: Option<f64>,
    #[sqlx(skip)]
    pub assigned: Vec<User>,
    #[sqlx(skip)]
    pub authors: Vec<User>,
    pub publication_state: PublicationState,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /api/projects` and `PUT /api/projects`.
///
/// Fields stay loosely typed so that coercion (budget) and validation
/// (title, status, deadline, assignees) happen in one place on the server
/// rather than as opaque deserialization failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct UpsertProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    #[ts(type = "number | string | null")]
    pub budget: Option<serde_json::Value>,
    /// User ids
    #[serde(default)]
    pub assigned: Option<Vec<String>>,
}

/// Store-side filter for listing projects
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub published_only: bool,
    pub limit: i64,
}

/// Fully validated column values for a create or an overwrite
#[derive(Debug, Clone)]
pub struct ProjectData {
    pub title: String,
    pub slug: String,
    pub status: ProjectStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub budget: Option<f64>,
    pub publication_state: PublicationState,
    pub assigned: Vec<Uuid>,
    pub authors: Vec<Uuid>,
}

const PROJECT_COLUMNS: &str = "id, title, slug, status, deadline, budget, publication_state, \
                               published_at, created_at, updated_at";

const ASSIGNEES_QUERY: &str = r#"SELECT u.id, u.name, u.email, u.created_at, u.updated_at
    FROM project_assignees pa
    JOIN users u ON u.id = pa.user_id
    WHERE pa.project_id = $1
    ORDER BY pa.position ASC"#;

const AUTHORS_QUERY: &str = r#"SELECT u.id, u.name, u.email, u.created_at, u.updated_at
    FROM project_authors pa
    JOIN users u ON u.id = pa.user_id
    WHERE pa.project_id = $1
    ORDER BY pa.position ASC"#;

impl Project {
    /// List projects matching `filter`, newest first, with users populated
    pub async fn find_filtered(
        pool: &SqlitePool,
        filter: &ProjectFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT ");
        query.push(PROJECT_COLUMNS).push(" FROM projects WHERE 1 = 1");
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if filter.published_only {
            query
                .push(" AND publication_state = ")
                .push_bind(PublicationState::Published);
        }
        query
            .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(filter.limit);

        let projects = query.build_query_as::<Project>().fetch_all(pool).await?;

        let mut populated = Vec::with_capacity(projects.len());
        for project in projects {
            populated.push(project.populate(pool).await?);
        }
        Ok(populated)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match project {
            Some(project) => Ok(Some(project.populate(pool).await?)),
            None => Ok(None),
        }
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &ProjectData,
    ) -> Result<Self, sqlx::Error> {
        let published_at = published_at_for(data.publication_state);

        let mut tx = pool.begin().await?;
        sqlx::query(
            r#"INSERT INTO projects (id, title, slug, status, deadline, budget, publication_state, published_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.slug)
        .bind(data.status)
        .bind(data.deadline)
        .bind(data.budget)
        .bind(data.publication_state)
        .bind(published_at)
        .execute(&mut *tx)
        .await?;
        replace_links(&mut tx, id, &data.assigned, &data.authors).await?;
        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Overwrite every column and relationship of an existing project.
    /// `published_at` is only ever set once.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &ProjectData,
    ) -> Result<Self, sqlx::Error> {
        let published_at = published_at_for(data.publication_state);

        let mut tx = pool.begin().await?;
        let result = sqlx::query(
            r#"UPDATE projects
               SET title = $1,
                   slug = $2,
                   status = $3,
                   deadline = $4,
                   budget = $5,
                   publication_state = $6,
                   published_at = COALESCE(published_at, $7),
                   updated_at = datetime('now', 'subsec')
               WHERE id = $8"#,
        )
        .bind(&data.title)
        .bind(&data.slug)
        .bind(data.status)
        .bind(data.deadline)
        .bind(data.budget)
        .bind(data.publication_state)
        .bind(published_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        replace_links(&mut tx, id, &data.assigned, &data.authors).await?;
        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn populate(mut self, pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        self.assigned = sqlx::query_as::<_, User>(ASSIGNEES_QUERY)
            .bind(self.id)
            .fetch_all(pool)
            .await?;
        self.authors = sqlx::query_as::<_, User>(AUTHORS_QUERY)
            .bind(self.id)
            .fetch_all(pool)
            .await?;
        Ok(self)
    }
}

fn published_at_for(state: PublicationState) -> Option<DateTime<Utc>> {
    match state {
        PublicationState::Published => Some(Utc::now()),
        PublicationState::Draft => None,
    }
}

async fn replace_links(
    conn: &mut SqliteConnection,
    project_id: Uuid,
    assigned: &[Uuid],
    authors: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_assignees WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM project_authors WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut *conn)
        .await?;

    for (position, user_id) in assigned.iter().enumerate() {
        sqlx::query(
            "INSERT INTO project_assignees (project_id, user_id, position) VALUES ($1, $2, $3)",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }
    for (position, user_id) in authors.iter().enumerate() {
        sqlx::query(
            "INSERT INTO project_authors (project_id, user_id, position) VALUES ($1, $2, $3)",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
