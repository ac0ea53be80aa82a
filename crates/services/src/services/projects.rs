//! Project listing and upsert: validation, assignee resolution and writes.

use chrono::{DateTime, NaiveDate, Utc};
use db::{
    DBService,
    models::{
        project::{Project, ProjectData, ProjectFilter, ProjectStatus, PublicationState, UpsertProject},
        user::User,
    },
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use utils::response::ErrorCode;
use uuid::Uuid;

use super::{
    limits::{DEFAULT_PROJECT_LIMIT, resolve_limit},
    revalidation::{ProjectChange, ProjectEvent, Revalidator},
};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error("invalid deadline: {0}")]
    InvalidDeadline(String),
    #[error("invalid assignee: {0}")]
    InvalidAssignee(String),
    #[error("project id is required")]
    IdRequired,
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TitleRequired => ErrorCode::TitleRequired,
            Self::InvalidStatus(_) => ErrorCode::InvalidStatus,
            Self::InvalidDeadline(_) => ErrorCode::InvalidDeadline,
            Self::InvalidAssignee(_) => ErrorCode::InvalidAssignee,
            Self::IdRequired => ErrorCode::IdRequired,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProjectServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("project not found: {0}")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Raw list query as it arrives on the wire
#[derive(Debug, Clone, Default)]
pub struct ListProjectsQuery {
    pub status: Option<String>,
    pub limit: Option<String>,
}

/// Payload fields after validation, before any store access
#[derive(Debug, Clone, PartialEq)]
struct ValidatedProject {
    title: String,
    status: ProjectStatus,
    deadline: Option<DateTime<Utc>>,
    budget: Option<f64>,
    assigned: Vec<Uuid>,
}

#[derive(Clone)]
pub struct ProjectService {
    db: DBService,
    revalidator: Revalidator,
}

impl ProjectService {
    pub fn new(db: DBService, revalidator: Revalidator) -> Self {
        Self { db, revalidator }
    }

    /// List projects. Anonymous callers (`include_drafts == false`) only see
    /// published records.
    pub async fn list(
        &self,
        query: &ListProjectsQuery,
        include_drafts: bool,
    ) -> Result<Vec<Project>, ProjectServiceError> {
        let filter = ProjectFilter {
            status: parse_status_filter(query.status.as_deref())?,
            published_only: !include_drafts,
            limit: resolve_limit(query.limit.as_deref(), DEFAULT_PROJECT_LIMIT),
        };
        debug!(?filter, "Listing projects");
        Ok(Project::find_filtered(&self.db.pool, &filter).await?)
    }

    pub async fn get(&self, id: Uuid, include_drafts: bool) -> Result<Project, ProjectServiceError> {
        match Project::find_by_id(&self.db.pool, id).await? {
            Some(project)
                if include_drafts || project.publication_state == PublicationState::Published =>
            {
                Ok(project)
            }
            _ => Err(ProjectServiceError::NotFound(id)),
        }
    }

    /// Create a published project authored by `author`
    pub async fn create(
        &self,
        author: &User,
        payload: &UpsertProject,
    ) -> Result<Project, ProjectServiceError> {
        let input = validate(payload)?;
        self.ensure_assignees_exist(&input.assigned).await?;

        let id = Uuid::new_v4();
        let data = into_data(input, vec![author.id]);
        let project = Project::create(&self.db.pool, id, &data).await?;

        info!(
            project_id = %project.id,
            author_id = %author.id,
            status = %project.status,
            "Project created"
        );
        self.revalidator
            .publish(ProjectEvent::new(ProjectChange::Created, project.id, &project.slug));
        Ok(project)
    }

    /// Overwrite an existing project. `author` joins the author list if absent.
    pub async fn update(
        &self,
        author: &User,
        payload: &UpsertProject,
    ) -> Result<Project, ProjectServiceError> {
        let id = parse_project_id(payload.id.as_deref())?;
        let input = validate(payload)?;

        let existing = Project::find_by_id(&self.db.pool, id)
            .await?
            .ok_or(ProjectServiceError::NotFound(id))?;
        self.ensure_assignees_exist(&input.assigned).await?;

        let mut authors: Vec<Uuid> = existing.authors.iter().map(|u| u.id).collect();
        if !authors.contains(&author.id) {
            authors.push(author.id);
        }

        let data = into_data(input, authors);
        let project = Project::update(&self.db.pool, id, &data)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => ProjectServiceError::NotFound(id),
                other => ProjectServiceError::Database(other),
            })?;

        info!(
            project_id = %project.id,
            author_id = %author.id,
            status = %project.status,
            "Project updated"
        );
        self.revalidator
            .publish(ProjectEvent::new(ProjectChange::Updated, project.id, &project.slug));
        Ok(project)
    }

    async fn ensure_assignees_exist(&self, ids: &[Uuid]) -> Result<(), ProjectServiceError> {
        let found = User::find_by_ids(&self.db.pool, ids).await?;
        if let Some(missing) = ids.iter().find(|id| !found.iter().any(|u| u.id == **id)) {
            return Err(ValidationError::InvalidAssignee(missing.to_string()).into());
        }
        Ok(())
    }
}

fn into_data(input: ValidatedProject, authors: Vec<Uuid>) -> ProjectData {
    ProjectData {
        slug: slugify(&input.title),
        title: input.title,
        status: input.status,
        deadline: input.deadline,
        budget: input.budget,
        publication_state: PublicationState::Published,
        assigned: input.assigned,
        authors,
    }
}

fn validate(payload: &UpsertProject) -> Result<ValidatedProject, ValidationError> {
    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::TitleRequired)?
        .to_string();

    let status = match non_blank(payload.status.as_deref()) {
        None => ProjectStatus::default(),
        Some(raw) => raw
            .parse()
            .map_err(|_| ValidationError::InvalidStatus(raw.to_string()))?,
    };

    Ok(ValidatedProject {
        title,
        status,
        deadline: parse_deadline(payload.deadline.as_deref())?,
        budget: coerce_budget(payload.budget.as_ref()),
        assigned: parse_assignees(payload.assigned.as_deref().unwrap_or_default())?,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<ProjectStatus>, ValidationError> {
    non_blank(raw)
        .map(|s| {
            s.parse()
                .map_err(|_| ValidationError::InvalidStatus(s.to_string()))
        })
        .transpose()
}

pub fn parse_project_id(raw: Option<&str>) -> Result<Uuid, ValidationError> {
    non_blank(raw)
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or(ValidationError::IdRequired)
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC)
fn parse_deadline(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let Some(raw) = non_blank(raw) else {
        return Ok(None);
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(timestamp.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| ValidationError::InvalidDeadline(raw.to_string()))
}

/// Numbers and numeric strings become a budget; everything else is null
fn coerce_budget(raw: Option<&Value>) -> Option<f64> {
    let budget = match raw? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    budget.filter(|b| b.is_finite())
}

fn parse_assignees(raw: &[String]) -> Result<Vec<Uuid>, ValidationError> {
    let mut ids = Vec::with_capacity(raw.len());
    for value in raw {
        let id = Uuid::parse_str(value.trim())
            .map_err(|_| ValidationError::InvalidAssignee(value.clone()))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
