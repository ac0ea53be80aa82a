use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::project::{Project, UpsertProject};
use serde::Deserialize;
use services::services::projects::{ListProjectsQuery, ProjectServiceError, parse_project_id};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ProjectsQuery {
    pub status: Option<String>,
    pub limit: Option<String>,
}

/// GET /api/projects?status=<status>&limit=<n>
pub async fn get_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ProjectsQuery>,
) -> Result<ResponseJson<Vec<Project>>, ApiError> {
    let caller = state.caller(&headers).await?;
    let query = ListProjectsQuery {
        status: query.status,
        limit: query.limit,
    };
    let projects = state.projects().list(&query, caller.is_some()).await?;
    Ok(ResponseJson(projects))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<ResponseJson<Project>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ProjectServiceError::NotFound(Uuid::nil()))?;
    let caller = state.caller(&headers).await?;
    let project = state.projects().get(id, caller.is_some()).await?;
    Ok(ResponseJson(project))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpsertProject>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<Project>), ApiError> {
    let Json(payload) = payload?;
    let author = state.caller(&headers).await?.ok_or(ApiError::Forbidden)?;

    let project = state.projects().create(&author, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(project)))
}

/// PUT /api/projects
/// The id travels in the body; it is checked before anything touches the store.
pub async fn update_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpsertProject>, JsonRejection>,
) -> Result<ResponseJson<Project>, ApiError> {
    let Json(payload) = payload?;
    parse_project_id(payload.id.as_deref())?;
    let author = state.caller(&headers).await?.ok_or(ApiError::Forbidden)?;

    let project = state.projects().update(&author, &payload).await?;
    Ok(ResponseJson(project))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/projects",
            get(get_projects).post(create_project).put(update_project),
        )
        .route("/projects/{id}", get(get_project))
}
