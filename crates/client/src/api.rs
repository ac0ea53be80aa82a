//! HTTP access to the project board API.

use std::time::Duration;

use async_trait::async_trait;
use db::models::{
    project::{Project, ProjectStatus, UpsertProject},
    user::User,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use utils::{headers::USER_HEADER, response::ErrorResponse};
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiClientError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}")]
    Http {
        status: u16,
        body: Option<ErrorResponse>,
    },
    #[error("json error: {0}")]
    Serde(String),
}

impl ApiClientError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Http { status, .. } if *status == StatusCode::FORBIDDEN.as_u16())
    }

    /// User-safe message the server attached to an error response, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http {
                body: Some(body), ..
            } => Some(body.message.as_str()),
            _ => None,
        }
    }
}

/// Operations the list view and the form need from the backend
#[async_trait]
pub trait ProjectsApi: Send + Sync {
    async fn list_projects(
        &self,
        status: Option<ProjectStatus>,
        limit: i64,
    ) -> Result<Vec<Project>, ApiClientError>;

    async fn get_project(&self, id: Uuid) -> Result<Project, ApiClientError>;

    async fn list_users(&self, limit: i64) -> Result<Vec<User>, ApiClientError>;

    async fn create_project(&self, payload: &UpsertProject) -> Result<Project, ApiClientError>;

    async fn update_project(&self, payload: &UpsertProject) -> Result<Project, ApiClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpProjectsApi {
    http: Client,
    base_url: String,
    user_email: Option<String>,
}

impl HttpProjectsApi {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// `base_url` points at the API root, e.g. `http://127.0.0.1:3001/api`.
    /// `user_email` is sent as the caller identity on every request.
    pub fn new(base_url: &str, user_email: Option<String>) -> Result<Self, ApiClientError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("project-board/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiClientError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_email,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiClientError> {
        let request = match &self.user_email {
            Some(email) => request.header(USER_HEADER, email),
            None => request,
        };
        let res = request.send().await.map_err(map_reqwest_error)?;

        let status = res.status();
        if status.is_success() {
            return res
                .json::<T>()
                .await
                .map_err(|e| ApiClientError::Serde(e.to_string()));
        }

        let text = res.text().await.unwrap_or_default();
        tracing::debug!(status = %status, body = %text, "API request failed");
        Err(ApiClientError::Http {
            status: status.as_u16(),
            body: serde_json::from_str(&text).ok(),
        })
    }
}

#[async_trait]
impl ProjectsApi for HttpProjectsApi {
    async fn list_projects(
        &self,
        status: Option<ProjectStatus>,
        limit: i64,
    ) -> Result<Vec<Project>, ApiClientError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        self.send(self.http.get(self.url("/projects")).query(&query))
            .await
    }

    async fn get_project(&self, id: Uuid) -> Result<Project, ApiClientError> {
        self.send(self.http.get(self.url(&format!("/projects/{id}"))))
            .await
    }

    async fn list_users(&self, limit: i64) -> Result<Vec<User>, ApiClientError> {
        self.send(
            self.http
                .get(self.url("/users"))
                .query(&[("limit", limit.to_string())]),
        )
        .await
    }

    async fn create_project(&self, payload: &UpsertProject) -> Result<Project, ApiClientError> {
        self.send(self.http.post(self.url("/projects")).json(payload))
            .await
    }

    async fn update_project(&self, payload: &UpsertProject) -> Result<Project, ApiClientError> {
        self.send(self.http.put(self.url("/projects")).json(payload))
            .await
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ApiClientError {
    if e.is_timeout() {
        ApiClientError::Timeout
    } else {
        ApiClientError::Transport(e.to_string())
    }
}
