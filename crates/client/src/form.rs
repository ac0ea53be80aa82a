//! Add/edit form for a single project.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use db::models::{
    project::{Project, ProjectStatus, UpsertProject},
    user::User,
};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::api::{ApiClientError, ProjectsApi};

const ASSIGNEE_CHOICE_LIMIT: i64 = 100;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    /// The server refused the write because the caller is not logged in
    #[error("Please log in to add or edit projects")]
    LoginRequired,
    #[error("{0}")]
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Submitting,
    Success(String),
    Error(FormError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectForm {
    pub title: String,
    pub status: ProjectStatus,
    pub deadline: Option<NaiveDate>,
    /// Raw field text; the server coerces it to a number or null
    pub budget: String,
    pub assigned: Vec<Uuid>,
    editing: Option<Uuid>,
    /// Stored deadline of the edited project, sent back verbatim while the
    /// date field still shows its day
    stored_deadline: Option<DateTime<Utc>>,
    choices: Vec<User>,
    state: FormState,
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectForm {
    /// Empty form for the "add" flow
    pub fn new() -> Self {
        Self {
            title: String::new(),
            status: ProjectStatus::default(),
            deadline: None,
            budget: String::new(),
            assigned: Vec::new(),
            editing: None,
            stored_deadline: None,
            choices: Vec::new(),
            state: FormState::Idle,
        }
    }

    /// Form pre-populated from an existing project
    pub fn edit(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            status: project.status,
            deadline: project.deadline.map(|d| d.date_naive()),
            budget: project.budget.map(|b| b.to_string()).unwrap_or_default(),
            assigned: project.assigned.iter().map(|u| u.id).collect(),
            editing: Some(project.id),
            stored_deadline: project.deadline,
            choices: Vec::new(),
            state: FormState::Idle,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn choices(&self) -> &[User] {
        &self.choices
    }

    /// Fetch the users offered as assignees. A failure leaves no choices.
    pub async fn load_choices(&mut self, api: &dyn ProjectsApi) {
        self.choices = match api.list_users(ASSIGNEE_CHOICE_LIMIT).await {
            Ok(users) => users,
            Err(e) => {
                warn!(error = %e, "Failed to load assignee choices");
                Vec::new()
            }
        };
    }

    pub fn payload(&self) -> UpsertProject {
        let budget = self.budget.trim();
        UpsertProject {
            id: self.editing.map(|id| id.to_string()),
            title: Some(self.title.clone()),
            status: Some(self.status.to_string()),
            deadline: self.deadline_value(),
            budget: (!budget.is_empty()).then(|| Value::String(budget.to_string())),
            assigned: Some(self.assigned.iter().map(Uuid::to_string).collect()),
        }
    }

    fn deadline_value(&self) -> Option<String> {
        let date = self.deadline?;
        match self.stored_deadline {
            Some(stored) if stored.date_naive() == date => {
                Some(stored.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            _ => Some(date.format("%Y-%m-%d").to_string()),
        }
    }

    /// Send the form once. Update vs create is decided by whether the form
    /// was opened on an existing project.
    pub async fn submit(&mut self, api: &dyn ProjectsApi) -> Result<Project, FormError> {
        self.state = FormState::Submitting;
        let payload = self.payload();

        let result = if self.is_edit() {
            api.update_project(&payload).await
        } else {
            api.create_project(&payload).await
        };

        match result {
            Ok(project) => {
                let message = if self.is_edit() {
                    "Project updated!"
                } else {
                    "Project created!"
                };
                self.state = FormState::Success(message.to_string());
                Ok(project)
            }
            Err(e) => {
                let error = self.describe(&e);
                self.state = FormState::Error(error.clone());
                Err(error)
            }
        }
    }

    fn describe(&self, error: &ApiClientError) -> FormError {
        if error.is_forbidden() {
            return FormError::LoginRequired;
        }
        match error {
            ApiClientError::Http { .. } => FormError::Message(
                error
                    .server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| self.fallback_message().to_string()),
            ),
            other => FormError::Message(other.to_string()),
        }
    }

    fn fallback_message(&self) -> &'static str {
        if self.is_edit() {
            "Failed to update project"
        } else {
            "Failed to create project"
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use db::models::project::PublicationState;
    use utils::response::{ErrorCode, ErrorResponse};

    use super::*;

    #[derive(Default)]
    struct ScriptedApi {
        response: Mutex<Option<Result<Project, ApiClientError>>>,
        users: Option<Vec<User>>,
        sent: Mutex<Vec<(&'static str, UpsertProject)>>,
    }

    impl ScriptedApi {
        fn replying(response: Result<Project, ApiClientError>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                ..Default::default()
            }
        }

        fn reply(&self, kind: &'static str, payload: &UpsertProject) -> Result<Project, ApiClientError> {
            self.sent.lock().unwrap().push((kind, payload.clone()));
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("unexpected request")
        }
    }

    #[async_trait]
    impl ProjectsApi for ScriptedApi {
        async fn list_projects(
            &self,
            _status: Option<ProjectStatus>,
            _limit: i64,
        ) -> Result<Vec<Project>, ApiClientError> {
            unreachable!()
        }

        async fn get_project(&self, _id: Uuid) -> Result<Project, ApiClientError> {
            unreachable!()
        }

        async fn list_users(&self, _limit: i64) -> Result<Vec<User>, ApiClientError> {
            self.users
                .clone()
                .ok_or(ApiClientError::Transport("connection refused".into()))
        }

        async fn create_project(&self, payload: &UpsertProject) -> Result<Project, ApiClientError> {
            self.reply("create", payload)
        }

        async fn update_project(&self, payload: &UpsertProject) -> Result<Project, ApiClientError> {
            self.reply("update", payload)
        }
    }

    fn user(name: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            created_at: now,
            updated_at: now,
        }
    }

    fn project(title: &str) -> Project {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: title.to_lowercase(),
            status: ProjectStatus::InProgress,
            deadline: Some(Utc.with_ymd_and_hms(2025, 8, 15, 23, 59, 59).unwrap()),
            budget: Some(7500.0),
            assigned: vec![user("Ada")],
            authors: vec![],
            publication_state: PublicationState::Published,
            published_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_edit_prepopulates_fields() {
        let existing = project("Project 2");
        let form = ProjectForm::edit(&existing);

        assert!(form.is_edit());
        assert_eq!(form.title, "Project 2");
        assert_eq!(form.status, ProjectStatus::InProgress);
        assert_eq!(form.deadline, NaiveDate::from_ymd_opt(2025, 8, 15));
        assert_eq!(form.budget, "7500");
        assert_eq!(form.assigned, vec![existing.assigned[0].id]);
        assert_eq!(form.state(), &FormState::Idle);

        let payload = form.payload();
        assert_eq!(payload.id, Some(existing.id.to_string()));
        assert_eq!(payload.status.as_deref(), Some("in-progress"));
        assert_eq!(
            payload.deadline.as_deref(),
            Some("2025-08-15T23:59:59.000Z")
        );
        assert_eq!(payload.budget, Some(Value::String("7500".into())));
    }

    #[test]
    fn test_changed_deadline_is_sent_as_a_date() {
        let mut form = ProjectForm::edit(&project("Project 2"));
        form.deadline = NaiveDate::from_ymd_opt(2025, 9, 1);
        assert_eq!(form.payload().deadline.as_deref(), Some("2025-09-01"));

        form.deadline = None;
        assert_eq!(form.payload().deadline, None);
    }

    #[test]
    fn test_new_form_deadline_is_a_date() {
        let mut form = ProjectForm::new();
        form.deadline = NaiveDate::from_ymd_opt(2026, 1, 31);
        assert_eq!(form.payload().deadline.as_deref(), Some("2026-01-31"));
    }

    #[test]
    fn test_new_form_payload_has_no_id_and_blank_budget_is_null() {
        let mut form = ProjectForm::new();
        form.title = "Alpha".to_string();
        form.budget = "   ".to_string();

        let payload = form.payload();
        assert_eq!(payload.id, None);
        assert_eq!(payload.budget, None);
        assert_eq!(payload.status.as_deref(), Some("planned"));
        assert_eq!(payload.assigned, Some(vec![]));
    }

    #[tokio::test]
    async fn test_create_success() {
        let created = project("Alpha");
        let api = ScriptedApi::replying(Ok(created.clone()));
        let mut form = ProjectForm::new();
        form.title = "Alpha".to_string();

        let result = form.submit(&api).await;

        assert_eq!(result, Ok(created));
        assert_eq!(form.state(), &FormState::Success("Project created!".into()));
        assert_eq!(api.sent.lock().unwrap()[0].0, "create");
    }

    #[tokio::test]
    async fn test_update_success() {
        let existing = project("Beta");
        let api = ScriptedApi::replying(Ok(existing.clone()));
        let mut form = ProjectForm::edit(&existing);

        form.submit(&api).await.unwrap();

        assert_eq!(form.state(), &FormState::Success("Project updated!".into()));
        assert_eq!(api.sent.lock().unwrap()[0].0, "update");
    }

    #[tokio::test]
    async fn test_forbidden_prompts_login() {
        let api = ScriptedApi::replying(Err(ApiClientError::Http {
            status: 403,
            body: Some(ErrorResponse::from(ErrorCode::Forbidden)),
        }));
        let mut form = ProjectForm::new();

        let result = form.submit(&api).await;

        assert_eq!(result, Err(FormError::LoginRequired));
        assert_eq!(form.state(), &FormState::Error(FormError::LoginRequired));
        assert_eq!(
            FormError::LoginRequired.to_string(),
            "Please log in to add or edit projects"
        );
    }

    #[tokio::test]
    async fn test_server_message_is_shown() {
        let api = ScriptedApi::replying(Err(ApiClientError::Http {
            status: 400,
            body: Some(ErrorResponse::from(ErrorCode::TitleRequired)),
        }));
        let mut form = ProjectForm::new();

        let result = form.submit(&api).await;

        assert_eq!(result, Err(FormError::Message("Title is required".into())));
    }

    #[tokio::test]
    async fn test_unparseable_error_body_falls_back() {
        let existing = project("Gamma");
        let api = ScriptedApi::replying(Err(ApiClientError::Http {
            status: 502,
            body: None,
        }));
        let mut form = ProjectForm::edit(&existing);

        let result = form.submit(&api).await;

        assert_eq!(
            result,
            Err(FormError::Message("Failed to update project".into()))
        );
    }

    #[tokio::test]
    async fn test_transport_error_keeps_its_message() {
        let api = ScriptedApi::replying(Err(ApiClientError::Transport(
            "connection refused".into(),
        )));
        let mut form = ProjectForm::new();

        let result = form.submit(&api).await;

        assert_eq!(
            result,
            Err(FormError::Message("network error: connection refused".into()))
        );
    }

    #[tokio::test]
    async fn test_load_choices() {
        let api = ScriptedApi {
            users: Some(vec![user("Ada"), user("Bob")]),
            ..Default::default()
        };
        let mut form = ProjectForm::new();
        form.load_choices(&api).await;
        assert_eq!(form.choices().len(), 2);

        let failing = ScriptedApi::default();
        form.load_choices(&failing).await;
        assert!(form.choices().is_empty());
    }
}
