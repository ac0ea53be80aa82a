//! Project list with a status filter and an add/edit modal.
//!
//! Every query carries the generation it was issued under. A reply is only
//! applied when its generation is still the latest, so a slow reply to an
//! older filter can never overwrite a newer one.

use std::sync::Arc;

use db::models::project::{Project, ProjectStatus};
use tracing::{debug, warn};

use crate::{
    api::{ApiClientError, ProjectsApi},
    form::{FormError, ProjectForm},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
    filter: Option<ProjectStatus>,
}

/// A query that has been issued but not yet sent
pub struct PendingQuery {
    ticket: QueryTicket,
    limit: i64,
    api: Arc<dyn ProjectsApi>,
}

impl PendingQuery {
    pub async fn run(self) -> (QueryTicket, Result<Vec<Project>, ApiClientError>) {
        let result = self.api.list_projects(self.ticket.filter, self.limit).await;
        (self.ticket, result)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Modal {
    #[default]
    Closed,
    Open(Box<ProjectForm>),
}

pub struct ProjectListView {
    api: Arc<dyn ProjectsApi>,
    limit: i64,
    filter: Option<ProjectStatus>,
    projects: Vec<Project>,
    modal: Modal,
    generation: u64,
    last_error: Option<ApiClientError>,
}

impl ProjectListView {
    pub fn new(api: Arc<dyn ProjectsApi>, limit: i64) -> Self {
        Self::with_projects(api, limit, Vec::new())
    }

    /// View that starts out showing `projects` (e.g. a server-rendered first
    /// page) under no filter
    pub fn with_projects(api: Arc<dyn ProjectsApi>, limit: i64, projects: Vec<Project>) -> Self {
        Self {
            api,
            limit,
            filter: None,
            projects,
            modal: Modal::Closed,
            generation: 0,
            last_error: None,
        }
    }

    pub fn filter(&self) -> Option<ProjectStatus> {
        self.filter
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn last_error(&self) -> Option<&ApiClientError> {
        self.last_error.as_ref()
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    /// Record a new active filter and hand back the query for it. Any reply
    /// to an earlier query becomes stale from this point on.
    pub fn begin_query(&mut self, filter: Option<ProjectStatus>) -> PendingQuery {
        self.filter = filter;
        self.generation += 1;
        PendingQuery {
            ticket: QueryTicket {
                generation: self.generation,
                filter,
            },
            limit: self.limit,
            api: Arc::clone(&self.api),
        }
    }

    /// Apply a reply. Returns `false` when the reply was stale and dropped.
    pub fn apply(
        &mut self,
        ticket: QueryTicket,
        result: Result<Vec<Project>, ApiClientError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                "Discarding stale project list reply"
            );
            return false;
        }

        match result {
            Ok(projects) => {
                self.projects = projects;
                self.last_error = None;
            }
            Err(e) => {
                warn!(error = %e, filter = ?ticket.filter, "Failed to load projects");
                self.last_error = Some(e);
            }
        }
        true
    }

    pub async fn change_filter(&mut self, filter: Option<ProjectStatus>) {
        let (ticket, result) = self.begin_query(filter).run().await;
        self.apply(ticket, result);
    }

    /// Re-query with the active filter
    pub async fn refresh(&mut self) {
        self.change_filter(self.filter).await;
    }

    pub async fn open_new(&mut self) {
        self.open(ProjectForm::new()).await;
    }

    pub async fn open_editor(&mut self, project: &Project) {
        self.open(ProjectForm::edit(project)).await;
    }

    async fn open(&mut self, mut form: ProjectForm) {
        form.load_choices(self.api.as_ref()).await;
        self.modal = Modal::Open(Box::new(form));
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::Closed;
    }

    pub fn form_mut(&mut self) -> Option<&mut ProjectForm> {
        match &mut self.modal {
            Modal::Open(form) => Some(form),
            Modal::Closed => None,
        }
    }

    /// Submit the open form. On success the list is re-queried with the
    /// active filter; on error the form stays open with its error state.
    pub async fn submit(&mut self) -> Option<Result<Project, FormError>> {
        let api = Arc::clone(&self.api);
        let form = self.form_mut()?;
        let result = form.submit(api.as_ref()).await;
        if result.is_ok() {
            self.refresh().await;
        }
        Some(result)
    }
}
