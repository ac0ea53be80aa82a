use std::sync::Arc;

use client::{
    api::{HttpProjectsApi, ProjectsApi},
    form::{FormError, FormState},
    list_view::{Modal, ProjectListView},
};
use db::{DBService, models::project::ProjectStatus};
use server::{AppState, routes};
use services::services::{identity::EmailIdentityProvider, revalidation::Revalidator};
use tokio::net::TcpListener;

const ADMIN: &str = "demo-author@example.com";

async fn spawn_server() -> String {
    let db = DBService::new_in_memory().await.unwrap();
    let identity = Arc::new(EmailIdentityProvider::new(db.pool.clone()));
    let state = AppState::new(db, identity, Revalidator::new());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, routes::router(state)).await.unwrap();
    });

    format!("http://{addr}/api")
}

fn api(base: &str, user: Option<&str>) -> Arc<dyn ProjectsApi> {
    Arc::new(HttpProjectsApi::new(base, user.map(str::to_string)).unwrap())
}

#[tokio::test]
async fn filter_change_shows_only_matching_projects() {
    let base = spawn_server().await;
    let mut view = ProjectListView::new(api(&base, None), 9);

    view.change_filter(None).await;
    assert_eq!(view.projects().len(), 3);

    for status in ProjectStatus::ALL {
        view.change_filter(Some(status)).await;
        assert!(!view.projects().is_empty());
        assert!(view.projects().iter().all(|p| p.status == status));
    }
}

#[tokio::test]
async fn add_then_edit_moves_project_between_filters() {
    let base = spawn_server().await;
    let mut view = ProjectListView::new(api(&base, Some(ADMIN)), 9);
    view.change_filter(Some(ProjectStatus::Planned)).await;

    view.open_new().await;
    let form = view.form_mut().unwrap();
    assert_eq!(form.choices().len(), 1);
    form.title = "Alpha".to_string();
    form.budget = "100".to_string();
    form.assigned = vec![form.choices()[0].id];
    let alpha = view.submit().await.unwrap().unwrap();

    assert_eq!(alpha.status, ProjectStatus::Planned);
    assert_eq!(alpha.budget, Some(100.0));
    assert_eq!(alpha.assigned[0].email, ADMIN);
    assert!(view.projects().iter().any(|p| p.id == alpha.id));

    view.open_editor(&alpha).await;
    let form = view.form_mut().unwrap();
    form.status = ProjectStatus::Completed;
    view.submit().await.unwrap().unwrap();

    match view.modal() {
        Modal::Open(form) => {
            assert_eq!(form.state(), &FormState::Success("Project updated!".into()))
        }
        Modal::Closed => panic!("modal closed unexpectedly"),
    }
    assert!(view.projects().iter().all(|p| p.id != alpha.id));

    view.change_filter(Some(ProjectStatus::Completed)).await;
    assert!(view.projects().iter().any(|p| p.id == alpha.id));
}

#[tokio::test]
async fn latest_filter_wins_when_replies_arrive_out_of_order() {
    let base = spawn_server().await;
    let mut view = ProjectListView::new(api(&base, None), 9);

    let first = view.begin_query(Some(ProjectStatus::Completed));
    let second = view.begin_query(Some(ProjectStatus::InProgress));
    let (ticket_b, reply_b) = second.run().await;
    let (ticket_a, reply_a) = first.run().await;

    view.apply(ticket_b, reply_b);
    view.apply(ticket_a, reply_a);

    assert_eq!(view.filter(), Some(ProjectStatus::InProgress));
    assert_eq!(view.projects().len(), 1);
    assert_eq!(view.projects()[0].title, "Project 2");
}

#[tokio::test]
async fn anonymous_submit_prompts_login() {
    let base = spawn_server().await;
    let mut view = ProjectListView::new(api(&base, None), 9);

    view.open_new().await;
    view.form_mut().unwrap().title = "Sneaky".to_string();
    let result = view.submit().await.unwrap();

    assert_eq!(result, Err(FormError::LoginRequired));
}

#[tokio::test]
async fn missing_title_shows_server_message() {
    let base = spawn_server().await;
    let mut view = ProjectListView::new(api(&base, Some(ADMIN)), 9);

    view.open_new().await;
    let result = view.submit().await.unwrap();

    assert_eq!(result, Err(FormError::Message("Title is required".into())));
}
