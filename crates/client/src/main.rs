use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use client::{
    api::{HttpProjectsApi, ProjectsApi},
    form::{FormState, ProjectForm},
    list_view::ProjectListView,
};
use db::models::project::{Project, ProjectStatus};
use utils::log::init_tracing;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "project-board")]
#[command(about = "List, add and edit projects on a project board server")]
struct Cli {
    /// API root of the server
    #[arg(long, env = "PROJECT_BOARD_URL", default_value = "http://127.0.0.1:3001/api")]
    url: String,
    /// Email of the acting user; required for create and edit
    #[arg(long, env = "PROJECT_BOARD_USER")]
    user: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List projects, optionally filtered by status
    List {
        #[arg(long)]
        status: Option<ProjectStatus>,
        #[arg(long, default_value_t = 9)]
        limit: i64,
    },
    /// List users that can be assigned to projects
    Users {
        #[arg(long, default_value_t = 100)]
        limit: i64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    Edit {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
        /// Remove every assignee before applying --assign
        #[arg(long)]
        clear_assignees: bool,
    },
}

#[derive(Args)]
struct FieldArgs {
    #[arg(long)]
    status: Option<ProjectStatus>,
    /// Calendar date, YYYY-MM-DD
    #[arg(long)]
    deadline: Option<NaiveDate>,
    #[arg(long)]
    budget: Option<String>,
    /// User id to assign; repeatable
    #[arg(long = "assign")]
    assign: Vec<Uuid>,
}

impl FieldArgs {
    fn apply(self, form: &mut ProjectForm) {
        if let Some(status) = self.status {
            form.status = status;
        }
        if let Some(deadline) = self.deadline {
            form.deadline = Some(deadline);
        }
        if let Some(budget) = self.budget {
            form.budget = budget;
        }
        for id in self.assign {
            if !form.assigned.contains(&id) {
                form.assigned.push(id);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let api: Arc<dyn ProjectsApi> = Arc::new(
        HttpProjectsApi::new(&cli.url, cli.user).context("failed to build HTTP client")?,
    );

    match cli.command {
        Command::List { status, limit } => {
            let mut view = ProjectListView::new(api, limit);
            view.change_filter(status).await;
            if let Some(e) = view.last_error() {
                bail!("failed to load projects: {e}");
            }
            for project in view.projects() {
                print_project(project);
            }
        }
        Command::Users { limit } => {
            let users = api.list_users(limit).await?;
            for user in users {
                println!("{}  {} <{}>", user.id, user.name, user.email);
            }
        }
        Command::Create { title, fields } => {
            let mut view = ProjectListView::new(api, 1);
            view.open_new().await;
            if let Some(form) = view.form_mut() {
                form.title = title;
                fields.apply(form);
            }
            submit(&mut view).await?;
        }
        Command::Edit {
            id,
            title,
            fields,
            clear_assignees,
        } => {
            let existing = api
                .get_project(id)
                .await
                .with_context(|| format!("failed to load project {id}"))?;
            let mut view = ProjectListView::new(api, 1);
            view.open_editor(&existing).await;
            if let Some(form) = view.form_mut() {
                if let Some(title) = title {
                    form.title = title;
                }
                if clear_assignees {
                    form.assigned.clear();
                }
                fields.apply(form);
            }
            submit(&mut view).await?;
        }
    }

    Ok(())
}

async fn submit(view: &mut ProjectListView) -> anyhow::Result<()> {
    match view.submit().await {
        Some(Ok(project)) => {
            if let Some(FormState::Success(message)) =
                view.form_mut().map(|form| form.state().clone())
            {
                println!("{message}");
            }
            print_project(&project);
            Ok(())
        }
        Some(Err(e)) => bail!("{e}"),
        None => bail!("no form open"),
    }
}

fn print_project(project: &Project) {
    let deadline = project
        .deadline
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let budget = project
        .budget
        .map(|b| b.to_string())
        .unwrap_or_else(|| "-".to_string());
    let assigned = project
        .assigned
        .iter()
        .map(|u| u.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{}  {:<12} {:<10} {:>10}  {}  [{}]",
        project.id, project.status, deadline, budget, project.title, assigned
    );
}
