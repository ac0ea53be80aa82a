//! Change notifications emitted after every successful project write.

use serde::Serialize;
use strum_macros::Display;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectChange {
    Created,
    Updated,
}

/// A write that invalidates cached renderings of `paths`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectEvent {
    pub change: ProjectChange,
    pub project_id: Uuid,
    pub paths: Vec<String>,
}

impl ProjectEvent {
    pub fn new(change: ProjectChange, project_id: Uuid, slug: &str) -> Self {
        Self {
            change,
            project_id,
            paths: vec!["/projects".to_string(), format!("/projects/{slug}")],
        }
    }
}

#[derive(Clone)]
pub struct Revalidator {
    sender: broadcast::Sender<ProjectEvent>,
}

impl Default for Revalidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Revalidator {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProjectEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ProjectEvent) {
        debug!(
            project_id = %event.project_id,
            change = %event.change,
            paths = ?event.paths,
            "Revalidating project paths"
        );
        // No subscribers is the common case outside of tests.
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let revalidator = Revalidator::new();
        let mut rx = revalidator.subscribe();
        let id = Uuid::new_v4();

        revalidator.publish(ProjectEvent::new(ProjectChange::Created, id, "alpha"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.project_id, id);
        assert_eq!(event.paths, vec!["/projects", "/projects/alpha"]);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        Revalidator::new().publish(ProjectEvent::new(
            ProjectChange::Updated,
            Uuid::new_v4(),
            "beta",
        ));
    }
}
