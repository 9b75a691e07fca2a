//! Typed wrappers for the `/tasks` surface.

use super::Gateway;
use crate::error::ClientError;
use crate::tasks::model::{Task, TaskDraft};

impl Gateway {
    /// Fetch the full task collection, in backend order.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.get_json("/tasks").await
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ClientError> {
        self.post_json("/tasks", draft).await
    }

    /// Full replacement of the task's mutable fields.
    pub async fn update_task(&self, id: &str, draft: &TaskDraft) -> Result<Task, ClientError> {
        self.put_json(&format!("/tasks/{id}"), draft).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/tasks/{id}")).await
    }
}
