//! The task service owns the cached collection and its filtered projection.
//! Mutations go through the gateway and resynchronize with a full refetch,
//! so after any successful mutation the cache equals the backend's view.

use std::sync::Arc;

use crate::api::Gateway;
use crate::error::ClientError;

use super::filter::{FilterPatch, FilterState};
use super::model::{Task, TaskDraft};
use super::stats::TaskStats;

/// Whether the user confirmed a destructive operation. Obtained out of band
/// (the CLI prompts); a delete is never issued without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

pub struct TaskService {
    gateway: Arc<Gateway>,
    tasks: Vec<Task>,
    filter: FilterState,
    visible: Vec<Task>,
}

impl TaskService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            tasks: Vec::new(),
            filter: FilterState::default(),
            visible: Vec::new(),
        }
    }

    /// Replace the collection wholesale with the backend's current state.
    /// On failure the existing collection and projection stay untouched.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let tasks = self.gateway.list_tasks().await?;
        tracing::debug!(count = tasks.len(), "task collection replaced");
        self.tasks = tasks;
        self.rebuild_projection();
        Ok(())
    }

    /// Validate locally, submit, then refetch. An empty or whitespace-only
    /// title fails before any network call.
    pub async fn create(&mut self, draft: &TaskDraft) -> Result<Task, ClientError> {
        draft.validate()?;
        let task = self.gateway.create_task(draft).await?;
        self.load().await?;
        Ok(task)
    }

    pub async fn update(&mut self, id: &str, draft: &TaskDraft) -> Result<Task, ClientError> {
        draft.validate()?;
        let task = self.gateway.update_task(id, draft).await?;
        self.load().await?;
        Ok(task)
    }

    /// Delete a task. Returns `Ok(false)` without issuing any request when
    /// the caller did not confirm.
    pub async fn remove(
        &mut self,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<bool, ClientError> {
        if confirmation != Confirmation::Confirmed {
            tracing::debug!(%id, "deletion not confirmed, nothing issued");
            return Ok(false);
        }
        self.gateway.delete_task(id).await?;
        self.load().await?;
        Ok(true)
    }

    /// Merge a partial filter update and rebuild the projection. Purely
    /// local; never touches the network.
    pub fn set_filter(&mut self, patch: FilterPatch) {
        self.filter.merge(patch);
        self.rebuild_projection();
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// The full cached collection, in backend order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The filtered projection as of the last collection or filter change.
    pub fn visible(&self) -> &[Task] {
        &self.visible
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::collect(&self.tasks)
    }

    // Always from scratch; the projection is never patched incrementally.
    fn rebuild_projection(&mut self) {
        self.visible = self.filter.apply(&self.tasks);
    }
}
