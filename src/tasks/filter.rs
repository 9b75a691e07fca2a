//! Client-side filtering. The projection is a pure function of the task
//! collection and the filter state; it never performs I/O.

use std::fmt;
use std::str::FromStr;

use super::model::{Task, TaskPriority, TaskStatus};
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    fn admits(&self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => status.fmt(f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        Ok(StatusFilter::Only(s.parse()?))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(TaskPriority),
}

impl PriorityFilter {
    fn admits(&self, priority: TaskPriority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(wanted) => *wanted == priority,
        }
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityFilter::All => f.write_str("all"),
            PriorityFilter::Only(priority) => priority.fmt(f),
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(PriorityFilter::All);
        }
        Ok(PriorityFilter::Only(s.parse()?))
    }
}

/// Transient, client-only view settings. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub search: String,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
}

/// Partial update merged into [`FilterState`]; unset fields are preserved.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
    pub priority: Option<PriorityFilter>,
}

impl FilterPatch {
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn status(filter: StatusFilter) -> Self {
        Self {
            status: Some(filter),
            ..Self::default()
        }
    }

    pub fn priority(filter: PriorityFilter) -> Self {
        Self {
            priority: Some(filter),
            ..Self::default()
        }
    }
}

impl FilterState {
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(search) = patch.search {
            self.search = search;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }

    /// A task passes when its title or description contains the search text
    /// case-insensitively (if any) and its status and priority match the
    /// non-`all` selections.
    pub fn matches(&self, task: &Task) -> bool {
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&needle);
            let in_description = task
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }

        self.status.admits(task.status) && self.priority.admits(task.priority)
    }

    /// Rebuild the projection from scratch, preserving collection order.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}
