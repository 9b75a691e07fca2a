use serde::Serialize;

use super::model::{Task, TaskPriority, TaskStatus};

/// Summary statistics derived from the full task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TaskStats {
    pub fn collect(tasks: &[Task]) -> Self {
        let mut stats = TaskStats {
            total: tasks.len(),
            ..TaskStats::default()
        };

        for task in tasks {
            match task.status {
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Pending => stats.pending += 1,
            }
            match task.priority {
                TaskPriority::High => stats.high += 1,
                TaskPriority::Medium => stats.medium += 1,
                TaskPriority::Low => stats.low += 1,
            }
        }

        stats
    }

    /// Percentage of completed tasks; 0 for an empty collection.
    pub fn completion_rate(&self) -> f64 {
        self.rate(self.completed)
    }

    pub fn in_progress_rate(&self) -> f64 {
        self.rate(self.in_progress)
    }

    pub fn pending_rate(&self) -> f64 {
        self.rate(self.pending)
    }

    fn rate(&self, count: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        count as f64 / self.total as f64 * 100.0
    }
}
