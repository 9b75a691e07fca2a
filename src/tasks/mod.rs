pub mod filter;
pub mod model;
pub mod service;
pub mod stats;

pub use filter::{FilterPatch, FilterState, PriorityFilter, StatusFilter};
pub use model::{Task, TaskDraft, TaskPriority, TaskStatus};
pub use service::{Confirmation, TaskService};
pub use stats::TaskStats;
