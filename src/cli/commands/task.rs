use clap::Subcommand;
use serde_json::json;

use crate::cli::{gateway, utils, OutputFormat};
use crate::config::AppConfig;
use crate::error::ClientError;
use crate::tasks::{
    Confirmation, FilterPatch, PriorityFilter, StatusFilter, TaskDraft, TaskPriority, TaskService,
    TaskStatus,
};

#[derive(Subcommand)]
pub enum TaskCommands {
    #[command(about = "List tasks, filtered client-side")]
    List {
        #[arg(long, help = "Case-insensitive search over title and description")]
        search: Option<String>,
        #[arg(long, help = "Filter by status (all, pending, in-progress, completed)")]
        status: Option<StatusFilter>,
        #[arg(long, help = "Filter by priority (all, low, medium, high)")]
        priority: Option<PriorityFilter>,
    },

    #[command(about = "Create a task")]
    Create {
        #[arg(long, help = "Task title")]
        title: String,
        #[arg(long, help = "Task description")]
        description: Option<String>,
        #[arg(long, default_value = "pending", help = "pending, in-progress or completed")]
        status: TaskStatus,
        #[arg(long, default_value = "medium", help = "low, medium or high")]
        priority: TaskPriority,
    },

    #[command(about = "Update a task; unspecified fields keep their current values")]
    Update {
        #[arg(help = "Task id")]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
    },

    #[command(about = "Delete a task (asks for confirmation)")]
    Delete {
        #[arg(help = "Task id")]
        id: String,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Show summary statistics over all tasks")]
    Stats,
}

pub async fn handle(
    cmd: TaskCommands,
    output_format: OutputFormat,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let mut service = TaskService::new(gateway(config)?);

    match cmd {
        TaskCommands::List {
            search,
            status,
            priority,
        } => {
            service.load().await?;
            service.set_filter(FilterPatch {
                search,
                status,
                priority,
            });
            utils::output_tasks(&output_format, service.visible())
        }

        TaskCommands::Create {
            title,
            description,
            status,
            priority,
        } => {
            let task = service
                .create(&TaskDraft {
                    title,
                    description,
                    status,
                    priority,
                })
                .await?;
            utils::output_success(
                &output_format,
                &format!("Task created: {}", task.title),
                Some(json!({ "task": task })),
            )
        }

        TaskCommands::Update {
            id,
            title,
            description,
            status,
            priority,
        } => {
            // The backend expects a full replacement, so start from the
            // task's current fields and lay the provided flags over them.
            service.load().await?;
            let existing = match service.find(&id) {
                Some(task) => task.clone(),
                None => return Err(ClientError::validation(format!("no task with id {id}")).into()),
            };
            let draft = TaskDraft {
                title: title.unwrap_or(existing.title),
                description: description.or(existing.description),
                status: status.unwrap_or(existing.status),
                priority: priority.unwrap_or(existing.priority),
            };
            let task = service.update(&id, &draft).await?;
            utils::output_success(
                &output_format,
                &format!("Task updated: {}", task.title),
                Some(json!({ "task": task })),
            )
        }

        TaskCommands::Delete { id, yes } => {
            let confirmation = if yes || utils::confirm("Delete this task?")? {
                Confirmation::Confirmed
            } else {
                Confirmation::Cancelled
            };
            if service.remove(&id, confirmation).await? {
                utils::output_success(&output_format, "Task deleted", None)
            } else {
                utils::output_error(&output_format, "task deletion cancelled")?;
                Ok(())
            }
        }

        TaskCommands::Stats => {
            service.load().await?;
            utils::output_stats(&output_format, &service.stats())
        }
    }
}
