use std::io::{self, Write};

use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::session::User;
use crate::tasks::{Task, TaskStats};

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(Value::Object(extra)) = data {
                if let Some(object) = response.as_object_mut() {
                    object.extend(extra);
                }
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": message
                }))?
            );
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Render a task list in the appropriate format
pub fn output_tasks(output_format: &OutputFormat, tasks: &[Task]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(tasks)?);
        }
        OutputFormat::Text => {
            if tasks.is_empty() {
                println!("No tasks found.");
                return Ok(());
            }
            for task in tasks {
                println!("{}", render_task_line(task));
            }
        }
    }
    Ok(())
}

pub fn render_task_line(task: &Task) -> String {
    let mut line = format!(
        "{}  [{}] [{}] {}",
        task.id, task.status, task.priority, task.title
    );
    if let Some(description) = &task.description {
        if !description.is_empty() {
            line.push_str(" - ");
            line.push_str(description);
        }
    }
    line
}

pub fn output_user(output_format: &OutputFormat, user: &User) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(user)?);
        }
        OutputFormat::Text => {
            println!("{} <{}>", user.name, user.email);
        }
    }
    Ok(())
}

pub fn output_stats(output_format: &OutputFormat, stats: &TaskStats) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(stats)?);
        }
        OutputFormat::Text => {
            println!("Total tasks:  {}", stats.total);
            println!(
                "Completed:    {} ({:.1}%)",
                stats.completed,
                stats.completion_rate()
            );
            println!(
                "In progress:  {} ({:.1}%)",
                stats.in_progress,
                stats.in_progress_rate()
            );
            println!(
                "Pending:      {} ({:.1}%)",
                stats.pending,
                stats.pending_rate()
            );
            println!(
                "Priority:     {} high / {} medium / {} low",
                stats.high, stats.medium, stats.low
            );
        }
    }
    Ok(())
}

/// Ask the user for a yes/no confirmation on stdin. Defaults to no.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N]: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Prompt for a value on stdin when it was not passed as a flag.
pub fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;

    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim_end_matches(['\r', '\n']).to_string())
}
