pub mod commands;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::api::Gateway;
use crate::config::AppConfig;
use crate::session::FileSessionStore;

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(about = "TaskFlow CLI - Command-line client for the TaskFlow task API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Account and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Profile management")]
    Profile {
        #[command(subcommand)]
        cmd: commands::profile::ProfileCommands,
    },

    #[command(about = "Task operations")]
    Task {
        #[command(subcommand)]
        cmd: commands::task::TaskCommands,
    },
}

#[derive(Debug, Clone)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Gateway over the file-backed session store, with a forced-logout hook
/// that tells the user how to get a fresh session.
pub fn gateway(config: &AppConfig) -> anyhow::Result<Arc<Gateway>> {
    let store = Arc::new(FileSessionStore::from_env()?);
    let gateway = Gateway::new(config.api_base.clone(), store).with_forced_logout(|| {
        eprintln!("Session expired. Run `taskflow auth login` to sign in again.");
    });
    Ok(Arc::new(gateway))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    // Missing or malformed TASKFLOW_BACKEND_URL is fatal before any command runs.
    let config = crate::config::init()?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format, config).await,
        Commands::Profile { cmd } => commands::profile::handle(cmd, output_format, config).await,
        Commands::Task { cmd } => commands::task::handle(cmd, output_format, config).await,
    }
}
