use clap::Subcommand;
use serde_json::json;

use crate::cli::{gateway, utils, OutputFormat};
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum ProfileCommands {
    #[command(about = "Show the profile from the backend")]
    Show,

    #[command(about = "Update the profile name")]
    Update {
        #[arg(help = "New display name")]
        name: String,
    },
}

pub async fn handle(
    cmd: ProfileCommands,
    output_format: OutputFormat,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let gateway = gateway(config)?;

    match cmd {
        ProfileCommands::Show => {
            let user = gateway.fetch_profile().await?;
            utils::output_user(&output_format, &user)
        }

        ProfileCommands::Update { name } => {
            let user = gateway.update_profile(&name).await?;
            utils::output_success(
                &output_format,
                &format!("Profile updated: {}", user.name),
                Some(json!({ "user": user })),
            )
        }
    }
}
