use clap::Subcommand;
use serde_json::json;

use crate::api::auth::{LoginRequest, RegisterRequest};
use crate::cli::{gateway, utils, OutputFormat};
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Register a new account and start a session")]
    Register {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Login and store the session")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and clear the stored session")]
    Logout,

    #[command(about = "Show the locally stored session")]
    Status,

    #[command(about = "Show the authenticated user from the backend")]
    Whoami,
}

pub async fn handle(
    cmd: AuthCommands,
    output_format: OutputFormat,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let gateway = gateway(config)?;

    match cmd {
        AuthCommands::Register {
            name,
            email,
            password,
        } => {
            let password = match password {
                Some(password) => password,
                None => utils::prompt("Password")?,
            };
            let credential = gateway
                .register(&RegisterRequest {
                    name,
                    email,
                    password,
                })
                .await?;
            utils::output_success(
                &output_format,
                &format!("Registered as {}", credential.user.email),
                Some(json!({ "user": credential.user })),
            )
        }

        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => utils::prompt("Password")?,
            };
            let credential = gateway.login(&LoginRequest { email, password }).await?;
            utils::output_success(
                &output_format,
                &format!("Signed in as {}", credential.user.email),
                Some(json!({ "user": credential.user })),
            )
        }

        AuthCommands::Logout => {
            gateway.logout()?;
            utils::output_success(&output_format, "Logged out", None)
        }

        AuthCommands::Status => match gateway.session().current() {
            Some(credential) => utils::output_user(&output_format, &credential.user),
            None => {
                utils::output_error(&output_format, "no active session")?;
                Ok(())
            }
        },

        AuthCommands::Whoami => {
            let user = gateway.fetch_profile().await?;
            utils::output_user(&output_format, &user)
        }
    }
}
