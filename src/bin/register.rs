//! One-time registration of the draft slash commands.

use anyhow::{Context, Result};
use clap::Parser;
use sns_draft::core::config::DEFAULT_DISCORD_API_BASE;
use sns_draft::discord::DiscordClient;
use sns_draft::discord::commands::command_definitions;
use tracing::info;

#[derive(Parser)]
#[command(name = "sns-draft-register")]
#[command(about = "Register the sns-x slash commands with Discord", long_about = None)]
struct Cli {
    /// Discord application id
    #[arg(long, env = "DISCORD_APPLICATION_ID")]
    app_id: String,

    /// Bot token used to authenticate
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    token: String,

    /// Register for one guild only (updates instantly); global otherwise
    #[arg(long, env = "DISCORD_GUILD_ID")]
    guild_id: Option<String>,

    /// REST API base URL
    #[arg(long, env = "DISCORD_API_BASE", default_value = DEFAULT_DISCORD_API_BASE)]
    api_base: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    sns_draft::setup_logging();
    let cli = Cli::parse();

    let client = DiscordClient::with_token(&cli.api_base, &cli.token)
        .context("Failed to build Discord client")?;

    for command in command_definitions() {
        let name = command["name"].as_str().unwrap_or_default().to_string();
        client
            .register_command(&cli.app_id, cli.guild_id.as_deref(), &command)
            .await
            .with_context(|| format!("Failed to register /{name}"))?;
        info!(command = %name, guild_id = ?cli.guild_id, "Registered command");
    }

    Ok(())
}
