/// SNS Draft - a Discord bot that turns recent channel history into an X post draft.
///
/// The API Lambda receives signed Discord interactions, resolves the requested
/// time window in the user's timezone, gathers the human-authored posts of the
/// channel and its threads, and asks an LLM for a short post in the user's
/// persona and language.
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda (function URL) for serverless execution
/// - Discord REST v10 for channel history and thread enumeration
/// - An OpenAI-compatible chat completions endpoint for generation
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sns_draft::core::config::AppConfig;
/// use sns_draft::core::models::ChannelScope;
/// use sns_draft::core::snowflake::Snowflake;
/// use sns_draft::discord::DiscordClient;
/// use sns_draft::ai::LlmClient;
/// use sns_draft::draft::{DraftOutcome, DraftRequest, DraftService, WindowRequest};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     sns_draft::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let service = DraftService::new(
///         Arc::new(DiscordClient::new(&config)?),
///         Arc::new(LlmClient::new(&config)?),
///     );
///
///     let request = DraftRequest {
///         scope: ChannelScope { channel_id: Snowflake(123), guild_id: None },
///         window: WindowRequest::Today,
///         timezone: "Asia/Tokyo",
///         persona: "an indie game studio",
///         language: "en",
///     };
///
///     match service.draft(&request, chrono::Utc::now()).await? {
///         DraftOutcome::Generated { draft, .. } => println!("{}", draft.content),
///         DraftOutcome::NoMessages { .. } => println!("No messages today"),
///     }
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod api;
pub mod core;
pub mod discord;
pub mod draft;
pub mod errors;

pub use errors::DraftError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// Output goes to `CloudWatch` Logs as one JSON object per event. The level
/// defaults to `info` and can be overridden through `RUST_LOG`. Calling it
/// more than once is harmless.
///
/// # Example
///
/// ```
/// sns_draft::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
