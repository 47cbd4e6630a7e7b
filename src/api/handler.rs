//! API Lambda handler - thin router for the Discord interactions webhook.
//!
//! This module handles:
//! - Request validation (headers, body, Ed25519 signature)
//! - Ping acknowledgement
//! - Application commands (delegated to `command_handler`)

use chrono::{DateTime, Utc};
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{Span, error, info, warn};
use uuid::Uuid;

use super::{command_handler, helpers, parsing, signature};
use crate::ai::client::LlmClient;
use crate::core::access::{FeatureGate, StaticFeatureGate, StaticUserSettings, UserSettingsProvider};
use crate::core::config::AppConfig;
use crate::discord::client::DiscordClient;
use crate::discord::interaction::{INTERACTION_APPLICATION_COMMAND, INTERACTION_PING};
use crate::discord::response_builder::{create_channel_message_payload, create_pong_payload};
use crate::draft::DraftService;
use crate::errors::DraftError;

pub use self::function_handler as handler;

/// Collaborators needed to answer one interaction.
pub struct App {
    pub public_key: String,
    pub feature_gate: Arc<dyn FeatureGate>,
    pub user_settings: Arc<dyn UserSettingsProvider>,
    pub drafts: DraftService,
}

impl App {
    #[must_use]
    pub fn new(
        public_key: String,
        feature_gate: Arc<dyn FeatureGate>,
        user_settings: Arc<dyn UserSettingsProvider>,
        drafts: DraftService,
    ) -> Self {
        Self {
            public_key,
            feature_gate,
            user_settings,
            drafts,
        }
    }

    /// Production wiring: Discord REST history, LLM generator, static access stubs.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, DraftError> {
        let history = Arc::new(DiscordClient::new(config)?);
        let generator = Arc::new(LlmClient::new(config)?);
        let drafts = DraftService::new(history, generator)
            .with_limits(config.history_limit, config.response_char_limit);

        Ok(Self::new(
            config.discord_public_key.clone(),
            Arc::new(StaticFeatureGate::default()),
            Arc::new(StaticUserSettings::default()),
            drafts,
        ))
    }
}

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Never fails at the Lambda level; request problems become HTTP error
/// responses.
#[tracing::instrument(level = "info", skip(event), fields(correlation_id))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let correlation_id = Uuid::new_v4().to_string();
    Span::current().record("correlation_id", correlation_id.as_str());
    info!(request_id = %event.context.request_id, "API Lambda received request");

    Ok(route_request(&event.payload, AppConfig::from_env, Utc::now()).await)
}

/// Validate the raw function URL event, build the app and answer the interaction.
pub async fn route_request<F>(payload: &Value, load_config: F, now: DateTime<Utc>) -> Value
where
    F: FnOnce() -> Result<AppConfig, DraftError>,
{
    let Some(headers) = payload.get("headers") else {
        error!("Request missing headers");
        return helpers::err_response(401, "Missing headers");
    };

    if parsing::get_header_value(headers, signature::SIGNATURE_HEADER).is_none()
        || parsing::get_header_value(headers, signature::TIMESTAMP_HEADER).is_none()
    {
        error!("Missing signature headers");
        return helpers::err_response(401, "Missing signature headers");
    }

    let body = match parsing::extract_body(payload) {
        Ok(b) => b,
        Err(e) => {
            error!("Body extraction failed: {}", e);
            return helpers::err_response(400, &e.to_string());
        }
    };

    let config = match load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Config error: {}", e);
            return helpers::err_response(500, "Server configuration error");
        }
    };

    let app = match App::from_config(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialise clients: {}", e);
            return helpers::err_response(500, "Server configuration error");
        }
    };

    handle_webhook(&app, headers, &body, now).await
}

/// Verify and dispatch one signed interaction.
pub async fn handle_webhook(app: &App, headers: &Value, body: &str, now: DateTime<Utc>) -> Value {
    let (Some(sig), Some(timestamp)) = (
        parsing::get_header_value(headers, signature::SIGNATURE_HEADER),
        parsing::get_header_value(headers, signature::TIMESTAMP_HEADER),
    ) else {
        return helpers::err_response(401, "Missing signature headers");
    };

    if !signature::verify_discord_signature(body, timestamp, sig, &app.public_key) {
        let e = DraftError::AuthenticationFailed("invalid request signature".to_string());
        error!("{}", e);
        return helpers::err_response(401, "invalid request signature");
    }

    let interaction = match parsing::parse_interaction(body) {
        Ok(i) => i,
        Err(e) => {
            error!("{}", e);
            return helpers::err_response(400, &e.to_string());
        }
    };

    match interaction.kind {
        INTERACTION_PING => {
            info!("Responding to ping");
            helpers::ok_json(&create_pong_payload())
        }
        INTERACTION_APPLICATION_COMMAND => {
            let content = command_handler::handle_command(app, &interaction, now).await;
            helpers::ok_json(&create_channel_message_payload(&content))
        }
        other => {
            warn!(interaction_type = other, "Unsupported interaction type");
            helpers::err_response(400, "Unsupported interaction type")
        }
    }
}
