//! Handler for the `/sns-x` and `/sns-x-today` application commands.
//!
//! Every outcome, including failures, becomes the text of a channel message
//! reply; only the webhook boundary deals in HTTP status codes.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::handler::App;
use crate::ai::prompt::sanitize_language;
use crate::core::access::SNS_X_FEATURE;
use crate::discord::commands::{OPTION_FROM, OPTION_LANGUAGE, OPTION_TO, SNS_X_COMMAND, SNS_X_TODAY_COMMAND};
use crate::discord::interaction::Interaction;
use crate::draft::response::render_outcome;
use crate::draft::{DraftRequest, WindowRequest};

pub const COMMAND_NOT_FOUND: &str = "Command not found.";
pub const MISSING_CHANNEL: &str = "Could not determine channel ID.";
pub const MISSING_USER: &str = "Could not determine user ID.";

#[must_use]
pub fn permission_denied_message(feature: &str) -> String {
    format!("You do not have permission to use the `{feature}` feature.")
}

/// Run one command invocation and return the reply text.
pub async fn handle_command(app: &App, interaction: &Interaction, now: DateTime<Utc>) -> String {
    let window = match interaction.command_name() {
        Some(SNS_X_COMMAND) => WindowRequest::Range {
            from: interaction.option_str(OPTION_FROM),
            to: interaction.option_str(OPTION_TO),
        },
        Some(SNS_X_TODAY_COMMAND) => WindowRequest::Today,
        other => {
            warn!(command = ?other, "Unknown command");
            return COMMAND_NOT_FOUND.to_string();
        }
    };

    let Some(user_id) = interaction.invoking_user_id() else {
        warn!("Interaction carries no user");
        return MISSING_USER.to_string();
    };

    match app.feature_gate.is_enabled(SNS_X_FEATURE, &user_id).await {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user_id, "Feature disabled for user");
            return permission_denied_message(SNS_X_FEATURE);
        }
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Feature gate lookup failed");
            return e.user_message();
        }
    }

    let Some(scope) = interaction.channel_scope() else {
        warn!(user_id = %user_id, "Interaction carries no channel");
        return MISSING_CHANNEL.to_string();
    };

    let settings = match app.user_settings.user_settings(&user_id).await {
        Ok(s) => s,
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Failed to load user settings");
            return e.user_message();
        }
    };
    let draft_config = match app.user_settings.draft_config(&user_id).await {
        Ok(c) => c,
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Failed to load draft config");
            return e.user_message();
        }
    };

    let language = interaction
        .option_str(OPTION_LANGUAGE)
        .map(sanitize_language)
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| sanitize_language(&draft_config.language));

    let request = DraftRequest {
        scope,
        window,
        timezone: &settings.timezone,
        persona: &draft_config.persona,
        language: &language,
    };

    info!(
        user_id = %user_id,
        channel_id = %scope.channel_id,
        today = window.is_today(),
        language = %language,
        "Drafting X post"
    );

    match app.drafts.draft(&request, now).await {
        Ok(outcome) => render_outcome(
            &outcome,
            window.is_today(),
            &language,
            app.drafts.response_char_limit(),
        ),
        Err(e) => {
            error!(channel_id = %scope.channel_id, error = %e, "Draft request failed");
            e.user_message()
        }
    }
}
