//! Slash command names and their registration payloads.

use serde_json::{Value, json};

use crate::ai::prompt::MAX_LANGUAGE_LEN;

pub const SNS_X_COMMAND: &str = "sns-x";
pub const SNS_X_TODAY_COMMAND: &str = "sns-x-today";

pub const OPTION_FROM: &str = "from";
pub const OPTION_TO: &str = "to";
pub const OPTION_LANGUAGE: &str = "language";

const CHAT_INPUT: u8 = 1;
const STRING_OPTION: u8 = 3;

fn string_option(name: &str, description: &str, required: bool) -> Value {
    json!({
        "name": name,
        "description": description,
        "type": STRING_OPTION,
        "required": required,
    })
}

/// Definitions sent to `POST /applications/{id}/commands`.
#[must_use]
pub fn command_definitions() -> Vec<Value> {
    let mut language = string_option(
        OPTION_LANGUAGE,
        "Output language (e.g. ja, en). Default: your setting.",
        false,
    );
    language["max_length"] = json!(MAX_LANGUAGE_LEN);

    vec![
        json!({
            "name": SNS_X_COMMAND,
            "description": "Generate an X post draft from Discord messages",
            "type": CHAT_INPUT,
            "options": [
                string_option(OPTION_FROM, "Start date (YYYY-MM-DD)", true),
                string_option(OPTION_TO, "End date (YYYY-MM-DD)", true),
                language.clone(),
            ],
        }),
        json!({
            "name": SNS_X_TODAY_COMMAND,
            "description": "Generate an X post draft from today's messages",
            "type": CHAT_INPUT,
            "options": [language],
        }),
    ]
}
