use std::env;

use super::aggregate::DEFAULT_HISTORY_LIMIT;
use crate::errors::DraftError;

pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";
pub const DEFAULT_LLM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash";

/// Discord's per-message content limit.
pub const DEFAULT_RESPONSE_CHAR_LIMIT: usize = 2000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord_public_key: String,
    pub discord_bot_token: String,
    pub discord_api_base: String,
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub history_limit: usize,
    pub response_char_limit: usize,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns [`DraftError::ConfigError`] naming the first missing or
    /// malformed variable.
    pub fn from_env() -> Result<Self, DraftError> {
        Ok(Self {
            discord_public_key: required("DISCORD_PUBLIC_KEY")?,
            discord_bot_token: required("DISCORD_BOT_TOKEN")?,
            discord_api_base: env::var("DISCORD_API_BASE")
                .unwrap_or_else(|_| DEFAULT_DISCORD_API_BASE.to_string()),
            llm_api_key: required("LLM_API_KEY")?,
            llm_base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            history_limit: optional_usize("HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?,
            response_char_limit: optional_usize("RESPONSE_CHAR_LIMIT", DEFAULT_RESPONSE_CHAR_LIMIT)?,
        })
    }
}

fn required(name: &str) -> Result<String, DraftError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        Ok(_) => Err(DraftError::ConfigError(format!("{name}: empty value"))),
        Err(e) => Err(DraftError::ConfigError(format!("{name}: {e}"))),
    }
}

fn optional_usize(name: &str, default: usize) -> Result<usize, DraftError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|e| DraftError::ConfigError(format!("{name}: {e}"))),
        Err(_) => Ok(default),
    }
}
