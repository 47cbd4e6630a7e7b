//! Per-user capabilities the draft pipeline depends on.
//!
//! Both are traits so a persistent store can replace the static defaults
//! without touching aggregation or formatting.

use async_trait::async_trait;

use super::models::{DraftConfig, UserSettings};
use crate::errors::DraftError;

/// Feature flag guarding the draft commands.
pub const SNS_X_FEATURE: &str = "sns-x";

pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";
pub const DEFAULT_LANGUAGE: &str = "ja";

pub const DEFAULT_PERSONA: &str = "個人事業主の公式アカウントとして振る舞ってください。\
プロフェッショナルでありながら、親しみやすさを持ち、読者に有益な情報や活動の様子を伝えてください。\
あまり大げさな表現は避け、誠実なトーンを維持してください。";

#[async_trait]
pub trait FeatureGate: Send + Sync {
    async fn is_enabled(&self, feature: &str, user_id: &str) -> Result<bool, DraftError>;
}

#[async_trait]
pub trait UserSettingsProvider: Send + Sync {
    async fn user_settings(&self, user_id: &str) -> Result<UserSettings, DraftError>;

    async fn draft_config(&self, user_id: &str) -> Result<DraftConfig, DraftError>;
}

/// Gate backed by a fixed allow-list shared by every user.
#[derive(Debug, Clone)]
pub struct StaticFeatureGate {
    enabled: Vec<String>,
}

impl StaticFeatureGate {
    #[must_use]
    pub fn new(enabled: Vec<String>) -> Self {
        Self { enabled }
    }
}

impl Default for StaticFeatureGate {
    fn default() -> Self {
        Self::new(vec![SNS_X_FEATURE.to_string()])
    }
}

#[async_trait]
impl FeatureGate for StaticFeatureGate {
    async fn is_enabled(&self, feature: &str, _user_id: &str) -> Result<bool, DraftError> {
        Ok(self.enabled.iter().any(|f| f == feature))
    }
}

/// Returns the same settings for every user.
#[derive(Debug, Clone)]
pub struct StaticUserSettings {
    pub timezone: String,
    pub language: String,
    pub persona: String,
}

impl Default for StaticUserSettings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            persona: DEFAULT_PERSONA.to_string(),
        }
    }
}

#[async_trait]
impl UserSettingsProvider for StaticUserSettings {
    async fn user_settings(&self, user_id: &str) -> Result<UserSettings, DraftError> {
        Ok(UserSettings {
            user_id: user_id.to_string(),
            timezone: self.timezone.clone(),
            language: self.language.clone(),
        })
    }

    async fn draft_config(&self, user_id: &str) -> Result<DraftConfig, DraftError> {
        Ok(DraftConfig {
            user_id: user_id.to_string(),
            persona: self.persona.clone(),
            language: self.language.clone(),
        })
    }
}
