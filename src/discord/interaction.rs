//! Typed view of the interaction payloads Discord posts to the webhook.

use serde::Deserialize;
use serde_json::Value;

use crate::core::models::ChannelScope;
use crate::core::snowflake::Snowflake;

pub const INTERACTION_PING: u8 = 1;
pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<CommandData>,
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    /// Present for guild invocations.
    #[serde(default)]
    pub member: Option<Member>,
    /// Present for DM invocations.
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: Snowflake,
}

impl Interaction {
    #[must_use]
    pub fn command_name(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.name.as_str())
    }

    /// String value of a named option; blank strings count as absent.
    #[must_use]
    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.data
            .as_ref()?
            .options
            .iter()
            .find(|opt| opt.name == name)
            .and_then(|opt| opt.value.as_ref())
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn invoking_user_id(&self) -> Option<String> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
            .map(|u| u.id.to_string())
    }

    #[must_use]
    pub fn channel_scope(&self) -> Option<ChannelScope> {
        self.channel_id.map(|channel_id| ChannelScope {
            channel_id,
            guild_id: self.guild_id,
        })
    }
}
