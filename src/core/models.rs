use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::snowflake::Snowflake;
use crate::errors::DraftError;

/// Resolved fetch window. `start <= end` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub timezone: Tz,
    /// Set when the requested timezone was unknown and UTC was used instead.
    pub timezone_fallback: Option<DraftError>,
}

impl TimeWindow {
    #[must_use]
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    #[must_use]
    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }

    /// Fetch boundary membership: `[start, end)`.
    #[must_use]
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start_utc() && *instant < self.end_utc()
    }

    /// `YYYY-MM-DD HH:MM - YYYY-MM-DD HH:MM (Zone)` in the window's timezone.
    #[must_use]
    pub fn display_range(&self) -> String {
        format!(
            "{} - {} ({})",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M"),
            self.timezone.name()
        )
    }
}

/// A single human-authored message inside the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPost {
    pub author_name: String,
    pub content: String,
    pub posted_at: DateTime<Utc>,
    pub message_id: Snowflake,
    pub thread_name: Option<String>,
    pub attachment_urls: Vec<String>,
}

/// Raw history entry as returned by a [`ChannelHistory`](super::aggregate::ChannelHistory)
/// implementation, before automated senders are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    pub message_id: Snowflake,
    pub author_name: String,
    pub author_is_automated: bool,
    pub content: String,
    pub posted_at: DateTime<Utc>,
    pub attachment_urls: Vec<String>,
}

impl HistoryMessage {
    #[must_use]
    pub fn into_post(self, thread_name: Option<&str>) -> ChannelPost {
        ChannelPost {
            author_name: self.author_name,
            content: self.content,
            posted_at: self.posted_at,
            message_id: self.message_id,
            thread_name: thread_name.map(ToString::to_string),
            attachment_urls: self.attachment_urls,
        }
    }
}

/// A thread attached to the primary channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRef {
    pub id: Snowflake,
    pub name: String,
    pub archived: bool,
    pub last_activity: Option<DateTime<Utc>>,
}

/// The channel a command was invoked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelScope {
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSettings {
    pub user_id: String,
    pub timezone: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftConfig {
    pub user_id: String,
    pub persona: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub content: String,
    pub source_post_count: usize,
}
