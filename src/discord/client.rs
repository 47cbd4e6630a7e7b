//! Discord REST client module
//!
//! Implements [`ChannelHistory`] on top of the v10 REST API with pagination,
//! thread enumeration and retry of transient failures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::core::aggregate::ChannelHistory;
use crate::core::config::AppConfig;
use crate::core::models::{ChannelScope, HistoryMessage, ThreadRef};
use crate::core::snowflake::Snowflake;
use crate::errors::DraftError;

/// Discord's maximum page size for history and archived thread listings.
pub const PAGE_SIZE: usize = 100;

/// Total attempts per REST call, first call included.
pub const MAX_REQUEST_ATTEMPTS: usize = 3;

/// Upper bound on a server-requested rate-limit wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/sns-draft, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

#[derive(Debug, Deserialize)]
struct DiscordAuthor {
    #[serde(default)]
    username: String,
    #[serde(default)]
    global_name: Option<String>,
    #[serde(default)]
    bot: bool,
    #[serde(default)]
    system: bool,
}

#[derive(Debug, Deserialize)]
struct DiscordAttachment {
    url: String,
}

#[derive(Debug, Deserialize)]
struct DiscordMessage {
    id: Snowflake,
    #[serde(default)]
    content: String,
    #[serde(default)]
    timestamp: Option<String>,
    author: DiscordAuthor,
    #[serde(default)]
    webhook_id: Option<Snowflake>,
    #[serde(default)]
    attachments: Vec<DiscordAttachment>,
}

impl DiscordMessage {
    fn into_history(self) -> HistoryMessage {
        let posted_at = self
            .timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map_or_else(|| self.id.timestamp(), |dt| dt.with_timezone(&Utc));

        let author_name = self
            .author
            .global_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.author.username);

        HistoryMessage {
            message_id: self.id,
            author_name,
            author_is_automated: self.author.bot
                || self.author.system
                || self.webhook_id.is_some(),
            content: self.content,
            posted_at,
            attachment_urls: self.attachments.into_iter().map(|a| a.url).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ThreadMetadata {
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    archive_timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiscordThread {
    id: Snowflake,
    #[serde(default)]
    name: String,
    #[serde(default)]
    parent_id: Option<Snowflake>,
    #[serde(default)]
    last_message_id: Option<Snowflake>,
    #[serde(default)]
    thread_metadata: Option<ThreadMetadata>,
}

impl DiscordThread {
    fn archive_timestamp(&self) -> Option<DateTime<Utc>> {
        self.thread_metadata
            .as_ref()
            .and_then(|m| m.archive_timestamp.as_deref())
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn into_ref(self) -> ThreadRef {
        let last_activity = match (
            self.archive_timestamp(),
            self.last_message_id.map(Snowflake::timestamp),
        ) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };

        ThreadRef {
            id: self.id,
            archived: self.thread_metadata.as_ref().is_some_and(|m| m.archived),
            name: self.name,
            last_activity,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ThreadList {
    #[serde(default)]
    threads: Vec<DiscordThread>,
    #[serde(default)]
    has_more: bool,
}

/// Discord REST client authenticated as the bot user.
pub struct DiscordClient {
    http: Client,
    api_base: String,
    token: String,
}

impl DiscordClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, DraftError> {
        Self::with_token(&config.discord_api_base, &config.discord_bot_token)
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_token(api_base: &str, token: &str) -> Result<Self, DraftError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DraftError::HttpError(format!("Failed to build Discord HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, DraftError>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, DraftError>> + Send,
        T: Send,
    {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(250)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(MAX_REQUEST_ATTEMPTS - 1);

        RetryIf::spawn(strategy, operation, |e: &DraftError| {
            let retry = e.is_transient();
            if retry {
                warn!(error = %e, "Discord API unavailable, retrying");
            }
            retry
        })
        .await
    }

    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DraftError> {
        let url = format!("{}{path}", self.api_base);
        let url = url.as_str();
        let mut attempt = 0usize;

        self.with_retry(|| {
            attempt += 1;
            let last_attempt = attempt >= MAX_REQUEST_ATTEMPTS;
            async move {
                let resp = self
                    .http
                    .get(url)
                    .header("Authorization", format!("Bot {}", self.token))
                    .query(query)
                    .send()
                    .await?;

                let status = resp.status();
                if !status.is_success() {
                    let header_delay = retry_after_header(resp.headers());
                    let body = resp.text().await.unwrap_or_default();
                    if status == StatusCode::TOO_MANY_REQUESTS
                        && !last_attempt
                        && let Some(delay) = header_delay.or_else(|| retry_after_body(&body))
                    {
                        warn!(path = %path, retry_after_secs = delay.as_secs_f64(), "Rate limited by Discord");
                        tokio::time::sleep(delay).await;
                    }
                    return Err(classify_status(status, path, &body));
                }

                resp.json::<T>()
                    .await
                    .map_err(|e| DraftError::ParseError(format!("{path}: {e}")))
            }
        })
        .await
    }

    /// Register (or overwrite) one application command, globally or per guild.
    ///
    /// # Errors
    ///
    /// Returns an error if Discord rejects the definition.
    pub async fn register_command(
        &self,
        application_id: &str,
        guild_id: Option<&str>,
        command: &Value,
    ) -> Result<(), DraftError> {
        let url = match guild_id {
            Some(guild) => format!(
                "{}/applications/{application_id}/guilds/{guild}/commands",
                self.api_base
            ),
            None => format!("{}/applications/{application_id}/commands", self.api_base),
        };

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(command)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(DraftError::HttpError(format!(
                "command registration failed ({status}): {body}"
            )))
        }
    }
}

#[async_trait]
impl ChannelHistory for DiscordClient {
    async fn fetch_messages(
        &self,
        channel_id: Snowflake,
        after: u64,
        before: u64,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, DraftError> {
        let path = format!("/channels/{channel_id}/messages");
        let mut cursor = after;
        let mut collected: Vec<HistoryMessage> = Vec::new();

        loop {
            let page: Vec<DiscordMessage> = self
                .get_json(
                    &path,
                    &[
                        ("after", cursor.to_string()),
                        ("limit", PAGE_SIZE.to_string()),
                    ],
                )
                .await?;

            let page_len = page.len();
            let Some(newest) = page.iter().map(|m| m.id.get()).max() else {
                break;
            };

            collected.extend(
                page.into_iter()
                    .filter(|m| m.id.get() < before)
                    .map(DiscordMessage::into_history),
            );

            if newest >= before || page_len < PAGE_SIZE || collected.len() >= limit || newest <= cursor
            {
                break;
            }
            cursor = newest;
        }

        collected.sort_by_key(|m| m.message_id);
        collected.truncate(limit);
        debug!(channel_id = %channel_id, count = collected.len(), "Fetched history");
        Ok(collected)
    }

    async fn active_threads(&self, scope: &ChannelScope) -> Result<Vec<ThreadRef>, DraftError> {
        // Active threads are only listed per guild.
        let Some(guild_id) = scope.guild_id else {
            return Ok(Vec::new());
        };

        let list: ThreadList = self
            .get_json(&format!("/guilds/{guild_id}/threads/active"), &[])
            .await?;

        Ok(list
            .threads
            .into_iter()
            .filter(|t| t.parent_id == Some(scope.channel_id))
            .map(DiscordThread::into_ref)
            .collect())
    }

    async fn archived_threads(
        &self,
        channel_id: Snowflake,
        since: DateTime<Utc>,
    ) -> Result<Vec<ThreadRef>, DraftError> {
        let path = format!("/channels/{channel_id}/threads/archived/public");
        let mut before: Option<String> = None;
        let mut found = Vec::new();

        loop {
            let mut query = vec![("limit", PAGE_SIZE.to_string())];
            if let Some(b) = &before {
                query.push(("before", b.clone()));
            }
            let list: ThreadList = self.get_json(&path, &query).await?;

            // Listing is ordered by archive time, newest first.
            let oldest = list
                .threads
                .last()
                .and_then(|t| t.thread_metadata.as_ref())
                .and_then(|m| m.archive_timestamp.clone());
            let mut reached_cutoff = false;

            for thread in list.threads {
                match thread.archive_timestamp() {
                    Some(archived_at) if archived_at < since => reached_cutoff = true,
                    _ => found.push(thread.into_ref()),
                }
            }

            match oldest {
                Some(ts) if list.has_more && !reached_cutoff => before = Some(ts),
                _ => break,
            }
        }

        info!(channel_id = %channel_id, count = found.len(), "Listed archived threads");
        Ok(found)
    }
}

fn clamp_retry_after(secs: f64) -> Option<Duration> {
    (secs.is_finite() && secs >= 0.0)
        .then(|| Duration::from_secs_f64(secs.min(MAX_RETRY_AFTER.as_secs_f64())))
}

fn retry_after_header(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .and_then(clamp_retry_after)
}

// 429 bodies carry `retry_after` in seconds, possibly fractional.
fn retry_after_body(body: &str) -> Option<Duration> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("retry_after")?
        .as_f64()
        .and_then(clamp_retry_after)
}

fn classify_status(status: StatusCode, path: &str, body: &str) -> DraftError {
    let detail = format!("{path} returned {status}: {body}");
    match status {
        StatusCode::FORBIDDEN => DraftError::AccessDenied(detail),
        StatusCode::TOO_MANY_REQUESTS => DraftError::UpstreamUnavailable(detail),
        s if s.is_server_error() => DraftError::UpstreamUnavailable(detail),
        _ => DraftError::FetchFailed(detail),
    }
}
