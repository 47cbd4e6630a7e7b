//! Collects the human-authored posts of a channel and its threads for a window.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::models::{ChannelPost, ChannelScope, HistoryMessage, ThreadRef, TimeWindow};
use super::snowflake::{Snowflake, snowflake_from_instant};
use crate::errors::DraftError;

/// Per-scope safety cap on fetched messages.
pub const DEFAULT_HISTORY_LIMIT: usize = 2000;

/// Channel history source. Implementations paginate internally.
#[async_trait]
pub trait ChannelHistory: Send + Sync {
    /// Messages with `after < id < before`, oldest first, at most `limit` of them.
    async fn fetch_messages(
        &self,
        channel_id: Snowflake,
        after: u64,
        before: u64,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, DraftError>;

    /// Threads under the channel that are currently active.
    async fn active_threads(&self, scope: &ChannelScope) -> Result<Vec<ThreadRef>, DraftError>;

    /// Archived threads under the channel whose archive time is at or after `since`.
    async fn archived_threads(
        &self,
        channel_id: Snowflake,
        since: DateTime<Utc>,
    ) -> Result<Vec<ThreadRef>, DraftError>;
}

/// Drops posts written by bots, system users or webhooks.
#[must_use]
pub fn filter_human_messages(messages: Vec<HistoryMessage>) -> Vec<HistoryMessage> {
    messages
        .into_iter()
        .filter(|msg| !msg.author_is_automated)
        .collect()
}

/// Fetch, filter, merge and order every post in `window`.
///
/// Thread enumeration and per-thread failures only reduce completeness; a
/// failure on the primary channel aborts with [`DraftError::FetchFailed`].
///
/// # Errors
///
/// Returns [`DraftError::FetchFailed`] when the primary channel history cannot
/// be read.
pub async fn aggregate(
    history: &dyn ChannelHistory,
    scope: &ChannelScope,
    window: &TimeWindow,
    limit: usize,
) -> Result<Vec<ChannelPost>, DraftError> {
    // `after` is exclusive, so step one below the start cursor.
    let after = snowflake_from_instant(&window.start).saturating_sub(1);
    let before = snowflake_from_instant(&window.end);

    let channel_messages = history
        .fetch_messages(scope.channel_id, after, before, limit)
        .await
        .map_err(|e| match e {
            DraftError::FetchFailed(_) => e,
            other => DraftError::FetchFailed(other.to_string()),
        })?;

    let mut posts: Vec<ChannelPost> = filter_human_messages(channel_messages)
        .into_iter()
        .map(|msg| msg.into_post(None))
        .collect();

    let threads = candidate_threads(history, scope, window).await;

    let fetches = threads.iter().map(|thread| async move {
        (
            thread,
            history.fetch_messages(thread.id, after, before, limit).await,
        )
    });

    for (thread, result) in join_all(fetches).await {
        match result {
            Ok(messages) => {
                posts.extend(
                    filter_human_messages(messages)
                        .into_iter()
                        .map(|msg| msg.into_post(Some(&thread.name))),
                );
            }
            Err(DraftError::AccessDenied(_) | DraftError::ThreadReadDenied(_)) => {
                debug!(thread_id = %thread.id, "Skipping unreadable thread");
            }
            Err(e) => {
                warn!(thread_id = %thread.id, thread = %thread.name, error = %e, "Failed to read thread");
            }
        }
    }

    let merged = merge_posts(posts, window);
    info!(
        channel_id = %scope.channel_id,
        threads = threads.len(),
        posts = merged.len(),
        "Aggregated channel posts"
    );
    Ok(merged)
}

async fn candidate_threads(
    history: &dyn ChannelHistory,
    scope: &ChannelScope,
    window: &TimeWindow,
) -> Vec<ThreadRef> {
    let start = window.start_utc();
    let mut threads = match history.active_threads(scope).await {
        Ok(active) => active,
        Err(e) => {
            let e = DraftError::ThreadEnumerationFailed(e.to_string());
            warn!(channel_id = %scope.channel_id, error = %e, "Active threads unavailable");
            Vec::new()
        }
    };

    match history.archived_threads(scope.channel_id, start).await {
        Ok(archived) => threads.extend(
            archived
                .into_iter()
                .filter(|t| t.last_activity.is_none_or(|at| at >= start)),
        ),
        Err(e) => {
            let e = DraftError::ThreadEnumerationFailed(e.to_string());
            warn!(channel_id = %scope.channel_id, error = %e, "Archived threads unavailable");
        }
    }

    let mut seen = HashSet::new();
    threads.retain(|t| seen.insert(t.id));
    threads
}

/// Keep in-window posts, drop duplicate ids, order by time then id.
fn merge_posts(mut posts: Vec<ChannelPost>, window: &TimeWindow) -> Vec<ChannelPost> {
    posts.retain(|p| window.contains(&p.posted_at));
    posts.sort_by(|a, b| {
        a.posted_at
            .cmp(&b.posted_at)
            .then(a.message_id.cmp(&b.message_id))
    });
    let mut seen = HashSet::new();
    posts.retain(|p| seen.insert(p.message_id));
    posts
}
