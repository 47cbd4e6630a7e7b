//! Request pipeline: resolve the window, aggregate posts, build the prompt,
//! generate the draft.

pub mod response;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::ai::client::DraftGenerator;
use crate::ai::prompt::build_prompt;
use crate::core::aggregate::{ChannelHistory, DEFAULT_HISTORY_LIMIT, aggregate};
use crate::core::config::DEFAULT_RESPONSE_CHAR_LIMIT;
use crate::core::models::{ChannelScope, Draft, TimeWindow};
use crate::core::window::{resolve, resolve_today};
use crate::errors::DraftError;

/// Which window the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRequest<'a> {
    /// Explicit calendar dates; either side may be omitted.
    Range {
        from: Option<&'a str>,
        to: Option<&'a str>,
    },
    /// Local midnight until now.
    Today,
}

impl WindowRequest<'_> {
    #[must_use]
    pub const fn is_today(&self) -> bool {
        matches!(self, WindowRequest::Today)
    }
}

#[derive(Debug, Clone)]
pub struct DraftRequest<'a> {
    pub scope: ChannelScope,
    pub window: WindowRequest<'a>,
    pub timezone: &'a str,
    pub persona: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftOutcome {
    /// The window held no human posts; nothing was sent to the model.
    NoMessages { window: TimeWindow },
    Generated { window: TimeWindow, draft: Draft },
}

impl DraftOutcome {
    #[must_use]
    pub fn window(&self) -> &TimeWindow {
        match self {
            DraftOutcome::NoMessages { window } | DraftOutcome::Generated { window, .. } => window,
        }
    }
}

pub struct DraftService {
    history: Arc<dyn ChannelHistory>,
    generator: Arc<dyn DraftGenerator>,
    history_limit: usize,
    response_char_limit: usize,
}

impl DraftService {
    #[must_use]
    pub fn new(history: Arc<dyn ChannelHistory>, generator: Arc<dyn DraftGenerator>) -> Self {
        Self {
            history,
            generator,
            history_limit: DEFAULT_HISTORY_LIMIT,
            response_char_limit: DEFAULT_RESPONSE_CHAR_LIMIT,
        }
    }

    #[must_use]
    pub fn with_limits(mut self, history_limit: usize, response_char_limit: usize) -> Self {
        self.history_limit = history_limit;
        self.response_char_limit = response_char_limit;
        self
    }

    #[must_use]
    pub const fn response_char_limit(&self) -> usize {
        self.response_char_limit
    }

    /// Run the pipeline for one command invocation.
    ///
    /// # Errors
    ///
    /// Returns the resolver's date errors, [`DraftError::FetchFailed`] when the
    /// channel cannot be read and [`DraftError::GenerationFailed`] when the
    /// model call fails.
    pub async fn draft(
        &self,
        request: &DraftRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<DraftOutcome, DraftError> {
        let window = match request.window {
            WindowRequest::Range { from, to } => resolve(from, to, request.timezone, now)?,
            WindowRequest::Today => resolve_today(request.timezone, now),
        };

        let posts = aggregate(
            self.history.as_ref(),
            &request.scope,
            &window,
            self.history_limit,
        )
        .await?;

        if posts.is_empty() {
            info!(channel_id = %request.scope.channel_id, "No posts in window");
            return Ok(DraftOutcome::NoMessages { window });
        }

        let prompt = build_prompt(&posts, request.persona, request.language, &window.timezone);
        let content = self.generator.generate(&prompt).await.map_err(|e| match e {
            DraftError::GenerationFailed(_) => e,
            other => DraftError::GenerationFailed(other.to_string()),
        })?;

        info!(
            channel_id = %request.scope.channel_id,
            source_posts = posts.len(),
            draft_chars = content.chars().count(),
            "Draft generated"
        );

        Ok(DraftOutcome::Generated {
            window,
            draft: Draft {
                content: content.trim().to_string(),
                source_post_count: posts.len(),
            },
        })
    }
}
