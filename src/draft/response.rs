//! User-visible text for a draft outcome.

use super::DraftOutcome;
use crate::core::models::TimeWindow;

pub const TRUNCATION_MARKER: &str = "\n...(truncated)";

/// Room kept free below the transport limit when truncating.
const TRUNCATION_HEADROOM: usize = 100;

/// Cut `text` to `limit - 100` characters plus a marker when it exceeds `limit`.
#[must_use]
pub fn truncate_for_transport(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let marker_len = TRUNCATION_MARKER.chars().count();
    if limit < marker_len {
        return text.chars().take(limit).collect();
    }
    let keep = limit
        .saturating_sub(TRUNCATION_HEADROOM)
        .min(limit - marker_len);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

fn timezone_warning(window: &TimeWindow) -> Option<String> {
    window
        .timezone_fallback
        .as_ref()
        .map(|e| format!("⚠️ {e}."))
}

fn header(title: &str, window: &TimeWindow, message_count: Option<usize>) -> String {
    let mut lines = vec![title.to_string(), format!("Time: {}", window.display_range())];
    if let Some(count) = message_count {
        lines.push(format!("Messages: {count}"));
    }
    if let Some(warning) = timezone_warning(window) {
        lines.push(warning);
    }
    lines.join("\n")
}

/// Assemble the reply for `outcome`, keeping it within `limit` characters.
///
/// Only the draft body is truncated while the header block fits; an
/// oversized header falls back to cutting the whole reply.
#[must_use]
pub fn render_outcome(outcome: &DraftOutcome, today: bool, language: &str, limit: usize) -> String {
    let text = assemble(outcome, today, language, limit);
    if text.chars().count() > limit {
        truncate_for_transport(&text, limit)
    } else {
        text
    }
}

fn assemble(outcome: &DraftOutcome, today: bool, language: &str, limit: usize) -> String {
    match outcome {
        DraftOutcome::NoMessages { window } => {
            let title = if today {
                "**X Post Draft (Today)**"
            } else {
                "**X Post Draft**"
            };
            let empty = if today {
                "No messages found today."
            } else {
                "No messages found in this period."
            };
            format!("{}\n\n{empty}", header(title, window, None))
        }
        DraftOutcome::Generated { window, draft } => {
            let title = if today {
                format!("**X Post Draft (Today, {language})**")
            } else {
                format!("**X Post Draft ({language})**")
            };
            let head = format!(
                "{}\n\n",
                header(&title, window, Some(draft.source_post_count))
            );
            let body_limit = limit.saturating_sub(head.chars().count());
            format!("{head}{}", truncate_for_transport(&draft.content, body_limit))
        }
    }
}
