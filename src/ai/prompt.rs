//! Rendering of aggregated posts into the text handed to the model.
//!
//! Attachments are never rendered; the text model cannot read them.

use chrono_tz::Tz;

use crate::core::models::ChannelPost;

/// Maximum persona length embedded in the prompt.
pub const MAX_PERSONA_LEN: usize = 800;

/// Character budget for the rendered chat log.
pub const MAX_LOG_CHARS: usize = 60_000;

/// Longest accepted output language label, e.g. `ja` or `Brazilian Portuguese`.
pub const MAX_LANGUAGE_LEN: usize = 32;

fn strip_and_cap(raw: &str, max_chars: usize) -> String {
    raw.chars()
        .filter(|c| !c.is_control())
        .take(max_chars)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Remove control characters and hard-truncate a persona instruction.
#[must_use]
pub fn sanitize_persona(raw: &str) -> String {
    strip_and_cap(raw, MAX_PERSONA_LEN)
}

/// Same treatment for the language label, which is user input on every command.
#[must_use]
pub fn sanitize_language(raw: &str) -> String {
    strip_and_cap(raw, MAX_LANGUAGE_LEN)
}

/// `[YYYY-MM-DD HH:MM] author (in Thread: name): content`, local to `tz`.
#[must_use]
pub fn render_line(post: &ChannelPost, tz: &Tz) -> String {
    let stamp = post.posted_at.with_timezone(tz).format("%Y-%m-%d %H:%M");
    match &post.thread_name {
        Some(thread) => format!(
            "[{stamp}] {} (in Thread: {thread}): {}",
            post.author_name, post.content
        ),
        None => format!("[{stamp}] {}: {}", post.author_name, post.content),
    }
}

/// Render posts oldest first, keeping the newest lines that fit in `max_chars`.
#[must_use]
pub fn render_chat_log(posts: &[ChannelPost], tz: &Tz, max_chars: usize) -> String {
    let mut kept: Vec<String> = Vec::new();
    let mut used = 0usize;

    for post in posts.iter().rev() {
        let line = render_line(post, tz);
        let cost = line.chars().count() + 1;
        if used + cost > max_chars {
            break;
        }
        used += cost;
        kept.push(line);
    }

    let omitted = posts.len() - kept.len();
    kept.reverse();

    let log = kept.join("\n");
    if omitted > 0 {
        format!("({omitted} earlier messages omitted)\n{log}")
    } else {
        log
    }
}

/// Build the full instruction for an X (Twitter) post draft.
#[must_use]
pub fn build_prompt(posts: &[ChannelPost], persona: &str, language: &str, tz: &Tz) -> String {
    let persona = sanitize_persona(persona);
    let language = sanitize_language(language);
    let chat_log = render_chat_log(posts, tz, MAX_LOG_CHARS);

    format!(
        "You are a skilled social media manager.\n\
         Create an engaging post for X (formerly Twitter) based on the following chat log from a Discord server.\n\
         \n\
         **Persona Instructions:**\n\
         Act as: {persona}\n\
         \n\
         The post should summarize the interesting parts of the conversation or highlight key activities.\n\
         Include relevant hashtags.\n\
         \n\
         **IMPORTANT: Write the post in {language}.**\n\
         \n\
         Chat Log:\n\
         {chat_log}\n\
         \n\
         Output format:\n\
         [Post Content]\n"
    )
}
