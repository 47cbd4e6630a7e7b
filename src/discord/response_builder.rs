//! Interaction response payloads.
//!
//! Discord expects `{ "type": 1 }` to acknowledge a ping and
//! `{ "type": 4, "data": { "content": ... } }` to reply in the channel.

use serde_json::{Value, json};

pub const RESPONSE_PONG: u8 = 1;
pub const RESPONSE_CHANNEL_MESSAGE: u8 = 4;

#[must_use]
pub fn create_pong_payload() -> Value {
    json!({ "type": RESPONSE_PONG })
}

/// Create a JSON payload replying with a channel message.
///
/// # Examples
///
/// ```
/// use sns_draft::discord::response_builder::create_channel_message_payload;
///
/// let payload = create_channel_message_payload("Hello");
/// assert_eq!(payload["type"], 4);
/// assert_eq!(payload["data"]["content"], "Hello");
/// ```
#[must_use]
pub fn create_channel_message_payload(content: &str) -> Value {
    json!({
        "type": RESPONSE_CHANNEL_MESSAGE,
        "data": { "content": content }
    })
}
