use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::errors::DraftError;
use crate::discord::interaction::Interaction;

/// Case-insensitive header lookup; function URLs lower-case header names.
pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Raw request body, decoded when the event marks it as base64.
///
/// # Errors
///
/// Returns [`DraftError::ParseError`] when the body is missing, not a string,
/// or not valid base64/UTF-8.
pub fn extract_body(payload: &Value) -> Result<String, DraftError> {
    let body = payload
        .get("body")
        .ok_or_else(|| DraftError::ParseError("Missing body".to_string()))?
        .as_str()
        .ok_or_else(|| DraftError::ParseError("Invalid body format".to_string()))?;

    let encoded = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if !encoded {
        return Ok(body.to_string());
    }

    let bytes = STANDARD
        .decode(body)
        .map_err(|e| DraftError::ParseError(format!("Invalid base64 body: {e}")))?;
    String::from_utf8(bytes).map_err(|e| DraftError::ParseError(format!("Body is not UTF-8: {e}")))
}

/// # Errors
///
/// Returns [`DraftError::ParseError`] for a body that is not an interaction.
pub fn parse_interaction(body: &str) -> Result<Interaction, DraftError> {
    serde_json::from_str(body).map_err(|e| DraftError::ParseError(format!("Invalid interaction: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_lookup_ignores_case() {
        let headers = json!({"x-signature-ed25519": "abc", "Content-Type": "application/json"});
        assert_eq!(get_header_value(&headers, "X-Signature-Ed25519"), Some("abc"));
        assert_eq!(get_header_value(&headers, "content-type"), Some("application/json"));
        assert_eq!(get_header_value(&headers, "X-Missing"), None);
    }

    #[test]
    fn test_plain_and_base64_bodies() {
        let plain = json!({"body": "{\"type\":1}"});
        assert_eq!(extract_body(&plain).unwrap(), "{\"type\":1}");

        let encoded = json!({"body": STANDARD.encode("{\"type\":1}"), "isBase64Encoded": true});
        assert_eq!(extract_body(&encoded).unwrap(), "{\"type\":1}");
    }

    #[test]
    fn test_missing_or_invalid_body() {
        assert!(extract_body(&json!({})).is_err());
        assert!(extract_body(&json!({"body": 5})).is_err());
        assert!(extract_body(&json!({"body": "%%%", "isBase64Encoded": true})).is_err());
    }

    #[test]
    fn test_parse_interaction_rejects_non_json() {
        assert!(parse_interaction("type=1").is_err());
        assert_eq!(parse_interaction(r#"{"type":1}"#).unwrap().kind, 1);
    }
}
