//! Lambda function URL response builders.

use serde_json::{Value, json};

/// Returns a 200 OK response whose body is `payload` serialised as JSON.
#[must_use]
pub fn ok_json(payload: &Value) -> Value {
    json!({
        "statusCode": 200,
        "headers": { "Content-Type": "application/json" },
        "body": payload.to_string()
    })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "Content-Type": "application/json" },
        "body": json!({ "error": message }).to_string()
    })
}
