use std::error::Error;
use sns_draft::errors::DraftError;

#[test]
fn test_draft_error_implements_error_trait() {
    fn assert_error<T: Error>(_: &T) {}

    let error = DraftError::ParseError("test error".to_string());
    assert_error(&error);
}

#[test]
fn test_draft_error_display() {
    let error = DraftError::FetchFailed("403 Forbidden".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to fetch channel history: 403 Forbidden"
    );

    let error = DraftError::InvalidTimezone("Mars/Olympus".to_string());
    assert_eq!(
        format!("{error}"),
        "Unknown timezone 'Mars/Olympus', falling back to UTC"
    );

    let error = DraftError::HttpError("Connection error".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to send HTTP request: Connection error"
    );
}

#[test]
fn test_user_messages_hide_internal_detail() {
    let err = DraftError::FetchFailed("token xyz rejected".to_string());
    assert!(!err.user_message().contains("xyz"));

    assert_eq!(
        DraftError::InvalidDateFormat("2024-13-40".into()).user_message(),
        "❌ Invalid date format. Please use YYYY-MM-DD."
    );
    assert_eq!(
        DraftError::GenerationFailed("quota".into()).user_message(),
        DraftError::UpstreamUnavailable("503".into()).user_message()
    );
}

#[test]
fn test_only_upstream_unavailability_is_transient() {
    assert!(DraftError::UpstreamUnavailable("429".into()).is_transient());
    assert!(!DraftError::GenerationFailed("bad request".into()).is_transient());
    assert!(!DraftError::AccessDenied("403".into()).is_transient());
}

#[test]
fn test_draft_error_from_conversions() {
    let err = anyhow::anyhow!("test error");
    let draft_err: DraftError = err.into();
    match draft_err {
        DraftError::HttpError(msg) => assert!(msg.contains("test error")),
        _ => panic!("Unexpected error type"),
    }

    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(DraftError::from(json_err), DraftError::ParseError(_)));

    #[allow(unused)]
    #[allow(clippy::items_after_statements)]
    fn _check_reqwest_conversion(err: reqwest::Error) -> DraftError {
        DraftError::from(err)
    }
}
