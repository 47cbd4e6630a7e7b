use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Unknown timezone '{0}', falling back to UTC")]
    InvalidTimezone(String),

    #[error("Failed to fetch channel history: {0}")]
    FetchFailed(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Missing read access to thread: {0}")]
    ThreadReadDenied(String),

    #[error("Failed to enumerate threads: {0}")]
    ThreadEnumerationFailed(String),

    #[error("Upstream temporarily unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Failed to generate draft: {0}")]
    GenerationFailed(String),

    #[error("Request authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to parse payload: {0}")]
    ParseError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),
}

impl DraftError {
    /// Transient upstream failures are the only class worth retrying.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, DraftError::UpstreamUnavailable(_))
    }

    /// Text shown to the Discord user when a request ends in this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DraftError::InvalidDateFormat(_) => {
                "❌ Invalid date format. Please use YYYY-MM-DD.".to_string()
            }
            DraftError::InvalidDateRange(_) => {
                "❌ The start date must not be after the end date.".to_string()
            }
            DraftError::GenerationFailed(_) | DraftError::UpstreamUnavailable(_) => {
                "❌ Sorry, I couldn't generate a draft right now. Please try again later."
                    .to_string()
            }
            DraftError::FetchFailed(_)
            | DraftError::AccessDenied(_)
            | DraftError::ThreadReadDenied(_)
            | DraftError::ThreadEnumerationFailed(_) => {
                "❌ Sorry, I couldn't read the messages in this channel.".to_string()
            }
            _ => "❌ An unexpected error occurred. Please try again later.".to_string(),
        }
    }
}

impl From<reqwest::Error> for DraftError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            DraftError::UpstreamUnavailable(error.to_string())
        } else {
            DraftError::HttpError(error.to_string())
        }
    }
}

impl From<anyhow::Error> for DraftError {
    fn from(error: anyhow::Error) -> Self {
        DraftError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for DraftError {
    fn from(error: serde_json::Error) -> Self {
        DraftError::ParseError(error.to_string())
    }
}
