use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to resolve Slack integration: {status}, response: {body}")]
    Resolution { status: StatusCode, body: String },

    #[error("Failed to serialize message: {0}")]
    Serialization(String),

    #[error("Failed to send HTTP request: {0}")]
    Http(String),

    #[error("Server error: {status}, response: {body}")]
    Delivery { status: StatusCode, body: String },

    #[error("Slack API returned an error: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    ResponseParse(String),

    #[error("Failed to export outputs: {0}")]
    OutputExport(String),

    #[error("{0}")]
    Usage(String),
}

impl NotifyError {
    /// Whether the failure is worth another attempt.
    ///
    /// Only transport failures and 5xx answers from the build API count; a
    /// Slack delivery is never retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            NotifyError::Http(_) => true,
            NotifyError::Resolution { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(error: reqwest::Error) -> Self {
        NotifyError::Http(error.to_string())
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(error: serde_json::Error) -> Self {
        NotifyError::Serialization(error.to_string())
    }
}
