use thiserror::Error;

/// Shown when the service rejects a request without a `detail` field.
pub const GENERIC_SERVICE_ERROR: &str = "Server error";

/// Shown when a submission carries a blank job description.
pub const EMPTY_DESCRIPTION_ERROR: &str = "Please paste a job description.";

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("ranking service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("export failed: {0}")]
    Export(#[from] std::io::Error),

    #[error("no results available to export")]
    NothingToExport,

    #[error("unknown or already completed submission {0}")]
    UnknownSubmission(String),
}

impl MatchError {
    /// The single line a user sees for this failure.
    pub fn display_message(&self) -> String {
        match self {
            MatchError::Validation(message) => message.clone(),
            MatchError::Service { message, .. } => message.clone(),
            MatchError::Transport(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for MatchError {
    fn from(error: reqwest::Error) -> Self {
        MatchError::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for MatchError {
    fn from(error: serde_json::Error) -> Self {
        MatchError::Transport(error.to_string())
    }
}

pub type Result<T, E = MatchError> = std::result::Result<T, E>;
