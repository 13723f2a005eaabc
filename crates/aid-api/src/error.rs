use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, TLS or timeout failure before a response was read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The backend answered 2xx but refused the operation in its body.
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response missing expected field `{0}`")]
    MissingField(&'static str),

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("not logged in")]
    NotAuthenticated,

    #[error("session store: {0}")]
    Store(#[from] anyhow::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    /// Message suitable for a transient inline notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::Rejected(message) | Self::Invalid(message) => {
                message.clone()
            }
            _ => "An error occurred. Please try again.".to_string(),
        }
    }
}
