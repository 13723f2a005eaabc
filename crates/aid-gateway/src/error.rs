use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("connect failed: {0}")]
    Connect(#[source] tungstenite::Error),

    #[error("websocket error: {0}")]
    Socket(#[from] tungstenite::Error),

    #[error("no frames received for {0:?}")]
    Stale(Duration),

    #[error("connection closed by server")]
    Closed,

    #[error("server disconnected us: {reason}")]
    Disconnected { reason: String, reconnect: bool },

    #[error("subscription rejected")]
    Rejected,
}

impl GatewayError {
    /// Whether reconnecting could help.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Rejected => false,
            Self::Disconnected { reconnect, .. } => *reconnect,
            _ => true,
        }
    }
}
