//! Client error types with numeric code mapping.
//!
//! [`ClientError`] is the central error type for the realtime session
//! client. Each variant maps to a numeric code so failures can be reported
//! in logs and exit paths without string matching.

use tokio_tungstenite::tungstenite;

/// Session client error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category      |
/// |-----------|---------------|
/// | 1000–1999 | Configuration |
/// | 2000–2999 | Transport     |
/// | 3000–3999 | Protocol      |
/// | 4000–4999 | Internal      |
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A configuration variable is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The WebSocket handshake with the backend failed.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        /// Endpoint that was dialed.
        url: String,
        /// Underlying WebSocket error.
        #[source]
        source: tungstenite::Error,
    },

    /// Reading from or writing to an open channel failed.
    #[error("transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    /// A JSON message could not be encoded or decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A binary telemetry message could not be decoded.
    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// The peer task of a channel is gone.
    #[error("channel closed: {0}")]
    ChannelClosed(&'static str),

    /// The handshake reached a state its prerequisites do not allow.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A spawned task panicked or was cancelled.
    #[error("task failed: {0}")]
    TaskFailed(String),
}

impl ClientError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Config(_) => 1001,
            Self::Connect { .. } => 2001,
            Self::Transport(_) => 2002,
            Self::ChannelClosed(_) => 2003,
            Self::Json(_) => 3001,
            Self::Decode(_) => 3002,
            Self::Protocol(_) => 3003,
            Self::TaskFailed(_) => 4001,
        }
    }
}
