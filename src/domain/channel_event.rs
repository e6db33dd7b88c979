//! Events and actions exchanged between the channel tasks and the session
//! driver.

use std::fmt;

/// The two logical WebSocket channels of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Login and session management.
    Authentication,
    /// Live network and node state.
    RealtimeSituation,
}

impl Channel {
    /// Returns the channel name as a static string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::RealtimeSituation => "realtime_situation",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A WebSocket data frame as seen by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame (JSON).
    Text(String),
    /// Binary frame (protobuf).
    Binary(Vec<u8>),
}

impl Frame {
    /// Raw bytes of the frame.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(data) => data,
        }
    }

    /// Frame contents as text, replacing invalid UTF-8.
    #[must_use]
    pub fn to_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Text(text) => std::borrow::Cow::Borrowed(text),
            Self::Binary(data) => String::from_utf8_lossy(data),
        }
    }
}

/// Something that happened on one of the channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The WebSocket handshake completed.
    Opened(Channel),
    /// A data frame arrived.
    Received(Channel, Frame),
    /// The transport reported an error.
    Failed {
        /// Channel that failed.
        channel: Channel,
        /// Error description.
        error: String,
        /// Whether the channel was still meant to be running.
        running: bool,
    },
    /// The connection closed.
    Closed(Channel),
}

impl ChannelEvent {
    /// Returns the channel this event belongs to.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        match self {
            Self::Opened(channel)
            | Self::Received(channel, _)
            | Self::Failed { channel, .. }
            | Self::Closed(channel) => *channel,
        }
    }
}

/// Side effect the driver asks the session runner to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverAction {
    /// Send a text frame on a channel.
    Send {
        /// Target channel.
        channel: Channel,
        /// JSON text to send.
        text: String,
    },
    /// Stop both channels.
    Stop,
}
