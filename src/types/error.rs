use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while running a live update channel.
#[derive(Error, Debug)]
pub enum LiveChannelError {
    /// HTTP transport error (connection refused, body read failure, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error (malformed endpoint URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON deserialization error (malformed event payload)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid channel configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The server answered the stream request with a non-success status
    #[error("Stream rejected with HTTP status {0}")]
    Status(u16),

    /// The server answered with something other than an event stream
    #[error("Unexpected content type: {0}")]
    UnexpectedContentType(String),

    /// General connection error with descriptive message
    #[error("Connection error: {0}")]
    Connection(String),

    /// No frame (not even a heartbeat) arrived within the liveness window
    #[error("No heartbeat received within {0:?}")]
    HeartbeatTimeout(Duration),

    /// The server did not answer the stream request within the liveness window
    #[error("Stream did not open within {0:?}")]
    OpenTimeout(Duration),

    /// A line or event grew past the decoder's size limit
    #[error("Event stream frame exceeds {0} bytes")]
    FrameTooLarge(usize),

    /// Automatic reconnection gave up
    #[error("Reconnect attempts exhausted after {0} attempts")]
    ReconnectExhausted(u32),
}

/// Convenience type alias for `Result<T, LiveChannelError>`.
pub type Result<T> = std::result::Result<T, LiveChannelError>;
