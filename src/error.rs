//! Error types for the tabwire bridge.

use thiserror::Error;

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the tabwire bridge.
#[derive(Error, Debug)]
pub enum Error {
    /// The host's ambient last-error channel was set when a callback completed.
    #[error("Host error: {0}")]
    Host(String),

    /// Caller programming errors: unsupported action shapes, bad arguments.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The injected action threw or rejected inside the remote context.
    #[error("Error thrown in execution script: {message}.\nStack: {stack}")]
    Remote { message: String, stack: String },

    /// The awaited tab was removed before it finished loading.
    #[error("The tab with id = {tab_id} was removed before it finished loading.")]
    TabRemoved { tab_id: i64 },

    /// The awaited tab was replaced before it finished loading.
    #[error("The tab with id = {tab_id} was replaced before it finished loading.")]
    TabReplaced { tab_id: i64 },

    /// The awaited tab did not finish loading within the timeout.
    #[error("The tab loading timed out after {seconds} seconds.")]
    TabLoadTimeout { seconds: f64 },

    /// An inbound stream or completion callback was dropped without delivering.
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] Box<serde_json::Error>),
}

impl Error {
    /// Create a host (last-error channel) error.
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a remote-execution error from a transported snapshot.
    pub fn remote(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            stack: stack.into(),
        }
    }

    /// Create a closed-channel error.
    pub fn channel_closed(message: impl Into<String>) -> Self {
        Self::ChannelClosed(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(Box::new(value))
    }
}
