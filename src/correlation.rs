//! Completion messages from remote contexts and the one-shot correlation
//! listener that picks a single call's reply out of the inbound stream.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::error::{Error, Result};

/// Structural copy of an error's observable fields.
///
/// Errors thrown inside a remote context cannot cross the boundary as-is;
/// this snapshot carries what the caller needs to reconstruct its own error.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSnapshot {
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Implementation-specific fields, carried through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ErrorSnapshot {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// The single reply a remote execution sends back.
///
/// Exactly one of `content` / `error` is present. Consumed exactly once by
/// the first listener whose id matches, then dropped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSnapshot>,
}

impl CompletionMessage {
    /// A successful completion.
    #[must_use]
    pub fn content(id: impl Into<String>, content: Value) -> Self {
        Self {
            id: id.into(),
            content: Some(content),
            error: None,
        }
    }

    /// A failed completion.
    #[must_use]
    pub fn error(id: impl Into<String>, error: ErrorSnapshot) -> Self {
        Self {
            id: id.into(),
            content: None,
            error: Some(error),
        }
    }
}

/// Wait for the first inbound message whose id matches.
///
/// Dropping the receiver on return is the deregistration: at most one
/// resolution per id, and later duplicates for the same id are never
/// observed. Messages for other ids are skipped without consuming them from
/// other listeners' subscriptions. There is no intrinsic timeout; callers
/// needing a bound compose their own.
pub async fn await_completion(
    mut inbound: broadcast::Receiver<CompletionMessage>,
    id: &str,
) -> Result<CompletionMessage> {
    loop {
        match inbound.recv().await {
            Ok(message) if message.id == id => {
                tracing::trace!(event = "correlation.matched", id = %id, "completion message matched");
                return Ok(message);
            }
            Ok(other) => {
                tracing::trace!(
                    event = "correlation.skipped",
                    id = %id,
                    seen = %other.id,
                    "completion message for another call"
                );
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(
                    event = "correlation.lagged",
                    id = %id,
                    missed,
                    "listener lagged behind the inbound stream"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                return Err(Error::channel_closed(format!(
                    "inbound stream closed while waiting for {id}"
                )));
            }
        }
    }
}
