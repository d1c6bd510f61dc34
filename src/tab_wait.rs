//! Tab lifecycle events and the settle-once load wait.
//!
//! The wait races the lifecycle stream against a timer. Update, removal and
//! replacement are mutually exclusive branches of one receiver loop; the
//! first to match the target settles the whole wait. Settlement drops the
//! subscription and the timer together, so neither a listener nor a timer
//! outlives the wait.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::error::{Error, Result};

/// Default bound on waiting for a tab to finish loading.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_millis(120_000);

/// Status value a tab update carries once loading finished.
pub const STATUS_COMPLETE: &str = "complete";

/// One tab lifecycle event from the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TabEvent {
    /// A tab's state changed; `change_info` carries the delta.
    #[serde(rename_all = "camelCase")]
    Updated {
        tab_id: i64,
        change_info: Value,
        tab: Value,
    },
    /// A tab was closed.
    #[serde(rename_all = "camelCase")]
    Removed { tab_id: i64 },
    /// A tab was swapped out for another (prerender promotion and the like).
    #[serde(rename_all = "camelCase")]
    Replaced {
        added_tab_id: i64,
        removed_tab_id: i64,
    },
}

/// Snapshot delivered when the awaited tab finishes loading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabLoad {
    pub tab_id: i64,
    pub change_info: Value,
    pub tab: Value,
}

/// Resolve once `tab_id` finishes loading, or fail on removal, replacement,
/// or timeout, whichever fires first. Exactly one outcome per invocation.
///
/// A missing or zero `timeout` falls back to [`DEFAULT_LOAD_TIMEOUT`].
pub async fn wait_for_load(
    events: broadcast::Receiver<TabEvent>,
    tab_id: i64,
    timeout: Option<Duration>,
) -> Result<TabLoad> {
    let bound = effective_timeout(timeout);
    tokio::select! {
        outcome = watch_lifecycle(events, tab_id) => outcome,
        () = sleep(bound) => {
            tracing::debug!(
                event = "tab_wait.timeout",
                tab_id,
                timeout_secs = bound.as_secs_f64(),
                "tab load wait timed out"
            );
            Err(Error::TabLoadTimeout {
                seconds: bound.as_secs_f64(),
            })
        }
    }
}

fn effective_timeout(timeout: Option<Duration>) -> Duration {
    match timeout {
        Some(bound) if !bound.is_zero() => bound,
        _ => DEFAULT_LOAD_TIMEOUT,
    }
}

async fn watch_lifecycle(
    mut events: broadcast::Receiver<TabEvent>,
    tab_id: i64,
) -> Result<TabLoad> {
    loop {
        match events.recv().await {
            Ok(TabEvent::Updated {
                tab_id: updated,
                change_info,
                tab,
            }) if updated == tab_id && is_complete(&change_info) => {
                tracing::debug!(event = "tab_wait.loaded", tab_id, "tab finished loading");
                return Ok(TabLoad {
                    tab_id,
                    change_info,
                    tab,
                });
            }
            Ok(TabEvent::Removed { tab_id: removed }) if removed == tab_id => {
                return Err(Error::TabRemoved { tab_id });
            }
            Ok(TabEvent::Replaced { removed_tab_id, .. }) if removed_tab_id == tab_id => {
                return Err(Error::TabReplaced { tab_id });
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(
                    event = "tab_wait.lagged",
                    tab_id,
                    missed,
                    "tab event stream lagged"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                return Err(Error::channel_closed(format!(
                    "tab event stream closed while waiting for tab {tab_id}"
                )));
            }
        }
    }
}

fn is_complete(change_info: &Value) -> bool {
    change_info.get("status").and_then(Value::as_str) == Some(STATUS_COMPLETE)
}
