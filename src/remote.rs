//! The high-level remote operations: run an async function inside a tab and
//! await its correlated reply, and create/reload a tab and await the load.
//!
//! Both compose the lower pieces at call time: codegen + correlation listener
//! for execution, the lifecycle race for load waits. All per-call state (the
//! correlation id, the subscriptions, the timer) is owned by that call.

use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::codegen::{build_injection, Action};
use crate::correlation::await_completion;
use crate::error::{Error, Result};
use crate::host::{Arg, Host};
use crate::tab_wait::{wait_for_load, TabLoad};

impl Host {
    /// Run `action` inside the target tab and return what it produced.
    ///
    /// `tab` of `None` targets the host's current tab. The correlation
    /// listener is subscribed before the script is injected, so a reply
    /// cannot be missed even if the remote settles immediately. A failure
    /// inside the remote context is reconstructed as [`Error::Remote`],
    /// embedding the transported stack.
    pub async fn execute_async_function(
        &self,
        tab: Option<i64>,
        action: &Action,
        params: Vec<Value>,
    ) -> Result<Value> {
        let id = Uuid::new_v4().simple().to_string();
        let details = build_injection(action, &id, &params)?;

        let listener = self.messages();
        tracing::debug!(
            event = "remote.execute",
            id = %id,
            tab = ?tab,
            "injecting remote async function"
        );

        let target = tab.map_or(Value::Null, Value::from);
        self.call(
            "tabs.executeScript",
            vec![Arg::Value(target), Arg::Value(serde_json::to_value(&details)?)],
        )
        .await?;

        let reply = await_completion(listener, &id).await?;

        if let Some(snapshot) = reply.error {
            tracing::debug!(event = "remote.execute.error", id = %id, "remote action failed");
            return Err(Error::remote(
                snapshot.message,
                snapshot.stack.unwrap_or_default(),
            ));
        }
        Ok(reply.content.unwrap_or(Value::Null))
    }

    /// Create a tab and wait until it finishes loading.
    pub async fn create_and_wait(
        &self,
        create_props: Value,
        timeout: Option<Duration>,
    ) -> Result<TabLoad> {
        // Subscribe before creating: the new tab may finish loading between
        // the create completion and the wait.
        let events = self.tab_events();
        let tab = self.call("tabs.create", vec![Arg::Value(create_props)]).await?;
        let tab_id = tab
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::validation("tabs.create returned a tab without a numeric id"))?;
        tracing::debug!(event = "remote.create_and_wait", tab_id, "created tab, awaiting load");
        wait_for_load(events, tab_id, timeout).await
    }

    /// Reload a tab and wait until it finishes loading again.
    pub async fn reload_and_wait(
        &self,
        tab_id: i64,
        reload_props: Value,
        timeout: Option<Duration>,
    ) -> Result<TabLoad> {
        let events = self.tab_events();
        self.call(
            "tabs.reload",
            vec![Arg::Value(Value::from(tab_id)), Arg::Value(reload_props)],
        )
        .await?;
        tracing::debug!(event = "remote.reload_and_wait", tab_id, "reloaded tab, awaiting load");
        wait_for_load(events, tab_id, timeout).await
    }
}
