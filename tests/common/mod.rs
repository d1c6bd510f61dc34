//! In-memory fake browser host shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tabwire::host::Completion;
use tabwire::{promisify_host, CompletionMessage, Host, Namespace};

/// Pull the correlation id back out of a generated injection program.
pub fn injected_id(code: &str) -> String {
    let start = code
        .find("{ id: \"")
        .expect("generated code carries an id literal")
        + 7;
    let rest = &code[start..];
    let end = rest.find('"').expect("id literal is terminated");
    rest[..end].to_string()
}

/// A host with a `tabs` namespace whose `executeScript` records each
/// injection and, if `reply` returns a message, posts it back inbound.
pub fn script_host(
    reply: impl Fn(&str) -> Option<CompletionMessage> + Send + Sync + 'static,
) -> (Host, Arc<Mutex<Vec<Value>>>) {
    let mut host = Host::new();
    let injections = Arc::new(Mutex::new(Vec::new()));

    let messages = host.message_sender();
    let record = Arc::clone(&injections);
    let mut tabs = Namespace::new();
    tabs.insert_callback("executeScript", move |args: Vec<Value>, done: Completion| {
        let details = args.get(1).cloned().unwrap_or(Value::Null);
        record.lock().unwrap().push(details.clone());

        let code = details
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let id = injected_id(code);
        done(vec![]);
        if let Some(message) = reply(&id) {
            let _ = messages.send(message);
        }
        Ok(())
    });
    host.insert_namespace("tabs", tabs);

    promisify_host(&mut host);
    (host, injections)
}

/// A host with `tabs.create` / `tabs.reload` backed by the given tab id.
/// Lifecycle events are driven by the test through the host's event sender.
pub fn lifecycle_host(tab_id: i64) -> (Host, Arc<Mutex<Vec<Value>>>) {
    let mut host = Host::new();
    let calls = Arc::new(Mutex::new(Vec::new()));

    let mut tabs = Namespace::new();
    let record = Arc::clone(&calls);
    tabs.insert_callback("create", move |args: Vec<Value>, done: Completion| {
        record
            .lock()
            .unwrap()
            .push(json!({ "op": "create", "args": args }));
        done(vec![json!({ "id": tab_id, "status": "loading" })]);
        Ok(())
    });
    let record = Arc::clone(&calls);
    tabs.insert_callback("reload", move |args: Vec<Value>, done: Completion| {
        record
            .lock()
            .unwrap()
            .push(json!({ "op": "reload", "args": args }));
        done(vec![]);
        Ok(())
    });
    host.insert_namespace("tabs", tabs);

    promisify_host(&mut host);
    (host, calls)
}
