//! End-to-end remote execution through a fake browser host: inject, reply,
//! correlate.

mod common;

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tabwire::{Action, CompletionMessage, Error, ErrorSnapshot, InjectDetails};

use common::script_host;

#[tokio::test]
async fn round_trips_the_remote_result() {
    let (host, _) = script_host(|id| {
        Some(CompletionMessage::content(id, json!({ "title": "Example" })))
    });

    let content = host
        .execute_async_function(Some(3), &Action::function("() => document.title"), vec![])
        .await
        .unwrap();

    assert_eq!(content, json!({ "title": "Example" }));
}

#[tokio::test]
async fn parameters_are_embedded_in_the_injection() {
    let (host, injections) = script_host(|id| Some(CompletionMessage::content(id, Value::Null)));

    host.execute_async_function(
        None,
        &Action::function("(a, b) => a + b.n"),
        vec![json!(40), json!({ "n": 2 })],
    )
    .await
    .unwrap();

    let injections = injections.lock().unwrap();
    assert_eq!(injections.len(), 1);
    let code = injections[0]["code"].as_str().unwrap();
    assert!(code.contains(r#"(40,{"n":2})"#));
    // Code injection only: no file key in the serialized details.
    assert!(injections[0].get("file").is_none());
}

#[tokio::test]
async fn concurrent_calls_each_get_their_own_reply() {
    let pending: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&pending);
    let (host, _) = script_host(move |id| {
        record.lock().unwrap().push(id.to_string());
        None
    });

    let messages = host.message_sender();
    let driver = async {
        loop {
            let ids = pending.lock().unwrap().clone();
            if ids.len() == 2 {
                // Replies arrive in reverse request order.
                messages
                    .send(CompletionMessage::content(&ids[1], json!("second")))
                    .unwrap();
                messages
                    .send(CompletionMessage::content(&ids[0], json!("first")))
                    .unwrap();
                break;
            }
            tokio::task::yield_now().await;
        }
    };

    // The actions outlive the futures borrowing them across the join.
    let first_action = Action::code("() => 1");
    let second_action = Action::code("() => 2");
    let first = host.execute_async_function(Some(1), &first_action, vec![]);
    let second = host.execute_async_function(Some(2), &second_action, vec![]);
    let (first, second, ()) = tokio::join!(first, second, driver);

    assert_eq!(first.unwrap(), json!("first"));
    assert_eq!(second.unwrap(), json!("second"));

    let ids = pending.lock().unwrap();
    assert_ne!(ids[0], ids[1], "correlation ids must be distinct");
}

#[tokio::test]
async fn remote_failure_is_reconstructed_with_the_stack() {
    let (host, _) = script_host(|id| {
        Some(CompletionMessage::error(
            id,
            ErrorSnapshot::new("boom").with_stack("Error: boom\n    at <anonymous>:1:1"),
        ))
    });

    let err = host
        .execute_async_function(Some(3), &Action::code("() => { throw new Error('boom'); }"), vec![])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Remote { .. }));
    let rendered = err.to_string();
    assert!(rendered.contains("boom"));
    assert!(rendered.contains("at <anonymous>"));
}

#[tokio::test]
async fn file_actions_fail_before_any_injection() {
    let (host, injections) = script_host(|_| None);

    let action = Action::Details(InjectDetails {
        file: Some("content.js".to_string()),
        ..InjectDetails::default()
    });
    let err = host
        .execute_async_function(Some(3), &action, vec![])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(injections.lock().unwrap().is_empty());
}

#[tokio::test]
async fn host_signaled_injection_failure_surfaces_as_host_error() {
    use tabwire::host::Completion;
    use tabwire::{promisify_host, Host, Namespace};

    let mut host = Host::new();
    let last_error = host.last_error();
    let mut tabs = Namespace::new();
    tabs.insert_callback("executeScript", move |_args: Vec<Value>, done: Completion| {
        last_error.set(json!({ "message": "Cannot access contents of the page." }));
        done(vec![]);
        Ok(())
    });
    host.insert_namespace("tabs", tabs);
    promisify_host(&mut host);

    let err = host
        .execute_async_function(Some(3), &Action::code("() => 1"), vec![])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Host(message) if message.contains("Cannot access")));
}
