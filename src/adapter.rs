//! Callback-to-future adaptation for a single host function.
//!
//! One adapted call is one independent unit of state: the completion callback
//! is a oneshot channel, the pass-through callback runs before settlement,
//! and the last-error slot is consumed at a fixed point in the sequence.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::host::{Arg, AsyncFn, Completion, HostFn, LastError, PassThrough};

/// Folds the completion callback's values into one structured result, for
/// APIs whose multi-value completions have a known shape.
pub type Combiner = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Wrap one callback-style host function into a future-returning one.
///
/// The adapted function takes the same leading parameters as `f`, minus the
/// trailing completion callback. A trailing [`Arg::Callback`] is treated as a
/// caller-supplied legacy pass-through callback: it is invoked first with the
/// raw completion values, and an `Err` from it becomes the call's failure.
///
/// Without a `combiner`, the resolution rule is arity-based: zero completion
/// values resolve to `Null`, exactly one resolves to that value, and more
/// resolve to the full ordered sequence.
pub fn promisify(f: HostFn, combiner: Option<Combiner>, last_error: LastError) -> AsyncFn {
    Arc::new(move |args: Vec<Arg>| -> BoxFuture<'static, Result<Value>> {
        let f = Arc::clone(&f);
        let combiner = combiner.clone();
        let last_error = last_error.clone();
        Box::pin(adapt_call(f, combiner, last_error, args))
    })
}

async fn adapt_call(
    f: HostFn,
    combiner: Option<Combiner>,
    last_error: LastError,
    mut args: Vec<Arg>,
) -> Result<Value> {
    let pass_through = take_trailing_callback(&mut args);

    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Arg::Value(value) => values.push(value),
            Arg::Callback(_) => {
                return Err(Error::validation(
                    "only the final argument may be a callback",
                ));
            }
        }
    }

    let (tx, rx) = oneshot::channel::<Vec<Value>>();
    let completion: Completion = Box::new(move |results| {
        let _ = tx.send(results);
    });

    // A synchronous Err here is the invocation failing before it accepted
    // the callback, not the call completing with an error.
    f(values, completion)?;

    let results = rx
        .await
        .map_err(|_| Error::channel_closed("host function dropped its completion callback"))?;

    if let Some(callback) = pass_through {
        if let Err(err) = callback(&results) {
            tracing::trace!(
                event = "adapter.reject.pass_through",
                "pass-through callback failed"
            );
            // The slot is still consumed so a stale error cannot bleed into
            // a later call; the pass-through failure wins.
            let _ = last_error.take();
            return Err(err);
        }
    }

    // The slot must be read here: after the pass-through ran, before
    // resolving. Some hosts populate it lazily.
    if let Some(raw) = last_error.take() {
        let message = raw.get("message").and_then(Value::as_str).map_or_else(
            || format!("Error thrown by API {raw}"),
            ToString::to_string,
        );
        tracing::trace!(
            event = "adapter.reject.last_error",
            message = %message,
            "last-error slot was set"
        );
        return Err(Error::host(message));
    }

    if let Some(combine) = combiner {
        return Ok(combine(&results));
    }

    let mut results = results;
    Ok(match results.len() {
        0 => Value::Null,
        1 => results.swap_remove(0),
        _ => Value::Array(results),
    })
}

fn take_trailing_callback(args: &mut Vec<Arg>) -> Option<PassThrough> {
    if matches!(args.last(), Some(Arg::Callback(_))) {
        match args.pop() {
            Some(Arg::Callback(callback)) => Some(callback),
            _ => None,
        }
    } else {
        None
    }
}
