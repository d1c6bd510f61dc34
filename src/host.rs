//! Host environment model: namespace trees of callback-style and adapted
//! functions, the ambient last-error slot, and the inbound channels a live
//! host delivers completion messages and tab lifecycle events through.
//!
//! Embedders populate a [`Host`] with the live environment's callback
//! functions, run [`crate::bootstrap::promisify_host`] over it once, and from
//! then on invoke any adapted API through [`Host::call`] with its original
//! dotted name (`"tabs.create"`, `"storage.local.get"`, ...).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::correlation::CompletionMessage;
use crate::error::{Error, Result};
use crate::tab_wait::TabEvent;

/// Capacity of the broadcast channels carrying inbound messages and tab
/// lifecycle events. Listeners that lag past this skip ahead.
const CHANNEL_CAPACITY: usize = 64;

/// The completion callback handed to a callback-style host function as its
/// final argument.
pub type Completion = Box<dyn FnOnce(Vec<Value>) + Send + 'static>;

/// A callback-style host function.
///
/// Returning `Err` models a synchronous throw during invocation (argument
/// validation and the like), distinct from the asynchronous completion path.
/// Host-signaled failures are reported by setting the [`LastError`] slot
/// before invoking the completion callback.
pub type HostFn = Arc<dyn Fn(Vec<Value>, Completion) -> Result<()> + Send + Sync>;

/// An adapted, future-returning host function.
pub type AsyncFn = Arc<dyn Fn(Vec<Arg>) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// A caller-supplied legacy pass-through callback.
///
/// Runs with the raw completion values before the adapted call settles; an
/// `Err` from it becomes the call's failure.
pub type PassThrough = Arc<dyn Fn(&[Value]) -> Result<()> + Send + Sync>;

/// One argument to an adapted function. A trailing [`Arg::Callback`] is the
/// legacy dual-mode pass-through callback; everything else is data.
#[derive(Clone)]
pub enum Arg {
    Value(Value),
    Callback(PassThrough),
}

impl Arg {
    /// Wrap a serializable value as an argument.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// Wrap a pass-through callback as an argument.
    pub fn callback(f: impl Fn(&[Value]) -> Result<()> + Send + Sync + 'static) -> Self {
        Self::Callback(Arc::new(f))
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// The ambient last-error slot.
///
/// Callback-style hosts report failure out of band by setting this slot
/// before invoking the completion callback. The adapter reads and clears it
/// (`take`) at exactly one point per call, after the pass-through callback
/// has run; hosts with lazily populated slots rely on that timing. The slot
/// is owned by its [`Host`], never process-global.
#[derive(Clone, Default)]
pub struct LastError(Arc<Mutex<Option<Value>>>);

impl LastError {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slot, as a host function does on failure.
    pub fn set(&self, value: impl Into<Value>) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(value.into());
        }
    }

    /// Read and clear the slot.
    pub fn take(&self) -> Option<Value> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.lock().is_ok_and(|slot| slot.is_some())
    }
}

impl fmt::Debug for LastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LastError")
            .field(&self.0.lock().ok().as_deref().cloned())
            .finish()
    }
}

/// One member of a host namespace.
#[derive(Clone)]
pub enum Member {
    /// A legacy callback-style function, not yet adapted.
    Callback(HostFn),
    /// A future-returning function (post-adaptation).
    Future(AsyncFn),
    /// A nested sub-namespace.
    Namespace(Namespace),
    /// A plain data member (constants, enum tables). Never wrapped.
    Data(Value),
}

impl Member {
    #[must_use]
    pub const fn is_callback(&self) -> bool {
        matches!(self, Self::Callback(_))
    }

    #[must_use]
    pub const fn is_future(&self) -> bool {
        matches!(self, Self::Future(_))
    }

    #[must_use]
    pub const fn is_namespace(&self) -> bool {
        matches!(self, Self::Namespace(_))
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Future(_) => f.write_str("Future(..)"),
            Self::Namespace(ns) => f.debug_tuple("Namespace").field(ns).finish(),
            Self::Data(value) => f.debug_tuple("Data").field(value).finish(),
        }
    }
}

/// A string-keyed tree of host API members.
#[derive(Clone, Default)]
pub struct Namespace {
    members: HashMap<String, Member>,
}

impl Namespace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, member: Member) {
        self.members.insert(name.into(), member);
    }

    /// Convenience for registering a callback-style function.
    pub fn insert_callback(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(Vec<Value>, Completion) -> Result<()> + Send + Sync + 'static,
    ) {
        self.insert(name, Member::Callback(Arc::new(f)));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Member> {
        self.members.get_mut(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.members.iter()).finish()
    }
}

/// A live host environment.
///
/// Owns the top-level API namespaces, the ambient last-error slot, and the
/// two inbound broadcast channels: completion messages from remote contexts
/// and tab lifecycle events. The embedding glue forwards real host traffic
/// into [`Host::post_message`] / [`Host::emit_tab_event`].
pub struct Host {
    namespaces: HashMap<String, Namespace>,
    last_error: LastError,
    messages: broadcast::Sender<CompletionMessage>,
    tab_events: broadcast::Sender<TabEvent>,
}

impl Host {
    #[must_use]
    pub fn new() -> Self {
        let (messages, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (tab_events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            namespaces: HashMap::new(),
            last_error: LastError::new(),
            messages,
            tab_events,
        }
    }

    /// Register a top-level namespace under its host name.
    pub fn insert_namespace(&mut self, name: impl Into<String>, namespace: Namespace) {
        self.namespaces.insert(name.into(), namespace);
    }

    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(name)
    }

    pub fn namespace_mut(&mut self, name: &str) -> Option<&mut Namespace> {
        self.namespaces.get_mut(name)
    }

    /// A handle to this host's last-error slot, for host functions to set.
    #[must_use]
    pub fn last_error(&self) -> LastError {
        self.last_error.clone()
    }

    /// Subscribe to inbound completion messages.
    #[must_use]
    pub fn messages(&self) -> broadcast::Receiver<CompletionMessage> {
        self.messages.subscribe()
    }

    /// Subscribe to tab lifecycle events.
    #[must_use]
    pub fn tab_events(&self) -> broadcast::Receiver<TabEvent> {
        self.tab_events.subscribe()
    }

    /// Sender half of the completion-message channel, for embedding glue
    /// that needs to deliver messages from outside the host.
    #[must_use]
    pub fn message_sender(&self) -> broadcast::Sender<CompletionMessage> {
        self.messages.clone()
    }

    /// Sender half of the tab-event channel.
    #[must_use]
    pub fn tab_event_sender(&self) -> broadcast::Sender<TabEvent> {
        self.tab_events.clone()
    }

    /// Deliver a completion message from a remote context.
    pub fn post_message(&self, message: CompletionMessage) {
        if self.messages.send(message).is_err() {
            tracing::trace!(event = "host.message.dropped", "no listener for completion message");
        }
    }

    /// Deliver a tab lifecycle event.
    pub fn emit_tab_event(&self, event: TabEvent) {
        if self.tab_events.send(event).is_err() {
            tracing::trace!(event = "host.tab_event.dropped", "no listener for tab event");
        }
    }

    /// Invoke an adapted function by its dotted host name.
    ///
    /// Fails with a validation error if the path names a missing member, a
    /// namespace, a data member, or a function that has not been adapted.
    pub async fn call(&self, path: &str, args: Vec<Arg>) -> Result<Value> {
        let function = self.resolve_future(path)?;
        function(args).await
    }

    fn resolve_future(&self, path: &str) -> Result<AsyncFn> {
        let mut segments = path.split('.').peekable();
        let root = segments
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::validation("empty call path"))?;
        let mut namespace = self
            .namespaces
            .get(root)
            .ok_or_else(|| Error::validation(format!("unknown namespace: {root}")))?;

        loop {
            let Some(name) = segments.next() else {
                return Err(Error::validation(format!(
                    "{path} names a namespace, not a function"
                )));
            };
            let member = namespace.get(name).ok_or_else(|| {
                Error::validation(format!("unknown member {name} in call path {path}"))
            })?;

            if segments.peek().is_some() {
                match member {
                    Member::Namespace(sub) => namespace = sub,
                    _ => {
                        return Err(Error::validation(format!(
                            "{name} in call path {path} is not a namespace"
                        )));
                    }
                }
            } else {
                return match member {
                    Member::Future(f) => Ok(Arc::clone(f)),
                    Member::Callback(_) => Err(Error::validation(format!(
                        "{path} is still callback-style; adapt it before calling"
                    ))),
                    Member::Namespace(_) => Err(Error::validation(format!(
                        "{path} names a namespace, not a function"
                    ))),
                    Member::Data(_) => {
                        Err(Error::validation(format!("{path} is not callable")))
                    }
                };
            }
        }
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("namespaces", &self.namespaces.keys().collect::<Vec<_>>())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
