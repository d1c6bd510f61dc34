//! tabwire - future-style bridge over callback-style browser-extension host
//! APIs, with correlated async execution in tabs.
//!
//! Two pieces:
//!
//! - a declarative callback-to-future adaptation engine ([`adapter`],
//!   [`api_map`], [`catalog`], [`bootstrap`]): a typed map of API names is
//!   walked over a host's namespace tree, replacing every enumerated
//!   callback-style function in place with a future-returning one under its
//!   original name;
//! - a correlated remote-execution protocol ([`codegen`], [`correlation`],
//!   [`tab_wait`] and the operations on [`host::Host`]): generate a
//!   self-reporting program, inject it into a tab, and match its single
//!   completion message back to the caller by unique id, with a
//!   timeout-bounded race over tab lifecycle events for load waits.
//!
//! The host environment itself (namespaces of callback functions, the
//! inbound message stream, tab events) is modeled by [`host::Host`];
//! embedders populate it from the live environment and forward its traffic
//! into [`host::Host::post_message`] / [`host::Host::emit_tab_event`].

#![forbid(unsafe_code)]

pub mod adapter;
pub mod api_map;
pub mod bootstrap;
pub mod catalog;
pub mod codegen;
pub mod correlation;
pub mod error;
pub mod host;
mod remote;
pub mod tab_wait;

pub use adapter::{promisify, Combiner};
pub use api_map::{apply_map, leaf, leaf_with, node, ApiEntry};
pub use bootstrap::promisify_host;
pub use catalog::api_catalog;
pub use codegen::{build_injection, Action, InjectDetails};
pub use correlation::{await_completion, CompletionMessage, ErrorSnapshot};
pub use error::{Error, Result};
pub use host::{Arg, Host, LastError, Member, Namespace};
pub use tab_wait::{wait_for_load, TabEvent, TabLoad, DEFAULT_LOAD_TIMEOUT};
