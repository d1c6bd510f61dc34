//! Declarative API-map tree and the walker that adapts a namespace in place.
//!
//! The map is a typed tree: a [`Leaf`](ApiEntry::Leaf) names a callback-style
//! function to adapt, a [`Node`](ApiEntry::Node) names a sub-namespace to
//! recurse into. The walk mutates the namespace so every named function is
//! replaced by its future-returning form under the original name.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::adapter::{promisify, Combiner};
use crate::host::{LastError, Member, Namespace};

/// One entry in an API map.
#[derive(Clone)]
pub enum ApiEntry {
    /// A named callback-style function to adapt. The optional combiner folds
    /// a multi-value completion into one structured result instead of the
    /// default arity-based rule.
    Leaf {
        name: String,
        combiner: Option<Combiner>,
    },
    /// A named sub-namespace with its own entries.
    Node {
        name: String,
        children: Vec<ApiEntry>,
    },
}

impl ApiEntry {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf { name, .. } | Self::Node { name, .. } => name,
        }
    }
}

impl fmt::Debug for ApiEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf { name, combiner } => f
                .debug_struct("Leaf")
                .field("name", name)
                .field("combiner", &combiner.is_some())
                .finish(),
            Self::Node { name, children } => f
                .debug_struct("Node")
                .field("name", name)
                .field("children", children)
                .finish(),
        }
    }
}

/// A plain function entry.
#[must_use]
pub fn leaf(name: impl Into<String>) -> ApiEntry {
    ApiEntry::Leaf {
        name: name.into(),
        combiner: None,
    }
}

/// A function entry whose completion values are folded by `combiner`.
#[must_use]
pub fn leaf_with(
    name: impl Into<String>,
    combiner: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
) -> ApiEntry {
    ApiEntry::Leaf {
        name: name.into(),
        combiner: Some(Arc::new(combiner)),
    }
}

/// A sub-namespace entry.
#[must_use]
pub fn node(name: impl Into<String>, children: Vec<ApiEntry>) -> ApiEntry {
    ApiEntry::Node {
        name: name.into(),
        children,
    }
}

/// Adapt every function the map names, in place.
///
/// Names absent from the namespace are skipped: maps are written against a
/// superset of host versions and capabilities, and compatibility is achieved
/// by skipping, not failing. Members whose shape does not match their entry
/// (a data member named by a leaf, a function named by a node) are left
/// untouched. Already-adapted members no longer match the callback shape, so
/// walking a namespace twice is a no-op rather than a double wrap.
pub fn apply_map(namespace: &mut Namespace, map: &[ApiEntry], last_error: &LastError) {
    for entry in map {
        match entry {
            ApiEntry::Leaf { name, combiner } => {
                let Some(member) = namespace.get_mut(name) else {
                    continue;
                };
                if let Member::Callback(f) = member {
                    tracing::trace!(event = "api_map.adapt", name = %name, "adapting callback function");
                    *member = Member::Future(promisify(
                        Arc::clone(f),
                        combiner.clone(),
                        last_error.clone(),
                    ));
                }
            }
            ApiEntry::Node { name, children } => {
                if let Some(Member::Namespace(sub)) = namespace.get_mut(name) {
                    apply_map(sub, children, last_error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Completion, HostFn};
    use serde_json::json;

    fn callback_member() -> Member {
        let f: HostFn = Arc::new(|_args, done: Completion| {
            done(vec![json!("done")]);
            Ok(())
        });
        Member::Callback(f)
    }

    #[test]
    fn absent_names_leave_the_namespace_unchanged() {
        let mut ns = Namespace::new();
        ns.insert("present", callback_member());

        apply_map(
            &mut ns,
            &[leaf("missing"), node("alsoMissing", vec![leaf("x")])],
            &LastError::new(),
        );

        assert_eq!(ns.len(), 1);
        assert!(ns.get("present").unwrap().is_callback());
    }

    #[test]
    fn matching_leaves_are_replaced_in_place() {
        let mut ns = Namespace::new();
        ns.insert("get", callback_member());
        ns.insert("untouched", callback_member());

        apply_map(&mut ns, &[leaf("get")], &LastError::new());

        assert!(ns.get("get").unwrap().is_future());
        assert!(ns.get("untouched").unwrap().is_callback());
    }

    #[test]
    fn nodes_recurse_into_sub_namespaces() {
        let mut local = Namespace::new();
        local.insert("get", callback_member());
        let mut storage = Namespace::new();
        storage.insert("local", Member::Namespace(local));

        apply_map(
            &mut storage,
            &[node("local", vec![leaf("get")])],
            &LastError::new(),
        );

        let Some(Member::Namespace(local)) = storage.get("local") else {
            panic!("sub-namespace replaced");
        };
        assert!(local.get("get").unwrap().is_future());
    }

    #[test]
    fn shape_mismatches_are_skipped() {
        let mut ns = Namespace::new();
        ns.insert("data", Member::Data(json!(7)));
        ns.insert("fn", callback_member());

        // A leaf naming data, and a node naming a function: both skipped.
        apply_map(
            &mut ns,
            &[leaf("data"), node("fn", vec![leaf("x")])],
            &LastError::new(),
        );

        assert!(matches!(ns.get("data"), Some(Member::Data(_))));
        assert!(ns.get("fn").unwrap().is_callback());
    }

    #[test]
    fn walking_twice_does_not_double_wrap() {
        let mut ns = Namespace::new();
        ns.insert("get", callback_member());

        let map = [leaf("get")];
        apply_map(&mut ns, &map, &LastError::new());
        apply_map(&mut ns, &map, &LastError::new());

        assert!(ns.get("get").unwrap().is_future());
    }

    #[tokio::test]
    async fn adapted_leaf_is_callable() {
        let mut ns = Namespace::new();
        ns.insert("get", callback_member());
        apply_map(&mut ns, &[leaf("get")], &LastError::new());

        let Some(Member::Future(f)) = ns.get("get") else {
            panic!("not adapted");
        };
        assert_eq!(f(vec![]).await.unwrap(), json!("done"));
    }
}
