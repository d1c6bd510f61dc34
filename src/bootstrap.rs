//! One-time adaptation of every catalog namespace a host provides.

use crate::api_map::apply_map;
use crate::catalog::api_catalog;
use crate::host::Host;

/// Walk the full [`api_catalog`](crate::catalog::api_catalog) over `host`,
/// replacing every named callback-style function with its future-returning
/// form under the original name.
///
/// Intended to run exactly once, before the host is shared; there is no
/// teardown, the adapted namespaces live as long as the host. Namespaces the
/// host does not provide are skipped. Walking again is a no-op because
/// adapted members no longer match the callback shape.
pub fn promisify_host(host: &mut Host) {
    let last_error = host.last_error();
    let mut adapted = 0usize;
    for (name, map) in api_catalog() {
        let Some(namespace) = host.namespace_mut(name) else {
            continue;
        };
        apply_map(namespace, &map, &last_error);
        adapted += 1;
    }
    tracing::debug!(
        event = "bootstrap.promisify",
        namespaces = adapted,
        "adapted host namespaces"
    );
}
