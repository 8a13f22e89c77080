//! Single-binding resolution against the output scope.

use tracing::{trace, warn};
use xsl_ir::{Document, NodeId, NsBinding, NsRef};

use super::AliasTable;

/// Find or create the output binding standing in for `ns` at `out`.
///
/// In order:
/// 1. if `out`'s own namespace already has the URI of `ns`, that binding is
///    returned as is (no alias is applied on this path)
/// 2. the URI is mapped through `aliases` once
/// 3. the nearest unshadowed binding of the mapped URI in scope at `out` is
///    returned
/// 4. otherwise a declaration of the mapped URI under the prefix of `ns` is
///    added to `out`
///
/// Returns `None` when `ns` has an empty URI, when `out` is not an element
/// and nothing was found in scope, or when `out` already declares the prefix
/// of `ns` for a different URI.
#[tracing::instrument(level = "trace", skip(aliases, output, ns), fields(uri = %ns.uri))]
pub fn get_namespace(
    aliases: &AliasTable,
    output: &mut Document,
    ns: &NsBinding,
    out: NodeId,
) -> Option<NsRef> {
    if ns.uri.is_empty() {
        return None;
    }

    if let Some(own) = output.ns_of(out) {
        if output.binding(own).uri == ns.uri {
            return Some(own);
        }
    }

    let uri = aliases.target(&ns.uri);
    if let Some(found) = output.search_ns_by_href(out, uri) {
        trace!(?found, "reusing in-scope binding");
        return Some(found);
    }

    if !output.is_element(out) {
        return None;
    }
    match output.new_ns(out, uri, ns.prefix()) {
        Ok(created) => {
            trace!(?created, "declared on output element");
            Some(created)
        }
        Err(err) => {
            warn!(%err, uri, "namespace dropped from output");
            None
        }
    }
}
