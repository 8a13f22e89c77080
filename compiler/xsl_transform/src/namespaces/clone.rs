//! Bulk re-declaration of namespace lists onto output elements.

use tracing::warn;
use xsl_ir::{Document, NodeId, NsBinding, NsRef, XSLT_NAMESPACE};

use super::AliasTable;

/// Declare each binding of `source` on the output element `out`.
///
/// Bindings of the XSLT namespace are skipped; every other URI goes through
/// `aliases` once and keeps its prefix. Order follows `source`.
///
/// Stops at the first declaration `out` refuses (for example a prefix it
/// already declares); bindings added before that point stay on `out`, and
/// only those are returned.
#[tracing::instrument(level = "trace", skip(aliases, output, source), fields(count = source.len()))]
pub fn copy_namespace_list(
    aliases: &AliasTable,
    output: &mut Document,
    out: NodeId,
    source: &[NsBinding],
) -> Vec<NsRef> {
    let mut copied = Vec::with_capacity(source.len());
    for ns in source.iter().filter(|ns| ns.uri != XSLT_NAMESPACE) {
        let uri = aliases.target(&ns.uri);
        match output.new_ns(out, uri, ns.prefix()) {
            Ok(created) => copied.push(created),
            Err(err) => {
                warn!(%err, copied = copied.len(), "namespace list copy stopped");
                break;
            }
        }
    }
    copied
}
