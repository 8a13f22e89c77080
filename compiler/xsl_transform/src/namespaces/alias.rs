//! The alias registry filled by `namespace-alias` declarations.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use xsl_diagnostic::{missing_alias_attribute, unbound_prefix, Diagnostic, DiagnosticQueue, ErrorCode};
use xsl_ir::{Document, NodeId, XSLT_NAMESPACE};

/// Prefix value naming the default namespace.
const DEFAULT_PREFIX: &str = "#default";

/// Stylesheet namespace URI → result namespace URI.
///
/// Filled while the stylesheet is compiled, read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: FxHashMap<String, String>,
    /// The `namespace-alias` node that set each entry.
    declared_at: FxHashMap<String, NodeId>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The result URI registered for `uri`, if any.
    pub fn get(&self, uri: &str) -> Option<&str> {
        self.aliases.get(uri).map(String::as_str)
    }

    /// `uri` after one alias lookup.
    ///
    /// The result is never looked up again, so chained aliases are not
    /// followed.
    pub fn target<'a>(&'a self, uri: &'a str) -> &'a str {
        self.get(uri).unwrap_or(uri)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Record an alias, returning the result URI it replaced.
    pub(crate) fn insert(&mut self, from: String, to: String) -> Option<String> {
        self.aliases.insert(from, to)
    }

    /// Record an alias declared by `node`, returning the result URI it
    /// replaced and the node that declared that one.
    fn declare(
        &mut self,
        from: String,
        to: String,
        node: NodeId,
    ) -> Option<(String, Option<NodeId>)> {
        let previous_node = self.declared_at.insert(from.clone(), node);
        self.insert(from, to).map(|previous| (previous, previous_node))
    }
}

/// Register the alias declared by a `namespace-alias` element.
///
/// Both `stylesheet-prefix` and `result-prefix` are read from `node` and
/// resolved against the namespaces in scope there; `#default` names the
/// default namespace. A missing attribute or a prefix with no binding is
/// reported to `queue` and nothing is registered. Redeclaring an alias for
/// the same stylesheet URI replaces the earlier one.
///
/// Returns `true` if an alias was registered.
#[tracing::instrument(level = "debug", skip(aliases, doc, queue))]
pub fn register_namespace_alias(
    aliases: &mut AliasTable,
    doc: &Document,
    node: NodeId,
    queue: &mut DiagnosticQueue,
) -> bool {
    let line = doc.line(node);

    let Some(stylesheet_prefix) = doc.get_ns_prop(node, "stylesheet-prefix", XSLT_NAMESPACE)
    else {
        warn!("namespace-alias without stylesheet-prefix");
        queue.add(missing_alias_attribute(node, line, "stylesheet-prefix"));
        return false;
    };
    let Some(result_prefix) = doc.get_ns_prop(node, "result-prefix", XSLT_NAMESPACE) else {
        warn!("namespace-alias without result-prefix");
        queue.add(missing_alias_attribute(node, line, "result-prefix"));
        return false;
    };

    let Some(from) = prefix_uri(doc, node, stylesheet_prefix) else {
        warn!(prefix = stylesheet_prefix, "stylesheet-prefix not bound");
        queue.add(unbound_prefix(ErrorCode::E0003, node, line, stylesheet_prefix));
        return false;
    };
    let Some(to) = prefix_uri(doc, node, result_prefix) else {
        warn!(prefix = result_prefix, "result-prefix not bound");
        queue.add(unbound_prefix(ErrorCode::E0003, node, line, result_prefix));
        return false;
    };

    let (from, to) = (from.to_owned(), to.to_owned());
    debug!(from = %from, to = %to, "namespace alias");
    if let Some((previous, previous_node)) = aliases.declare(from.clone(), to.clone(), node) {
        if previous != to {
            debug!(from = %from, previous = %previous, "namespace alias replaced");
            let mut diag = Diagnostic::warning(ErrorCode::W0001)
                .with_message(format!("namespace {from} was already aliased to {previous}"))
                .with_label(node, line, format!("now aliased to {to}"));
            if let Some(earlier) = previous_node {
                diag =
                    diag.with_secondary_label(earlier, doc.line(earlier), "first aliased here");
            }
            queue.add(diag.with_note("the last declaration wins"));
        }
    }
    true
}

/// URI bound to `prefix` at `node`, treating `#default` as the default
/// namespace. An empty default namespace counts as unbound.
fn prefix_uri<'d>(doc: &'d Document, node: NodeId, prefix: &str) -> Option<&'d str> {
    let prefix = (prefix != DEFAULT_PREFIX).then_some(prefix);
    doc.search_ns(node, prefix)
        .map(|r| doc.binding(r).uri.as_str())
        .filter(|uri| !uri.is_empty())
}
