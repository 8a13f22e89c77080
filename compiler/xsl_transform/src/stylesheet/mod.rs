//! Stylesheet compilation: top-level declarations into an immutable
//! [`Stylesheet`].
//!
//! Only the declarations this crate acts on are read (`namespace-alias` and
//! `key`); every other top-level element is left to the template engine.
//! Problems with a declaration are reported as diagnostics and the
//! declaration is skipped, so compilation always produces a stylesheet.

use tracing::{debug, trace};
use xsl_diagnostic::{
    invalid_key_expression, missing_key_attribute, not_a_stylesheet, unbound_prefix, Diagnostic,
    DiagnosticConfig, DiagnosticQueue, ErrorCode,
};
use xsl_ir::{Document, NodeId, XSLT_NAMESPACE};

use crate::keys::{KeyDefinitions, KeyError, NodeScope, PrefixResolver};
use crate::namespaces::{self, AliasTable};

/// A compiled stylesheet.
///
/// Immutable once built; share it by reference between transform contexts.
#[derive(Clone, Debug, Default)]
pub struct Stylesheet {
    aliases: AliasTable,
    keys: KeyDefinitions,
}

impl Stylesheet {
    /// Compile the top-level declarations of `doc`.
    pub fn compile(doc: &Document, config: DiagnosticConfig) -> Compilation {
        let mut builder = StylesheetBuilder::with_config(config);
        builder.add_declarations(doc);
        builder.finish()
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn keys(&self) -> &KeyDefinitions {
        &self.keys
    }
}

/// Result of compiling a stylesheet.
#[derive(Debug)]
pub struct Compilation {
    pub stylesheet: Stylesheet,
    /// Diagnostics sorted by source line.
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Mutable stylesheet under construction.
#[derive(Debug, Default)]
pub struct StylesheetBuilder {
    aliases: AliasTable,
    keys: KeyDefinitions,
    queue: DiagnosticQueue,
}

impl StylesheetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        StylesheetBuilder {
            aliases: AliasTable::new(),
            keys: KeyDefinitions::new(),
            queue: DiagnosticQueue::with_config(config),
        }
    }

    /// Walk the children of the document element and compile the
    /// declarations found there.
    #[tracing::instrument(level = "debug", skip_all, fields(doc = doc.id().raw()))]
    pub fn add_declarations(&mut self, doc: &Document) {
        let Some(top) = doc.document_element() else {
            self.queue.add(not_a_stylesheet(doc.root(), 0, "(none)"));
            return;
        };
        let is_stylesheet = doc.namespace_uri(top) == Some(XSLT_NAMESPACE)
            && matches!(doc.local_name(top), Some("stylesheet" | "transform"));
        if !is_stylesheet {
            let found = doc.local_name(top).unwrap_or_default();
            self.queue.add(not_a_stylesheet(top, doc.line(top), found));
            return;
        }

        for &child in doc.children(top) {
            if doc.namespace_uri(child) != Some(XSLT_NAMESPACE) {
                continue;
            }
            match doc.local_name(child) {
                Some("namespace-alias") => {
                    self.register_namespace_alias(doc, child);
                }
                Some("key") => {
                    self.declare_key(doc, child);
                }
                other => trace!(name = ?other, "declaration left to the template engine"),
            }
        }
    }

    /// Register the alias declared by the `namespace-alias` element `node`.
    ///
    /// Returns `true` if an alias was registered; failures are reported as
    /// diagnostics.
    pub fn register_namespace_alias(&mut self, doc: &Document, node: NodeId) -> bool {
        namespaces::register_namespace_alias(&mut self.aliases, doc, node, &mut self.queue)
    }

    /// Compile and register a key definition.
    pub fn define_key(
        &mut self,
        name: &str,
        name_uri: Option<&str>,
        match_source: &str,
        use_source: &str,
        scope: &dyn PrefixResolver,
    ) -> Result<(), KeyError> {
        self.keys
            .define(name, name_uri, match_source, use_source, scope)
    }

    /// Read and register the `key` element `node`.
    ///
    /// Returns `true` if a definition was registered; failures are reported
    /// as diagnostics.
    #[tracing::instrument(level = "debug", skip(self, doc))]
    pub fn declare_key(&mut self, doc: &Document, node: NodeId) -> bool {
        let line = doc.line(node);
        let qname = doc.get_ns_prop(node, "name", XSLT_NAMESPACE);
        let pattern = doc.get_ns_prop(node, "match", XSLT_NAMESPACE);
        let use_expr = doc.get_ns_prop(node, "use", XSLT_NAMESPACE);
        let (Some(qname), Some(pattern), Some(use_expr)) = (qname, pattern, use_expr) else {
            for (attribute, value) in [("name", qname), ("match", pattern), ("use", use_expr)] {
                if value.is_none() {
                    self.queue.add(missing_key_attribute(node, line, attribute));
                }
            }
            return false;
        };

        let (prefix, local) = match qname.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, qname),
        };
        let scope = NodeScope::new(doc, node);
        let uri = match prefix {
            Some(prefix) => match scope.resolve_prefix(prefix) {
                Some(uri) => Some(uri),
                None => {
                    self.queue
                        .add(unbound_prefix(ErrorCode::E1002, node, line, prefix));
                    return false;
                }
            },
            None => None,
        };

        match self.define_key(local, uri.as_deref(), pattern, use_expr, &scope) {
            Ok(()) => {
                debug!(key = local, "key defined");
                true
            }
            Err(err) => {
                self.queue.add(invalid_key_expression(
                    node,
                    line,
                    err.is_match(),
                    err.expr(),
                    &err.syntax_error().to_string(),
                ));
                false
            }
        }
    }

    /// Freeze the stylesheet and hand back the collected diagnostics.
    pub fn finish(mut self) -> Compilation {
        let diagnostics = self.queue.flush();
        debug!(
            aliases = self.aliases.len(),
            keys = self.keys.len(),
            diagnostics = diagnostics.len(),
            "stylesheet compiled"
        );
        Compilation {
            stylesheet: Stylesheet {
                aliases: self.aliases,
                keys: self.keys,
            },
            diagnostics,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]
mod tests;
