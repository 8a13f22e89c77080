//! Per-run transformation state.

mod copy;

use tracing::debug;
use xsl_ir::{Document, NodeId, NsBinding, NsRef};

use crate::keys::KeyCache;
use crate::namespaces;
use crate::Stylesheet;

/// State of one transformation: a source document read through a shared
/// stylesheet into an owned output document.
pub struct TransformContext<'a> {
    stylesheet: &'a Stylesheet,
    source: &'a Document,
    output: Document,
    keys: KeyCache,
}

impl<'a> TransformContext<'a> {
    pub fn new(stylesheet: &'a Stylesheet, source: &'a Document) -> Self {
        let mut ctx = TransformContext {
            stylesheet,
            source,
            output: Document::new(),
            keys: KeyCache::new(),
        };
        ctx.init_keys();
        ctx
    }

    pub fn stylesheet(&self) -> &'a Stylesheet {
        self.stylesheet
    }

    pub fn source(&self) -> &'a Document {
        self.source
    }

    pub fn output(&self) -> &Document {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut Document {
        &mut self.output
    }

    /// Find or create the output binding for `ns` at the output node `out`.
    pub fn get_namespace(&mut self, ns: &NsBinding, out: NodeId) -> Option<NsRef> {
        namespaces::get_namespace(self.stylesheet.aliases(), &mut self.output, ns, out)
    }

    /// Declare `bindings` on the output element `out`.
    pub fn copy_namespace_list(&mut self, out: NodeId, bindings: &[NsBinding]) -> Vec<NsRef> {
        namespaces::copy_namespace_list(self.stylesheet.aliases(), &mut self.output, out, bindings)
    }

    /// Source nodes whose value for the key `name` is `value`.
    pub fn key(&mut self, name: &str, uri: Option<&str>, value: &str) -> Vec<NodeId> {
        self.keys
            .lookup(self.stylesheet.keys(), self.source, name, uri, value)
    }

    /// Start from an empty key cache.
    pub fn init_keys(&mut self) {
        self.keys = KeyCache::new();
    }

    /// Drop every key index built so far.
    pub fn release_keys(&mut self) {
        self.keys.release();
    }

    /// Number of key indexes currently built.
    pub fn built_keys(&self) -> usize {
        self.keys.len()
    }

    /// Release keys and return the output document.
    pub fn finish(mut self) -> Document {
        self.release_keys();
        debug!(nodes = self.output.node_count(), "transformation finished");
        self.output
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]
mod tests;
