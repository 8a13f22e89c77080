//! Copying source nodes into the output tree.

use tracing::{trace, warn};
use xsl_ir::{NodeId, NodeKind, NsBinding, NsRef, TreeError};

use super::TransformContext;
use crate::stack::ensure_sufficient_stack;

impl TransformContext<'_> {
    /// Shallow copy of the source node `src` as the last child of the
    /// output node `parent`.
    ///
    /// An element copy gets the element's namespace declarations (without
    /// the XSLT namespace, aliases applied), then its own namespace and the
    /// namespaces of its attributes through the scope of `parent`. A copy
    /// that ends up in no namespace under an inherited default namespace
    /// gets `xmlns=""`. Copying the document node copies nothing and returns
    /// `parent`.
    pub fn copy_node(&mut self, src: NodeId, parent: NodeId) -> Result<NodeId, TreeError> {
        let source = self.source;
        let copy = match source.kind(src) {
            NodeKind::Document => return Ok(parent),
            NodeKind::Element(element) => {
                let copy = self.output.new_element(element.name.clone());
                self.output.append_child(parent, copy)?;
                if !element.ns_defs.is_empty() {
                    self.copy_namespace_list(copy, element.ns_defs.as_slice());
                }
                let ns = element
                    .ns
                    .and_then(|r| self.get_namespace(source.binding(r), copy));
                self.output.set_ns(copy, ns)?;
                if ns.is_none() {
                    self.undeclare_default(copy)?;
                }
                for attr in &element.attributes {
                    let ns = attr
                        .ns
                        .and_then(|r| self.attribute_namespace(source.binding(r), copy));
                    self.output
                        .set_attribute(copy, attr.name.clone(), ns, attr.value.clone())?;
                }
                return Ok(copy);
            }
            NodeKind::Text(text) => self.output.new_text(text.clone()),
            NodeKind::Comment(text) => self.output.new_comment(text.clone()),
            NodeKind::ProcessingInstruction { target, data } => {
                self.output.new_pi(target.clone(), data.clone())
            }
        };
        self.output.append_child(parent, copy)?;
        Ok(copy)
    }

    /// Declare `xmlns=""` on `copy` if it inherits a non-empty default
    /// namespace.
    fn undeclare_default(&mut self, copy: NodeId) -> Result<(), TreeError> {
        let inherited = self
            .output
            .search_ns(copy, None)
            .filter(|r| r.node != copy && !self.output.binding(*r).uri.is_empty());
        if inherited.is_some() {
            self.output.new_ns(copy, "", None)?;
        }
        Ok(())
    }

    /// Like [`get_namespace`](Self::get_namespace), but never settles for a
    /// default binding: an unprefixed attribute is in no namespace.
    ///
    /// Falls back to a prefixed binding of the same URI in scope at `copy`,
    /// then to a new declaration on `copy` under a prefix free in its scope.
    fn attribute_namespace(&mut self, ns: &NsBinding, copy: NodeId) -> Option<NsRef> {
        let found = self.get_namespace(ns, copy)?;
        let binding = self.output.binding(found);
        if binding.prefix.is_some() {
            return Some(found);
        }
        let uri = binding.uri.clone();
        let output = &self.output;
        if let Some(prefixed) = output
            .in_scope_namespaces(copy)
            .into_iter()
            .find(|&r| output.binding(r).prefix.is_some() && output.binding(r).uri == uri)
        {
            return Some(prefixed);
        }

        let base = ns.prefix().unwrap_or("ns");
        let prefix = std::iter::once(base.to_owned())
            .chain((1..).map(|n| format!("{base}{n}")))
            .find(|p| {
                p != "xml" && p != "xmlns" && output.search_ns(copy, Some(p.as_str())).is_none()
            })?;
        match self.output.new_ns(copy, uri, Some(&prefix)) {
            Ok(created) => {
                trace!(?created, %prefix, "attribute namespace declared");
                Some(created)
            }
            Err(err) => {
                warn!(%err, "attribute namespace dropped from output");
                None
            }
        }
    }

    /// Deep copy of the source subtree at `src` under the output node
    /// `parent`.
    ///
    /// Descendants reuse declarations already made on their copied
    /// ancestors.
    pub fn copy_tree(&mut self, src: NodeId, parent: NodeId) -> Result<NodeId, TreeError> {
        ensure_sufficient_stack(|| {
            let copy = self.copy_node(src, parent)?;
            let source = self.source;
            for &child in source.children(src) {
                self.copy_tree(child, copy)?;
            }
            trace!(?src, ?copy, "subtree copied");
            Ok(copy)
        })
    }
}
