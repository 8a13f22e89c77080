//! Programmatic document construction.
//!
//! Element and attribute names are given as QNames (`prefix:local`).
//! Prefixes are resolved when the element is closed, so declarations made
//! after `start` apply to the element's own name, as in markup.
//!
//! ```text
//! let mut b = TreeBuilder::new();
//! b.start("xsl:stylesheet").declare(Some("xsl"), XSLT_NAMESPACE);
//! b.start("xsl:namespace-alias")
//!     .attr("stylesheet-prefix", "foo")
//!     .attr("result-prefix", "bar")
//!     .end();
//! b.end();
//! let doc = b.finish()?;
//! ```

use crate::{Document, NodeId, TreeError};

struct PendingAttr {
    prefix: Option<String>,
    name: String,
    value: String,
}

struct OpenElement {
    node: NodeId,
    prefix: Option<String>,
    attrs: Vec<PendingAttr>,
}

/// Builder that records the first failure and reports it from `finish`.
pub struct TreeBuilder {
    doc: Document,
    open: Vec<OpenElement>,
    last: Option<NodeId>,
    error: Option<TreeError>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder {
            doc: Document::new(),
            open: Vec::new(),
            last: None,
            error: None,
        }
    }

    fn record<T>(&mut self, result: Result<T, TreeError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
                None
            }
        }
    }

    fn parent(&self) -> NodeId {
        self.open.last().map_or(NodeId::ROOT, |open| open.node)
    }

    /// The innermost open element.
    pub fn current(&self) -> Option<NodeId> {
        self.open.last().map(|open| open.node)
    }

    /// The most recently created node.
    pub fn last(&self) -> Option<NodeId> {
        self.last
    }

    /// Open a child element of the current element.
    pub fn start(&mut self, qname: &str) -> &mut Self {
        let (prefix, local) = split_qname(qname);
        let parent = self.parent();
        let node = self.doc.new_element(local);
        let result = self.doc.append_child(parent, node);
        self.record(result);
        self.open.push(OpenElement {
            node,
            prefix: prefix.map(str::to_owned),
            attrs: Vec::new(),
        });
        self.last = Some(node);
        self
    }

    /// Declare a namespace on the current element.
    pub fn declare(&mut self, prefix: Option<&str>, uri: &str) -> &mut Self {
        if let Some(node) = self.current() {
            let result = self.doc.new_ns(node, uri, prefix);
            self.record(result);
        }
        self
    }

    /// Add an attribute to the current element.
    pub fn attr(&mut self, qname: &str, value: &str) -> &mut Self {
        let (prefix, name) = split_qname(qname);
        if let Some(open) = self.open.last_mut() {
            open.attrs.push(PendingAttr {
                prefix: prefix.map(str::to_owned),
                name: name.to_owned(),
                value: value.to_owned(),
            });
        }
        self
    }

    /// Record a source line on the most recently created node.
    pub fn line(&mut self, line: u32) -> &mut Self {
        if let Some(node) = self.last {
            self.doc.set_line(node, line);
        }
        self
    }

    /// Append a text child.
    pub fn text(&mut self, text: &str) -> &mut Self {
        let parent = self.parent();
        let node = self.doc.new_text(text);
        let result = self.doc.append_child(parent, node);
        self.record(result);
        self.last = Some(node);
        self
    }

    /// Append a comment child.
    pub fn comment(&mut self, text: &str) -> &mut Self {
        let parent = self.parent();
        let node = self.doc.new_comment(text);
        let result = self.doc.append_child(parent, node);
        self.record(result);
        self.last = Some(node);
        self
    }

    /// Close the current element, resolving its prefixes.
    pub fn end(&mut self) -> &mut Self {
        let Some(open) = self.open.pop() else {
            return self;
        };
        let ns = match open.prefix.as_deref() {
            Some(prefix) => self.resolve(open.node, prefix),
            // An empty default namespace (`xmlns=""`) means "no namespace".
            None => self
                .doc
                .search_ns(open.node, None)
                .filter(|&r| !self.doc.binding(r).uri.is_empty()),
        };
        let result = self.doc.set_ns(open.node, ns);
        self.record(result);
        for attr in open.attrs {
            let ns = match attr.prefix.as_deref() {
                Some(prefix) => self.resolve(open.node, prefix),
                None => None,
            };
            let result = self.doc.set_attribute(open.node, attr.name, ns, attr.value);
            self.record(result);
        }
        self
    }

    /// Open and immediately close an element.
    pub fn leaf(&mut self, qname: &str) -> &mut Self {
        self.start(qname).end()
    }

    fn resolve(&mut self, node: NodeId, prefix: &str) -> Option<crate::NsRef> {
        let found = self.doc.search_ns(node, Some(prefix));
        if found.is_none() {
            self.record::<()>(Err(TreeError::UnboundPrefix {
                node,
                prefix: prefix.to_owned(),
            }));
        }
        found
    }

    /// Close any open elements and return the document.
    pub fn finish(mut self) -> Result<Document, TreeError> {
        while !self.open.is_empty() {
            self.end();
        }
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.doc),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
