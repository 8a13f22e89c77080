//! Arena-backed document tree with namespace scope primitives.
//!
//! Every node of a document lives in one flat `Vec<Node>`; parent and child
//! links are `NodeId` indices. Namespace declarations are owned by the
//! element that declares them ([`Element::ns_defs`]) and referenced from
//! elsewhere through [`NsRef`] handles.
//!
//! # Scope searches
//!
//! [`Document::search_ns`] and [`Document::search_ns_by_href`] walk the
//! ancestor chain iteratively. Cost is O(depth × declarations per element);
//! no per-subtree summaries are cached.

use thiserror::Error;

use crate::{DocumentId, NodeId, NsBinding, NsList, NsRef, XML_NAMESPACE};

/// Refusal from a tree primitive.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0:?} cannot have children")]
    NotAContainer(NodeId),

    #[error("node {0:?} already has a parent")]
    AlreadyAttached(NodeId),

    #[error("prefix `{}` is already declared on node {node:?}", prefix.as_deref().unwrap_or("#default"))]
    PrefixInUse { node: NodeId, prefix: Option<String> },

    #[error("prefix `{0}` is reserved")]
    ReservedPrefix(String),

    #[error("prefix `{prefix}` is not bound on node {node:?}")]
    UnboundPrefix { node: NodeId, prefix: String },
}

/// An attribute owned by an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Local name.
    pub name: String,
    /// Namespace binding, resolved in the owning document.
    pub ns: Option<NsRef>,
    pub value: String,
}

/// Element payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Local name (no prefix).
    pub name: String,
    /// The element's own namespace, if any.
    pub ns: Option<NsRef>,
    /// Namespaces declared on this element, in declaration order.
    pub ns_defs: NsList,
    /// Attributes in insertion order.
    pub attributes: Vec<Attribute>,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ns: None,
            ns_defs: NsList::new(),
            attributes: Vec::new(),
        }
    }
}

/// Node payload by kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

/// A node in the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Source line for diagnostics, 0 when unknown.
    pub line: u32,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            parent: None,
            children: Vec::new(),
            line: 0,
        }
    }
}

/// A document tree.
///
/// The `xml` prefix is bound to [`XML_NAMESPACE`] in every document. The
/// binding lives on the document node, so it is in scope everywhere and is
/// never written out as a declaration.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    nodes: Vec<Node>,
    reserved: NsList,
}

/// A clone is a new document and gets its own identity.
impl Clone for Document {
    fn clone(&self) -> Self {
        Document {
            id: DocumentId::fresh(),
            nodes: self.nodes.clone(),
            reserved: self.reserved.clone(),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only its document node.
    pub fn new() -> Self {
        let mut reserved = NsList::new();
        reserved.push(NsBinding::new(Some("xml"), XML_NAMESPACE));
        Document {
            id: DocumentId::fresh(),
            nodes: vec![Node::new(NodeKind::Document)],
            reserved,
        }
    }

    #[inline]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The document node.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// First element child of the document node.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&child| self.is_element(child))
    }

    /// Number of nodes in the arena (attached or not).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // Node access

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    #[inline]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element(_))
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, TreeError> {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Element(element) => Ok(element),
            _ => Err(TreeError::NotAnElement(id)),
        }
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    #[inline]
    pub fn line(&self, id: NodeId) -> u32 {
        self.node(id).line
    }

    pub fn set_line(&mut self, id: NodeId, line: u32) {
        self.nodes[id.index()].line = line;
    }

    /// Local name of an element.
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    /// Namespace URI of an element, `None` for no namespace.
    pub fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        self.element(id)
            .and_then(|e| e.ns)
            .map(|r| self.binding(r).uri.as_str())
    }

    /// The element's own namespace binding handle.
    pub fn ns_of(&self, id: NodeId) -> Option<NsRef> {
        self.element(id).and_then(|e| e.ns)
    }

    /// Namespaces declared directly on `id`.
    ///
    /// For the document node this is the built-in `xml` binding; other
    /// non-elements declare nothing.
    pub fn ns_defs(&self, id: NodeId) -> &[NsBinding] {
        match self.kind(id) {
            NodeKind::Element(element) => element.ns_defs.as_slice(),
            NodeKind::Document => self.reserved.as_slice(),
            _ => &[],
        }
    }

    /// Handle to the built-in `xml` binding.
    #[inline]
    pub fn xml_ns(&self) -> NsRef {
        NsRef::new(NodeId::ROOT, 0)
    }

    /// Resolve a binding handle.
    #[inline]
    pub fn binding(&self, r: NsRef) -> &NsBinding {
        &self.ns_defs(r.node)[r.index as usize]
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match self.element(id) {
            Some(element) => &element.attributes,
            None => &[],
        }
    }

    // Construction

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "documents never approach u32::MAX nodes"
        )]
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind));
        id
    }

    /// Create a detached element.
    pub fn new_element(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Element(Element::new(name)))
    }

    /// Create a detached text node.
    pub fn new_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    /// Create a detached comment.
    pub fn new_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Comment(text.into()))
    }

    /// Create a detached processing instruction.
    pub fn new_pi(&mut self, target: impl Into<String>, data: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        })
    }

    /// Attach a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !matches!(self.kind(parent), NodeKind::Document | NodeKind::Element(_)) {
            return Err(TreeError::NotAContainer(parent));
        }
        if child == NodeId::ROOT || self.parent(child).is_some() {
            return Err(TreeError::AlreadyAttached(child));
        }
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Create an element and append it to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        let element = self.new_element(name);
        self.append_child(parent, element)?;
        Ok(element)
    }

    /// Set (or clear) the element's own namespace.
    pub fn set_ns(&mut self, id: NodeId, ns: Option<NsRef>) -> Result<(), TreeError> {
        self.element_mut(id)?.ns = ns;
        Ok(())
    }

    /// Set an attribute, replacing one with the same name and namespace URI.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        ns: Option<NsRef>,
        value: impl Into<String>,
    ) -> Result<(), TreeError> {
        let name = name.into();
        let uri = ns.map(|r| self.binding(r).uri.clone());
        let existing = self.attributes(id).iter().position(|attr| {
            attr.name == name && attr.ns.map(|r| self.binding(r).uri.as_str()) == uri.as_deref()
        });
        let value = value.into();
        let element = self.element_mut(id)?;
        match existing {
            Some(pos) => {
                let attr = &mut element.attributes[pos];
                attr.ns = ns;
                attr.value = value;
            }
            None => element.attributes.push(Attribute { name, ns, value }),
        }
        Ok(())
    }

    /// Value of the attribute `name` that is either unqualified or in the
    /// namespace `uri`.
    pub fn get_ns_prop(&self, id: NodeId, name: &str, uri: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|attr| {
                attr.name == name
                    && attr.ns.map_or(true, |r| self.binding(r).uri == uri)
            })
            .map(|attr| attr.value.as_str())
    }

    // Namespace scope

    /// Declare a namespace on an element.
    ///
    /// Refused when `id` is not an element, when `prefix` is `xml`/`xmlns`,
    /// or when the element already declares `prefix`.
    pub fn new_ns(
        &mut self,
        id: NodeId,
        uri: impl Into<String>,
        prefix: Option<&str>,
    ) -> Result<NsRef, TreeError> {
        if let Some(p @ ("xml" | "xmlns")) = prefix {
            return Err(TreeError::ReservedPrefix(p.to_owned()));
        }
        let element = self.element_mut(id)?;
        if element.ns_defs.position_of_prefix(prefix).is_some() {
            return Err(TreeError::PrefixInUse {
                node: id,
                prefix: prefix.map(str::to_owned),
            });
        }
        let index = element.ns_defs.push(NsBinding::new(prefix, uri));
        Ok(Self::ns_ref(id, index))
    }

    /// Nearest in-scope declaration of `prefix` at `id`.
    ///
    /// Starts at `id` itself when it is an element, otherwise at its parent.
    /// `xml` always resolves to the built-in binding, even on detached
    /// nodes.
    pub fn search_ns(&self, id: NodeId, prefix: Option<&str>) -> Option<NsRef> {
        if prefix == Some("xml") {
            return Some(self.xml_ns());
        }
        self.ancestors_or_self(id).find_map(|node| {
            self.ns_defs(node)
                .iter()
                .position(|b| b.has_prefix(prefix))
                .map(|pos| Self::ns_ref(node, pos))
        })
    }

    /// Nearest in-scope declaration binding `uri` at `id`.
    ///
    /// A declaration whose prefix is redeclared closer to `id` with another
    /// URI is shadowed and skipped.
    pub fn search_ns_by_href(&self, id: NodeId, uri: &str) -> Option<NsRef> {
        if uri == XML_NAMESPACE {
            return Some(self.xml_ns());
        }
        for node in self.ancestors_or_self(id) {
            for (pos, binding) in self.ns_defs(node).iter().enumerate() {
                if binding.uri != uri {
                    continue;
                }
                let candidate = Self::ns_ref(node, pos);
                if self.search_ns(id, binding.prefix()) == Some(candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// All bindings visible at `id`, nearest first, one per prefix.
    ///
    /// The built-in `xml` binding is last unless `id` is detached.
    pub fn in_scope_namespaces(&self, id: NodeId) -> Vec<NsRef> {
        let mut seen: Vec<Option<&str>> = Vec::new();
        let mut result = Vec::new();
        for node in self.ancestors_or_self(id) {
            for (pos, binding) in self.ns_defs(node).iter().enumerate() {
                if !seen.contains(&binding.prefix()) {
                    seen.push(binding.prefix());
                    result.push(Self::ns_ref(node, pos));
                }
            }
        }
        result
    }

    fn ns_ref(node: NodeId, pos: usize) -> NsRef {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "an element never declares u32::MAX namespaces"
        )]
        let index = pos as u32;
        NsRef::new(node, index)
    }

    // Traversal

    /// Proper ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// `id` followed by its ancestors.
    pub fn ancestors_or_self(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: Some(id),
        }
    }

    /// `id` and its descendants in document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Concatenated text of all descendant text nodes (XPath string-value).
    pub fn string_value(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Text(text) | NodeKind::Comment(text) => text.clone(),
            NodeKind::ProcessingInstruction { data, .. } => data.clone(),
            NodeKind::Document | NodeKind::Element(_) => self
                .descendants(id)
                .filter_map(|node| match self.kind(node) {
                    NodeKind::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }
}

/// Iterator over a node's ancestor chain.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree, using an explicit stack.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
