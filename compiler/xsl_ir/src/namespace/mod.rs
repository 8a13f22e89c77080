//! Namespace bindings and per-element declaration lists.

use std::fmt;

use smallvec::SmallVec;

use crate::NodeId;

/// URI of the transformation language's own declarations.
///
/// Bindings to this URI describe the stylesheet, not its output, and are
/// never propagated into a result tree.
pub const XSLT_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";

/// URI permanently bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A prefix→URI namespace declaration.
///
/// `prefix == None` is the default namespace (`xmlns="..."`).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NsBinding {
    pub prefix: Option<String>,
    pub uri: String,
}

impl NsBinding {
    /// Create a new binding.
    pub fn new(prefix: Option<&str>, uri: impl Into<String>) -> Self {
        NsBinding {
            prefix: prefix.map(str::to_owned),
            uri: uri.into(),
        }
    }

    /// Prefix as a borrowed string.
    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Check whether this binding declares `prefix`.
    #[inline]
    pub fn has_prefix(&self, prefix: Option<&str>) -> bool {
        self.prefix.as_deref() == prefix
    }
}

impl fmt::Display for NsBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "xmlns:{prefix}=\"{}\"", self.uri),
            None => write!(f, "xmlns=\"{}\"", self.uri),
        }
    }
}

/// Handle to one binding declared on one element.
///
/// `index` is the position in that element's [`NsList`]. Declarations are
/// only ever appended, so a handle stays valid for the document's lifetime.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NsRef {
    pub node: NodeId,
    pub index: u32,
}

impl NsRef {
    #[inline]
    pub const fn new(node: NodeId, index: u32) -> Self {
        NsRef { node, index }
    }
}

/// Ordered declarations owned by a single element.
///
/// Most elements declare zero to two namespaces, so the list is stored
/// inline up to that size.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct NsList {
    bindings: SmallVec<[NsBinding; 2]>,
}

impl NsList {
    pub fn new() -> Self {
        NsList::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&NsBinding> {
        self.bindings.get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &[NsBinding] {
        &self.bindings
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, NsBinding> {
        self.bindings.iter()
    }

    /// Position of the declaration for `prefix`, if any.
    pub fn position_of_prefix(&self, prefix: Option<&str>) -> Option<usize> {
        self.bindings.iter().position(|b| b.has_prefix(prefix))
    }

    /// Append a declaration, returning its position.
    pub(crate) fn push(&mut self, binding: NsBinding) -> usize {
        self.bindings.push(binding);
        self.bindings.len() - 1
    }
}

impl<'a> IntoIterator for &'a NsList {
    type Item = &'a NsBinding;
    type IntoIter = std::slice::Iter<'a, NsBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
