//! Node and document identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Index into a document's node arena.
///
/// - Memory: 4 bytes
/// - Equality: O(1) integer compare
/// - Only meaningful together with the `Document` that produced it
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// The document node of every document.
    pub const ROOT: NodeId = NodeId(0);

    /// Create a new `NodeId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Process-unique document identity.
///
/// Used to key per-document caches (the key index) so that a cache entry
/// built for one tree is never consulted for another.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct DocumentId(u32);

static NEXT_DOCUMENT_ID: AtomicU32 = AtomicU32::new(0);

impl DocumentId {
    /// Allocate a fresh identifier.
    pub(crate) fn fresh() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}
