//! XSL IR - document tree types for the transformation engine.
//!
//! This crate contains the tree model shared by the stylesheet compiler and
//! the transformer:
//! - `NodeId`/`DocumentId` indices into a flat node arena
//! - Namespace bindings (`NsBinding`) owned by the element declaring them
//! - `NsRef` handles addressing one binding inside one document
//! - In-scope namespace searches (by prefix and by URI)
//! - `TreeBuilder` for building documents programmatically
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: nodes live in one `Vec`, links are `NodeId(u32)`
//! - **Owned Declarations**: a binding belongs to exactly one element; other
//!   nodes refer to it by `NsRef`, never by sharing
//! - **Iterative Walks**: ancestor and descendant traversals never recurse

mod builder;
mod document;
mod namespace;
mod node_id;

pub use builder::TreeBuilder;
pub use document::{Ancestors, Attribute, Descendants, Document, Element, Node, NodeKind, TreeError};
pub use namespace::{NsBinding, NsList, NsRef, XML_NAMESPACE, XSLT_NAMESPACE};
pub use node_id::{DocumentId, NodeId};
