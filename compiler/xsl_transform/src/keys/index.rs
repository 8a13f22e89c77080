//! Per-document key indexes and the cache that owns them.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use xsl_ir::{Document, DocumentId, NodeId};

use super::{KeyDefinition, KeyDefinitions, KeyName};

/// Key value → matching nodes of one document, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyIndex {
    entries: FxHashMap<String, Vec<NodeId>>,
}

impl KeyIndex {
    /// Index every node of `doc` against the union of `definitions`.
    pub fn build(definitions: &[KeyDefinition], doc: &Document) -> Self {
        let mut entries: FxHashMap<String, Vec<NodeId>> = FxHashMap::default();
        for node in doc.descendants(doc.root()).skip(1) {
            for definition in definitions.iter().filter(|d| d.matches(doc, node)) {
                for value in definition.values(doc, node) {
                    let nodes = entries.entry(value).or_default();
                    // Nodes are visited once each, so a repeat is always the tail.
                    if nodes.last() != Some(&node) {
                        nodes.push(node);
                    }
                }
            }
        }
        KeyIndex { entries }
    }

    pub fn get(&self, value: &str) -> &[NodeId] {
        self.entries.get(value).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct key values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Key indexes built so far, one per (key, document) pair.
#[derive(Clone, Debug, Default)]
pub struct KeyCache {
    indexes: FxHashMap<(KeyName, DocumentId), KeyIndex>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes of `doc` whose value for the key `name` is `value`.
    ///
    /// Builds the index on the first lookup for this key and document. An
    /// undefined key yields no nodes.
    #[tracing::instrument(level = "trace", skip(self, definitions, doc))]
    pub fn lookup(
        &mut self,
        definitions: &KeyDefinitions,
        doc: &Document,
        name: &str,
        uri: Option<&str>,
        value: &str,
    ) -> Vec<NodeId> {
        let name = KeyName::new(name, uri);
        let Some(defs) = definitions.get(&name) else {
            warn!(key = %name, "lookup of undefined key");
            return Vec::new();
        };
        let index = self
            .indexes
            .entry((name, doc.id()))
            .or_insert_with_key(|(name, id)| {
                let index = KeyIndex::build(defs, doc);
                debug!(key = %name, doc = id.raw(), values = index.len(), "key index built");
                index
            });
        index.get(value).to_vec()
    }

    /// Number of indexes built.
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Drop every index.
    pub fn release(&mut self) {
        if !self.indexes.is_empty() {
            debug!(count = self.indexes.len(), "releasing key indexes");
        }
        self.indexes.clear();
    }
}
