//! Keys: named, lazily built indexes from string values to source nodes.
//!
//! A `key` declaration names a match pattern and a use expression. At run
//! time, `key(name, value)` returns every node of the current source document
//! that matches one of the key's patterns and whose use expression yields
//! `value`. The index behind a key is built on first use per document and
//! reused until the context releases its keys.

mod expr;
mod index;
mod lexer;

use std::fmt;

use rustc_hash::FxHashMap;
use thiserror::Error;
use xsl_ir::{Document, NodeId};

pub use expr::{Axis, MatchPattern, NameTest, NodeTest, Step, UseExpr};
pub use index::{KeyCache, KeyIndex};

/// Why an expression failed to parse.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unexpected `{found}` at offset {offset}")]
    BadCharacter { found: String, offset: usize },

    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    Unexpected {
        found: &'static str,
        offset: usize,
        expected: &'static str,
    },

    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("{found} at offset {offset} is not allowed in a match pattern")]
    NotInPattern { found: &'static str, offset: usize },

    #[error("unknown node test `{name}()` at offset {offset}")]
    UnknownNodeTest { name: String, offset: usize },

    #[error("prefix `{prefix}` at offset {offset} is not bound to any namespace")]
    UnboundPrefix { prefix: String, offset: usize },
}

/// A key definition that could not be compiled.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid match pattern `{expr}`: {error}")]
    InvalidMatch { expr: String, error: SyntaxError },

    #[error("invalid use expression `{expr}`: {error}")]
    InvalidUse { expr: String, error: SyntaxError },
}

impl KeyError {
    /// `true` for a match pattern failure, `false` for a use expression one.
    pub fn is_match(&self) -> bool {
        matches!(self, KeyError::InvalidMatch { .. })
    }

    /// The expression text that failed.
    pub fn expr(&self) -> &str {
        match self {
            KeyError::InvalidMatch { expr, .. } | KeyError::InvalidUse { expr, .. } => expr,
        }
    }

    pub fn syntax_error(&self) -> &SyntaxError {
        match self {
            KeyError::InvalidMatch { error, .. } | KeyError::InvalidUse { error, .. } => error,
        }
    }
}

/// Source of prefix → URI bindings used while compiling expressions.
pub trait PrefixResolver {
    fn resolve_prefix(&self, prefix: &str) -> Option<String>;
}

/// The namespaces in scope at one node of a document.
#[derive(Clone, Copy, Debug)]
pub struct NodeScope<'a> {
    doc: &'a Document,
    node: NodeId,
}

impl<'a> NodeScope<'a> {
    pub fn new(doc: &'a Document, node: NodeId) -> Self {
        NodeScope { doc, node }
    }
}

impl PrefixResolver for NodeScope<'_> {
    fn resolve_prefix(&self, prefix: &str) -> Option<String> {
        self.doc
            .search_ns(self.node, Some(prefix))
            .map(|r| self.doc.binding(r).uri.clone())
    }
}

impl<S: std::hash::BuildHasher> PrefixResolver for std::collections::HashMap<String, String, S> {
    fn resolve_prefix(&self, prefix: &str) -> Option<String> {
        self.get(prefix).cloned()
    }
}

/// Expanded name of a key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyName {
    pub local: String,
    pub uri: Option<String>,
}

impl KeyName {
    pub fn new(local: &str, uri: Option<&str>) -> Self {
        KeyName {
            local: local.to_owned(),
            uri: uri.map(str::to_owned),
        }
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.uri {
            Some(uri) => write!(f, "{{{uri}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// One compiled `key` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyDefinition {
    pub name: KeyName,
    /// Match pattern as written.
    pub match_source: String,
    /// Use expression as written.
    pub use_source: String,
    pattern: MatchPattern,
    use_expr: UseExpr,
}

impl KeyDefinition {
    /// Compile a definition, resolving prefixes through `scope`.
    pub fn compile(
        name: KeyName,
        match_source: &str,
        use_source: &str,
        scope: &dyn PrefixResolver,
    ) -> Result<Self, KeyError> {
        let pattern =
            MatchPattern::parse(match_source, scope).map_err(|error| KeyError::InvalidMatch {
                expr: match_source.to_owned(),
                error,
            })?;
        let use_expr = UseExpr::parse(use_source, scope).map_err(|error| KeyError::InvalidUse {
            expr: use_source.to_owned(),
            error,
        })?;
        Ok(KeyDefinition {
            name,
            match_source: match_source.to_owned(),
            use_source: use_source.to_owned(),
            pattern,
            use_expr,
        })
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.pattern.matches(doc, node)
    }

    /// Key values of `node` under this definition.
    pub fn values(&self, doc: &Document, node: NodeId) -> Vec<String> {
        self.use_expr.evaluate(doc, node)
    }
}

/// All key definitions of a stylesheet, grouped by name.
///
/// Definitions sharing a name form a union: a node is indexed if any of
/// them matches it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyDefinitions {
    by_name: FxHashMap<KeyName, Vec<KeyDefinition>>,
}

impl KeyDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and register a definition.
    #[tracing::instrument(level = "debug", skip(self, scope))]
    pub fn define(
        &mut self,
        name: &str,
        name_uri: Option<&str>,
        match_source: &str,
        use_source: &str,
        scope: &dyn PrefixResolver,
    ) -> Result<(), KeyError> {
        let name = KeyName::new(name, name_uri);
        let definition = KeyDefinition::compile(name.clone(), match_source, use_source, scope)?;
        self.by_name.entry(name).or_default().push(definition);
        Ok(())
    }

    pub fn get(&self, name: &KeyName) -> Option<&[KeyDefinition]> {
        self.by_name.get(name).map(Vec::as_slice)
    }

    /// Number of distinct key names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
