//! XSL Transform - result-tree construction support for the transformation
//! engine.
//!
//! This crate provides the pieces of the engine that decide what a copied
//! or synthesized output node looks like, independently of which template
//! selected it:
//!
//! - `namespaces`: namespace aliasing (`namespace-alias`), single-binding
//!   resolution against the output scope, and bulk declaration copying
//! - `keys`: `key` definitions and the per-document lookup index behind
//!   `key()`
//! - `stylesheet`: the compile phase that reads top-level declarations into
//!   an immutable [`Stylesheet`]
//! - `context`: [`TransformContext`], the per-run owner of the output tree,
//!   plus shallow/deep node copying
//!
//! # Sharing
//!
//! A compiled [`Stylesheet`] is never mutated after
//! [`StylesheetBuilder::finish`] and is `Send + Sync`; any number of
//! contexts may borrow it concurrently. Each context owns its output tree
//! and key cache.

mod context;
pub mod keys;
pub mod namespaces;
mod stack;
mod stylesheet;

pub use context::TransformContext;
pub use keys::{KeyCache, KeyDefinition, KeyDefinitions, KeyError, KeyName, NodeScope, PrefixResolver};
pub use namespaces::{copy_namespace_list, get_namespace, register_namespace_alias, AliasTable};
pub use stylesheet::{Compilation, Stylesheet, StylesheetBuilder};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=xsl_transform=debug` or `RUST_LOG=xsl_transform=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
