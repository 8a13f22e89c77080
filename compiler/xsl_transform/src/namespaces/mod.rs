//! Namespace handling for the result tree.
//!
//! Three operations decide which namespace declarations appear in the output:
//!
//! - [`register_namespace_alias`] records a stylesheet-URI → result-URI
//!   substitution while the stylesheet is compiled
//! - [`get_namespace`] finds (or creates) the output binding to use for one
//!   source binding at one output element
//! - [`copy_namespace_list`] re-declares an element's namespace declarations
//!   on its copy, dropping the XSLT namespace and applying aliases
//!
//! Aliases are looked up once. A chain `a → b → c` maps `a` to `b`, never
//! to `c`.

mod alias;
mod clone;
mod resolve;

pub use alias::{register_namespace_alias, AliasTable};
pub use clone::copy_namespace_list;
pub use resolve::get_namespace;
