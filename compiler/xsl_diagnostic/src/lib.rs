//! Diagnostic system for stylesheet compilation.
//!
//! Declaration problems (a `namespace-alias` with a missing attribute, a
//! `key` whose pattern does not compile) never abort compilation. They are
//! collected as [`Diagnostic`]s in a [`DiagnosticQueue`] and handed back to
//! the caller next to the compiled stylesheet.
//!
//! Every diagnostic carries:
//! - an error code for searchability
//! - a message (what went wrong)
//! - labels pointing at stylesheet nodes (where it went wrong)
//! - optional notes and suggestions

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{
    invalid_key_expression, missing_alias_attribute, missing_key_attribute, not_a_stylesheet,
    unbound_prefix, Diagnostic, Label, Severity,
};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
