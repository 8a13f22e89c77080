//! Error codes for stylesheet diagnostics.
//!
//! The first digit of each code names the declaration family. Used for
//! documentation lookups and as diagnostic messages.

use std::fmt;

/// Error codes for all stylesheet diagnostics.
///
/// Format: E#### / W#### where the first digit indicates the family:
/// - E0xxx: namespace-alias declarations
/// - E1xxx: key declarations
/// - E9xxx: stylesheet structure
/// - W0xxx: namespace-alias warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Namespace alias (E0xxx)
    /// `stylesheet-prefix` attribute missing
    E0001,
    /// `result-prefix` attribute missing
    E0002,
    /// Alias prefix not bound to any namespace
    E0003,

    // Keys (E1xxx)
    /// Required `key` attribute missing
    E1001,
    /// Key name uses an unbound prefix
    E1002,
    /// Key match pattern does not compile
    E1003,
    /// Key use expression does not compile
    E1004,

    // Structure (E9xxx)
    /// Document element is not a stylesheet
    E9001,

    // Warnings
    /// Namespace alias redeclared for the same stylesheet URI
    W0001,
}

impl ErrorCode {
    /// All variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E9001,
        ErrorCode::W0001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E9001 => "E9001",
            ErrorCode::W0001 => "W0001",
        }
    }

    /// Short human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "namespace-alias: stylesheet-prefix attribute missing",
            ErrorCode::E0002 => "namespace-alias: result-prefix attribute missing",
            ErrorCode::E0003 => "namespace-alias: prefix not bound to any namespace",
            ErrorCode::E1001 => "key: required attribute missing",
            ErrorCode::E1002 => "key: name prefix not bound to any namespace",
            ErrorCode::E1003 => "key: match pattern does not compile",
            ErrorCode::E1004 => "key: use expression does not compile",
            ErrorCode::E9001 => "document element is not a stylesheet",
            ErrorCode::W0001 => "namespace-alias: alias redeclared",
        }
    }

    /// Check if this code is a warning.
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
