//! Core diagnostic types.
//!
//! Defines [`Diagnostic`], [`Label`] and [`Severity`], plus the constructor
//! functions the stylesheet compiler uses for each declaration problem.

use std::fmt;

use xsl_ir::NodeId;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A stylesheet node with an explanatory message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    /// The declaring node.
    pub node: NodeId,
    /// Source line of the node, 0 when unknown.
    pub line: u32,
    pub message: String,
    /// Whether this is the primary location.
    pub is_primary: bool,
}

impl Label {
    pub fn primary(node: NodeId, line: u32, message: impl Into<String>) -> Self {
        Label {
            node,
            line,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(node: NodeId, line: u32, message: impl Into<String>) -> Self {
        Label {
            node,
            line,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A diagnostic with the context needed to explain a declaration problem.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the declaring node.
    pub fn with_label(mut self, node: NodeId, line: u32, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(node, line, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(
        mut self,
        node: NodeId,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        self.labels.push(Label::secondary(node, line, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// The first primary label.
    pub fn primary_label(&self) -> Option<&Label> {
        self.labels.iter().find(|l| l.is_primary)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            if label.line > 0 {
                write!(f, "\n  {marker} line {}: {}", label.line, label.message)?;
            } else {
                write!(f, "\n  {marker} {:?}: {}", label.node, label.message)?;
            }
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        for suggestion in &self.suggestions {
            write!(f, "\n  = help: {suggestion}")?;
        }

        Ok(())
    }
}

/// Create a "namespace-alias attribute missing" diagnostic.
///
/// `attribute` selects the code: `stylesheet-prefix` → E0001, anything else
/// (`result-prefix`) → E0002.
pub fn missing_alias_attribute(node: NodeId, line: u32, attribute: &str) -> Diagnostic {
    let code = if attribute == "stylesheet-prefix" {
        ErrorCode::E0001
    } else {
        ErrorCode::E0002
    };
    Diagnostic::error(code)
        .with_message(code.description())
        .with_label(node, line, "declared here")
        .with_note("the alias is ignored and compilation continues")
}

/// Create a "prefix not bound to any namespace" diagnostic.
pub fn unbound_prefix(code: ErrorCode, node: NodeId, line: u32, prefix: &str) -> Diagnostic {
    Diagnostic::error(code)
        .with_message(format!("prefix {prefix} not bound to any namespace"))
        .with_label(node, line, format!("`{prefix}` is not in scope here"))
        .with_suggestion(format!("declare `xmlns:{prefix}` on this element or an ancestor"))
}

/// Create a "key attribute missing" diagnostic.
pub fn missing_key_attribute(node: NodeId, line: u32, attribute: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1001)
        .with_message(format!("key: {attribute} attribute missing"))
        .with_label(node, line, "declared here")
}

/// Create an "invalid key expression" diagnostic.
///
/// `is_match` selects E1003 (match pattern) or E1004 (use expression).
pub fn invalid_key_expression(
    node: NodeId,
    line: u32,
    is_match: bool,
    source: &str,
    reason: &str,
) -> Diagnostic {
    let (code, what) = if is_match {
        (ErrorCode::E1003, "match pattern")
    } else {
        (ErrorCode::E1004, "use expression")
    };
    Diagnostic::error(code)
        .with_message(format!("key: failed to compile {what} `{source}`"))
        .with_label(node, line, reason.to_owned())
}

/// Create a "document element is not a stylesheet" diagnostic.
pub fn not_a_stylesheet(node: NodeId, line: u32, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9001)
        .with_message(format!(
            "document element `{found}` is not a stylesheet element"
        ))
        .with_label(node, line, "expected `stylesheet` or `transform` in the XSLT namespace")
}
