use pretty_assertions::assert_eq;

use super::*;
use crate::{missing_alias_attribute, Diagnostic};

#[test]
fn test_duplicates_are_dropped() {
    let mut queue = DiagnosticQueue::new();
    let node = NodeId::new(4);

    assert!(queue.add(missing_alias_attribute(node, 3, "result-prefix")));
    assert!(!queue.add(missing_alias_attribute(node, 3, "result-prefix")));
    // Same problem on another node is not a duplicate.
    assert!(queue.add(missing_alias_attribute(NodeId::new(5), 4, "result-prefix")));

    assert_eq!(queue.len(), 2);
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn test_unlimited_keeps_duplicates() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    let node = NodeId::new(4);

    assert!(queue.add(missing_alias_attribute(node, 3, "result-prefix")));
    assert!(queue.add(missing_alias_attribute(node, 3, "result-prefix")));
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_error_limit_stops_errors_but_not_warnings() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 1,
        deduplicate: false,
    });

    assert!(queue.add(missing_alias_attribute(NodeId::new(1), 1, "stylesheet-prefix")));
    assert!(queue.limit_reached());
    assert!(!queue.add(missing_alias_attribute(NodeId::new(2), 2, "stylesheet-prefix")));

    let warning = Diagnostic::warning(ErrorCode::W0001)
        .with_message("alias redeclared")
        .with_label(NodeId::new(3), 3, "here");
    assert!(queue.add(warning));
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.error_count(), 1);
}

#[test]
fn test_flush_sorts_by_line_and_resets() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(missing_alias_attribute(NodeId::new(1), 9, "result-prefix")));
    assert!(queue.add(missing_alias_attribute(NodeId::new(2), 2, "stylesheet-prefix")));
    assert!(queue.has_errors());

    let flushed = queue.flush();
    let codes: Vec<ErrorCode> = flushed.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E0001, ErrorCode::E0002]);

    assert!(queue.is_empty());
    assert!(!queue.has_errors());
    // Dedup state is reset too.
    assert!(queue.add(missing_alias_attribute(NodeId::new(1), 9, "result-prefix")));
}
