use pretty_assertions::assert_eq;
use xsl_diagnostic::{DiagnosticConfig, ErrorCode};
use xsl_ir::{Document, TreeBuilder, XSLT_NAMESPACE};

use super::*;
use crate::keys::KeyName;

fn compile(doc: &Document) -> Compilation {
    Stylesheet::compile(doc, DiagnosticConfig::default())
}

fn codes(compilation: &Compilation) -> Vec<ErrorCode> {
    compilation.diagnostics.iter().map(|d| d.code).collect()
}

/// `<xsl:stylesheet>` with `foo`/`bar` declared; `body` adds children.
fn stylesheet(body: impl FnOnce(&mut TreeBuilder)) -> Document {
    let mut b = TreeBuilder::new();
    b.start("xsl:stylesheet")
        .declare(Some("xsl"), XSLT_NAMESPACE)
        .declare(Some("foo"), "urn:a")
        .declare(Some("bar"), "urn:b");
    body(&mut b);
    b.finish().unwrap()
}

#[test]
fn empty_stylesheet_has_empty_alias_table() {
    let compilation = compile(&stylesheet(|_| {}));

    assert!(compilation.diagnostics.is_empty());
    assert!(compilation.stylesheet.aliases().is_empty());
    assert!(compilation.stylesheet.keys().is_empty());
}

#[test]
fn transform_is_accepted_as_document_element() {
    let mut b = TreeBuilder::new();
    b.start("xsl:transform").declare(Some("xsl"), XSLT_NAMESPACE);
    let doc = b.finish().unwrap();

    assert!(compile(&doc).diagnostics.is_empty());
}

#[test]
fn declarations_are_dispatched() {
    let doc = stylesheet(|b| {
        b.start("xsl:namespace-alias")
            .attr("stylesheet-prefix", "foo")
            .attr("result-prefix", "bar")
            .end();
        b.start("xsl:key")
            .attr("name", "by-id")
            .attr("match", "foo:item")
            .attr("use", "@id")
            .end();
        b.start("xsl:template").attr("match", "/").end();
    });
    let compilation = compile(&doc);

    assert!(compilation.diagnostics.is_empty());
    let stylesheet = &compilation.stylesheet;
    assert_eq!(stylesheet.aliases().get("urn:a"), Some("urn:b"));
    assert!(stylesheet.keys().get(&KeyName::new("by-id", None)).is_some());
}

#[test]
fn alias_problems_do_not_stop_compilation() {
    let doc = stylesheet(|b| {
        b.start("xsl:namespace-alias")
            .line(3)
            .attr("stylesheet-prefix", "foo")
            .end();
        b.start("xsl:namespace-alias")
            .line(4)
            .attr("stylesheet-prefix", "nope")
            .attr("result-prefix", "bar")
            .end();
        b.start("xsl:namespace-alias")
            .line(5)
            .attr("stylesheet-prefix", "bar")
            .attr("result-prefix", "foo")
            .end();
    });
    let compilation = compile(&doc);

    assert_eq!(codes(&compilation), vec![ErrorCode::E0002, ErrorCode::E0003]);
    assert!(compilation.has_errors());
    let aliases = compilation.stylesheet.aliases();
    assert_eq!(aliases.len(), 1);
    assert_eq!(aliases.get("urn:b"), Some("urn:a"));
}

#[test]
fn key_with_missing_attributes_reports_each() {
    let doc = stylesheet(|b| {
        b.start("xsl:key").line(2).attr("name", "k").end();
    });
    let compilation = compile(&doc);

    assert_eq!(codes(&compilation), vec![ErrorCode::E1001, ErrorCode::E1001]);
    assert!(compilation.stylesheet.keys().is_empty());
}

#[test]
fn key_name_prefix_is_resolved() {
    let doc = stylesheet(|b| {
        b.start("xsl:key")
            .attr("name", "foo:k")
            .attr("match", "item")
            .attr("use", ".")
            .end();
        b.start("xsl:key")
            .attr("name", "nope:k")
            .attr("match", "item")
            .attr("use", ".")
            .end();
    });
    let compilation = compile(&doc);

    assert_eq!(codes(&compilation), vec![ErrorCode::E1002]);
    let keys = compilation.stylesheet.keys();
    assert!(keys.get(&KeyName::new("k", Some("urn:a"))).is_some());
    assert_eq!(keys.len(), 1);
}

#[test]
fn invalid_key_expressions_are_reported() {
    let doc = stylesheet(|b| {
        b.start("xsl:key")
            .attr("name", "k")
            .attr("match", "item |")
            .attr("use", ".")
            .end();
        b.start("xsl:key")
            .attr("name", "k")
            .attr("match", "item")
            .attr("use", "@")
            .end();
    });
    let compilation = compile(&doc);

    assert_eq!(codes(&compilation), vec![ErrorCode::E1003, ErrorCode::E1004]);
    assert_eq!(
        compilation.diagnostics[0].message,
        "key: failed to compile match pattern `item |`"
    );
}

#[test]
fn non_stylesheet_document_element_is_reported() {
    let mut b = TreeBuilder::new();
    b.start("html").line(1);
    let doc = b.finish().unwrap();
    let compilation = compile(&doc);

    assert_eq!(codes(&compilation), vec![ErrorCode::E9001]);
    assert_eq!(
        compilation.diagnostics[0].message,
        "document element `html` is not a stylesheet element"
    );
}

#[test]
fn empty_document_is_reported() {
    let compilation = compile(&Document::new());
    assert_eq!(codes(&compilation), vec![ErrorCode::E9001]);
}

#[test]
fn builder_steps_can_be_driven_individually() {
    let doc = stylesheet(|b| {
        b.start("xsl:namespace-alias")
            .attr("stylesheet-prefix", "#default")
            .attr("result-prefix", "bar")
            .end();
    });
    let alias = doc.children(doc.document_element().unwrap())[0];
    let mut builder = StylesheetBuilder::new();

    // No default namespace in scope.
    assert!(!builder.register_namespace_alias(&doc, alias));
    let scope: rustc_hash::FxHashMap<String, String> = rustc_hash::FxHashMap::default();
    builder
        .define_key("k", None, "item", "@id", &scope)
        .unwrap();
    let err = builder.define_key("k", None, "", ".", &scope).unwrap_err();
    assert!(err.is_match());

    let compilation = builder.finish();
    assert_eq!(codes(&compilation), vec![ErrorCode::E0003]);
    assert_eq!(compilation.stylesheet.keys().len(), 1);
}

#[test]
fn stylesheet_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Stylesheet>();
}
