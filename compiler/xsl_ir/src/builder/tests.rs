use pretty_assertions::assert_eq;

use super::*;
use crate::{NodeKind, XSLT_NAMESPACE};

#[test]
fn prefixed_element_resolves_declaration_made_after_start() {
    let mut b = TreeBuilder::new();
    b.start("foo:item").declare(Some("foo"), "urn:a");
    let item = b.current().unwrap();
    b.end();
    let doc = b.finish().unwrap();

    assert_eq!(doc.local_name(item), Some("item"));
    assert_eq!(doc.namespace_uri(item), Some("urn:a"));
    assert_eq!(doc.document_element(), Some(item));
}

#[test]
fn unprefixed_element_takes_default_namespace() {
    let mut b = TreeBuilder::new();
    b.start("outer").declare(None, "urn:default");
    b.start("inner");
    let inner = b.current().unwrap();
    b.end().end();
    let doc = b.finish().unwrap();

    assert_eq!(doc.namespace_uri(inner), Some("urn:default"));
}

#[test]
fn empty_default_namespace_undeclares() {
    let mut b = TreeBuilder::new();
    b.start("outer").declare(None, "urn:default");
    b.start("inner").declare(None, "");
    let inner = b.current().unwrap();
    let doc = b.finish().unwrap();

    assert_eq!(doc.namespace_uri(inner), None);
}

#[test]
fn unprefixed_attributes_have_no_namespace() {
    let mut b = TreeBuilder::new();
    b.start("x:e")
        .declare(None, "urn:default")
        .declare(Some("x"), "urn:x")
        .attr("plain", "1")
        .attr("x:qualified", "2");
    let e = b.current().unwrap();
    let doc = b.finish().unwrap();

    let attrs = doc.attributes(e);
    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs[0].ns, None);
    assert_eq!(
        attrs[1].ns.map(|r| doc.binding(r).uri.as_str()),
        Some("urn:x")
    );
}

#[test]
fn xml_prefix_needs_no_declaration() {
    let mut b = TreeBuilder::new();
    b.start("e").attr("xml:lang", "en");
    let e = b.current().unwrap();
    let doc = b.finish().unwrap();

    let attr = &doc.attributes(e)[0];
    assert_eq!(attr.name, "lang");
    assert_eq!(attr.ns, Some(doc.xml_ns()));
    assert!(doc.ns_defs(e).is_empty());
}

#[test]
fn unbound_prefix_is_reported_by_finish() {
    let mut b = TreeBuilder::new();
    b.start("missing:e");
    let e = b.current().unwrap();
    assert_eq!(
        b.finish().err(),
        Some(TreeError::UnboundPrefix {
            node: e,
            prefix: "missing".to_owned()
        })
    );
}

#[test]
fn text_and_comment_children_in_order() {
    let mut b = TreeBuilder::new();
    b.start("xsl:stylesheet").declare(Some("xsl"), XSLT_NAMESPACE);
    b.text("a").comment("c").text("b").line(7);
    let last = b.last().unwrap();
    let sheet = b.current().unwrap();
    let doc = b.finish().unwrap();

    let kinds: Vec<&NodeKind> = doc.children(sheet).iter().map(|&c| doc.kind(c)).collect();
    assert_eq!(
        kinds,
        vec![
            &NodeKind::Text("a".to_owned()),
            &NodeKind::Comment("c".to_owned()),
            &NodeKind::Text("b".to_owned()),
        ]
    );
    assert_eq!(doc.line(last), 7);
    assert_eq!(doc.namespace_uri(sheet), Some(XSLT_NAMESPACE));
}
