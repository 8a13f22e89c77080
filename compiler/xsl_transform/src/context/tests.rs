use pretty_assertions::assert_eq;
use xsl_diagnostic::DiagnosticConfig;
use xsl_ir::{Document, NodeId, NodeKind, NsBinding, TreeBuilder, XML_NAMESPACE, XSLT_NAMESPACE};

use super::*;

/// Compile a stylesheet aliasing `urn:a` (prefix `foo`) to `urn:b` (`bar`)
/// with a key `by-id` on `@id` of every element.
fn aliasing_stylesheet() -> Stylesheet {
    let mut b = TreeBuilder::new();
    b.start("xsl:stylesheet")
        .declare(Some("xsl"), XSLT_NAMESPACE)
        .declare(Some("foo"), "urn:a")
        .declare(Some("bar"), "urn:b");
    b.start("xsl:namespace-alias")
        .attr("stylesheet-prefix", "foo")
        .attr("result-prefix", "bar")
        .end();
    b.start("xsl:key")
        .attr("name", "by-id")
        .attr("match", "*")
        .attr("use", "@id")
        .end();
    let compilation = Stylesheet::compile(&b.finish().unwrap(), DiagnosticConfig::default());
    assert!(compilation.diagnostics.is_empty());
    compilation.stylesheet
}

/// `<foo:item xmlns:foo="urn:a" xmlns:xsl="…" foo:flag="1" id="i1">
///    <foo:child id="c1">text</foo:child><!--note--></foo:item>`
fn source() -> (Document, NodeId, NodeId) {
    let mut b = TreeBuilder::new();
    b.start("foo:item")
        .declare(Some("foo"), "urn:a")
        .declare(Some("xsl"), XSLT_NAMESPACE)
        .attr("foo:flag", "1")
        .attr("id", "i1");
    let item = b.current().unwrap();
    b.start("foo:child").attr("id", "c1").text("text");
    let child = b.current().unwrap();
    b.end();
    b.comment("note");
    (b.finish().unwrap(), item, child)
}

fn prefix_and_uri(doc: &Document, node: NodeId) -> Option<(Option<String>, String)> {
    doc.ns_of(node).map(|r| {
        let binding = doc.binding(r);
        (binding.prefix.clone(), binding.uri.clone())
    })
}

#[test]
fn copied_element_is_renamed_but_keeps_prefix() {
    let stylesheet = aliasing_stylesheet();
    let (source, item, _) = source();
    let mut ctx = TransformContext::new(&stylesheet, &source);
    let root = ctx.output().root();

    let copy = ctx.copy_node(item, root).unwrap();
    let output = ctx.finish();

    assert_eq!(
        prefix_and_uri(&output, copy),
        Some((Some("foo".to_owned()), "urn:b".to_owned()))
    );
    // The XSLT namespace is not carried over; the element namespace reuses
    // the cloned declaration.
    assert_eq!(output.ns_defs(copy), &[NsBinding::new(Some("foo"), "urn:b")]);
    let attrs = output.attributes(copy);
    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs[0].ns, output.ns_of(copy));
    assert_eq!(attrs[1].ns, None);
    assert!(output.children(copy).is_empty());
}

#[test]
fn deep_copy_reuses_ancestor_declarations() {
    let stylesheet = aliasing_stylesheet();
    let (source, item, _) = source();
    let mut ctx = TransformContext::new(&stylesheet, &source);
    let root = ctx.output().root();

    let copy = ctx.copy_tree(item, root).unwrap();
    let output = ctx.finish();

    let children = output.children(copy);
    assert_eq!(children.len(), 2);
    let child = children[0];
    assert_eq!(output.local_name(child), Some("child"));
    assert_eq!(output.namespace_uri(child), Some("urn:b"));
    assert!(output.ns_defs(child).is_empty());
    assert_eq!(output.string_value(child), "text");
    assert!(matches!(output.kind(children[1]), NodeKind::Comment(c) if c == "note"));
}

#[test]
fn copying_the_document_node_copies_its_children() {
    let stylesheet = Stylesheet::default();
    let (source, _, _) = source();
    let mut ctx = TransformContext::new(&stylesheet, &source);
    let root = ctx.output().root();

    assert_eq!(ctx.copy_tree(source.root(), root).unwrap(), root);
    let output = ctx.finish();

    let top = output.document_element().unwrap();
    // Without aliases, namespaces are copied unmodified.
    assert_eq!(output.namespace_uri(top), Some("urn:a"));
    assert_eq!(output.node_count(), source.node_count());
}

#[test]
fn no_namespace_copy_undeclares_inherited_default() {
    let mut b = TreeBuilder::new();
    b.start("r");
    b.start("a").declare(None, "urn:x");
    let a = b.current().unwrap();
    b.end();
    b.start("b");
    let plain = b.current().unwrap();
    let source = b.finish().unwrap();
    let stylesheet = Stylesheet::default();
    let mut ctx = TransformContext::new(&stylesheet, &source);
    let root = ctx.output().root();

    let a_copy = ctx.copy_node(a, root).unwrap();
    let b_copy = ctx.copy_node(plain, a_copy).unwrap();
    let top_copy = ctx.copy_node(plain, root).unwrap();
    let output = ctx.finish();

    assert_eq!(output.namespace_uri(a_copy), Some("urn:x"));
    assert_eq!(output.namespace_uri(b_copy), None);
    assert_eq!(output.ns_defs(b_copy), &[NsBinding::new(None, "")]);
    let default_at_b = output.search_ns(b_copy, None).unwrap();
    assert_eq!(output.binding(default_at_b).uri, "");
    // Nothing to undeclare at the top.
    assert!(output.ns_defs(top_copy).is_empty());
}

#[test]
fn xml_attributes_copy_without_declarations() {
    let mut b = TreeBuilder::new();
    b.start("e").attr("xml:lang", "en").attr("xml:space", "preserve");
    let e = b.current().unwrap();
    let source = b.finish().unwrap();
    let stylesheet = aliasing_stylesheet();
    let mut ctx = TransformContext::new(&stylesheet, &source);
    let root = ctx.output().root();

    let copy = ctx.copy_node(e, root).unwrap();
    let output = ctx.finish();

    let attrs: Vec<(&str, Option<&str>, &str)> = output
        .attributes(copy)
        .iter()
        .map(|a| {
            let uri = a.ns.map(|r| output.binding(r).uri.as_str());
            (a.name.as_str(), uri, a.value.as_str())
        })
        .collect();
    assert_eq!(
        attrs,
        vec![
            ("lang", Some(XML_NAMESPACE), "en"),
            ("space", Some(XML_NAMESPACE), "preserve"),
        ]
    );
    assert!(output.ns_defs(copy).is_empty());
}

/// `<outer xmlns="urn:x" xmlns:p="urn:x"><inner p:att="1"/></outer>`
fn default_and_prefixed_source() -> (Document, NodeId) {
    let mut b = TreeBuilder::new();
    b.start("outer")
        .declare(None, "urn:x")
        .declare(Some("p"), "urn:x");
    b.start("inner").attr("p:att", "1");
    let inner = b.current().unwrap();
    (b.finish().unwrap(), inner)
}

/// An output element declaring `xmlns="urn:x"` and placed in it.
fn default_namespace_host(ctx: &mut TransformContext<'_>) -> NodeId {
    let root = ctx.output().root();
    let output = ctx.output_mut();
    let host = output.append_element(root, "host").unwrap();
    let default = output.new_ns(host, "urn:x", None).unwrap();
    output.set_ns(host, Some(default)).unwrap();
    host
}

#[test]
fn namespaced_attribute_never_takes_default_binding() {
    let (source, inner) = default_and_prefixed_source();
    let stylesheet = Stylesheet::default();
    let mut ctx = TransformContext::new(&stylesheet, &source);
    let host = default_namespace_host(&mut ctx);

    let copy = ctx.copy_node(inner, host).unwrap();
    let output = ctx.finish();

    // The element reuses the inherited default binding.
    assert_eq!(output.ns_of(copy), output.search_ns(host, None));
    let attr_ns = output.attributes(copy)[0].ns.unwrap();
    assert_eq!(output.binding(attr_ns), &NsBinding::new(Some("p"), "urn:x"));
    assert_eq!(attr_ns.node, copy);
}

#[test]
fn namespaced_attribute_reuses_prefixed_binding_in_scope() {
    let (source, inner) = default_and_prefixed_source();
    let stylesheet = Stylesheet::default();
    let mut ctx = TransformContext::new(&stylesheet, &source);
    let host = default_namespace_host(&mut ctx);
    let q = ctx.output_mut().new_ns(host, "urn:x", Some("q")).unwrap();

    let copy = ctx.copy_node(inner, host).unwrap();
    let output = ctx.finish();

    assert_eq!(output.attributes(copy)[0].ns, Some(q));
    assert!(output.ns_defs(copy).is_empty());
}

#[test]
fn copy_under_text_node_is_refused() {
    let stylesheet = Stylesheet::default();
    let (source, item, child) = source();
    let mut ctx = TransformContext::new(&stylesheet, &source);
    let root = ctx.output().root();
    let text = ctx.output_mut().new_text("t");
    ctx.output_mut().append_child(root, text).unwrap();

    assert_eq!(
        ctx.copy_node(item, text),
        Err(xsl_ir::TreeError::NotAContainer(text))
    );
    assert!(ctx.copy_tree(child, text).is_err());
}

#[test]
fn context_resolves_through_stylesheet_aliases() {
    let stylesheet = aliasing_stylesheet();
    let (source, _, _) = source();
    let mut ctx = TransformContext::new(&stylesheet, &source);
    let root = ctx.output().root();
    let out = ctx.output_mut().append_element(root, "out").unwrap();

    let found = ctx
        .get_namespace(&NsBinding::new(Some("foo"), "urn:a"), out)
        .unwrap();
    assert_eq!(ctx.output().binding(found).uri, "urn:b");

    let cloned = ctx.copy_namespace_list(
        out,
        &[
            NsBinding::new(Some("xsl"), XSLT_NAMESPACE),
            NsBinding::new(Some("p"), "urn:p"),
        ],
    );
    assert_eq!(cloned.len(), 1);
    assert_eq!(ctx.output().ns_defs(out).len(), 2);
}

#[test]
fn key_lookup_builds_index_once_and_finish_releases() {
    let stylesheet = aliasing_stylesheet();
    let (source, item, child) = source();
    let mut ctx = TransformContext::new(&stylesheet, &source);
    assert_eq!(ctx.built_keys(), 0);

    assert_eq!(ctx.key("by-id", None, "c1"), vec![child]);
    assert_eq!(ctx.key("by-id", None, "i1"), vec![item]);
    assert!(ctx.key("by-id", None, "zz").is_empty());
    assert!(ctx.key("undefined", None, "c1").is_empty());
    assert_eq!(ctx.built_keys(), 1);

    ctx.release_keys();
    assert_eq!(ctx.built_keys(), 0);
    ctx.init_keys();
    assert_eq!(ctx.key("by-id", None, "c1"), vec![child]);
    let _output = ctx.finish();
}

#[test]
fn very_deep_trees_copy_without_overflow() {
    const DEPTH: usize = 5_000;
    let mut b = TreeBuilder::new();
    b.start("p:n").declare(Some("p"), "urn:a");
    for _ in 0..DEPTH {
        b.start("p:n");
    }
    let source = b.finish().unwrap();
    let stylesheet = aliasing_stylesheet();
    let mut ctx = TransformContext::new(&stylesheet, &source);
    let root = ctx.output().root();

    ctx.copy_tree(source.root(), root).unwrap();
    let output = ctx.finish();

    assert_eq!(output.node_count(), source.node_count());
    let deepest = output.descendants(output.root()).last().unwrap();
    assert_eq!(output.namespace_uri(deepest), Some("urn:b"));
}

#[test]
fn one_stylesheet_serves_concurrent_contexts() {
    let stylesheet = aliasing_stylesheet();

    let outputs: Vec<Document> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stylesheet = &stylesheet;
                scope.spawn(move || {
                    let (source, _, child) = source();
                    let mut ctx = TransformContext::new(stylesheet, &source);
                    let root = ctx.output().root();
                    ctx.copy_tree(source.root(), root).unwrap();
                    assert_eq!(ctx.key("by-id", None, "c1"), vec![child]);
                    ctx.finish()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(outputs.len(), 4);
    for output in &outputs {
        let top = output.document_element().unwrap();
        assert_eq!(output.namespace_uri(top), Some("urn:b"));
    }
}
