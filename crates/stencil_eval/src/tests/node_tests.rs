use std::sync::Arc;

use pretty_assertions::assert_eq;
use stencil_ir::{Expr, Instruction, SpecialVariable};
use stencil_value::{RenderErrorKind, TemplateNode, Value};

use super::{import, lib, macro_def, main, text, Fixture};
use crate::Template;

#[derive(Debug)]
struct TestNode {
    name: &'static str,
    namespace: Option<&'static str>,
    kind: &'static str,
    text: Option<&'static str>,
    children: Vec<Value>,
}

impl TemplateNode for TestNode {
    fn node_name(&self) -> &str {
        self.name
    }

    fn node_namespace(&self) -> Option<&str> {
        self.namespace
    }

    fn node_type(&self) -> &str {
        self.kind
    }

    fn children(&self) -> Vec<Value> {
        self.children.clone()
    }

    fn text(&self) -> Option<Arc<str>> {
        self.text.map(Arc::from)
    }
}

fn element(name: &'static str, namespace: Option<&'static str>, children: Vec<Value>) -> Value {
    Value::node(TestNode {
        name,
        namespace,
        kind: "element",
        text: None,
        children,
    })
}

fn text_node(content: &'static str) -> Value {
    Value::node(TestNode {
        name: "@text",
        namespace: None,
        kind: "text",
        text: Some(content),
        children: Vec::new(),
    })
}

fn document(children: Vec<Value>) -> Value {
    Value::node(TestNode {
        name: "@document",
        namespace: None,
        kind: "document",
        text: None,
        children,
    })
}

fn visit(node: &str, namespaces: &[&str]) -> Instruction {
    Instruction::Visit {
        node: Expr::var(node),
        namespaces: namespaces.iter().map(|n| Expr::var(n)).collect(),
    }
}

fn recurse() -> Instruction {
    Instruction::Recurse {
        node: None,
        namespaces: Vec::new(),
    }
}

#[test]
fn visit_dispatches_to_handlers_and_recurses() {
    let doc = document(vec![element(
        "title",
        None,
        vec![text_node("Hello"), element("em", None, vec![text_node("!")])],
    )]);
    let fixture = Fixture::new().data(vec![("doc", doc)]);
    let template = main(vec![
        macro_def("title", &[], vec![text("<h1>"), recurse(), text("</h1>")]),
        macro_def("em", &[], vec![text("<i>"), recurse(), text("</i>")]),
        visit("doc", &[]),
    ]);
    assert_eq!(fixture.render_ok(template), "<h1>Hello<i>!</i></h1>");
}

#[test]
fn handler_names_follow_namespace_prefixes() {
    let doc = document(vec![
        element("item", Some("urn:x"), Vec::new()),
        element("item", Some("urn:d"), Vec::new()),
    ]);
    let fixture = Fixture::new().data(vec![("doc", doc)]);
    let template = Template::new(
        "main.ftl",
        Instruction::block(vec![
            macro_def("x:item", &[], vec![text("[x]")]),
            macro_def("D:item", &[], vec![text("[default]")]),
            macro_def("item", &[], vec![text("[plain]")]),
            visit("doc", &[]),
        ]),
    )
    .with_prefix("x", "urn:x")
    .with_default_namespace("urn:d");
    assert_eq!(fixture.render_ok(template), "[x][default]");
}

#[test]
fn fallback_continues_with_the_next_namespace() {
    let doc = element("item", None, Vec::new());
    let fixture = Fixture::new()
        .data(vec![("doc", doc)])
        .with(lib(
            "a.ftl",
            vec![macro_def(
                "item",
                &[],
                vec![text("a["), Instruction::Fallback, text("]")],
            )],
        ))
        .with(lib("b.ftl", vec![macro_def("item", &[], vec![text("b")])]));
    let template = main(vec![
        import("a.ftl", "a"),
        import("b.ftl", "b"),
        visit("doc", &["a", "b"]),
    ]);
    assert_eq!(fixture.render_ok(template), "a[b]");
}

#[test]
fn element_without_handler_is_an_error() {
    let fixture = Fixture::new().data(vec![("doc", element("orphan", Some("urn:o"), Vec::new()))]);
    let err = fixture.render_err(main(vec![visit("doc", &[])]));
    assert!(matches!(
        err.kind,
        RenderErrorKind::NoNodeHandler { ref node } if node == "{urn:o}orphan"
    ));
}

#[test]
fn current_node_is_only_set_inside_handlers() {
    let doc = element("para", None, Vec::new());
    let fixture = Fixture::new().data(vec![("doc", doc)]);
    let has_node = || {
        Instruction::if_else(
            Expr::Special(SpecialVariable::Node).exists(),
            text("node"),
            Some(text("none")),
        )
    };
    let template = main(vec![
        macro_def("para", &[], vec![text("["), has_node(), text("]")]),
        has_node(),
        visit("doc", &[]),
        has_node(),
    ]);
    assert_eq!(fixture.render_ok(template), "none[node]none");
}
