use super::*;
use pretty_assertions::assert_eq;
use stencil_ir::{Instruction, MacroKind};

#[derive(Debug)]
struct Point {
    x: i32,
}

impl TemplateModel for Point {
    fn type_name(&self) -> &str {
        "point"
    }

    fn get_key(&self, key: &str) -> Option<Value> {
        (key == "x").then(|| Value::int(self.x))
    }
}

#[test]
fn capability_views() {
    assert_eq!(Value::int(3).as_number(), Some(Number::Int(3)));
    assert_eq!(Value::string("hi").as_text().as_deref(), Some("hi"));
    assert_eq!(Value::Bool(true).as_bool(), Some(true));
    assert_eq!(Value::string("hi").as_number(), None);

    let seq = Value::sequence(vec![Value::int(1), Value::int(2)]);
    assert_eq!(seq.seq_len(), Some(2));
    assert_eq!(seq.get_index(1), Some(Value::int(2)));
    assert_eq!(seq.get_index(5), None);

    let hash = Value::hash([("a", Value::int(1))]);
    assert_eq!(hash.get_key("a"), Some(Value::int(1)));
    assert_eq!(hash.get_key("b"), None);
}

#[test]
fn host_models_answer_through_capabilities() {
    let point = Value::host(Point { x: 7 });
    assert_eq!(point.type_name(), "point");
    assert_eq!(point.get_key("x"), Some(Value::int(7)));
    assert_eq!(point.as_number(), None);
    assert!(point.is_hash_like());
}

#[test]
fn equality_is_structural_for_data_and_identity_for_objects() {
    assert_eq!(
        Value::sequence(vec![Value::string("a")]),
        Value::sequence(vec![Value::string("a")])
    );
    assert_ne!(Value::int(4), Value::from(4_i64));

    let point = Value::host(Point { x: 1 });
    assert_eq!(point, point.clone());
    assert_ne!(point, Value::host(Point { x: 1 }));

    let def = Arc::new(MacroDef::new(
        "m",
        MacroKind::Function,
        vec![],
        None,
        Instruction::text(""),
    ));
    let m = Value::Macro(MacroValue {
        def: Arc::clone(&def),
        namespace: NamespaceId::new(0),
    });
    assert_eq!(m.type_name(), "function");
    assert_eq!(
        m,
        Value::Macro(MacroValue {
            def,
            namespace: NamespaceId::new(0)
        })
    );
    assert_eq!(Value::Namespace(NamespaceId::new(2)).type_name(), "namespace");
}
