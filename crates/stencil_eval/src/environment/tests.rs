use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use stencil_ir::{Instruction, MacroDef, MacroKind};

fn namespace_kind(raw: u32) -> ScopeKind {
    ScopeKind::Namespace(NamespaceState {
        id: NamespaceId::new(raw),
        template: Arc::new(Template::new("main.ftl", Instruction::block(vec![]))),
        declared: FxHashSet::default(),
        included: false,
    })
}

fn frame_kind(namespace: ScopeId) -> ScopeKind {
    ScopeKind::MacroFrame(MacroFrame {
        def: Arc::new(MacroDef::new(
            "m",
            MacroKind::Macro,
            vec![],
            None,
            Instruction::block(vec![]),
        )),
        invoking_scope: namespace,
        invoking_namespace: namespace,
        nested: None,
        loop_vars: Vec::new(),
    })
}

#[test]
fn resolve_walks_to_the_innermost_binding() {
    let mut arena = ScopeArena::new();
    let ns = arena.push(None, namespace_kind(0));
    let block = arena.push(Some(ns), ScopeKind::Block);
    let inner = arena.push(Some(block), ScopeKind::Block);

    arena.set(ns, "x".into(), Value::int(1));
    arena.set(block, "x".into(), Value::int(2));
    arena.set(ns, "y".into(), Value::int(3));

    assert_eq!(arena.resolve(inner, "x"), Some(&Value::int(2)));
    assert_eq!(arena.resolve(inner, "y"), Some(&Value::int(3)));
    assert_eq!(arena.resolve(ns, "x"), Some(&Value::int(1)));
    assert_eq!(arena.resolve(inner, "missing"), None);
}

#[test]
fn sibling_chains_do_not_see_each_other() {
    let mut arena = ScopeArena::new();
    let ns = arena.push(None, namespace_kind(0));
    let left = arena.push(Some(ns), ScopeKind::Block);
    let right = arena.push(Some(ns), ScopeKind::Block);
    arena.set(left, "only_left".into(), Value::Bool(true));

    assert_eq!(arena.resolve(right, "only_left"), None);
    assert!(arena.declares_locally(left, "only_left"));
    assert!(!arena.declares_locally(ns, "only_left"));
}

#[test]
fn released_slots_are_reused() {
    let mut arena = ScopeArena::new();
    let ns = arena.push(None, namespace_kind(0));
    let block = arena.push(Some(ns), ScopeKind::Block);
    arena.set(block, "tmp".into(), Value::int(1));
    assert_eq!(arena.live(), 2);

    arena.release(block);
    assert_eq!(arena.live(), 1);

    let reused = arena.push(Some(ns), ScopeKind::Block);
    assert_eq!(reused, block);
    assert_eq!(arena.live(), 2);
    // A reused slot starts empty.
    assert_eq!(arena.local_get(reused, "tmp"), None);
}

#[test]
fn publish_iteration_sets_loop_variables() {
    let mut arena = ScopeArena::new();
    let ns = arena.push(None, namespace_kind(0));
    let scope = arena.push(Some(ns), ScopeKind::Loop(LoopState { var: "item".into() }));

    arena.publish_iteration(scope, Value::string("a"), 0, true);
    assert_eq!(arena.local_get(scope, "item"), Some(&Value::string("a")));
    assert_eq!(arena.local_get(scope, "item_index"), Some(&Value::int(0)));
    assert_eq!(arena.local_get(scope, "item_has_next"), Some(&Value::Bool(true)));

    arena.publish_iteration(scope, Value::string("b"), 1, false);
    assert_eq!(arena.local_get(scope, "item"), Some(&Value::string("b")));
    assert_eq!(arena.local_get(scope, "item_index"), Some(&Value::int(1)));
    assert_eq!(arena.local_get(scope, "item_has_next"), Some(&Value::Bool(false)));
}

#[test]
fn publish_iteration_ignores_non_loop_scopes() {
    let mut arena = ScopeArena::new();
    let ns = arena.push(None, namespace_kind(0));
    arena.publish_iteration(ns, Value::int(1), 0, false);
    assert_eq!(arena.local_get(ns, "_index"), None);
}

#[test]
fn nearest_macro_frame_stops_at_the_first_frame() {
    let mut arena = ScopeArena::new();
    let ns = arena.push(None, namespace_kind(0));
    let frame = arena.push(Some(ns), frame_kind(ns));
    let block = arena.push(Some(frame), ScopeKind::Block);

    assert_eq!(arena.nearest_macro_frame(block), Some(frame));
    assert_eq!(arena.nearest_macro_frame(ns), None);
    assert!(arena.macro_frame(frame).is_some());
    assert!(arena.macro_frame(block).is_none());
}

#[test]
fn namespace_accessors() {
    let mut arena = ScopeArena::new();
    let ns = arena.push(None, namespace_kind(3));
    let block = arena.push(Some(ns), ScopeKind::Block);

    assert_eq!(arena.namespace(ns).map(|n| n.id), Some(NamespaceId::new(3)));
    assert!(arena.namespace(block).is_none());
    if let Some(state) = arena.namespace_mut(ns) {
        state.declared.insert("x".into());
    }
    assert!(arena.namespace(ns).is_some_and(|n| n.declared.contains("x")));
    assert_eq!(
        arena.find(block, |k| matches!(k, ScopeKind::Namespace(_))),
        Some(ns)
    );
}

proptest! {
    /// For any chain and any assignment of a key to chain levels, lookup
    /// from the innermost scope yields the innermost binding.
    #[test]
    fn lookup_returns_innermost_binding(bound in proptest::collection::vec(any::<bool>(), 1..12)) {
        let mut arena = ScopeArena::new();
        let mut chain = vec![arena.push(None, namespace_kind(0))];
        for _ in 1..bound.len() {
            let enclosing = chain.last().copied();
            chain.push(arena.push(enclosing, ScopeKind::Block));
        }
        for (level, (&scope, &has)) in chain.iter().zip(&bound).enumerate() {
            if has {
                let level = i32::try_from(level).unwrap_or(i32::MAX);
                arena.set(scope, "k".into(), Value::int(level));
            }
        }
        let expected = bound
            .iter()
            .rposition(|&has| has)
            .map(|level| Value::int(i32::try_from(level).unwrap_or(i32::MAX)));
        let innermost = chain.last().copied().unwrap_or(chain[0]);
        prop_assert_eq!(arena.resolve(innermost, "k").cloned(), expected);
    }
}

#[test]
fn unset_removes_only_the_local_binding() {
    let mut arena = ScopeArena::new();
    let ns = arena.push(None, namespace_kind(0));
    let block = arena.push(Some(ns), ScopeKind::Block);
    arena.set(ns, "x".into(), Value::int(1));
    arena.set(block, "x".into(), Value::int(2));
    arena.set(block, "y".into(), Value::int(3));

    assert_eq!(arena.unset(block, "x"), Some(Value::int(2)));
    assert_eq!(arena.unset(block, "x"), None);
    assert_eq!(arena.resolve(block, "x"), Some(&Value::int(1)));

    let mut names = arena.local_names(block);
    names.sort();
    assert_eq!(names, vec![Name::from("y")]);
}
