//! Scope arena for variable resolution.
//!
//! Scopes live in slots owned by the renderer and refer to their enclosing
//! scope by [`ScopeId`], so the chain never forms owning cycles. A scope with
//! no enclosing id chains to the renderer itself (globals, data model,
//! shared variables).
//!
//! Block, loop, macro-frame and include-namespace scopes are released when
//! their construct finishes. Imported namespaces and the main namespace stay
//! alive for the whole render because macros keep referring to the
//! namespace they were defined in.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use stencil_ir::{Instruction, MacroDef, Name};
use stencil_value::{NamespaceId, Value};

use crate::Template;

/// Index of a scope in the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Loop variable of a `list` loop.
#[derive(Clone, Debug)]
pub(crate) struct LoopState {
    pub var: Name,
}

/// Bookkeeping for one macro invocation.
#[derive(Clone, Debug)]
pub(crate) struct MacroFrame {
    pub def: Arc<MacroDef>,
    /// Caller's scope; nested content renders under it.
    pub invoking_scope: ScopeId,
    /// Caller's namespace; current again while nested content renders.
    pub invoking_namespace: ScopeId,
    pub nested: Option<Arc<Instruction>>,
    pub loop_vars: Vec<Name>,
}

/// Top-level scope of one loaded template.
#[derive(Clone, Debug)]
pub(crate) struct NamespaceState {
    pub id: NamespaceId,
    pub template: Arc<Template>,
    /// Names the template declares; strict mode rejects writes to others.
    pub declared: FxHashSet<Name>,
    /// Included (not imported) namespaces redirect writes to undeclared
    /// names to the including scope chain.
    pub included: bool,
}

#[derive(Clone, Debug)]
pub(crate) enum ScopeKind {
    Block,
    Loop(LoopState),
    MacroFrame(MacroFrame),
    Namespace(NamespaceState),
}

#[derive(Debug)]
struct Scope {
    enclosing: Option<ScopeId>,
    vars: FxHashMap<Name, Value>,
    kind: ScopeKind,
}

/// Arena of live scopes with slot reuse.
#[derive(Debug, Default)]
pub(crate) struct ScopeArena {
    slots: Vec<Option<Scope>>,
    free: Vec<u32>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a scope chained to `enclosing` (`None` chains to the root).
    pub fn push(&mut self, enclosing: Option<ScopeId>, kind: ScopeKind) -> ScopeId {
        let scope = Scope {
            enclosing,
            vars: FxHashMap::default(),
            kind,
        };
        if let Some(raw) = self.free.pop() {
            self.slots[raw as usize] = Some(scope);
            return ScopeId(raw);
        }
        let raw = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Some(scope));
        ScopeId(raw)
    }

    /// Free a scope's slot. Its id must not be used afterwards.
    pub fn release(&mut self, id: ScopeId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            if slot.take().is_some() {
                self.free.push(id.0);
            }
        }
    }

    /// Number of scopes currently allocated.
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    fn scope_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn kind(&self, id: ScopeId) -> Option<&ScopeKind> {
        self.scope(id).map(|s| &s.kind)
    }

    pub fn kind_mut(&mut self, id: ScopeId) -> Option<&mut ScopeKind> {
        self.scope_mut(id).map(|s| &mut s.kind)
    }

    pub fn enclosing(&self, id: ScopeId) -> Option<ScopeId> {
        self.scope(id).and_then(|s| s.enclosing)
    }

    pub fn set(&mut self, id: ScopeId, key: Name, value: Value) {
        debug_assert!(self.scope(id).is_some(), "write to released scope");
        if let Some(scope) = self.scope_mut(id) {
            scope.vars.insert(key, value);
        }
    }

    pub fn unset(&mut self, id: ScopeId, key: &str) -> Option<Value> {
        self.scope_mut(id).and_then(|s| s.vars.remove(key))
    }

    pub fn local_get(&self, id: ScopeId, key: &str) -> Option<&Value> {
        self.scope(id).and_then(|s| s.vars.get(key))
    }

    pub fn declares_locally(&self, id: ScopeId, key: &str) -> bool {
        self.scope(id).is_some_and(|s| s.vars.contains_key(key))
    }

    /// Names bound directly in `id`, unordered.
    pub fn local_names(&self, id: ScopeId) -> Vec<Name> {
        self.scope(id)
            .map(|s| s.vars.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Walk the chain from `id`; `None` means the root must be consulted.
    pub fn resolve(&self, id: ScopeId, key: &str) -> Option<&Value> {
        let mut current = Some(id);
        while let Some(scope) = current.and_then(|c| self.scope(c)) {
            if let Some(value) = scope.vars.get(key) {
                return Some(value);
            }
            current = scope.enclosing;
        }
        None
    }

    /// First scope on the chain from `id` (inclusive) matching `pred`.
    pub fn find(&self, id: ScopeId, pred: impl Fn(&ScopeKind) -> bool) -> Option<ScopeId> {
        let mut current = Some(id);
        while let Some(c) = current {
            let scope = self.scope(c)?;
            if pred(&scope.kind) {
                return Some(c);
            }
            current = scope.enclosing;
        }
        None
    }

    pub fn nearest_macro_frame(&self, id: ScopeId) -> Option<ScopeId> {
        self.find(id, |k| matches!(k, ScopeKind::MacroFrame(_)))
    }

    pub fn macro_frame(&self, id: ScopeId) -> Option<&MacroFrame> {
        match self.kind(id) {
            Some(ScopeKind::MacroFrame(frame)) => Some(frame),
            _ => None,
        }
    }

    pub fn namespace(&self, id: ScopeId) -> Option<&NamespaceState> {
        match self.kind(id) {
            Some(ScopeKind::Namespace(ns)) => Some(ns),
            _ => None,
        }
    }

    pub fn namespace_mut(&mut self, id: ScopeId) -> Option<&mut NamespaceState> {
        match self.kind_mut(id) {
            Some(ScopeKind::Namespace(ns)) => Some(ns),
            _ => None,
        }
    }

    /// Re-publish `<var>`, `<var>_index` and `<var>_has_next` for an iteration.
    pub fn publish_iteration(&mut self, id: ScopeId, item: Value, index: usize, has_next: bool) {
        let Some(scope) = self.scope_mut(id) else {
            return;
        };
        let ScopeKind::Loop(state) = &scope.kind else {
            return;
        };
        let var = Arc::clone(&state.var);
        let index_value = i32::try_from(index)
            .map(Value::int)
            .unwrap_or_else(|_| Value::from(i64::try_from(index).unwrap_or(i64::MAX)));
        scope.vars.insert(Name::from(format!("{var}_index")), index_value);
        scope.vars.insert(Name::from(format!("{var}_has_next")), Value::Bool(has_next));
        scope.vars.insert(var, item);
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
