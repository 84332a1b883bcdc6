//! Assignment targets.
//!
//! An unqualified assignment walks the scope chain from the current scope:
//! the first non-namespace scope that already holds the name is written,
//! otherwise the nearest namespace receives it. An included namespace
//! forwards names it doesn't declare to the scope chain that included it.

use stencil_ir::{AssignTarget, Assignment, Name};
use stencil_value::{outside_macro, type_mismatch, undeclared_variable, RenderResult, Value};

use super::Renderer;
use crate::environment::{ScopeId, ScopeKind};

impl Renderer {
    pub(crate) fn exec_assign(&mut self, assignment: &Assignment) -> RenderResult<()> {
        let value = self.eval(&assignment.value)?;
        let name = Name::clone(&assignment.name);
        match &assignment.target {
            AssignTarget::Unqualified => self.assign_unqualified(self.current_scope, name, value),
            AssignTarget::Block => {
                let scope = self.current_scope;
                if let Some(ns) = self.scopes.namespace_mut(scope) {
                    ns.declared.insert(Name::clone(&name));
                }
                self.scopes.set(scope, name, value);
                Ok(())
            }
            AssignTarget::Local => self.set_local(&name, value),
            AssignTarget::Global => {
                self.globals.insert(name, value);
                Ok(())
            }
            AssignTarget::Namespace(target) => {
                let target = self.eval(target)?;
                let Value::Namespace(id) = target else {
                    return Err(type_mismatch("namespace", target.type_name()));
                };
                let scope = self.namespace_scope(id)?;
                self.assign_in_namespace(scope, name, value)
            }
        }
    }

    /// Write to the innermost macro frame.
    pub fn set_local(&mut self, name: &str, value: Value) -> RenderResult<()> {
        let frame = self
            .scopes
            .nearest_macro_frame(self.current_scope)
            .ok_or_else(|| outside_macro("#local"))?;
        self.scopes.set(frame, name.into(), value);
        Ok(())
    }

    /// Remove a binding from the innermost macro frame, returning it.
    pub fn unset_local(&mut self, name: &str) -> RenderResult<Option<Value>> {
        let frame = self
            .scopes
            .nearest_macro_frame(self.current_scope)
            .ok_or_else(|| outside_macro("#local"))?;
        Ok(self.scopes.unset(frame, name))
    }

    /// Names bound directly in the current scope.
    pub fn local_names(&self) -> Vec<Name> {
        self.scopes.local_names(self.current_scope)
    }

    pub(crate) fn assign_unqualified(
        &mut self,
        from: ScopeId,
        name: Name,
        value: Value,
    ) -> RenderResult<()> {
        let mut current = Some(from);
        while let Some(scope) = current {
            if matches!(self.scopes.kind(scope), Some(ScopeKind::Namespace(_))) {
                return self.assign_in_namespace(scope, name, value);
            }
            if self.scopes.declares_locally(scope, &name) {
                self.scopes.set(scope, name, value);
                return Ok(());
            }
            current = self.scopes.enclosing(scope);
        }
        self.assign_in_namespace(self.current_namespace, name, value)
    }

    /// Namespace write honoring strict mode and include forwarding.
    fn assign_in_namespace(&mut self, scope: ScopeId, name: Name, value: Value) -> RenderResult<()> {
        let Some(ns) = self.scopes.namespace(scope) else {
            self.scopes.set(scope, name, value);
            return Ok(());
        };
        let declared = ns.declared.contains(&name) || self.scopes.declares_locally(scope, &name);
        if ns.included && !declared {
            if let Some(outer) = self.scopes.enclosing(scope) {
                return self.assign_unqualified(outer, name, value);
            }
        }
        if declared || !self.strict_variables() {
            self.scopes.set(scope, name, value);
            return Ok(());
        }
        if let Some(global) = self.globals.get_mut(&name) {
            *global = value;
            return Ok(());
        }
        Err(undeclared_variable(&name))
    }

    /// Namespace that receives definitions made while `current_namespace`
    /// runs: the nearest namespace that was not included.
    pub(crate) fn defining_namespace(&self) -> ScopeId {
        let mut scope = self.current_namespace;
        while let Some(ns) = self.scopes.namespace(scope) {
            if !ns.included {
                break;
            }
            let outer = self
                .scopes
                .enclosing(scope)
                .and_then(|e| self.scopes.find(e, |k| matches!(k, ScopeKind::Namespace(_))));
            match outer {
                Some(outer) => scope = outer,
                None => break,
            }
        }
        scope
    }

    /// Bind `name` in `scope` as a declaration (bypasses strict mode).
    pub(crate) fn declare(&mut self, scope: ScopeId, name: Name, value: Value) {
        if let Some(ns) = self.scopes.namespace_mut(scope) {
            ns.declared.insert(Name::clone(&name));
        }
        self.scopes.set(scope, name, value);
    }
}
