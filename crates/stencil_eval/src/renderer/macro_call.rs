//! Macro and function invocation.
//!
//! A call pushes a macro-frame scope whose enclosing scope is the namespace
//! the macro was defined in, so the body sees its own namespace and never
//! the caller's locals. The frame records the caller's scope and namespace;
//! nested content renders under those, with the caller's own locals in
//! view.

use std::borrow::Cow;
use std::sync::Arc;

use stencil_ir::{Expr, Instruction, MacroCall, MacroDef, Name};
use stencil_value::{
    function_without_return, missing_parameter, not_invokable, outside_macro, type_mismatch,
    unexpected_arguments, HashMap, MacroValue, RenderResult, Value,
};

use super::{Flow, Renderer};
use crate::diagnostics::CallFrame;
use crate::environment::{MacroFrame, ScopeId, ScopeKind};

/// Evaluated arguments of a macro call.
#[derive(Clone, Debug, Default)]
pub struct MacroArgs {
    pub positional: Vec<Value>,
    pub named: Vec<(Name, Value)>,
}

impl MacroArgs {
    pub fn positional(values: Vec<Value>) -> Self {
        MacroArgs {
            positional: values,
            named: Vec::new(),
        }
    }

    #[must_use]
    pub fn named(mut self, name: &str, value: Value) -> Self {
        self.named.push((name.into(), value));
        self
    }
}

/// Content block passed to a macro call.
#[derive(Clone, Debug)]
pub struct NestedContent {
    pub body: Arc<Instruction>,
    /// Names bound to the values `nested` passes back.
    pub loop_vars: Vec<Name>,
}

impl Renderer {
    /// Register `def` in the defining namespace, closed over it.
    ///
    /// Inside an include that is the nearest non-included namespace, which
    /// outlives the include.
    pub(crate) fn define_macro(&mut self, def: &Arc<MacroDef>) {
        let target = self.defining_namespace();
        let value = Value::Macro(MacroValue {
            def: Arc::clone(def),
            namespace: self.namespace_id(target),
        });
        self.declare(target, Name::clone(&def.name), value);
    }

    /// Define every top-level macro of `root` before it runs.
    pub(crate) fn hoist_definitions(&mut self, root: &Instruction) {
        for def in root.top_level_definitions() {
            self.define_macro(def);
        }
    }

    pub(crate) fn exec_macro_call(&mut self, call: &MacroCall) -> RenderResult<Flow> {
        let callee = self.eval(&call.callee)?;
        let Value::Macro(target) = callee else {
            return Err(not_invokable(callee.type_name()));
        };
        if target.def.is_function() {
            return Err(type_mismatch("macro", "function"));
        }
        let positional = call
            .positional
            .iter()
            .map(|arg| self.eval(arg))
            .collect::<RenderResult<Vec<_>>>()?;
        let mut named = Vec::with_capacity(call.named.len());
        for (name, arg) in &call.named {
            named.push((Name::clone(name), self.eval(arg)?));
        }
        let nested = call.nested.as_ref().map(|body| NestedContent {
            body: Arc::clone(body),
            loop_vars: call.loop_vars.clone(),
        });
        self.invoke_macro(&target, MacroArgs { positional, named }, nested)?;
        Ok(Flow::Normal)
    }

    /// Invoke a macro or function with already-evaluated arguments.
    ///
    /// Returns the value of a `return` with an expression, if any ran.
    #[tracing::instrument(level = "trace", skip_all, fields(name = %target.def.name))]
    pub fn invoke_macro(
        &mut self,
        target: &MacroValue,
        args: MacroArgs,
        nested: Option<NestedContent>,
    ) -> RenderResult<Option<Value>> {
        let def = &target.def;
        let definition_namespace = self.namespace_scope(target.namespace)?;
        self.call_stack.push(CallFrame {
            name: Cow::Owned(format!("@{}", def.name)),
            template: self.current_template_name(),
            location: None,
        })?;

        let (nested, loop_vars) = match nested {
            Some(content) => (Some(content.body), content.loop_vars),
            None => (None, Vec::new()),
        };
        let frame = self.scopes.push(
            Some(definition_namespace),
            ScopeKind::MacroFrame(MacroFrame {
                def: Arc::clone(def),
                invoking_scope: self.current_scope,
                invoking_namespace: self.current_namespace,
                nested,
                loop_vars,
            }),
        );
        let previous = self.active_frames.insert(def.id(), frame);

        let mut scoped = self
            .switch_context()
            .releasing(frame)
            .restoring_active(def.id(), previous)
            .popping_call_frame();
        scoped.current_scope = frame;
        scoped.current_namespace = definition_namespace;
        scoped.current_macro_frame = Some(frame);
        scoped.sync_context();

        scoped.bind_arguments(frame, def, args)?;
        match scoped.execute(&def.body)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal | Flow::Break => Ok(None),
        }
    }

    /// Bind parameters by position then by name; leftovers go to the
    /// catch-all, missing ones take their defaults (evaluated in the frame).
    fn bind_arguments(&mut self, frame: ScopeId, def: &MacroDef, args: MacroArgs) -> RenderResult<()> {
        let mut positional = args.positional.into_iter();
        for param in &def.params {
            let Some(value) = positional.next() else {
                break;
            };
            self.scopes.set(frame, Name::clone(&param.name), value);
        }
        let extra_positional: Vec<Value> = positional.collect();

        let mut extra_named = Vec::new();
        let mut duplicates = Vec::new();
        for (name, value) in args.named {
            if def.param(&name).is_none() {
                extra_named.push((name, value));
            } else if self.scopes.declares_locally(frame, &name) {
                duplicates.push(name.to_string());
            } else {
                self.scopes.set(frame, name, value);
            }
        }
        // An argument already bound by position is never rebound by name.
        if !duplicates.is_empty() {
            return Err(unexpected_arguments(&def.name, duplicates));
        }

        match &def.catch_all {
            Some(catch_all) => {
                let rest = if extra_named.is_empty() {
                    Value::sequence(extra_positional)
                } else {
                    let map: HashMap = extra_named.into_iter().collect();
                    Value::Hash(Arc::new(map))
                };
                self.scopes.set(frame, Name::clone(catch_all), rest);
            }
            None if !extra_positional.is_empty() || !extra_named.is_empty() => {
                let mut unexpected: Vec<String> = extra_named
                    .iter()
                    .map(|(name, _)| name.to_string())
                    .collect();
                let first = def.params.len();
                unexpected.extend((0..extra_positional.len()).map(|i| format!("#{}", first + i + 1)));
                return Err(unexpected_arguments(&def.name, unexpected));
            }
            None => {}
        }

        for param in &def.params {
            if self.scopes.declares_locally(frame, &param.name) {
                continue;
            }
            let Some(default) = &param.default else {
                return Err(missing_parameter(&def.name, &param.name));
            };
            let value = self.eval(default)?;
            self.scopes.set(frame, Name::clone(&param.name), value);
        }
        Ok(())
    }

    /// Call a function macro for its return value; its output is discarded.
    pub(crate) fn call_function(
        &mut self,
        function: &MacroValue,
        args: Vec<Value>,
    ) -> RenderResult<Value> {
        if !function.def.is_function() {
            return Err(type_mismatch("function", "macro"));
        }
        self.out.push_silent();
        let result = self.invoke_macro(function, MacroArgs::positional(args), None);
        self.out.pop();
        result?.ok_or_else(|| function_without_return(&function.def.name))
    }

    /// Render the content block of the innermost macro call.
    ///
    /// The arguments are evaluated in the macro's scope and bound to the
    /// call's loop variables in a fresh scope over the caller's scope.
    pub(crate) fn exec_nested(&mut self, args: &[Expr]) -> RenderResult<Flow> {
        let frame_id = self
            .scopes
            .nearest_macro_frame(self.current_scope)
            .ok_or_else(|| outside_macro("#nested"))?;
        let Some(frame) = self.scopes.macro_frame(frame_id) else {
            return Err(outside_macro("#nested"));
        };
        let Some(body) = frame.nested.clone() else {
            return Ok(Flow::Normal);
        };
        tracing::trace!(macro_name = %frame.def.name, "rendering nested content");
        let invoking_scope = frame.invoking_scope;
        let invoking_namespace = frame.invoking_namespace;
        let loop_vars = frame.loop_vars.clone();

        let values = args
            .iter()
            .map(|arg| self.eval(arg))
            .collect::<RenderResult<Vec<_>>>()?;

        let scope = self.scopes.push(Some(invoking_scope), ScopeKind::Block);
        for (name, value) in loop_vars.into_iter().zip(values) {
            self.scopes.set(scope, name, value);
        }
        let mut scoped = self.switch_context().releasing(scope);
        scoped.current_scope = scope;
        scoped.current_namespace = invoking_namespace;
        scoped.sync_context();
        scoped.execute(&body)
    }
}
