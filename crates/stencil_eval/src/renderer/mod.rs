//! The rendering orchestrator.
//!
//! A [`Renderer`] runs exactly one top-level render. It owns the scope
//! arena, the diagnostic call stack, the macro-identity -> active-frame map,
//! the output sink stack and the per-render format cache.
//!
//! # Execution
//!
//! Every instruction goes through [`Renderer::execute`], which pushes a
//! diagnostic frame, pushes a block scope when the instruction asks for
//! one, dispatches, routes any error through the configured handler, and
//! unwinds both on every exit path. Instructions report `break`/`return`
//! through [`Flow`] rather than as errors.
//!
//! Submodules:
//! - `expr` - expression evaluation and value formatting
//! - `assign` - assignment targets and the unqualified-assignment walk
//! - `control` - `if`, `list`, `switch`
//! - `macro_call` - macro/function invocation and nested content
//! - `attempt` - attempt/recover and error-handler routing
//! - `library` - `include` and `import`
//! - `node_dispatch` - `visit`, `recurse`, `fallback`

mod assign;
mod attempt;
mod builder;
mod control;
mod expr;
mod library;
mod macro_call;
mod node_dispatch;
mod scope_guard;

pub use builder::RendererBuilder;
pub use macro_call::{MacroArgs, NestedContent};

use std::borrow::Cow;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use stencil_ir::{Instruction, MacroId, Name};
use stencil_numeric::ArithmeticPolicy;
use stencil_value::{stop, ErrorId, NamespaceId, RenderError, RenderResult, Value};

use crate::current::{self, ContextGuard, RenderContext};
use crate::diagnostics::{CallFrame, CallStack};
use crate::environment::{NamespaceState, ScopeArena, ScopeId, ScopeKind};
use crate::format::FormatCache;
use crate::output::OutputStack;
use crate::{Configuration, ErrorHandlerPolicy, Settings, Template};

use node_dispatch::VisitState;

/// How an instruction finished.
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    Normal,
    /// Unwind to the nearest `list` or `switch`.
    Break,
    /// Unwind to the nearest macro or function invocation.
    Return(Option<Value>),
}

/// Orchestrator for a single render.
pub struct Renderer {
    config: Arc<Configuration>,
    /// Render-level setting overrides (highest priority).
    settings: Settings,
    main_template: Arc<Template>,
    data_model: Option<Value>,
    globals: FxHashMap<Name, Value>,

    scopes: ScopeArena,
    current_scope: ScopeId,
    current_namespace: ScopeId,
    /// Live namespace scopes. Ids are never reused, so a stale
    /// `NamespaceId` fails to resolve instead of naming another namespace.
    namespaces: FxHashMap<NamespaceId, ScopeId>,
    next_namespace: u32,

    /// Frame currently running for each macro, if any.
    active_frames: FxHashMap<MacroId, ScopeId>,
    current_macro_frame: Option<ScopeId>,

    call_stack: CallStack,
    recovered_errors: Vec<Name>,
    last_handled_error: Option<ErrorId>,
    attempt_depth: usize,

    out: OutputStack,
    imported: FxHashMap<Name, NamespaceId>,
    formats: FormatCache,
    visit: Option<VisitState>,
}

impl Renderer {
    /// Render `template` against `data_model` and return the output.
    pub fn render(
        config: &Arc<Configuration>,
        template: &Arc<Template>,
        data_model: Value,
    ) -> RenderResult<String> {
        let mut renderer = RendererBuilder::new(Arc::clone(config), Arc::clone(template))
            .data_model(data_model)
            .build();
        renderer.process()?;
        Ok(renderer.take_output())
    }

    /// Run the main template from the top.
    #[tracing::instrument(level = "debug", skip_all, fields(template = %self.main_template.name()))]
    pub fn process(&mut self) -> RenderResult<()> {
        self.formats.clear();
        let _context = ContextGuard::enter(self.context_snapshot());
        let template = Arc::clone(&self.main_template);
        self.hoist_definitions(template.root());
        let result = self.execute(template.root()).map(|_| ());
        self.formats.clear();
        tracing::debug!(
            live_scopes = self.scopes.live(),
            namespaces = self.namespaces.len(),
            "render finished"
        );
        result
    }

    /// Captured output of a [`OutputTarget::Buffer`](crate::OutputTarget) render.
    pub fn take_output(&mut self) -> String {
        self.out.take_output()
    }

    /// Execute one instruction in the current scope.
    pub fn execute(&mut self, instruction: &Instruction) -> RenderResult<Flow> {
        stencil_stack::ensure_sufficient_stack(|| self.execute_frame(instruction))
    }

    fn execute_frame(&mut self, instruction: &Instruction) -> RenderResult<Flow> {
        let (instruction, location) = match instruction {
            Instruction::Located { location, body } => (&**body, Some(location)),
            other => (other, None),
        };
        let frame = CallFrame {
            name: Cow::Borrowed(instruction.label()),
            template: self.current_template_name(),
            location: location.cloned(),
        };
        if let Err(err) = self.call_stack.push(frame) {
            return self.handle_error(err).map(|()| Flow::Normal);
        }

        let result = if instruction.introduces_new_scope() {
            self.scoped(ScopeKind::Block).dispatch(instruction)
        } else {
            self.dispatch(instruction)
        };
        let result = match result {
            Err(err) => {
                let err = match location {
                    Some(location) => err.with_location(location),
                    None => err,
                };
                self.handle_error(err).map(|()| Flow::Normal)
            }
            ok => ok,
        };

        self.call_stack.pop();
        result
    }

    /// Execute `children` in order, stopping at the first non-normal flow.
    pub(crate) fn execute_all(&mut self, children: &[Instruction]) -> RenderResult<Flow> {
        for child in children {
            match self.execute(child)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn dispatch(&mut self, instruction: &Instruction) -> RenderResult<Flow> {
        match instruction {
            Instruction::Text(text) => {
                self.out.write(text);
                Ok(Flow::Normal)
            }
            Instruction::Interpolation(expr) => {
                let value = self.eval(expr)?;
                let text = self.format_value(&value)?;
                self.out.write(&text);
                Ok(Flow::Normal)
            }
            Instruction::Block(children) => self.execute_all(children),
            Instruction::If {
                branches,
                otherwise,
            } => self.exec_if(branches, otherwise.as_deref()),
            Instruction::List {
                source,
                var,
                body,
                otherwise,
            } => self.exec_list(source, var, body, otherwise.as_deref()),
            Instruction::Switch { value, cases } => self.exec_switch(value, cases),
            Instruction::Break => Ok(Flow::Break),
            Instruction::Return(value) => {
                let value = value.as_ref().map(|e| self.eval(e)).transpose()?;
                Ok(Flow::Return(value))
            }
            Instruction::Assign(assignment) => {
                self.exec_assign(assignment)?;
                Ok(Flow::Normal)
            }
            Instruction::MacroDefinition(def) => {
                self.define_macro(def);
                Ok(Flow::Normal)
            }
            Instruction::MacroCall(call) => self.exec_macro_call(call),
            Instruction::Nested(args) => self.exec_nested(args),
            Instruction::Attempt { attempt, recover } => self.exec_attempt(attempt, recover),
            Instruction::Stop(message) => {
                let message = match message {
                    Some(expr) => self.eval_text(expr)?.to_string(),
                    None => String::new(),
                };
                Err(stop(&message))
            }
            Instruction::Include {
                template,
                fresh_namespace,
            } => {
                let name = self.eval_text(template)?;
                self.include_named(&name, *fresh_namespace)?;
                Ok(Flow::Normal)
            }
            Instruction::Import {
                template,
                alias,
                global,
            } => {
                let name = self.eval_text(template)?;
                self.exec_import(&name, alias, *global)?;
                Ok(Flow::Normal)
            }
            Instruction::Visit { node, namespaces } => {
                self.exec_visit(node, namespaces)?;
                Ok(Flow::Normal)
            }
            Instruction::Recurse { node, namespaces } => {
                self.exec_recurse(node.as_ref(), namespaces)?;
                Ok(Flow::Normal)
            }
            Instruction::Fallback => {
                self.exec_fallback()?;
                Ok(Flow::Normal)
            }
            Instruction::Setting { name, value } => {
                let value = self.eval(value)?;
                let text = self.setting_text(&value)?;
                self.settings.apply(name, &text)?;
                self.sync_context();
                Ok(Flow::Normal)
            }
            Instruction::Located { location, body } => self
                .execute(body)
                .map_err(|err| err.with_location(location)),
        }
    }

    // Variables

    /// Resolve `name` from the current scope through the root.
    pub fn resolve(&self, name: &str) -> Option<Value> {
        self.scopes
            .resolve(self.current_scope, name)
            .cloned()
            .or_else(|| self.root_get(name))
    }

    /// Root lookup: globals, then the data model, then shared variables.
    fn root_get(&self, name: &str) -> Option<Value> {
        self.globals
            .get(name)
            .cloned()
            .or_else(|| self.data_model.as_ref().and_then(|d| d.get_key(name)))
            .or_else(|| self.config.shared_variable(name).cloned())
    }

    pub fn set_global(&mut self, name: &str, value: Value) {
        self.globals.insert(name.into(), value);
    }

    /// Namespace whose template is currently running.
    pub fn current_namespace(&self) -> NamespaceId {
        self.namespace_id(self.current_namespace)
    }

    /// Variable stored directly in a namespace.
    pub fn namespace_get(&self, namespace: NamespaceId, name: &str) -> Option<Value> {
        let scope = self.namespaces.get(&namespace)?;
        self.scopes.local_get(*scope, name).cloned()
    }

    // Namespaces

    fn create_namespace(
        &mut self,
        template: Arc<Template>,
        enclosing: Option<ScopeId>,
        included: bool,
    ) -> (ScopeId, NamespaceId) {
        let id = NamespaceId::new(self.next_namespace);
        self.next_namespace = self.next_namespace.saturating_add(1);
        let state = NamespaceState {
            id,
            declared: template.declared().clone(),
            template,
            included,
        };
        let scope = self.scopes.push(enclosing, ScopeKind::Namespace(state));
        self.namespaces.insert(id, scope);
        (scope, id)
    }

    /// Drop a namespace that doesn't outlive the construct that created it.
    fn release_namespace(&mut self, id: NamespaceId, scope: ScopeId) {
        self.namespaces.remove(&id);
        self.scopes.release(scope);
    }

    fn namespace_id(&self, scope: ScopeId) -> NamespaceId {
        self.scopes
            .namespace(scope)
            .map_or(NamespaceId::new(0), |ns| ns.id)
    }

    fn namespace_scope(&self, id: NamespaceId) -> RenderResult<ScopeId> {
        self.namespaces
            .get(&id)
            .copied()
            .ok_or_else(|| RenderError::new(format!("namespace {id:?} is not part of this render")))
    }

    fn current_template(&self) -> &Arc<Template> {
        self.scopes
            .namespace(self.current_namespace)
            .map_or(&self.main_template, |ns| &ns.template)
    }

    fn current_template_name(&self) -> Name {
        Arc::clone(self.current_template().name())
    }

    // Settings

    fn setting<T>(&self, pick: impl Fn(&Settings) -> Option<T>) -> Option<T> {
        pick(&self.settings).or_else(|| pick(self.current_template().settings()))
    }

    pub fn locale(&self) -> Name {
        self.setting(|s| s.locale.clone())
            .unwrap_or_else(|| Arc::clone(&self.config.locale))
    }

    fn number_format(&self) -> Name {
        self.setting(|s| s.number_format.clone())
            .unwrap_or_else(|| Arc::clone(&self.config.number_format))
    }

    fn boolean_format(&self) -> Name {
        self.setting(|s| s.boolean_format.clone())
            .unwrap_or_else(|| Arc::clone(&self.config.boolean_format))
    }

    pub fn arithmetic(&self) -> ArithmeticPolicy {
        self.setting(|s| s.arithmetic.clone())
            .unwrap_or_else(|| self.config.arithmetic.clone())
    }

    fn error_handler(&self) -> ErrorHandlerPolicy {
        self.setting(|s| s.error_handler.clone())
            .unwrap_or_else(|| self.config.error_handler.clone())
    }

    fn strict_variables(&self) -> bool {
        self.setting(|s| s.strict_variables)
            .unwrap_or(self.config.strict_variables)
    }

    fn log_template_exceptions(&self) -> bool {
        self.setting(|s| s.log_template_exceptions)
            .unwrap_or(self.config.log_template_exceptions)
    }

    fn context_snapshot(&self) -> RenderContext {
        RenderContext {
            locale: self.locale(),
            arithmetic: self.arithmetic(),
            template_name: self.current_template_name(),
        }
    }

    /// Refresh the thread-bound context after a setting or namespace change.
    fn sync_context(&self) {
        let snapshot = self.context_snapshot();
        current::update(|ctx| *ctx = snapshot);
    }
}

#[cfg(test)]
impl Renderer {
    pub(crate) fn active_frame_count(&self) -> usize {
        self.active_frames.len()
    }

    pub(crate) fn live_scopes(&self) -> usize {
        self.scopes.live()
    }

    pub(crate) fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    pub(crate) fn call_depth(&self) -> usize {
        self.call_stack.depth()
    }

    pub(crate) fn output_depth(&self) -> usize {
        self.out.depth()
    }
}
