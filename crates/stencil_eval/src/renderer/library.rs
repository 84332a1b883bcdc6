//! Including and importing other templates.
//!
//! Both create a namespace scope. An included namespace chains to the
//! including scope and forwards writes of names it doesn't declare; a fresh
//! or imported namespace chains only to the root. Include namespaces are
//! released when the include finishes; imported ones live for the rest of
//! the render.

use std::sync::Arc;

use stencil_ir::Name;
use stencil_value::{NamespaceId, RenderResult, Value};

use super::Renderer;
use crate::{to_absolute_name, Template};

impl Renderer {
    fn absolute_name(&self, name: &str) -> Name {
        to_absolute_name(self.current_template().name(), name).into()
    }

    pub(crate) fn include_named(&mut self, name: &str, fresh_namespace: bool) -> RenderResult<()> {
        let template = self.config.registry().get_template(&self.absolute_name(name))?;
        self.include(&template, fresh_namespace)
    }

    /// Execute `template` at the current position of the output.
    ///
    /// With `fresh_namespace` the template sees only the root (globals, data
    /// model, shared variables); otherwise it sees the including scope chain.
    #[tracing::instrument(level = "debug", skip_all, fields(template = %template.name()))]
    pub fn include(&mut self, template: &Arc<Template>, fresh_namespace: bool) -> RenderResult<()> {
        let enclosing = (!fresh_namespace).then_some(self.current_scope);
        let (scope, id) = self.create_namespace(Arc::clone(template), enclosing, !fresh_namespace);
        let result = {
            let mut scoped = self.switch_context();
            scoped.current_scope = scope;
            scoped.current_namespace = scope;
            scoped.sync_context();
            scoped.hoist_definitions(template.root());
            scoped.execute(template.root())
        };
        self.release_namespace(id, scope);
        result.map(|_| ())
    }

    /// Load and run a template at most once per render.
    ///
    /// Every import of the same absolute name yields the same namespace.
    /// The template's output is discarded.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn import_once(&mut self, name: &str) -> RenderResult<NamespaceId> {
        let absolute = self.absolute_name(name);
        if let Some(id) = self.imported.get(&absolute) {
            return Ok(*id);
        }
        let template = self.config.registry().get_template(&absolute)?;
        let (scope, id) = self.create_namespace(Arc::clone(&template), None, false);
        self.imported.insert(absolute, id);

        self.out.push_silent();
        let result = {
            let mut scoped = self.switch_context();
            scoped.current_scope = scope;
            scoped.current_namespace = scope;
            scoped.sync_context();
            scoped.hoist_definitions(template.root());
            scoped.execute(template.root())
        };
        self.out.pop();
        result?;
        Ok(id)
    }

    pub(crate) fn exec_import(&mut self, name: &str, alias: &Name, global: bool) -> RenderResult<()> {
        let id = self.import_once(name)?;
        let value = Value::Namespace(id);
        if global {
            self.globals.insert(Name::clone(alias), value);
        } else {
            let target = self.defining_namespace();
            self.declare(target, Name::clone(alias), value);
        }
        Ok(())
    }
}
