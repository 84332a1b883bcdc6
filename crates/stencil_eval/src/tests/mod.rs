//! Render-level tests.
//!
//! Templates are built directly as instruction trees with the helpers
//! below and rendered through a [`Fixture`] that owns an in-memory
//! registry.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

mod error_handler_tests;
mod node_tests;

use std::sync::Arc;

use stencil_ir::{
    AssignTarget, BinaryOp, Expr, Instruction, MacroCall, MacroDef, MacroKind, MacroParam,
};
use stencil_value::{RenderError, RenderResult, Value};

use crate::{Configuration, MemoryRegistry, Renderer, RendererBuilder, Settings, Template};

/// Registry plus configuration settings shared by one test.
pub(crate) struct Fixture {
    registry: Arc<MemoryRegistry>,
    settings: Settings,
    data_model: Option<Value>,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture {
            registry: Arc::new(MemoryRegistry::new()),
            settings: Settings::default(),
            data_model: None,
        }
    }

    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn data(mut self, entries: Vec<(&str, Value)>) -> Self {
        self.data_model = Some(Value::hash(entries));
        self
    }

    /// Register a library template.
    pub fn with(self, template: Template) -> Self {
        self.registry.insert(template);
        self
    }

    pub fn config(&self) -> Arc<Configuration> {
        Configuration::builder()
            .settings(self.settings.clone())
            .registry(Arc::clone(&self.registry) as Arc<dyn crate::TemplateRegistry>)
            .build()
    }

    pub fn renderer(&self, main: Template) -> Renderer {
        let template = self.registry.insert(main);
        let builder = RendererBuilder::new(self.config(), template);
        match &self.data_model {
            Some(data) => builder.data_model(data.clone()).build(),
            None => builder.build(),
        }
    }

    pub fn render(&self, main: Template) -> RenderResult<String> {
        let mut renderer = self.renderer(main);
        renderer.process()?;
        Ok(renderer.take_output())
    }

    pub fn render_ok(&self, main: Template) -> String {
        self.render(main).unwrap()
    }

    pub fn render_err(&self, main: Template) -> RenderError {
        self.render(main).unwrap_err()
    }
}

pub(crate) fn main(body: Vec<Instruction>) -> Template {
    Template::new("main.ftl", Instruction::block(body))
}

pub(crate) fn lib(name: &str, body: Vec<Instruction>) -> Template {
    Template::new(name, Instruction::block(body))
}

pub(crate) fn text(s: &str) -> Instruction {
    Instruction::text(s)
}

pub(crate) fn out(expr: Expr) -> Instruction {
    Instruction::Interpolation(expr)
}

pub(crate) fn var(name: &str) -> Expr {
    Expr::var(name)
}

pub(crate) fn num(text: &str) -> Expr {
    Expr::number(text)
}

pub(crate) fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::binary(op, left, right)
}

pub(crate) fn assign(name: &str, value: Expr) -> Instruction {
    Instruction::assign(AssignTarget::Unqualified, name, value)
}

pub(crate) fn set(target: AssignTarget, name: &str, value: Expr) -> Instruction {
    Instruction::assign(target, name, value)
}

fn params(names: &[&str]) -> Vec<MacroParam> {
    names.iter().map(|n| MacroParam::required(n)).collect()
}

pub(crate) fn macro_def(name: &str, param_names: &[&str], body: Vec<Instruction>) -> Instruction {
    define(MacroDef::new(
        name,
        MacroKind::Macro,
        params(param_names),
        None,
        Instruction::block(body),
    ))
}

pub(crate) fn function_def(name: &str, param_names: &[&str], body: Vec<Instruction>) -> Instruction {
    define(MacroDef::new(
        name,
        MacroKind::Function,
        params(param_names),
        None,
        Instruction::block(body),
    ))
}

pub(crate) fn define(def: MacroDef) -> Instruction {
    Instruction::MacroDefinition(Arc::new(def))
}

pub(crate) fn call(callee: Expr) -> MacroCall {
    MacroCall::new(callee)
}

pub(crate) fn invoke(call: MacroCall) -> Instruction {
    Instruction::MacroCall(call)
}

pub(crate) fn import(template: &str, alias: &str) -> Instruction {
    Instruction::Import {
        template: Expr::str(template),
        alias: alias.into(),
        global: false,
    }
}

pub(crate) fn include(template: &str, fresh_namespace: bool) -> Instruction {
    Instruction::Include {
        template: Expr::str(template),
        fresh_namespace,
    }
}

pub(crate) fn setting(name: &str, value: &str) -> Instruction {
    Instruction::Setting {
        name: name.into(),
        value: Expr::str(value),
    }
}
