//! Handler dispatch for tree nodes (`visit`, `recurse`, `fallback`).
//!
//! For each namespace in the search list, in order, a node handler is the
//! macro named by the first of:
//!
//! 1. `<prefix>:<name>` where the template maps the node's namespace URI
//!    to `prefix`,
//! 2. `D:<name>` when the node's URI is the template's default namespace,
//! 3. `<name>` when the node has no URI or the template has no default
//!    namespace.
//!
//! `fallback` resumes the search after the namespace whose handler is
//! running.

use std::sync::Arc;

use stencil_ir::Expr;
use stencil_value::{
    no_node_handler, type_mismatch, undefined_variable, MacroValue, RenderResult, TemplateNode,
    Value,
};

use super::{MacroArgs, Renderer};
use crate::environment::ScopeId;

/// The node being handled and where its handler was found.
#[derive(Clone)]
pub(crate) struct VisitState {
    pub node: Arc<dyn TemplateNode>,
    pub namespaces: Vec<ScopeId>,
    pub position: usize,
}

fn qualified_name(node: &dyn TemplateNode) -> String {
    match node.node_namespace() {
        Some(uri) => format!("{{{uri}}}{}", node.node_name()),
        None => node.node_name().to_string(),
    }
}

impl Renderer {
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) fn exec_visit(&mut self, node: &Expr, namespaces: &[Expr]) -> RenderResult<()> {
        let node = self.eval_node(node)?;
        let namespaces = self.search_list(namespaces)?;
        self.dispatch_node(node, namespaces, 0)
    }

    pub(crate) fn exec_recurse(
        &mut self,
        node: Option<&Expr>,
        namespaces: &[Expr],
    ) -> RenderResult<()> {
        let node = match node {
            Some(expr) => self.eval_node(expr)?,
            None => self
                .visit
                .as_ref()
                .map(|v| Arc::clone(&v.node))
                .ok_or_else(|| undefined_variable(".node"))?,
        };
        let namespaces = self.search_list(namespaces)?;
        self.visit_children(node.as_ref(), &namespaces)
    }

    pub(crate) fn exec_fallback(&mut self) -> RenderResult<()> {
        let Some(state) = self.visit.clone() else {
            return Err(undefined_variable(".node"));
        };
        self.dispatch_node(state.node, state.namespaces, state.position + 1)
    }

    fn eval_node(&mut self, expr: &Expr) -> RenderResult<Arc<dyn TemplateNode>> {
        match self.eval(expr)? {
            Value::Node(node) => Ok(node),
            other => Err(type_mismatch("node", other.type_name())),
        }
    }

    /// Namespaces named by `exprs`; defaults to the running visit's list,
    /// then to the current namespace alone.
    fn search_list(&mut self, exprs: &[Expr]) -> RenderResult<Vec<ScopeId>> {
        if exprs.is_empty() {
            return Ok(match &self.visit {
                Some(state) => state.namespaces.clone(),
                None => vec![self.current_namespace],
            });
        }
        let mut scopes = Vec::with_capacity(exprs.len());
        for expr in exprs {
            match self.eval(expr)? {
                Value::Namespace(id) => scopes.push(self.namespace_scope(id)?),
                other => return Err(type_mismatch("namespace", other.type_name())),
            }
        }
        Ok(scopes)
    }

    fn visit_children(&mut self, node: &dyn TemplateNode, namespaces: &[ScopeId]) -> RenderResult<()> {
        for child in node.children() {
            if let Value::Node(child) = child {
                self.dispatch_node(child, namespaces.to_vec(), 0)?;
            }
        }
        Ok(())
    }

    fn dispatch_node(
        &mut self,
        node: Arc<dyn TemplateNode>,
        namespaces: Vec<ScopeId>,
        start: usize,
    ) -> RenderResult<()> {
        let Some((position, handler)) = self.find_node_handler(node.as_ref(), &namespaces, start)
        else {
            return self.default_node_action(node.as_ref(), &namespaces);
        };
        tracing::trace!(node = node.node_name(), handler = %handler.def.name, "node handler");
        let previous = self.visit.replace(VisitState {
            node,
            namespaces,
            position,
        });
        let result = self.invoke_macro(&handler, MacroArgs::default(), None);
        self.visit = previous;
        result.map(|_| ())
    }

    fn find_node_handler(
        &self,
        node: &dyn TemplateNode,
        namespaces: &[ScopeId],
        start: usize,
    ) -> Option<(usize, MacroValue)> {
        let name = node.node_name();
        let uri = node.node_namespace();
        for (position, &scope) in namespaces.iter().enumerate().skip(start) {
            let Some(ns) = self.scopes.namespace(scope) else {
                continue;
            };
            let template = &ns.template;
            let default_namespace = template.default_namespace().map(|d| &**d);

            let mut candidates = Vec::with_capacity(3);
            if let Some(prefix) = uri.and_then(|u| template.prefix_for(u)) {
                candidates.push(format!("{prefix}:{name}"));
            }
            if uri.is_some() && uri == default_namespace {
                candidates.push(format!("D:{name}"));
            }
            if uri.is_none() || default_namespace.is_none() {
                candidates.push(name.to_string());
            }

            let found = candidates.iter().find_map(|candidate| {
                match self.scopes.local_get(scope, candidate) {
                    Some(Value::Macro(m)) => Some(m.clone()),
                    _ => None,
                }
            });
            if let Some(handler) = found {
                return Some((position, handler));
            }
        }
        None
    }

    /// No handler: text nodes print their text, documents visit their
    /// children, anything else is an error.
    fn default_node_action(
        &mut self,
        node: &dyn TemplateNode,
        namespaces: &[ScopeId],
    ) -> RenderResult<()> {
        match node.node_type() {
            "text" => {
                if let Some(text) = node.text() {
                    self.out.write(&text);
                }
                Ok(())
            }
            "document" => self.visit_children(node, namespaces),
            _ => Err(no_node_handler(&qualified_name(node))),
        }
    }
}
