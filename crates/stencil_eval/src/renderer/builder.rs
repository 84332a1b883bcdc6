//! `RendererBuilder` for creating a [`Renderer`] for one render.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::Renderer;
use crate::diagnostics::CallStack;
use crate::environment::{NamespaceState, ScopeArena, ScopeKind};
use crate::format::FormatCache;
use crate::output::{OutputStack, OutputTarget};
use crate::{Configuration, Settings, Template};
use stencil_value::{NamespaceId, Value};

/// Builder for a [`Renderer`].
///
/// Only the configuration and the main template are required; everything
/// else defaults to an empty data model, no render-level overrides, a
/// buffered output and the configuration's depth limit.
pub struct RendererBuilder {
    config: Arc<Configuration>,
    template: Arc<Template>,
    data_model: Option<Value>,
    settings: Settings,
    output: OutputTarget,
    max_call_depth: Option<Option<usize>>,
}

impl RendererBuilder {
    pub fn new(config: Arc<Configuration>, template: Arc<Template>) -> Self {
        Self {
            config,
            template,
            data_model: None,
            settings: Settings::default(),
            output: OutputTarget::default(),
            max_call_depth: None,
        }
    }

    /// Root object consulted after globals; usually a hash or host model.
    #[must_use]
    pub fn data_model(mut self, data_model: Value) -> Self {
        self.data_model = Some(data_model);
        self
    }

    /// Render-level overrides; these beat template and configuration settings.
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    /// Override the configuration's diagnostic depth limit.
    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.max_call_depth = Some(depth);
        self
    }

    pub fn build(self) -> Renderer {
        let max_call_depth = self.max_call_depth.unwrap_or(self.config.max_call_depth);
        let mut scopes = ScopeArena::new();
        let main = scopes.push(
            None,
            ScopeKind::Namespace(NamespaceState {
                id: NamespaceId::new(0),
                declared: self.template.declared().clone(),
                template: Arc::clone(&self.template),
                included: false,
            }),
        );
        Renderer {
            config: self.config,
            settings: self.settings,
            main_template: self.template,
            data_model: self.data_model,
            globals: FxHashMap::default(),
            scopes,
            current_scope: main,
            current_namespace: main,
            namespaces: std::iter::once((NamespaceId::new(0), main)).collect(),
            next_namespace: 1,
            active_frames: FxHashMap::default(),
            current_macro_frame: None,
            call_stack: CallStack::new(max_call_depth),
            recovered_errors: Vec::new(),
            last_handled_error: None,
            attempt_depth: 0,
            out: OutputStack::new(self.output),
            imported: FxHashMap::default(),
            formats: FormatCache::default(),
            visit: None,
        }
    }
}
