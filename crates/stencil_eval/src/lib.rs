//! Stencil Eval - rendering engine for compiled stencil templates.
//!
//! A compiled template is a tree of [`Instruction`](stencil_ir::Instruction)s.
//! A [`Renderer`] executes one template against a data model and writes the
//! result to an output target.
//!
//! # Architecture
//!
//! - `environment`: scope arena; every scope names its enclosing scope by
//!   id, and the chain ends at a namespace or at the root
//! - `renderer`: the orchestrator (instruction dispatch, macros, error
//!   routing, includes and imports, node dispatch)
//! - `settings`: render/template/configuration settings chain
//! - `registry`: template lookup by absolute name
//! - `format`: locale-aware number and boolean formatting
//! - `current`: thread-bound context readable by host code during a render
//!
//! Runtime values and errors live in `stencil_value`; arithmetic in
//! `stencil_numeric`.

mod current;
mod diagnostics;
mod environment;
mod format;
mod output;
mod registry;
pub mod renderer;
mod settings;
mod template;

use std::sync::Once;

pub use current::{with_current, RenderContext};
pub use diagnostics::{CallFrame, CallStack};
pub use format::{format_boolean, LocaleSymbols, NumberFormat};
pub use output::OutputTarget;
pub use registry::{to_absolute_name, MemoryRegistry, TemplateRegistry};
pub use renderer::{Flow, MacroArgs, NestedContent, Renderer, RendererBuilder};
pub use settings::{Configuration, ConfigurationBuilder, ErrorHandler, ErrorHandlerPolicy, Settings};
pub use template::Template;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber when `RUST_LOG` is set.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
mod tests;
