//! Ambient render context.
//!
//! Code running deep inside a render (host models, custom error handlers)
//! can read the active locale, arithmetic policy and template name without
//! having them passed through every call. The context is thread-bound: each
//! thread sees only the renders it is running, innermost last.

use std::cell::RefCell;

use stencil_ir::Name;
use stencil_numeric::ArithmeticPolicy;

/// Snapshot of the settings a render is currently using.
#[derive(Clone, Debug)]
pub struct RenderContext {
    pub locale: Name,
    pub arithmetic: ArithmeticPolicy,
    pub template_name: Name,
}

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<RenderContext>> = const { RefCell::new(Vec::new()) };
}

/// Run `f` with the innermost active render context, if any.
pub fn with_current<R>(f: impl FnOnce(Option<&RenderContext>) -> R) -> R {
    CONTEXT_STACK.with(|stack| f(stack.borrow().last()))
}

/// Installs a context for its lifetime; dropping it restores the previous one.
#[must_use = "the context is removed as soon as the guard is dropped"]
pub(crate) struct ContextGuard {
    depth: usize,
}

impl ContextGuard {
    pub fn enter(context: RenderContext) -> Self {
        let depth = CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(context);
            stack.len()
        });
        ContextGuard { depth }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| stack.borrow_mut().truncate(self.depth - 1));
    }
}

/// Replace the innermost context (after a setting or template switch).
pub(crate) fn update(f: impl FnOnce(&mut RenderContext)) {
    CONTEXT_STACK.with(|stack| {
        if let Some(top) = stack.borrow_mut().last_mut() {
            f(top);
        }
    });
}
