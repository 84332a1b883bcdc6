//! RAII guard for scope and context switches.
//!
//! [`ScopedRenderer`] records the current scope, namespace and macro frame
//! when it is created and restores them on drop, together with any extra
//! cleanup registered on it: releasing a scope slot, restoring a macro's
//! active-frame entry, popping a diagnostic frame. Every exit path,
//! including `?` and unwinding, goes through `Drop`.
//!
//! The guard implements `Deref`/`DerefMut` to [`Renderer`], so code inside a
//! switched context uses it exactly like the renderer.

use std::ops::{Deref, DerefMut};

use stencil_ir::MacroId;

use super::Renderer;
use crate::environment::{ScopeId, ScopeKind};

#[derive(Clone, Copy)]
struct SavedContext {
    scope: ScopeId,
    namespace: ScopeId,
    macro_frame: Option<ScopeId>,
}

pub(crate) struct ScopedRenderer<'r> {
    renderer: &'r mut Renderer,
    saved: SavedContext,
    release: Option<ScopeId>,
    restore_active: Option<(MacroId, Option<ScopeId>)>,
    pops_call_frame: bool,
}

impl ScopedRenderer<'_> {
    /// Release `scope` when the guard drops.
    #[must_use]
    pub fn releasing(mut self, scope: ScopeId) -> Self {
        self.release = Some(scope);
        self
    }

    /// Put `previous` back as the active frame of `id` when the guard drops.
    #[must_use]
    pub fn restoring_active(mut self, id: MacroId, previous: Option<ScopeId>) -> Self {
        self.restore_active = Some((id, previous));
        self
    }

    /// Pop one diagnostic frame when the guard drops.
    #[must_use]
    pub fn popping_call_frame(mut self) -> Self {
        self.pops_call_frame = true;
        self
    }
}

impl Drop for ScopedRenderer<'_> {
    fn drop(&mut self) {
        let r = &mut *self.renderer;
        if let Some((id, previous)) = self.restore_active.take() {
            match previous {
                Some(frame) => {
                    r.active_frames.insert(id, frame);
                }
                None => {
                    r.active_frames.remove(&id);
                }
            }
        }
        let namespace_changed = r.current_namespace != self.saved.namespace;
        r.current_scope = self.saved.scope;
        r.current_namespace = self.saved.namespace;
        r.current_macro_frame = self.saved.macro_frame;
        if let Some(scope) = self.release.take() {
            r.scopes.release(scope);
        }
        if self.pops_call_frame {
            r.call_stack.pop();
        }
        if namespace_changed {
            r.sync_context();
        }
    }
}

impl Deref for ScopedRenderer<'_> {
    type Target = Renderer;

    fn deref(&self) -> &Self::Target {
        self.renderer
    }
}

impl DerefMut for ScopedRenderer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.renderer
    }
}

impl Renderer {
    /// Guard that restores the current scope, namespace and macro frame.
    pub(crate) fn switch_context(&mut self) -> ScopedRenderer<'_> {
        let saved = SavedContext {
            scope: self.current_scope,
            namespace: self.current_namespace,
            macro_frame: self.current_macro_frame,
        };
        ScopedRenderer {
            renderer: self,
            saved,
            release: None,
            restore_active: None,
            pops_call_frame: false,
        }
    }

    /// Push a scope of `kind` over the current scope and make it current.
    ///
    /// The scope is released when the guard drops.
    pub(crate) fn scoped(&mut self, kind: ScopeKind) -> ScopedRenderer<'_> {
        let scope = self.scopes.push(Some(self.current_scope), kind);
        let mut guard = self.switch_context().releasing(scope);
        guard.current_scope = scope;
        guard
    }
}
