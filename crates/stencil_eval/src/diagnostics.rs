//! Diagnostic instruction stack.
//!
//! Every executed instruction and every macro invocation pushes a
//! [`CallFrame`]; the frames are snapshotted into a `RenderBacktrace` when an
//! error is handled.

use std::borrow::Cow;

use stencil_ir::{Location, Name};
use stencil_value::{recursion_limit_exceeded, BacktraceFrame, RenderBacktrace, RenderError};

/// A single frame of the live stack.
#[derive(Clone, Debug)]
pub struct CallFrame {
    /// Instruction label (`#list`) or macro name (`@greet`).
    pub name: Cow<'static, str>,
    /// Template whose namespace was current when the frame was pushed.
    pub template: Name,
    pub location: Option<Location>,
}

/// Live stack of executing instructions.
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: Option<usize>,
}

impl CallStack {
    /// `max_depth` is `None` for unlimited.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame, checking the depth limit.
    ///
    /// The frame is NOT pushed on overflow.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), RenderError> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                return Err(recursion_limit_exceeded(max));
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Snapshot the stack, most recent frame first.
    pub fn capture(&self) -> RenderBacktrace {
        let frames = self
            .frames
            .iter()
            .rev()
            .map(|f| BacktraceFrame {
                name: f.name.to_string(),
                template: f.template.to_string(),
                location: f.location.clone(),
            })
            .collect();
        RenderBacktrace::new(frames)
    }

    /// Attach a backtrace unless the error already carries one.
    pub fn attach_backtrace(&self, err: RenderError) -> RenderError {
        if self.frames.is_empty() || err.backtrace.is_some() {
            return err;
        }
        err.with_backtrace(self.capture())
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
