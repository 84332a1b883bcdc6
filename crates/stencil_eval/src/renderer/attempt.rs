//! Attempt/recover and error-handler routing.

use std::fmt::Write as _;

use stencil_ir::{Instruction, Name};
use stencil_value::{RenderError, RenderResult};

use super::{Flow, Renderer};
use crate::ErrorHandlerPolicy;

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn debug_report(err: &RenderError) -> String {
    let mut report = format!("Template error: {err}\n");
    if let Some(backtrace) = &err.backtrace {
        let _ = write!(report, "\n{backtrace}");
    }
    report
}

impl Renderer {
    /// Run `attempt` into a buffer; commit it on success, otherwise discard
    /// it and run `recover` with the error message published as `.error`.
    pub(crate) fn exec_attempt(
        &mut self,
        attempt: &Instruction,
        recover: &Instruction,
    ) -> RenderResult<Flow> {
        self.out.push_buffer();
        self.attempt_depth += 1;
        let result = self.execute(attempt);
        self.attempt_depth -= 1;
        match result {
            Ok(flow) => {
                self.out.commit();
                Ok(flow)
            }
            Err(err) if err.is_stop() => {
                self.out.pop();
                Err(err)
            }
            Err(err) => {
                self.out.pop();
                tracing::debug!(error = %err, "recovering from template error");
                self.recovered_errors.push(Name::from(err.message.as_str()));
                let result = self.execute(recover);
                self.recovered_errors.pop();
                result
            }
        }
    }

    /// Route an error raised by an instruction.
    ///
    /// `Ok(())` means the error was swallowed and rendering continues after
    /// the failed instruction. Each error is handled once; as it propagates
    /// through enclosing instructions it is passed on untouched.
    pub(crate) fn handle_error(&mut self, err: RenderError) -> RenderResult<()> {
        if err.is_stop() || self.last_handled_error == Some(err.id()) {
            return Err(err);
        }
        let err = self.call_stack.attach_backtrace(err);
        self.last_handled_error = Some(err.id());

        if self.attempt_depth > 0 {
            tracing::debug!(error = %err, "template error inside attempt");
            return Err(err);
        }
        if self.log_template_exceptions() {
            tracing::error!(
                error = %err,
                template = %self.current_template_name(),
                "template error"
            );
        }

        match self.error_handler() {
            ErrorHandlerPolicy::Ignore => Ok(()),
            ErrorHandlerPolicy::Rethrow => Err(err),
            ErrorHandlerPolicy::Debug => {
                self.out.write(&debug_report(&err));
                Err(err)
            }
            ErrorHandlerPolicy::HtmlDebug => {
                let report = escape_html(&debug_report(&err));
                self.out.write(&format!("<pre>{report}</pre>"));
                Err(err)
            }
            ErrorHandlerPolicy::Custom(handler) => match handler.handle(&err, &mut self.out) {
                Ok(()) => Ok(()),
                Err(raised) => {
                    self.last_handled_error = Some(raised.id());
                    Err(raised)
                }
            },
        }
    }
}
