use std::fmt;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use stencil_ir::{Expr, Instruction, Location};
use stencil_value::{RenderError, RenderErrorKind, RenderResult};

use super::{call, invoke, macro_def, main, out, text, var, Fixture};
use crate::{ErrorHandler, ErrorHandlerPolicy, RendererBuilder, Settings};

fn with_policy(policy: ErrorHandlerPolicy) -> Fixture {
    Fixture::new().settings(Settings::default().error_handler(policy))
}

#[test]
fn ignore_continues_after_the_failed_instruction() {
    let template = main(vec![text("a"), out(var("missing")), text("b")]);
    assert_eq!(with_policy(ErrorHandlerPolicy::Ignore).render_ok(template), "ab");
}

#[test]
fn rethrow_is_the_default() {
    let err = Fixture::new().render_err(main(vec![text("a"), out(var("missing"))]));
    assert!(matches!(err.kind, RenderErrorKind::UndefinedVariable { .. }));
}

#[test]
fn debug_writes_the_report_then_propagates() {
    let mut renderer =
        with_policy(ErrorHandlerPolicy::Debug).renderer(main(vec![text("a"), out(var("missing"))]));
    assert!(renderer.process().is_err());
    let output = renderer.take_output();
    assert!(output.starts_with("aTemplate error: the following has evaluated to null or missing: missing"));
    assert!(output.contains("template stack:"));
}

#[test]
fn html_debug_escapes_the_report() {
    let mut renderer = with_policy(ErrorHandlerPolicy::HtmlDebug)
        .renderer(main(vec![out(var("a").dot("b"))]));
    assert!(renderer.process().is_err());
    let output = renderer.take_output();
    assert!(output.starts_with("<pre>Template error:"));
    assert!(output.ends_with("</pre>"));
    assert!(output.contains("&quot;main.ftl&quot;"));
}

#[test]
fn stop_bypasses_the_handler() {
    let template = main(vec![
        text("a"),
        Instruction::Stop(None),
        text("b"),
    ]);
    let err = with_policy(ErrorHandlerPolicy::Ignore).render_err(template);
    assert!(err.is_stop());
    assert_eq!(err.message, "stopped");
}

#[derive(Debug)]
struct Replacing;

impl ErrorHandler for Replacing {
    fn handle(&self, error: &RenderError, out: &mut dyn fmt::Write) -> RenderResult<()> {
        out.write_str("[handled]").map_err(|_| RenderError::new("write failed"))?;
        Err(RenderError::new(format!("wrapped: {}", error.message)))
    }
}

#[test]
fn custom_handler_can_replace_the_error() {
    let fixture = with_policy(ErrorHandlerPolicy::Custom(Arc::new(Replacing)));
    let template = main(vec![
        macro_def("m", &[], vec![out(var("missing"))]),
        invoke(call(var("m"))),
    ]);
    let mut renderer = fixture.renderer(template);
    let err = renderer.process().unwrap_err();
    assert_eq!(
        err.message,
        "wrapped: the following has evaluated to null or missing: missing"
    );
    // The replacement is not handed to the handler a second time.
    assert_eq!(renderer.take_output(), "[handled]");
}

#[test]
fn errors_carry_location_and_backtrace() {
    let template = main(vec![
        macro_def(
            "m",
            &[],
            vec![out(var("missing")).at(Location::new("main.ftl", 3, 7))],
        ),
        invoke(call(var("m"))),
    ]);
    let err = Fixture::new().render_err(template);
    assert_eq!(err.location, Some(Location::new("main.ftl", 3, 7)));
    let backtrace = err.backtrace.expect("backtrace attached");
    let names: Vec<&str> = backtrace.frames().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["${...}", "block", "@m", "@call", "block"]);
    assert_eq!(
        backtrace.frames()[0].location,
        Some(Location::new("main.ftl", 3, 7))
    );
}

#[test]
fn call_depth_limit_raises_stack_overflow() {
    let fixture = Fixture::new();
    let template = main(vec![
        macro_def("forever", &[], vec![invoke(call(var("forever")))]),
        invoke(call(var("forever"))),
    ]);
    let registry_template = Arc::new(template);
    let mut renderer = RendererBuilder::new(fixture.config(), registry_template)
        .max_call_depth(Some(64))
        .build();
    let err = renderer.process().unwrap_err();
    assert!(matches!(err.kind, RenderErrorKind::StackOverflow { depth: 64 }));
    assert_eq!(renderer.active_frame_count(), 0);
    assert_eq!(renderer.live_scopes(), renderer.namespace_count());
    assert_eq!(renderer.call_depth(), 0);
}

#[test]
fn setting_instruction_switches_the_handler() {
    let template = main(vec![
        Instruction::Setting {
            name: "error_handler".into(),
            value: Expr::str("ignore"),
        },
        out(var("missing")),
        text("done"),
    ]);
    assert_eq!(Fixture::new().render_ok(template), "done");
}
