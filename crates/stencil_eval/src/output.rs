//! Output sinks.
//!
//! The renderer writes to the top of a sink stack. The bottom sink is the
//! render's target; `attempt` pushes a buffer that is committed or
//! discarded, and imports and function calls push a silent sink.
//!
//! Enum dispatch rather than trait objects: this is the hottest path of a
//! render.

use std::fmt;

/// Where a render's output goes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout as output is produced.
    Stdout,
    /// Capture for [`Renderer::take_output`](crate::Renderer::take_output).
    #[default]
    Buffer,
    /// Discard everything.
    Silent,
}

#[derive(Debug)]
enum Sink {
    Stdout,
    Buffer(String),
    Silent,
}

impl Sink {
    fn new(target: OutputTarget) -> Self {
        match target {
            OutputTarget::Stdout => Sink::Stdout,
            OutputTarget::Buffer => Sink::Buffer(String::new()),
            OutputTarget::Silent => Sink::Silent,
        }
    }

    fn write(&mut self, text: &str) {
        match self {
            Sink::Stdout => print!("{text}"),
            Sink::Buffer(buf) => buf.push_str(text),
            Sink::Silent => {}
        }
    }
}

/// Stack of sinks; the bottom sink is never popped.
#[derive(Debug)]
pub(crate) struct OutputStack {
    base: Sink,
    pushed: Vec<Sink>,
}

impl OutputStack {
    pub fn new(target: OutputTarget) -> Self {
        OutputStack {
            base: Sink::new(target),
            pushed: Vec::new(),
        }
    }

    fn top(&mut self) -> &mut Sink {
        self.pushed.last_mut().unwrap_or(&mut self.base)
    }

    pub fn write(&mut self, text: &str) {
        self.top().write(text);
    }

    /// Start capturing into a fresh buffer.
    pub fn push_buffer(&mut self) {
        self.pushed.push(Sink::Buffer(String::new()));
    }

    pub fn push_silent(&mut self) {
        self.pushed.push(Sink::Silent);
    }

    /// Pop the top sink, returning its captured text (empty when silent).
    pub fn pop(&mut self) -> String {
        match self.pushed.pop() {
            Some(Sink::Buffer(buf)) => buf,
            Some(Sink::Stdout | Sink::Silent) | None => String::new(),
        }
    }

    /// Pop the top buffer and write its contents to the sink below.
    pub fn commit(&mut self) {
        let captured = self.pop();
        self.write(&captured);
    }

    pub fn depth(&self) -> usize {
        self.pushed.len()
    }

    /// Drain the render target's captured output.
    pub fn take_output(&mut self) -> String {
        match &mut self.base {
            Sink::Buffer(buf) => std::mem::take(buf),
            Sink::Stdout | Sink::Silent => String::new(),
        }
    }
}

impl fmt::Write for OutputStack {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s);
        Ok(())
    }
}
