//! Render errors.
//!
//! `RenderErrorKind` is the typed taxonomy; `RenderError` adds the rendered
//! message, an identity used to log each error once, and optional location
//! and backtrace. Build errors through the `#[cold]` factory functions.
//!
//! `break` and `return` are not errors: instructions report them through
//! the renderer's `Flow` result instead.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use stencil_ir::Location;
use stencil_numeric::ArithmeticError;

/// Result of a render operation.
pub type RenderResult<T> = Result<T, RenderError>;

/// Identity of a raised error.
///
/// Clones share the id, so the renderer can recognize an error it already
/// handled as it propagates through enclosing instructions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorId(u64);

impl ErrorId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ErrorId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderErrorKind {
    // Access
    UndefinedVariable {
        name: String,
    },
    /// Strict-mode write to a name the namespace never declared.
    UndeclaredVariable {
        name: String,
    },

    // Types
    TypeMismatch {
        expected: String,
        got: String,
    },
    NotInvokable {
        type_name: String,
    },
    Arithmetic(ArithmeticError),

    // Macros
    MissingParameter {
        macro_name: String,
        param: String,
    },
    UnexpectedArguments {
        macro_name: String,
        arguments: Vec<String>,
    },
    FunctionWithoutReturn {
        name: String,
    },
    /// A macro-only directive (`nested`, `local`) ran outside any macro.
    OutsideMacro {
        directive: &'static str,
    },

    // Templates and nodes
    TemplateNotFound {
        name: String,
    },
    NoNodeHandler {
        node: String,
    },
    InvalidSetting {
        name: String,
        value: String,
    },

    // Control
    StackOverflow {
        depth: usize,
    },
    /// Explicit abort; never delivered to the configured error handler.
    Stop {
        message: String,
    },

    Custom {
        message: String,
    },
}

impl fmt::Display for RenderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedVariable { name } => {
                write!(f, "the following has evaluated to null or missing: {name}")
            }
            Self::UndeclaredVariable { name } => {
                write!(f, "can't assign to undeclared variable: {name}")
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::NotInvokable { type_name } => write!(f, "{type_name} can't be called"),
            Self::Arithmetic(err) => write!(f, "{err}"),
            Self::MissingParameter { macro_name, param } => {
                write!(f, "macro {macro_name:?} has no value for parameter {param:?}")
            }
            Self::UnexpectedArguments {
                macro_name,
                arguments,
            } => write!(
                f,
                "macro {macro_name:?} has no parameter for argument(s): {}",
                arguments.join(", ")
            ),
            Self::FunctionWithoutReturn { name } => {
                write!(f, "function {name:?} finished without returning a value")
            }
            Self::OutsideMacro { directive } => {
                write!(f, "{directive} can only be used inside a macro")
            }
            Self::TemplateNotFound { name } => write!(f, "template not found: {name:?}"),
            Self::NoNodeHandler { node } => {
                write!(f, "no macro or transform is defined for node {node:?}")
            }
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid value {value:?} for setting {name:?}")
            }
            Self::StackOverflow { depth } => {
                write!(f, "maximum nesting depth exceeded (limit: {depth})")
            }
            Self::Stop { message } if message.is_empty() => write!(f, "stopped"),
            Self::Stop { message } => write!(f, "stopped: {message}"),
            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// A single frame in a render backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Instruction label or macro name.
    pub name: String,
    pub template: String,
    pub location: Option<Location>,
}

/// Snapshot of the diagnostic instruction stack at an error site.
///
/// Most recent frame first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl RenderBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for RenderBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "template stack:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "  {i}: {} in {:?}", frame.name, frame.template)?;
            if let Some(location) = &frame.location {
                write!(f, " at line {}, column {}", location.line, location.column)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Error raised while rendering.
#[derive(Clone, Debug)]
pub struct RenderError {
    pub kind: RenderErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory errors.
    pub message: String,
    id: ErrorId,
    pub location: Option<Location>,
    pub backtrace: Option<RenderBacktrace>,
}

impl RenderError {
    /// Create a `Custom` error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_kind(RenderErrorKind::Custom {
            message: message.into(),
        })
    }

    fn from_kind(kind: RenderErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            id: ErrorId::fresh(),
            location: None,
            backtrace: None,
        }
    }

    #[inline]
    pub fn id(&self) -> ErrorId {
        self.id
    }

    /// Attach a location unless one is already present.
    #[must_use]
    pub fn with_location(mut self, location: &Location) -> Self {
        if self.location.is_none() {
            self.location = Some(location.clone());
        }
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: RenderBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    #[inline]
    pub fn is_stop(&self) -> bool {
        matches!(self.kind, RenderErrorKind::Stop { .. })
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(location) = &self.location {
            write!(f, " ({location})")?;
        }
        Ok(())
    }
}

impl std::error::Error for RenderError {}

impl From<ArithmeticError> for RenderError {
    fn from(err: ArithmeticError) -> Self {
        RenderError::from_kind(RenderErrorKind::Arithmetic(err))
    }
}

// Access Errors

#[cold]
pub fn undefined_variable(name: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn undeclared_variable(name: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::UndeclaredVariable {
        name: name.to_string(),
    })
}

// Type Errors

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn not_invokable(type_name: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::NotInvokable {
        type_name: type_name.to_string(),
    })
}

// Macro Errors

#[cold]
pub fn missing_parameter(macro_name: &str, param: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::MissingParameter {
        macro_name: macro_name.to_string(),
        param: param.to_string(),
    })
}

#[cold]
pub fn unexpected_arguments(macro_name: &str, arguments: Vec<String>) -> RenderError {
    RenderError::from_kind(RenderErrorKind::UnexpectedArguments {
        macro_name: macro_name.to_string(),
        arguments,
    })
}

#[cold]
pub fn function_without_return(name: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::FunctionWithoutReturn {
        name: name.to_string(),
    })
}

#[cold]
pub fn outside_macro(directive: &'static str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::OutsideMacro { directive })
}

// Template and Node Errors

#[cold]
pub fn template_not_found(name: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::TemplateNotFound {
        name: name.to_string(),
    })
}

#[cold]
pub fn no_node_handler(node: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::NoNodeHandler {
        node: node.to_string(),
    })
}

#[cold]
pub fn invalid_setting(name: &str, value: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::InvalidSetting {
        name: name.to_string(),
        value: value.to_string(),
    })
}

// Control Errors

#[cold]
pub fn recursion_limit_exceeded(limit: usize) -> RenderError {
    RenderError::from_kind(RenderErrorKind::StackOverflow { depth: limit })
}

#[cold]
pub fn stop(message: &str) -> RenderError {
    RenderError::from_kind(RenderErrorKind::Stop {
        message: message.to_string(),
    })
}
