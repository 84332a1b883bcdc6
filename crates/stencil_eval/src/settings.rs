//! Render settings and engine-wide configuration.
//!
//! Settings resolve through a chain: render-level overrides (builder and the
//! `setting` instruction), then the current template's settings, then the
//! `Configuration` defaults, which always carry a value.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use stencil_ir::Name;
use stencil_numeric::ArithmeticPolicy;
use stencil_value::{invalid_setting, RenderError, RenderResult, Value};

use crate::{MemoryRegistry, TemplateRegistry};

/// User-supplied error handler.
pub trait ErrorHandler: Send + Sync + fmt::Debug {
    /// Called once per error. `Ok(())` swallows the error and rendering
    /// continues after the failed instruction; `Err` propagates it.
    fn handle(&self, error: &RenderError, out: &mut dyn fmt::Write) -> RenderResult<()>;
}

/// What happens to an error that reaches the configured handler.
#[derive(Clone, Debug, Default)]
pub enum ErrorHandlerPolicy {
    /// Swallow the error and continue.
    Ignore,
    /// Propagate the error.
    #[default]
    Rethrow,
    /// Print the error and its backtrace to the output, then propagate.
    Debug,
    /// Like `Debug`, wrapped in an escaped `<pre>` block.
    HtmlDebug,
    Custom(Arc<dyn ErrorHandler>),
}

impl ErrorHandlerPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ignore" => Some(Self::Ignore),
            "rethrow" => Some(Self::Rethrow),
            "debug" => Some(Self::Debug),
            "html_debug" => Some(Self::HtmlDebug),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Rethrow => "rethrow",
            Self::Debug => "debug",
            Self::HtmlDebug => "html_debug",
            Self::Custom(_) => "custom",
        }
    }
}

/// Optional overrides at one level of the settings chain.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub locale: Option<Name>,
    pub number_format: Option<Name>,
    /// `"c"` or `"<true text>,<false text>"`.
    pub boolean_format: Option<Name>,
    pub arithmetic: Option<ArithmeticPolicy>,
    pub error_handler: Option<ErrorHandlerPolicy>,
    pub strict_variables: Option<bool>,
    pub log_template_exceptions: Option<bool>,
}

fn parse_bool(name: &str, value: &str) -> RenderResult<bool> {
    match value {
        "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        _ => Err(invalid_setting(name, value)),
    }
}

fn check_boolean_format(value: &str) -> RenderResult<Name> {
    if value == "c" || value.split(',').count() == 2 {
        Ok(value.into())
    } else {
        Err(invalid_setting("boolean_format", value))
    }
}

impl Settings {
    #[must_use]
    pub fn locale(mut self, locale: &str) -> Self {
        self.locale = Some(locale.into());
        self
    }

    #[must_use]
    pub fn number_format(mut self, pattern: &str) -> Self {
        self.number_format = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn boolean_format(mut self, format: &str) -> Self {
        self.boolean_format = Some(format.into());
        self
    }

    #[must_use]
    pub fn arithmetic(mut self, policy: ArithmeticPolicy) -> Self {
        self.arithmetic = Some(policy);
        self
    }

    #[must_use]
    pub fn error_handler(mut self, policy: ErrorHandlerPolicy) -> Self {
        self.error_handler = Some(policy);
        self
    }

    #[must_use]
    pub fn strict_variables(mut self, strict: bool) -> Self {
        self.strict_variables = Some(strict);
        self
    }

    #[must_use]
    pub fn log_template_exceptions(mut self, log: bool) -> Self {
        self.log_template_exceptions = Some(log);
        self
    }

    /// Set one value from its textual form, as the `setting` instruction does.
    pub fn apply(&mut self, name: &str, value: &str) -> RenderResult<()> {
        match name {
            "locale" => self.locale = Some(value.into()),
            "number_format" => self.number_format = Some(value.into()),
            "boolean_format" => self.boolean_format = Some(check_boolean_format(value)?),
            "arithmetic_engine" => {
                let policy = ArithmeticPolicy::from_name(value)
                    .ok_or_else(|| invalid_setting(name, value))?;
                self.arithmetic = Some(policy);
            }
            "error_handler" => {
                let policy = ErrorHandlerPolicy::from_name(value)
                    .ok_or_else(|| invalid_setting(name, value))?;
                self.error_handler = Some(policy);
            }
            "strict_variables" => self.strict_variables = Some(parse_bool(name, value)?),
            "log_template_exceptions" => {
                self.log_template_exceptions = Some(parse_bool(name, value)?);
            }
            _ => return Err(invalid_setting(name, value)),
        }
        Ok(())
    }
}

/// Engine-wide defaults, shared variables and the template registry.
///
/// Built once and shared between renders as `Arc<Configuration>`.
#[derive(Debug)]
pub struct Configuration {
    pub(crate) locale: Name,
    pub(crate) number_format: Name,
    pub(crate) boolean_format: Name,
    pub(crate) arithmetic: ArithmeticPolicy,
    pub(crate) error_handler: ErrorHandlerPolicy,
    pub(crate) strict_variables: bool,
    pub(crate) log_template_exceptions: bool,
    pub(crate) max_call_depth: Option<usize>,
    shared_variables: FxHashMap<Name, Value>,
    registry: Arc<dyn TemplateRegistry>,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    pub fn shared_variable(&self, name: &str) -> Option<&Value> {
        self.shared_variables.get(name)
    }

    pub fn registry(&self) -> &Arc<dyn TemplateRegistry> {
        &self.registry
    }
}

/// Consuming builder for [`Configuration`].
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    settings: Settings,
    max_call_depth: Option<Option<usize>>,
    shared_variables: FxHashMap<Name, Value>,
    registry: Option<Arc<dyn TemplateRegistry>>,
}

impl ConfigurationBuilder {
    /// Defaults for every setting; unset values fall back to the built-ins
    /// (`en_US`, `number`, `true,false`, decimal arithmetic, rethrow,
    /// non-strict, logging on).
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn shared_variable(mut self, name: &str, value: Value) -> Self {
        self.shared_variables.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: Arc<dyn TemplateRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Limit on the diagnostic stack depth; `None` for unlimited.
    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.max_call_depth = Some(depth);
        self
    }

    pub fn build(self) -> Arc<Configuration> {
        let s = self.settings;
        Arc::new(Configuration {
            locale: s.locale.unwrap_or_else(|| "en_US".into()),
            number_format: s.number_format.unwrap_or_else(|| "number".into()),
            boolean_format: s.boolean_format.unwrap_or_else(|| "true,false".into()),
            arithmetic: s.arithmetic.unwrap_or_default(),
            error_handler: s.error_handler.unwrap_or_default(),
            strict_variables: s.strict_variables.unwrap_or(false),
            log_template_exceptions: s.log_template_exceptions.unwrap_or(true),
            max_call_depth: self.max_call_depth.unwrap_or(Some(1000)),
            shared_variables: self.shared_variables,
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(MemoryRegistry::new())),
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
