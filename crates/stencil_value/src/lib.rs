//! Stencil Value - runtime values and errors.
//!
//! Values are cheap to clone: strings, collections and host objects are
//! shared through `Arc`. Host data plugs in through two capability traits:
//!
//! - [`TemplateModel`]: numeric/textual/boolean views, indexed and keyed access
//! - [`TemplateNode`]: tree nodes for `visit`/`recurse` dispatch
//!
//! The renderer never inspects a host object beyond these capabilities.
//!
//! A missing value is `Option::None`; there is no null variant.

mod errors;
mod model;
mod value;

pub use errors::{
    // Access
    undeclared_variable, undefined_variable,
    // Types
    not_invokable, type_mismatch,
    // Macros
    function_without_return, missing_parameter, outside_macro, unexpected_arguments,
    // Templates and nodes
    invalid_setting, no_node_handler, template_not_found,
    // Control
    recursion_limit_exceeded, stop,
    BacktraceFrame, ErrorId, RenderBacktrace, RenderError, RenderErrorKind, RenderResult,
};
pub use model::{TemplateModel, TemplateNode};
pub use value::{HashMap, MacroValue, NamespaceId, Value};
