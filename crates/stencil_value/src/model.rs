//! Capability traits for host-provided data.

use std::fmt;
use std::sync::Arc;

use stencil_numeric::Number;

use crate::Value;

/// Host object exposed to templates.
///
/// Every capability is optional; the defaults report "not supported" and
/// the renderer raises a type mismatch when a template needs one that is
/// missing.
pub trait TemplateModel: Send + Sync + fmt::Debug {
    /// Name used in type-mismatch messages.
    fn type_name(&self) -> &str;

    fn as_number(&self) -> Option<Number> {
        None
    }

    fn as_text(&self) -> Option<Arc<str>> {
        None
    }

    fn as_bool(&self) -> Option<bool> {
        None
    }

    /// Number of items when the object is a sequence.
    fn len(&self) -> Option<usize> {
        None
    }

    fn get_index(&self, _index: usize) -> Option<Value> {
        None
    }

    /// Keyed lookup when the object is hash-like.
    fn get_key(&self, _key: &str) -> Option<Value> {
        None
    }
}

/// Node of a host tree (for example, a parsed document).
pub trait TemplateNode: Send + Sync + fmt::Debug {
    /// Local name, without any prefix.
    fn node_name(&self) -> &str;

    /// Namespace URI, if the node is namespaced.
    fn node_namespace(&self) -> Option<&str> {
        None
    }

    /// `"element"`, `"text"`, `"document"`, ...
    fn node_type(&self) -> &str {
        "element"
    }

    fn children(&self) -> Vec<Value>;

    /// Character content for text nodes.
    fn text(&self) -> Option<Arc<str>> {
        None
    }

    /// Keyed access to attributes and child elements.
    fn get_key(&self, _key: &str) -> Option<Value> {
        None
    }
}
