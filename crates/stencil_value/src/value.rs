//! Runtime values.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use stencil_ir::{MacroDef, Name};
use stencil_numeric::Number;

use crate::{TemplateModel, TemplateNode};

/// Key/value storage of hash values.
pub type HashMap = FxHashMap<Name, Value>;

/// Handle to a namespace owned by a renderer.
///
/// Only meaningful inside the render that produced it. Two imports of the
/// same template in one render yield equal handles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NamespaceId(u32);

impl NamespaceId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        NamespaceId(raw)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A macro closed over the namespace it was defined in.
#[derive(Clone, Debug)]
pub struct MacroValue {
    pub def: Arc<MacroDef>,
    pub namespace: NamespaceId,
}

/// A template value.
#[derive(Clone, Debug)]
pub enum Value {
    Str(Arc<str>),
    Number(Number),
    Bool(bool),
    Sequence(Arc<Vec<Value>>),
    Hash(Arc<HashMap>),
    Macro(MacroValue),
    Namespace(NamespaceId),
    Node(Arc<dyn TemplateNode>),
    Host(Arc<dyn TemplateModel>),
}

impl Value {
    pub fn string(text: &str) -> Value {
        Value::Str(text.into())
    }

    pub fn int(value: i32) -> Value {
        Value::Number(Number::Int(value))
    }

    pub fn sequence(items: Vec<Value>) -> Value {
        Value::Sequence(Arc::new(items))
    }

    pub fn hash<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Value {
        Value::Hash(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (Name::from(k), v))
                .collect(),
        ))
    }

    pub fn host(model: impl TemplateModel + 'static) -> Value {
        Value::Host(Arc::new(model))
    }

    pub fn node(node: impl TemplateNode + 'static) -> Value {
        Value::Node(Arc::new(node))
    }

    /// Name used in type-mismatch messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Str(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Sequence(_) => "sequence",
            Value::Hash(_) => "hash",
            Value::Macro(m) if m.def.is_function() => "function",
            Value::Macro(_) => "macro",
            Value::Namespace(_) => "namespace",
            Value::Node(_) => "node",
            Value::Host(h) => h.type_name(),
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(n.clone()),
            Value::Host(h) => h.as_number(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<Arc<str>> {
        match self {
            Value::Str(s) => Some(Arc::clone(s)),
            Value::Host(h) => h.as_text(),
            Value::Node(n) => n.text(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Host(h) => h.as_bool(),
            _ => None,
        }
    }

    pub fn as_macro(&self) -> Option<&MacroValue> {
        match self {
            Value::Macro(m) => Some(m),
            _ => None,
        }
    }

    /// Item count of a sequence (native or host).
    pub fn seq_len(&self) -> Option<usize> {
        match self {
            Value::Sequence(items) => Some(items.len()),
            Value::Host(h) => h.len(),
            _ => None,
        }
    }

    pub fn get_index(&self, index: usize) -> Option<Value> {
        match self {
            Value::Sequence(items) => items.get(index).cloned(),
            Value::Host(h) => h.get_index(index),
            _ => None,
        }
    }

    /// Keyed lookup on hashes, host objects and nodes.
    ///
    /// Namespaces are resolved by the renderer, which owns their storage.
    pub fn get_key(&self, key: &str) -> Option<Value> {
        match self {
            Value::Hash(map) => map.get(key).cloned(),
            Value::Host(h) => h.get_key(key),
            Value::Node(n) => n.get_key(key),
            _ => None,
        }
    }

    pub fn is_hash_like(&self) -> bool {
        matches!(self, Value::Hash(_) | Value::Host(_) | Value::Node(_))
    }
}

impl PartialEq for Value {
    /// Structural for data, identity for macros, namespaces and host objects.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (Value::Macro(a), Value::Macro(b)) => {
                a.def.id() == b.def.id() && a.namespace == b.namespace
            }
            (Value::Namespace(a), Value::Namespace(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (Value::Host(a), Value::Host(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::Int(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Long(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Double(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::sequence(value)
    }
}

#[cfg(test)]
mod tests;
