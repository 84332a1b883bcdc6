//! Expression evaluation.
//!
//! `eval_optional` is the core: a missing variable or member yields
//! `Ok(None)` so that `!` defaults and `??` tests can observe absence.
//! Everything else calls `eval`, which turns absence into
//! `UndefinedVariable` naming the whole expression.

use std::cmp::Ordering;
use std::sync::Arc;

use stencil_ir::{BinaryOp, Expr, Literal, Name, SpecialVariable, UnaryOp};
use stencil_numeric::{ArithmeticEngine, ArithmeticOp, Number};
use stencil_value::{
    not_invokable, type_mismatch, undefined_variable, HashMap, RenderResult, Value,
};

use super::Renderer;
use crate::format::format_boolean;

fn arithmetic_op(op: BinaryOp) -> Option<ArithmeticOp> {
    match op {
        BinaryOp::Add => Some(ArithmeticOp::Add),
        BinaryOp::Sub => Some(ArithmeticOp::Subtract),
        BinaryOp::Mul => Some(ArithmeticOp::Multiply),
        BinaryOp::Div => Some(ArithmeticOp::Divide),
        BinaryOp::Mod => Some(ArithmeticOp::Modulus),
        _ => None,
    }
}

impl Renderer {
    /// Evaluate `expr`; a missing value is an error.
    pub(crate) fn eval(&mut self, expr: &Expr) -> RenderResult<Value> {
        self.eval_optional(expr)?
            .ok_or_else(|| undefined_variable(&expr.to_string()))
    }

    pub(crate) fn eval_optional(&mut self, expr: &Expr) -> RenderResult<Option<Value>> {
        match expr {
            Expr::Literal(Literal::Str(text)) => Ok(Some(Value::Str(Arc::clone(text)))),
            Expr::Literal(Literal::Number(text)) => {
                let number = self.arithmetic().parse_literal(text)?;
                Ok(Some(Value::Number(number)))
            }
            Expr::Literal(Literal::Bool(b)) => Ok(Some(Value::Bool(*b))),
            Expr::Variable(name) => Ok(self.resolve(name)),
            Expr::Dot { target, key } => match self.eval_optional(target)? {
                Some(target) => self.member(&target, key),
                None => Ok(None),
            },
            Expr::Index { target, index } => {
                let Some(target) = self.eval_optional(target)? else {
                    return Ok(None);
                };
                let index = self.eval(index)?;
                self.index_value(&target, &index)
            }
            Expr::Sequence(items) => {
                let items = items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<RenderResult<Vec<_>>>()?;
                Ok(Some(Value::sequence(items)))
            }
            Expr::Hash(entries) => {
                let mut map = HashMap::default();
                for (key, value) in entries {
                    let key = self.eval_text(key)?;
                    let value = self.eval(value)?;
                    map.insert(key, value);
                }
                Ok(Some(Value::Hash(Arc::new(map))))
            }
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right).map(Some),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                match op {
                    UnaryOp::Not => {
                        let b = value
                            .as_bool()
                            .ok_or_else(|| type_mismatch("boolean", value.type_name()))?;
                        Ok(Some(Value::Bool(!b)))
                    }
                    UnaryOp::Neg => {
                        let n = value
                            .as_number()
                            .ok_or_else(|| type_mismatch("number", value.type_name()))?;
                        Ok(Some(Value::Number(n.negate())))
                    }
                }
            }
            Expr::Default { value, fallback } => {
                if let Some(found) = self.eval_optional(value)? {
                    return Ok(Some(found));
                }
                match fallback {
                    Some(fallback) => self.eval_optional(fallback),
                    None => Ok(Some(Value::string(""))),
                }
            }
            Expr::Exists(inner) => Ok(Some(Value::Bool(self.eval_optional(inner)?.is_some()))),
            Expr::Call { callee, args } => {
                let callee = self.eval(callee)?;
                let Value::Macro(function) = callee else {
                    return Err(not_invokable(callee.type_name()));
                };
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<RenderResult<Vec<_>>>()?;
                self.call_function(&function, args).map(Some)
            }
            Expr::Special(special) => Ok(self.special(*special)),
        }
    }

    fn special(&self, special: SpecialVariable) -> Option<Value> {
        match special {
            SpecialVariable::Error => self.recovered_errors.last().map(|m| Value::Str(Arc::clone(m))),
            SpecialVariable::Node => self.visit.as_ref().map(|v| Value::Node(Arc::clone(&v.node))),
            SpecialVariable::CurrentTemplateName => Some(Value::Str(self.current_template_name())),
        }
    }

    /// `target.key`
    fn member(&self, target: &Value, key: &str) -> RenderResult<Option<Value>> {
        match target {
            Value::Namespace(id) => {
                let scope = self.namespace_scope(*id)?;
                Ok(self.scopes.local_get(scope, key).cloned())
            }
            value if value.is_hash_like() => Ok(value.get_key(key)),
            other => Err(type_mismatch("hash", other.type_name())),
        }
    }

    /// `target[index]`
    fn index_value(&self, target: &Value, index: &Value) -> RenderResult<Option<Value>> {
        if let Value::Str(key) = index {
            return self.member(target, key);
        }
        let Some(position) = index.as_number() else {
            return Err(type_mismatch("number or string", index.type_name()));
        };
        if target.seq_len().is_none() {
            return Err(type_mismatch("sequence", target.type_name()));
        }
        Ok(position
            .to_i64()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| target.get_index(i)))
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> RenderResult<Value> {
        match op {
            BinaryOp::And => {
                let result = self.eval_bool(left)? && self.eval_bool(right)?;
                Ok(Value::Bool(result))
            }
            BinaryOp::Or => {
                let result = self.eval_bool(left)? || self.eval_bool(right)?;
                Ok(Value::Bool(result))
            }
            _ => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                if op.is_comparison() {
                    return self.compare_values(op, &left, &right).map(Value::Bool);
                }
                if op == BinaryOp::Add {
                    return self.add_values(&left, &right);
                }
                let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
                    let culprit = if left.as_number().is_none() { &left } else { &right };
                    return Err(type_mismatch("number", culprit.type_name()));
                };
                let Some(op) = arithmetic_op(op) else {
                    return Err(type_mismatch("number operator", op.as_symbol()));
                };
                Ok(Value::Number(self.arithmetic().apply(op, &a, &b)?))
            }
        }
    }

    /// `+` adds numbers, concatenates sequences, merges hashes (right wins)
    /// and otherwise concatenates the operands' text.
    fn add_values(&mut self, left: &Value, right: &Value) -> RenderResult<Value> {
        match (left, right) {
            (Value::Sequence(a), Value::Sequence(b)) => {
                let items = a.iter().chain(b.iter()).cloned().collect();
                return Ok(Value::sequence(items));
            }
            (Value::Hash(a), Value::Hash(b)) => {
                let mut merged = HashMap::clone(a);
                merged.extend(b.iter().map(|(k, v)| (Arc::clone(k), v.clone())));
                return Ok(Value::Hash(Arc::new(merged)));
            }
            _ => {}
        }
        if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
            return Ok(Value::Number(self.arithmetic().add(&a, &b)?));
        }
        let mut text = self.format_value(left)?;
        text.push_str(&self.format_value(right)?);
        Ok(Value::from(text))
    }

    /// Evaluate a comparison. Numbers compare through the arithmetic
    /// policy; text and booleans only support equality.
    pub(crate) fn compare_values(
        &self,
        op: BinaryOp,
        left: &Value,
        right: &Value,
    ) -> RenderResult<bool> {
        if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
            let ordering = self.arithmetic().compare(&a, &b)?;
            return Ok(match op {
                BinaryOp::Eq => ordering == Ordering::Equal,
                BinaryOp::NotEq => ordering != Ordering::Equal,
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::LtEq => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                BinaryOp::GtEq => ordering != Ordering::Less,
                _ => false,
            });
        }
        let equal = if let (Some(a), Some(b)) = (left.as_text(), right.as_text()) {
            Some(a == b)
        } else if let (Some(a), Some(b)) = (left.as_bool(), right.as_bool()) {
            Some(a == b)
        } else {
            None
        };
        match (equal, op) {
            (Some(equal), BinaryOp::Eq) => Ok(equal),
            (Some(equal), BinaryOp::NotEq) => Ok(!equal),
            (Some(_), _) => Err(type_mismatch("number", left.type_name())),
            (None, _) => Err(type_mismatch(left.type_name(), right.type_name())),
        }
    }

    pub(crate) fn eval_bool(&mut self, expr: &Expr) -> RenderResult<bool> {
        let value = self.eval(expr)?;
        value
            .as_bool()
            .ok_or_else(|| type_mismatch("boolean", value.type_name()))
    }

    /// Evaluate to a string, formatting numbers and booleans.
    pub(crate) fn eval_text(&mut self, expr: &Expr) -> RenderResult<Name> {
        match self.eval(expr)? {
            Value::Str(text) => Ok(text),
            other => self.format_value(&other).map(Name::from),
        }
    }

    /// Text of a value as written by an interpolation.
    pub(crate) fn format_value(&mut self, value: &Value) -> RenderResult<String> {
        match value {
            Value::Str(text) => Ok(text.to_string()),
            Value::Number(n) => self.format_number(n),
            Value::Bool(b) => Ok(format_boolean(*b, &self.boolean_format())),
            Value::Host(host) => {
                if let Some(text) = host.as_text() {
                    Ok(text.to_string())
                } else if let Some(n) = host.as_number() {
                    self.format_number(&n)
                } else if let Some(b) = host.as_bool() {
                    Ok(format_boolean(b, &self.boolean_format()))
                } else {
                    Err(type_mismatch("string, number or boolean", host.type_name()))
                }
            }
            Value::Node(node) => node
                .text()
                .map(|t| t.to_string())
                .ok_or_else(|| type_mismatch("string, number or boolean", "node")),
            other => Err(type_mismatch("string, number or boolean", other.type_name())),
        }
    }

    fn format_number(&mut self, number: &Number) -> RenderResult<String> {
        let locale = self.locale();
        let pattern = self.number_format();
        let format = self.formats.get(&locale, &pattern)?;
        Ok(format.format(number))
    }

    /// Textual value accepted by the `setting` instruction.
    pub(crate) fn setting_text(&self, value: &Value) -> RenderResult<String> {
        match value {
            Value::Str(text) => Ok(text.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(type_mismatch("string", other.type_name())),
        }
    }
}
