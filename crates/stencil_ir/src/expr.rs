//! Expression nodes.
//!
//! Expressions are evaluated by the renderer against the current scope
//! chain. The `Display` impl renders a canonical source form used in error
//! messages (`undefined variable: user.name`).

use std::fmt;

use crate::Name;

/// Literal constants.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Str(Name),
    /// Number literal text, parsed by the active arithmetic policy at
    /// evaluation time so the same tree renders under either policy.
    Number(Name),
    Bool(bool),
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Whether the operator orders or equates its operands.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Variables maintained by the renderer rather than by scopes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecialVariable {
    /// Message of the innermost error being recovered from.
    Error,
    /// Node currently being visited.
    Node,
    /// Name of the template whose namespace is current.
    CurrentTemplateName,
}

impl SpecialVariable {
    pub fn name(self) -> &'static str {
        match self {
            SpecialVariable::Error => "error",
            SpecialVariable::Node => "node",
            SpecialVariable::CurrentTemplateName => "current_template_name",
        }
    }
}

/// An expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Literal(Literal),
    /// Reference resolved through the scope chain.
    Variable(Name),
    /// `target.key`: hash entry, namespace variable or host-model member.
    Dot { target: Box<Expr>, key: Name },
    /// `target[index]`: sequence position or hash key.
    Index { target: Box<Expr>, index: Box<Expr> },
    Sequence(Vec<Expr>),
    Hash(Vec<(Expr, Expr)>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// `value!fallback`; without a fallback a missing value is the empty string.
    Default {
        value: Box<Expr>,
        fallback: Option<Box<Expr>>,
    },
    /// `value??`
    Exists(Box<Expr>),
    /// Function-macro call.
    Call { callee: Box<Expr>, args: Vec<Expr> },
    Special(SpecialVariable),
}

impl Expr {
    pub fn var(name: &str) -> Expr {
        Expr::Variable(name.into())
    }

    pub fn str(text: &str) -> Expr {
        Expr::Literal(Literal::Str(text.into()))
    }

    pub fn number(text: &str) -> Expr {
        Expr::Literal(Literal::Number(text.into()))
    }

    pub fn bool(value: bool) -> Expr {
        Expr::Literal(Literal::Bool(value))
    }

    #[must_use]
    pub fn dot(self, key: &str) -> Expr {
        Expr::Dot {
            target: Box::new(self),
            key: key.into(),
        }
    }

    #[must_use]
    pub fn index(self, index: Expr) -> Expr {
        Expr::Index {
            target: Box::new(self),
            index: Box::new(index),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    #[must_use]
    pub fn or_default(self, fallback: Option<Expr>) -> Expr {
        Expr::Default {
            value: Box::new(self),
            fallback: fallback.map(Box::new),
        }
    }

    #[must_use]
    pub fn exists(self) -> Expr {
        Expr::Exists(Box::new(self))
    }

    #[must_use]
    pub fn call(self, args: Vec<Expr>) -> Expr {
        Expr::Call {
            callee: Box::new(self),
            args,
        }
    }
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut item: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    for (i, it) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item(f, it)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Literal::Str(s)) => write!(f, "{s:?}"),
            Expr::Literal(Literal::Number(n)) => f.write_str(n),
            Expr::Literal(Literal::Bool(b)) => write!(f, "{b}"),
            Expr::Variable(name) => f.write_str(name),
            Expr::Dot { target, key } => write!(f, "{target}.{key}"),
            Expr::Index { target, index } => write!(f, "{target}[{index}]"),
            Expr::Sequence(items) => {
                f.write_str("[")?;
                write_list(f, items, |f, e| write!(f, "{e}"))?;
                f.write_str("]")
            }
            Expr::Hash(entries) => {
                f.write_str("{")?;
                write_list(f, entries, |f, (k, v)| write!(f, "{k}: {v}"))?;
                f.write_str("}")
            }
            Expr::Binary { op, left, right } => {
                write!(f, "{left} {} {right}", op.as_symbol())
            }
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => write!(f, "!{operand}"),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => write!(f, "-{operand}"),
            Expr::Default {
                value,
                fallback: Some(fallback),
            } => write!(f, "{value}!{fallback}"),
            Expr::Default {
                value,
                fallback: None,
            } => write!(f, "{value}!"),
            Expr::Exists(value) => write!(f, "{value}??"),
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_list(f, args, |f, e| write!(f, "{e}"))?;
                f.write_str(")")
            }
            Expr::Special(var) => write!(f, ".{}", var.name()),
        }
    }
}

#[cfg(test)]
mod tests;
