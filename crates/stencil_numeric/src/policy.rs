//! The engine interface and the selectable policy.

use std::cmp::Ordering;

use crate::{ArithmeticError, ConservativeEngine, DecimalEngine, Number};

/// Binary arithmetic operators understood by an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
}

impl ArithmeticOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
            ArithmeticOp::Modulus => "%",
        }
    }
}

/// Coercion strategy for operations on two possibly heterogeneous numbers.
pub trait ArithmeticEngine {
    fn compare(&self, left: &Number, right: &Number) -> Result<Ordering, ArithmeticError>;
    fn add(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError>;
    fn subtract(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError>;
    fn multiply(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError>;
    fn divide(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError>;
    fn modulus(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError>;

    /// Parse a numeric literal as written in a template.
    fn parse_literal(&self, text: &str) -> Result<Number, ArithmeticError>;

    fn apply(
        &self,
        op: ArithmeticOp,
        left: &Number,
        right: &Number,
    ) -> Result<Number, ArithmeticError> {
        match op {
            ArithmeticOp::Add => self.add(left, right),
            ArithmeticOp::Subtract => self.subtract(left, right),
            ArithmeticOp::Multiply => self.multiply(left, right),
            ArithmeticOp::Divide => self.divide(left, right),
            ArithmeticOp::Modulus => self.modulus(left, right),
        }
    }
}

/// Arithmetic policy chosen per render or template.
///
/// Enum dispatch over the two engines: the set is closed, and the policy is
/// stored in settings that need `Clone + Eq`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArithmeticPolicy {
    Decimal(DecimalEngine),
    Conservative(ConservativeEngine),
}

impl Default for ArithmeticPolicy {
    fn default() -> Self {
        ArithmeticPolicy::Decimal(DecimalEngine::default())
    }
}

impl ArithmeticPolicy {
    /// Policy name as accepted by the `arithmetic_engine` setting.
    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticPolicy::Decimal(_) => "decimal",
            ArithmeticPolicy::Conservative(_) => "conservative",
        }
    }

    /// Parse a policy name; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "decimal" | "bigdecimal" => Some(ArithmeticPolicy::Decimal(DecimalEngine::default())),
            "conservative" => Some(ArithmeticPolicy::Conservative(
                ConservativeEngine::default(),
            )),
            _ => None,
        }
    }
}

impl ArithmeticEngine for ArithmeticPolicy {
    fn compare(&self, left: &Number, right: &Number) -> Result<Ordering, ArithmeticError> {
        match self {
            Self::Decimal(e) => e.compare(left, right),
            Self::Conservative(e) => e.compare(left, right),
        }
    }

    fn add(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        match self {
            Self::Decimal(e) => e.add(left, right),
            Self::Conservative(e) => e.add(left, right),
        }
    }

    fn subtract(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        match self {
            Self::Decimal(e) => e.subtract(left, right),
            Self::Conservative(e) => e.subtract(left, right),
        }
    }

    fn multiply(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        match self {
            Self::Decimal(e) => e.multiply(left, right),
            Self::Conservative(e) => e.multiply(left, right),
        }
    }

    fn divide(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        match self {
            Self::Decimal(e) => e.divide(left, right),
            Self::Conservative(e) => e.divide(left, right),
        }
    }

    fn modulus(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        match self {
            Self::Decimal(e) => e.modulus(left, right),
            Self::Conservative(e) => e.modulus(left, right),
        }
    }

    fn parse_literal(&self, text: &str) -> Result<Number, ArithmeticError> {
        match self {
            Self::Decimal(e) => e.parse_literal(text),
            Self::Conservative(e) => e.parse_literal(text),
        }
    }
}
