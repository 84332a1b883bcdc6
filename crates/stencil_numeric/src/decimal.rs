//! Canonical-decimal policy: every operand becomes a `BigDecimal`.

use std::cmp::Ordering;

use bigdecimal::BigDecimal;
use num_traits::Zero;

use crate::number::parse_decimal_literal;
use crate::{ArithmeticEngine, ArithmeticError, DecimalContext, Number};

/// Arithmetic on arbitrary-precision decimals.
///
/// Add and subtract are exact. Products are exact unless their scale exceeds
/// `max_scale`, quotients get scale `max(left, right, min_scale)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecimalEngine {
    pub context: DecimalContext,
}

impl DecimalEngine {
    pub fn new(context: DecimalContext) -> Self {
        Self { context }
    }
}

fn decimals(left: &Number, right: &Number) -> Result<(BigDecimal, BigDecimal), ArithmeticError> {
    Ok((left.to_big_decimal()?, right.to_big_decimal()?))
}

impl ArithmeticEngine for DecimalEngine {
    fn compare(&self, left: &Number, right: &Number) -> Result<Ordering, ArithmeticError> {
        let (l, r) = decimals(left, right)?;
        Ok(l.cmp(&r))
    }

    fn add(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        let (l, r) = decimals(left, right)?;
        Ok(Number::Decimal(l + r))
    }

    fn subtract(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        let (l, r) = decimals(left, right)?;
        Ok(Number::Decimal(l - r))
    }

    fn multiply(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        let (l, r) = decimals(left, right)?;
        Ok(Number::Decimal(self.context.multiply(&l, &r)))
    }

    fn divide(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        let (l, r) = decimals(left, right)?;
        self.context.divide(&l, &r).map(Number::Decimal)
    }

    /// Remainder of the truncated integral parts.
    ///
    /// `5.5 % 2` is `1`, not `1.5`.
    fn modulus(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        let divisor = right.truncate()?;
        if divisor.is_zero() {
            return Err(ArithmeticError::ModulusByZero);
        }
        let dividend = left.truncate()?;
        Ok(Number::Decimal(BigDecimal::new(dividend % divisor, 0)))
    }

    fn parse_literal(&self, text: &str) -> Result<Number, ArithmeticError> {
        parse_decimal_literal(text).map(Number::Decimal)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
