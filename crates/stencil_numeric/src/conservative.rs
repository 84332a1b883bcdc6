//! Conservative-widening policy.
//!
//! Each operand is classified into a [`NumberClass`]; the pair is computed at
//! the wider of the two classes, with two overrides:
//!
//! - `Float` with `Long` computes as `Double` (an `f32` can't hold the long's
//!   magnitude with any useful precision).
//! - `BigInt` with `Float`/`Double` computes as `BigDecimal` (keeps the
//!   fractional part that a big integer would drop).
//!
//! Integer add/subtract/multiply promote on overflow instead of wrapping.

use std::cmp::Ordering;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

use crate::number::{parse_decimal_literal, scale_of};
use crate::rounding::pow10;
use crate::{ArithmeticEngine, ArithmeticError, DecimalContext, Number, NumberClass};

/// Arithmetic that keeps the narrowest representation that is still exact.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConservativeEngine {
    /// Scale bounds for `BigDecimal`-width products and quotients.
    pub context: DecimalContext,
}

impl ConservativeEngine {
    pub fn new(context: DecimalContext) -> Self {
        Self { context }
    }
}

/// Both operands converted to a common width.
enum Operands {
    Int(i32, i32),
    Long(i64, i64),
    Float(f32, f32),
    Double(f64, f64),
    BigInt(BigInt, BigInt),
    Decimal(BigDecimal, BigDecimal),
}

/// The width a pair of numbers is computed at.
pub(crate) fn common_class(left: &Number, right: &Number) -> NumberClass {
    let (a, b) = (left.class(), right.class());
    let (wide, narrow) = if a >= b { (a, b) } else { (b, a) };
    match (wide, narrow) {
        (NumberClass::Float, NumberClass::Long) => NumberClass::Double,
        (NumberClass::BigInt, NumberClass::Float | NumberClass::Double) => NumberClass::BigDecimal,
        _ => wide,
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "f32 width is only chosen for int/float pairs"
)]
fn as_f32(n: &Number) -> f32 {
    match n {
        Number::Int(i) => *i as f32,
        Number::Float(f) => *f,
        other => other.to_f64() as f32,
    }
}

fn widen(left: &Number, right: &Number) -> Result<Operands, ArithmeticError> {
    Ok(match common_class(left, right) {
        NumberClass::Int => match (left, right) {
            (Number::Int(a), Number::Int(b)) => Operands::Int(*a, *b),
            _ => unreachable_width(left, right)?,
        },
        NumberClass::Long => match (left.to_i64(), right.to_i64()) {
            (Some(a), Some(b)) => Operands::Long(a, b),
            _ => unreachable_width(left, right)?,
        },
        NumberClass::Float => Operands::Float(as_f32(left), as_f32(right)),
        NumberClass::Double => Operands::Double(left.to_f64(), right.to_f64()),
        NumberClass::BigInt => match (left.to_bigint_exact(), right.to_bigint_exact()) {
            (Some(a), Some(b)) => Operands::BigInt(a, b),
            _ => unreachable_width(left, right)?,
        },
        NumberClass::BigDecimal => {
            Operands::Decimal(left.to_big_decimal()?, right.to_big_decimal()?)
        }
    })
}

/// Fallback for a width/representation mismatch: compute as decimals.
fn unreachable_width(left: &Number, right: &Number) -> Result<Operands, ArithmeticError> {
    Ok(Operands::Decimal(
        left.to_big_decimal()?,
        right.to_big_decimal()?,
    ))
}

fn compare_floats<T: PartialOrd>(a: T, b: T) -> Result<Ordering, ArithmeticError> {
    a.partial_cmp(&b).ok_or(ArithmeticError::Incomparable)
}

impl ArithmeticEngine for ConservativeEngine {
    fn compare(&self, left: &Number, right: &Number) -> Result<Ordering, ArithmeticError> {
        match widen(left, right)? {
            Operands::Int(a, b) => Ok(a.cmp(&b)),
            Operands::Long(a, b) => Ok(a.cmp(&b)),
            Operands::Float(a, b) => compare_floats(a, b),
            Operands::Double(a, b) => compare_floats(a, b),
            Operands::BigInt(a, b) => Ok(a.cmp(&b)),
            Operands::Decimal(a, b) => Ok(a.cmp(&b)),
        }
    }

    fn add(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        Ok(match widen(left, right)? {
            Operands::Int(a, b) => {
                let sum = a.wrapping_add(b);
                // Overflow iff the sum's sign differs from both operands' signs.
                if (sum ^ a) < 0 && (sum ^ b) < 0 {
                    Number::Long(i64::from(a) + i64::from(b))
                } else {
                    Number::Int(sum)
                }
            }
            Operands::Long(a, b) => {
                let sum = a.wrapping_add(b);
                if (sum ^ a) < 0 && (sum ^ b) < 0 {
                    Number::BigInt(BigInt::from(a) + BigInt::from(b))
                } else {
                    Number::Long(sum)
                }
            }
            Operands::Float(a, b) => Number::Float(a + b),
            Operands::Double(a, b) => Number::Double(a + b),
            Operands::BigInt(a, b) => Number::BigInt(a + b),
            Operands::Decimal(a, b) => Number::Decimal(a + b),
        })
    }

    fn subtract(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        Ok(match widen(left, right)? {
            Operands::Int(a, b) => {
                let diff = a.wrapping_sub(b);
                // Overflow iff operands differ in sign and the result's sign differs from `a`.
                if (diff ^ a) < 0 && (a ^ b) < 0 {
                    Number::Long(i64::from(a) - i64::from(b))
                } else {
                    Number::Int(diff)
                }
            }
            Operands::Long(a, b) => {
                let diff = a.wrapping_sub(b);
                if (diff ^ a) < 0 && (a ^ b) < 0 {
                    Number::BigInt(BigInt::from(a) - BigInt::from(b))
                } else {
                    Number::Long(diff)
                }
            }
            Operands::Float(a, b) => Number::Float(a - b),
            Operands::Double(a, b) => Number::Double(a - b),
            Operands::BigInt(a, b) => Number::BigInt(a - b),
            Operands::Decimal(a, b) => Number::Decimal(a - b),
        })
    }

    fn multiply(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        Ok(match widen(left, right)? {
            Operands::Int(a, b) => {
                let product = i64::from(a) * i64::from(b);
                i32::try_from(product).map_or(Number::Long(product), Number::Int)
            }
            Operands::Long(a, b) => a.checked_mul(b).map_or_else(
                || Number::BigInt(BigInt::from(a) * BigInt::from(b)),
                Number::Long,
            ),
            Operands::Float(a, b) => Number::Float(a * b),
            Operands::Double(a, b) => Number::Double(a * b),
            Operands::BigInt(a, b) => Number::BigInt(a * b),
            Operands::Decimal(a, b) => Number::Decimal(self.context.multiply(&a, &b)),
        })
    }

    /// Integer division stays integral only when exact; otherwise the
    /// quotient is a `Double` (or a decimal at big-integer width).
    #[expect(
        clippy::cast_precision_loss,
        reason = "inexact long quotients are defined to be doubles"
    )]
    fn divide(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        match widen(left, right)? {
            Operands::Int(a, b) => {
                if b == 0 {
                    return Err(ArithmeticError::DivisionByZero);
                }
                let (a, b) = (i64::from(a), i64::from(b));
                if a % b == 0 {
                    let quotient = a / b;
                    Ok(i32::try_from(quotient).map_or(Number::Long(quotient), Number::Int))
                } else {
                    Ok(Number::Double(a as f64 / b as f64))
                }
            }
            Operands::Long(a, b) => {
                if b == 0 {
                    return Err(ArithmeticError::DivisionByZero);
                }
                match a.checked_rem(b) {
                    Some(0) => Ok(a.checked_div(b).map_or_else(
                        || Number::BigInt(BigInt::from(a) / BigInt::from(b)),
                        Number::Long,
                    )),
                    Some(_) => Ok(Number::Double(a as f64 / b as f64)),
                    // i64::MIN % -1: exact, but the quotient needs a big integer.
                    None => Ok(Number::BigInt(BigInt::from(a) / BigInt::from(b))),
                }
            }
            Operands::Float(a, b) => Ok(Number::Float(a / b)),
            Operands::Double(a, b) => Ok(Number::Double(a / b)),
            Operands::BigInt(a, b) => {
                if b.is_zero() {
                    return Err(ArithmeticError::DivisionByZero);
                }
                let (quotient, remainder) = a.div_rem(&b);
                if remainder.is_zero() {
                    Ok(Number::BigInt(quotient))
                } else {
                    self.context
                        .divide(&BigDecimal::new(a, 0), &BigDecimal::new(b, 0))
                        .map(Number::Decimal)
                }
            }
            Operands::Decimal(a, b) => self.context.divide(&a, &b).map(Number::Decimal),
        }
    }

    fn modulus(&self, left: &Number, right: &Number) -> Result<Number, ArithmeticError> {
        match widen(left, right)? {
            Operands::Int(a, b) => {
                if b == 0 {
                    return Err(ArithmeticError::ModulusByZero);
                }
                Ok(Number::Int(a.checked_rem(b).unwrap_or(0)))
            }
            Operands::Long(a, b) => {
                if b == 0 {
                    return Err(ArithmeticError::ModulusByZero);
                }
                Ok(Number::Long(a.checked_rem(b).unwrap_or(0)))
            }
            Operands::Float(a, b) => Ok(Number::Float(a % b)),
            Operands::Double(a, b) => Ok(Number::Double(a % b)),
            Operands::BigInt(a, b) => {
                if b.is_zero() {
                    return Err(ArithmeticError::ModulusByZero);
                }
                Ok(Number::BigInt(a % b))
            }
            Operands::Decimal(..) => Err(ArithmeticError::DecimalModulus),
        }
    }

    /// Parse as a decimal, then demote to the smallest exact representation.
    ///
    /// Zero-scale literals become `Int`/`Long`/`BigInt`; fractional literals
    /// become `Double` unless the double would be infinite.
    fn parse_literal(&self, text: &str) -> Result<Number, ArithmeticError> {
        let decimal = parse_decimal_literal(text)?;
        let scale = scale_of(&decimal);
        if scale <= 0 {
            let (digits, _) = decimal.as_bigint_and_exponent();
            return Ok(Number::from_bigint(digits * pow10(-scale)));
        }
        match decimal.to_f64() {
            Some(d) if d.is_finite() => Ok(Number::Double(d)),
            _ => Ok(Number::Decimal(decimal)),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
