//! The six numeric representations a template value can carry.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::rounding::pow10;
use crate::ArithmeticError;

/// Width class of a [`Number`], ordered from narrowest to widest.
///
/// The derived `Ord` is the widening order used by the conservative policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumberClass {
    Int,
    Long,
    Float,
    Double,
    BigInt,
    BigDecimal,
}

/// A template number.
///
/// Equality is representation-sensitive: `Int(4) != Long(4)`. Use an
/// [`ArithmeticEngine`](crate::ArithmeticEngine) to compare numerically.
#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    BigInt(BigInt),
    Decimal(BigDecimal),
}

impl Number {
    pub fn class(&self) -> NumberClass {
        match self {
            Number::Int(_) => NumberClass::Int,
            Number::Long(_) => NumberClass::Long,
            Number::Float(_) => NumberClass::Float,
            Number::Double(_) => NumberClass::Double,
            Number::BigInt(_) => NumberClass::BigInt,
            Number::Decimal(_) => NumberClass::BigDecimal,
        }
    }

    /// Smallest integer representation holding `value` exactly.
    pub fn from_bigint(value: BigInt) -> Number {
        if let Some(i) = value.to_i32() {
            Number::Int(i)
        } else if let Some(l) = value.to_i64() {
            Number::Long(l)
        } else {
            Number::BigInt(value)
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Int(i) => *i == 0,
            Number::Long(l) => *l == 0,
            Number::Float(f) => *f == 0.0,
            Number::Double(d) => *d == 0.0,
            Number::BigInt(b) => b.is_zero(),
            Number::Decimal(d) => d.is_zero(),
        }
    }

    /// Lossy conversion to `f64`.
    #[expect(
        clippy::cast_precision_loss,
        reason = "f64 view of a long is lossy by definition"
    )]
    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Int(i) => f64::from(*i),
            Number::Long(l) => *l as f64,
            Number::Float(f) => f64::from(*f),
            Number::Double(d) => *d,
            Number::BigInt(b) => b.to_f64().unwrap_or(f64::NAN),
            Number::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// `i64` view, truncating fractions; `None` if out of range or not finite.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "truncation toward zero is the documented behavior"
    )]
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(i64::from(*i)),
            Number::Long(l) => Some(*l),
            Number::Float(_) | Number::Double(_) => {
                let d = self.to_f64().trunc();
                if d.is_finite() && d >= i64::MIN as f64 && d < i64::MAX as f64 {
                    Some(d as i64)
                } else {
                    None
                }
            }
            Number::BigInt(b) => b.to_i64(),
            Number::Decimal(_) => self.truncate().ok().and_then(|b| b.to_i64()),
        }
    }

    /// Integral part as a big integer (truncated toward zero).
    pub fn truncate(&self) -> Result<BigInt, ArithmeticError> {
        match self {
            Number::Int(i) => Ok(BigInt::from(*i)),
            Number::Long(l) => Ok(BigInt::from(*l)),
            Number::BigInt(b) => Ok(b.clone()),
            Number::Float(_) | Number::Double(_) | Number::Decimal(_) => {
                let (digits, scale) = self.to_big_decimal()?.as_bigint_and_exponent();
                if scale <= 0 {
                    Ok(digits * pow10(-scale))
                } else {
                    Ok(digits / pow10(scale))
                }
            }
        }
    }

    /// Exact decimal view.
    ///
    /// Floats convert through their shortest round-trip text, so `0.1f64`
    /// becomes the decimal `0.1`, not its binary expansion.
    pub fn to_big_decimal(&self) -> Result<BigDecimal, ArithmeticError> {
        match self {
            Number::Int(i) => Ok(BigDecimal::new(BigInt::from(*i), 0)),
            Number::Long(l) => Ok(BigDecimal::new(BigInt::from(*l), 0)),
            Number::BigInt(b) => Ok(BigDecimal::new(b.clone(), 0)),
            Number::Decimal(d) => Ok(d.clone()),
            Number::Float(f) => float_to_decimal(f64::from(*f), &f.to_string()),
            Number::Double(d) => float_to_decimal(*d, &d.to_string()),
        }
    }

    /// Integer view for big-integer width; only integral classes qualify.
    pub(crate) fn to_bigint_exact(&self) -> Option<BigInt> {
        match self {
            Number::Int(i) => Some(BigInt::from(*i)),
            Number::Long(l) => Some(BigInt::from(*l)),
            Number::BigInt(b) => Some(b.clone()),
            _ => None,
        }
    }

    /// Arithmetic negation, promoting integers that can't be negated in place.
    #[must_use]
    pub fn negate(&self) -> Number {
        match self {
            Number::Int(i) => i
                .checked_neg()
                .map_or_else(|| Number::Long(-i64::from(*i)), Number::Int),
            Number::Long(l) => l
                .checked_neg()
                .map_or_else(|| Number::BigInt(-BigInt::from(*l)), Number::Long),
            Number::Float(f) => Number::Float(-f),
            Number::Double(d) => Number::Double(-d),
            Number::BigInt(b) => Number::BigInt(-b),
            Number::Decimal(d) => Number::Decimal(-d.clone()),
        }
    }
}

fn float_to_decimal(value: f64, text: &str) -> Result<BigDecimal, ArithmeticError> {
    if !value.is_finite() {
        return Err(ArithmeticError::NotFinite {
            value: text.to_string(),
        });
    }
    BigDecimal::from_str(text).map_err(|_| ArithmeticError::NotFinite {
        value: text.to_string(),
    })
}

/// Scale (digits after the point) of a decimal.
/// Largest exponent, of either sign, a number literal may carry.
pub(crate) const MAX_LITERAL_EXPONENT: u64 = 10_000;

/// Parse literal text into a decimal.
///
/// Literals whose exponent exceeds [`MAX_LITERAL_EXPONENT`] are rejected:
/// demoting or printing them expands the exponent into digits.
pub(crate) fn parse_decimal_literal(text: &str) -> Result<BigDecimal, ArithmeticError> {
    let decimal =
        BigDecimal::from_str(text.trim()).map_err(|_| ArithmeticError::MalformedLiteral {
            literal: text.to_string(),
        })?;
    if scale_of(&decimal).unsigned_abs() > MAX_LITERAL_EXPONENT {
        return Err(ArithmeticError::LiteralOutOfRange {
            literal: text.to_string(),
        });
    }
    Ok(decimal)
}

pub(crate) fn scale_of(value: &BigDecimal) -> i64 {
    value.as_bigint_and_exponent().1
}

/// Plain (never scientific) rendering of a decimal, keeping its scale.
pub(crate) fn plain_decimal(value: &BigDecimal) -> String {
    let (digits, scale) = value.as_bigint_and_exponent();
    if scale <= 0 {
        return (digits * pow10(-scale)).to_string();
    }
    let negative = digits.is_negative();
    let mut text = digits.abs().to_string();
    let scale = usize::try_from(scale).unwrap_or(usize::MAX);
    if text.len() <= scale {
        let padding = scale - text.len() + 1;
        text.insert_str(0, &"0".repeat(padding));
    }
    text.insert(text.len() - scale, '.');
    if negative {
        text.insert(0, '-');
    }
    text
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Long(l) => write!(f, "{l}"),
            Number::Float(x) => write!(f, "{x}"),
            Number::Double(x) => write!(f, "{x}"),
            Number::BigInt(b) => write!(f, "{b}"),
            Number::Decimal(d) => f.write_str(&plain_decimal(d)),
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Int(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Long(value)
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Double(value)
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number::BigInt(value)
    }
}

impl From<BigDecimal> for Number {
    fn from(value: BigDecimal) -> Self {
        Number::Decimal(value)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
