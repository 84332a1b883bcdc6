//! Scale control for decimal results.
//!
//! All rounding is done on the unscaled big-integer digits so results are
//! exact up to the single, explicit rounding step.

use std::cmp::Ordering;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::ArithmeticError;

/// How to discard digits beyond the target scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    /// Away from zero.
    Up,
    /// Toward zero.
    Down,
    /// Toward positive infinity.
    Ceiling,
    /// Toward negative infinity.
    Floor,
    /// Nearest neighbor, ties away from zero.
    #[default]
    HalfUp,
    /// Nearest neighbor, ties toward zero.
    HalfDown,
    /// Nearest neighbor, ties to the even neighbor.
    HalfEven,
}

/// Scale bounds shared by both arithmetic policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecimalContext {
    /// Lower bound on the scale of a quotient.
    pub min_scale: i64,
    /// Upper bound on the scale of a product.
    pub max_scale: i64,
    pub rounding: RoundingMode,
}

impl Default for DecimalContext {
    fn default() -> Self {
        Self {
            min_scale: 12,
            max_scale: 12,
            rounding: RoundingMode::HalfUp,
        }
    }
}

impl DecimalContext {
    /// Product with its scale clamped to `max_scale`.
    pub(crate) fn multiply(&self, left: &BigDecimal, right: &BigDecimal) -> BigDecimal {
        let product = left * right;
        if crate::number::scale_of(&product) > self.max_scale {
            rescale(&product, self.max_scale, self.rounding)
        } else {
            product
        }
    }

    /// Quotient at scale `max(left.scale, right.scale, min_scale)`.
    pub(crate) fn divide(
        &self,
        left: &BigDecimal,
        right: &BigDecimal,
    ) -> Result<BigDecimal, ArithmeticError> {
        let scale = crate::number::scale_of(left)
            .max(crate::number::scale_of(right))
            .max(self.min_scale);
        divide_to_scale(left, right, scale, self.rounding)
    }
}

/// `10^exp`; negative exponents are treated as zero.
pub(crate) fn pow10(exp: i64) -> BigInt {
    let exp = usize::try_from(exp).unwrap_or(0);
    num_traits::pow::pow(BigInt::from(10u8), exp)
}

/// Apply `mode` to a truncated quotient given its remainder.
fn round_quotient(
    quotient: BigInt,
    remainder: &BigInt,
    divisor: &BigInt,
    negative: bool,
    mode: RoundingMode,
) -> BigInt {
    if remainder.is_zero() {
        return quotient;
    }
    let twice_remainder = remainder.abs() * BigInt::from(2u8);
    let half = twice_remainder.cmp(&divisor.abs());
    let away_from_zero = match mode {
        RoundingMode::Up => true,
        RoundingMode::Down => false,
        RoundingMode::Ceiling => !negative,
        RoundingMode::Floor => negative,
        RoundingMode::HalfUp => half != Ordering::Less,
        RoundingMode::HalfDown => half == Ordering::Greater,
        RoundingMode::HalfEven => match half {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => quotient.is_odd(),
        },
    };
    if !away_from_zero {
        quotient
    } else if negative {
        quotient - BigInt::from(1u8)
    } else {
        quotient + BigInt::from(1u8)
    }
}

/// Re-express `value` at exactly `scale` digits after the point.
pub fn rescale(value: &BigDecimal, scale: i64, mode: RoundingMode) -> BigDecimal {
    let (digits, current) = value.as_bigint_and_exponent();
    if current <= scale {
        return BigDecimal::new(digits * pow10(scale - current), scale);
    }
    let divisor = pow10(current - scale);
    let negative = digits.is_negative();
    let (quotient, remainder) = digits.div_rem(&divisor);
    BigDecimal::new(
        round_quotient(quotient, &remainder, &divisor, negative, mode),
        scale,
    )
}

/// `left / right` rounded to exactly `scale` digits after the point.
pub(crate) fn divide_to_scale(
    left: &BigDecimal,
    right: &BigDecimal,
    scale: i64,
    mode: RoundingMode,
) -> Result<BigDecimal, ArithmeticError> {
    let (a, a_scale) = left.as_bigint_and_exponent();
    let (b, b_scale) = right.as_bigint_and_exponent();
    if b.is_zero() {
        return Err(ArithmeticError::DivisionByZero);
    }
    // left / right * 10^scale == a * 10^(scale + b_scale - a_scale) / b
    let shift = scale + b_scale - a_scale;
    let (numerator, denominator) = if shift >= 0 {
        (a * pow10(shift), b)
    } else {
        (a, b * pow10(-shift))
    };
    let negative = numerator.is_negative() != denominator.is_negative();
    let (quotient, remainder) = numerator.div_rem(&denominator);
    Ok(BigDecimal::new(
        round_quotient(quotient, &remainder, &denominator, negative, mode),
        scale,
    ))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
