//! Property-based tests for the arithmetic policies.
//!
//! Integer results from the conservative policy are checked against
//! big-integer ground truth, and decimal quotients against the scale rule.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::uninlined_format_args,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use stencil_numeric::{
    ArithmeticEngine, ArithmeticOp, BigDecimal, BigInt, ConservativeEngine, DecimalEngine, Number,
    NumberClass,
};

fn exact(op: ArithmeticOp, a: i64, b: i64) -> BigInt {
    let (a, b) = (BigInt::from(a), BigInt::from(b));
    match op {
        ArithmeticOp::Add => a + b,
        ArithmeticOp::Subtract => a - b,
        ArithmeticOp::Multiply => a * b,
        ArithmeticOp::Divide | ArithmeticOp::Modulus => unreachable!("not an exact ring op"),
    }
}

fn ring_op() -> impl Strategy<Value = ArithmeticOp> {
    prop_oneof![
        Just(ArithmeticOp::Add),
        Just(ArithmeticOp::Subtract),
        Just(ArithmeticOp::Multiply),
    ]
}

fn decimal_with_scale() -> impl Strategy<Value = BigDecimal> {
    (1i64..1_000_000, 0i64..20).prop_map(|(digits, scale)| BigDecimal::new(BigInt::from(digits), scale))
}

proptest! {
    #[test]
    fn conservative_long_ops_never_lose_digits(a in any::<i64>(), b in any::<i64>(), op in ring_op()) {
        let result = ConservativeEngine::default()
            .apply(op, &Number::Long(a), &Number::Long(b))
            .unwrap();
        prop_assert!(result.class() <= NumberClass::BigInt);
        prop_assert_eq!(result.truncate().unwrap(), exact(op, a, b));
    }

    #[test]
    fn conservative_int_ops_stay_narrow_unless_overflowing(
        a in any::<i32>(),
        b in any::<i32>(),
        op in ring_op(),
    ) {
        let result = ConservativeEngine::default()
            .apply(op, &Number::Int(a), &Number::Int(b))
            .unwrap();
        let expected = exact(op, i64::from(a), i64::from(b));
        let fits_int = i32::try_from(expected.clone()).is_ok();
        prop_assert_eq!(result.class() == NumberClass::Int, fits_int);
        prop_assert_eq!(result.truncate().unwrap(), expected);
    }

    #[test]
    fn conservative_int_division_is_integral_iff_exact(a in any::<i32>(), b in any::<i32>()) {
        prop_assume!(b != 0);
        let quotient = ConservativeEngine::default()
            .divide(&Number::Int(a), &Number::Int(b))
            .unwrap();
        let exact = i64::from(a) % i64::from(b) == 0;
        prop_assert_eq!(quotient.class() == NumberClass::Double, !exact);
    }

    #[test]
    fn decimal_quotient_scale_is_bounded_below(left in decimal_with_scale(), right in decimal_with_scale()) {
        let expected = left
            .as_bigint_and_exponent()
            .1
            .max(right.as_bigint_and_exponent().1)
            .max(12);
        let quotient = DecimalEngine::default()
            .divide(&Number::Decimal(left), &Number::Decimal(right))
            .unwrap();
        let Number::Decimal(quotient) = quotient else {
            panic!("decimal policy produced {quotient:?}");
        };
        prop_assert_eq!(quotient.as_bigint_and_exponent().1, expected);
    }

    #[test]
    fn decimal_add_is_exact(a in any::<i64>(), b in any::<i64>()) {
        let sum = DecimalEngine::default()
            .add(&Number::Long(a), &Number::Long(b))
            .unwrap();
        prop_assert_eq!(sum.truncate().unwrap(), BigInt::from(a) + BigInt::from(b));
    }
}
