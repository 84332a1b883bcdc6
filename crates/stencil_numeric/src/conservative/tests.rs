use std::str::FromStr;

use super::*;
use pretty_assertions::assert_eq;

fn engine() -> ConservativeEngine {
    ConservativeEngine::default()
}

#[test]
fn common_class_overrides() {
    assert_eq!(
        common_class(&Number::Float(1.0), &Number::Long(1)),
        NumberClass::Double
    );
    assert_eq!(
        common_class(&Number::BigInt(BigInt::from(1)), &Number::Double(0.5)),
        NumberClass::BigDecimal
    );
    assert_eq!(
        common_class(&Number::Int(1), &Number::Float(1.0)),
        NumberClass::Float
    );
    assert_eq!(
        common_class(&Number::Long(1), &Number::BigInt(BigInt::from(2))),
        NumberClass::BigInt
    );
}

#[test]
fn int_add_overflow_promotes_to_long() {
    let sum = engine()
        .add(&Number::Int(i32::MAX), &Number::Int(1))
        .unwrap();
    assert_eq!(sum, Number::Long(2_147_483_648));
}

#[test]
fn long_add_overflow_promotes_to_bigint() {
    let sum = engine()
        .add(&Number::Long(i64::MAX), &Number::Int(1))
        .unwrap();
    assert_eq!(sum, Number::BigInt(BigInt::from(i64::MAX) + BigInt::from(1)));
}

#[test]
fn subtract_overflow_promotes() {
    assert_eq!(
        engine()
            .subtract(&Number::Int(i32::MIN), &Number::Int(1))
            .unwrap(),
        Number::Long(i64::from(i32::MIN) - 1)
    );
    assert_eq!(
        engine().subtract(&Number::Int(5), &Number::Int(7)).unwrap(),
        Number::Int(-2)
    );
}

#[test]
fn multiply_overflow_promotes() {
    assert_eq!(
        engine()
            .multiply(&Number::Int(65_536), &Number::Int(65_536))
            .unwrap(),
        Number::Long(4_294_967_296)
    );
    assert_eq!(
        engine()
            .multiply(&Number::Long(i64::MAX), &Number::Int(2))
            .unwrap(),
        Number::BigInt(BigInt::from(i64::MAX) * BigInt::from(2))
    );
}

#[test]
fn integer_division_exact_or_double() {
    let e = engine();
    assert_eq!(
        e.divide(&Number::Int(7), &Number::Int(2)).unwrap(),
        Number::Double(3.5)
    );
    assert_eq!(
        e.divide(&Number::Int(8), &Number::Int(2)).unwrap(),
        Number::Int(4)
    );
    assert_eq!(
        e.divide(&Number::Long(10), &Number::Int(5)).unwrap(),
        Number::Long(2)
    );
    assert_eq!(
        e.divide(&Number::Int(i32::MIN), &Number::Int(-1)).unwrap(),
        Number::Long(2_147_483_648)
    );
    assert_eq!(
        e.divide(&Number::Int(1), &Number::Int(0)),
        Err(ArithmeticError::DivisionByZero)
    );
}

#[test]
fn float_division_by_zero_is_ieee() {
    let q = engine()
        .divide(&Number::Double(1.0), &Number::Int(0))
        .unwrap();
    assert_eq!(q, Number::Double(f64::INFINITY));
}

#[test]
fn bigint_inexact_division_yields_decimal() {
    let big = BigInt::from(i64::MAX) * BigInt::from(10);
    let q = engine()
        .divide(&Number::BigInt(big), &Number::BigInt(BigInt::from(4)))
        .unwrap();
    assert_eq!(q.class(), NumberClass::BigDecimal);
}

#[test]
fn modulus_rules() {
    let e = engine();
    assert_eq!(
        e.modulus(&Number::Int(-7), &Number::Int(3)).unwrap(),
        Number::Int(-1)
    );
    assert_eq!(
        e.modulus(&Number::Int(i32::MIN), &Number::Int(-1)).unwrap(),
        Number::Int(0)
    );
    assert_eq!(
        e.modulus(&Number::Int(1), &Number::Int(0)),
        Err(ArithmeticError::ModulusByZero)
    );
    let d = Number::Decimal(BigDecimal::from_str("1.5").unwrap());
    assert_eq!(
        e.modulus(&d, &Number::Int(1)),
        Err(ArithmeticError::DecimalModulus)
    );
}

#[test]
fn compare_across_widths() {
    let e = engine();
    assert_eq!(
        e.compare(&Number::Int(3), &Number::Double(2.5)).unwrap(),
        Ordering::Greater
    );
    assert_eq!(
        e.compare(&Number::Long(5), &Number::BigInt(BigInt::from(5)))
            .unwrap(),
        Ordering::Equal
    );
    assert_eq!(
        e.compare(&Number::Double(f64::NAN), &Number::Int(1)),
        Err(ArithmeticError::Incomparable)
    );
}

#[test]
fn literals_demote_to_smallest_exact_type() {
    let e = engine();
    assert_eq!(e.parse_literal("42").unwrap(), Number::Int(42));
    assert_eq!(
        e.parse_literal("3000000000").unwrap(),
        Number::Long(3_000_000_000)
    );
    assert_eq!(
        e.parse_literal("99999999999999999999").unwrap().class(),
        NumberClass::BigInt
    );
    assert_eq!(e.parse_literal("1e3").unwrap(), Number::Int(1000));
    assert_eq!(e.parse_literal("2.5").unwrap(), Number::Double(2.5));
    assert_eq!(e.parse_literal("1e400").unwrap().class(), NumberClass::BigInt);
    assert_eq!(
        e.parse_literal("1.5e400").unwrap().class(),
        NumberClass::BigInt
    );
}

#[test]
fn fractional_literal_too_large_for_double_stays_decimal() {
    let text = format!("{}.5", "9".repeat(400));
    assert_eq!(
        engine().parse_literal(&text).unwrap().class(),
        NumberClass::BigDecimal
    );
}

#[test]
fn literal_exponents_are_bounded() {
    let e = engine();
    assert_eq!(
        e.parse_literal("1e10000").unwrap().class(),
        NumberClass::BigInt
    );
    assert_eq!(
        e.parse_literal("1e999999999"),
        Err(ArithmeticError::LiteralOutOfRange {
            literal: "1e999999999".to_string()
        })
    );
    assert!(matches!(
        e.parse_literal("1e-999999999"),
        Err(ArithmeticError::LiteralOutOfRange { .. })
    ));
}
