use super::*;
use pretty_assertions::assert_eq;

#[test]
fn classes_are_ordered_by_width() {
    assert!(NumberClass::Int < NumberClass::Long);
    assert!(NumberClass::Long < NumberClass::Float);
    assert!(NumberClass::Double < NumberClass::BigInt);
    assert!(NumberClass::BigInt < NumberClass::BigDecimal);
}

#[test]
fn from_bigint_picks_narrowest_integer() {
    assert_eq!(Number::from_bigint(BigInt::from(7)), Number::Int(7));
    assert_eq!(
        Number::from_bigint(BigInt::from(i64::from(i32::MAX) + 1)),
        Number::Long(2_147_483_648)
    );
    let huge = BigInt::from(i64::MAX) * BigInt::from(4);
    assert_eq!(Number::from_bigint(huge.clone()), Number::BigInt(huge));
}

#[test]
fn equality_is_representation_sensitive() {
    assert_ne!(Number::Int(4), Number::Long(4));
    assert_eq!(Number::Long(4), Number::Long(4));
}

#[test]
fn decimal_display_is_plain() {
    let d = BigDecimal::new(BigInt::from(5), 3);
    assert_eq!(Number::Decimal(d).to_string(), "0.005");
    let d = BigDecimal::new(BigInt::from(-12345), 2);
    assert_eq!(Number::Decimal(d).to_string(), "-123.45");
    let d = BigDecimal::new(BigInt::from(12), -3);
    assert_eq!(Number::Decimal(d).to_string(), "12000");
}

#[test]
fn double_display_drops_integral_fraction() {
    assert_eq!(Number::Double(3.5).to_string(), "3.5");
    assert_eq!(Number::Double(4.0).to_string(), "4");
}

#[test]
fn floats_convert_through_shortest_text() {
    let d = Number::Double(0.1).to_big_decimal().unwrap();
    assert_eq!(plain_decimal(&d), "0.1");
}

#[test]
fn non_finite_floats_have_no_decimal_view() {
    assert!(matches!(
        Number::Double(f64::INFINITY).to_big_decimal(),
        Err(ArithmeticError::NotFinite { .. })
    ));
    assert!(Number::Double(f64::NAN).to_big_decimal().is_err());
}

#[test]
fn truncate_drops_fraction_toward_zero() {
    assert_eq!(Number::Double(-5.75).truncate().unwrap(), BigInt::from(-5));
    let d = BigDecimal::new(BigInt::from(1999), 2);
    assert_eq!(Number::Decimal(d).truncate().unwrap(), BigInt::from(19));
}

#[test]
fn negate_promotes_minimum_values() {
    assert_eq!(Number::Int(i32::MIN).negate(), Number::Long(2_147_483_648));
    assert_eq!(
        Number::Long(i64::MIN).negate(),
        Number::BigInt(-BigInt::from(i64::MIN))
    );
    assert_eq!(Number::Int(3).negate(), Number::Int(-3));
}

#[test]
fn to_i64_rejects_out_of_range_doubles() {
    assert_eq!(Number::Double(42.9).to_i64(), Some(42));
    assert_eq!(Number::Double(1e300).to_i64(), None);
    assert_eq!(Number::Double(f64::NAN).to_i64(), None);
}
