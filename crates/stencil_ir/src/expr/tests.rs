use super::*;
use pretty_assertions::assert_eq;

#[test]
fn display_reconstructs_source() {
    let expr = Expr::binary(
        BinaryOp::Add,
        Expr::var("user").dot("age"),
        Expr::number("1"),
    );
    assert_eq!(expr.to_string(), "user.age + 1");

    let expr = Expr::var("items").index(Expr::number("0")).or_default(Some(Expr::str("none")));
    assert_eq!(expr.to_string(), "items[0]!\"none\"");

    let expr = Expr::var("fmt").call(vec![Expr::var("x"), Expr::bool(true)]);
    assert_eq!(expr.to_string(), "fmt(x, true)");
}

#[test]
fn display_collections_and_specials() {
    let expr = Expr::Sequence(vec![Expr::number("1"), Expr::number("2")]);
    assert_eq!(expr.to_string(), "[1, 2]");

    let expr = Expr::Hash(vec![(Expr::str("a"), Expr::number("1"))]);
    assert_eq!(expr.to_string(), "{\"a\": 1}");

    assert_eq!(Expr::Special(SpecialVariable::Error).to_string(), ".error");
    assert_eq!(Expr::var("x").exists().to_string(), "x??");
    assert_eq!(
        Expr::unary(UnaryOp::Not, Expr::var("ok")).to_string(),
        "!ok"
    );
}

#[test]
fn comparison_operators() {
    assert!(BinaryOp::LtEq.is_comparison());
    assert!(!BinaryOp::And.is_comparison());
    assert!(!BinaryOp::Mod.is_comparison());
}
