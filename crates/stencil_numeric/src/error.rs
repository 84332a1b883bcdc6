//! Arithmetic failures.

/// Error produced by an [`ArithmeticEngine`](crate::ArithmeticEngine) operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulus by zero")]
    ModulusByZero,
    /// The conservative policy has no remainder for decimal-width operands.
    #[error("can't calculate remainder on arbitrary-precision decimals")]
    DecimalModulus,
    #[error("{value} is not a finite number and can't be used in exact arithmetic")]
    NotFinite { value: String },
    #[error("malformed number literal: {literal:?}")]
    MalformedLiteral { literal: String },
    #[error("number literal {literal:?} has an exponent out of range")]
    LiteralOutOfRange { literal: String },
    #[error("NaN can't be compared")]
    Incomparable,
}
