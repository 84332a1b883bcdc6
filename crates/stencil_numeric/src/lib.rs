//! Numeric coercion for the stencil template engine.
//!
//! Template values arrive from heterogeneous sources (literals, host data,
//! results of earlier operations), so a binary operation may see any mix of
//! the six numeric representations in [`Number`]. This crate decides how such
//! a pair is coerced and computed.
//!
//! Two policies implement [`ArithmeticEngine`]:
//!
//! - [`DecimalEngine`]: every operand becomes an arbitrary-precision decimal.
//!   Exact add/subtract/multiply, scale-bounded multiply and divide.
//! - [`ConservativeEngine`]: operands are widened only as far as needed, and
//!   integer results are promoted on overflow (`i32` -> `i64` -> big integer).
//!
//! [`ArithmeticPolicy`] selects between them with enum dispatch so the choice
//! can live in render settings.

mod conservative;
mod decimal;
mod error;
mod number;
mod policy;
mod rounding;

pub use conservative::ConservativeEngine;
pub use decimal::DecimalEngine;
pub use error::ArithmeticError;
pub use number::{Number, NumberClass};
pub use policy::{ArithmeticEngine, ArithmeticOp, ArithmeticPolicy};
pub use rounding::{rescale, DecimalContext, RoundingMode};

// Re-export the big-number types so dependents don't need direct deps.
pub use bigdecimal::BigDecimal;
pub use num_bigint::BigInt;
