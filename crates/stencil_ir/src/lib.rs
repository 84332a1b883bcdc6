//! Stencil IR - the compiled template tree.
//!
//! This crate contains the data structures a template parser produces and
//! the renderer consumes:
//! - `Instruction` nodes (text, interpolation, control flow, macro calls)
//! - `Expr` nodes evaluated against the active scope chain
//! - `MacroDef` with a process-unique `MacroId` used for frame bookkeeping
//! - `Location` for diagnostics
//!
//! Trees are immutable once built. Subtrees that outlive a single
//! instruction (macro bodies, nested content) are shared through `Arc`.

mod expr;
mod instruction;
mod location;
mod macro_def;

pub use expr::{BinaryOp, Expr, Literal, SpecialVariable, UnaryOp};
pub use instruction::{
    AssignTarget, Assignment, Case, ConditionalBranch, Instruction, MacroCall,
};
pub use location::Location;
pub use macro_def::{MacroDef, MacroId, MacroKind, MacroParam};

/// Identifier text as it appears in the template.
///
/// Shared so values, scopes and instructions can hold the same allocation.
pub type Name = std::sync::Arc<str>;
