//! Macro and function definitions.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::{Expr, Instruction, Name};

/// Process-unique identity of a macro definition.
///
/// The renderer keys its active-frame map by this id, so two definitions
/// with the same name (in different templates) never share frames.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacroId(u32);

impl MacroId {
    fn fresh() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        MacroId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MacroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "macro#{}", self.0)
    }
}

/// Whether a definition is called as a directive or from an expression.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MacroKind {
    /// Writes to the output; `return` carries no value.
    Macro,
    /// Output is discarded; must `return` a value.
    Function,
}

/// A declared parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MacroParam {
    pub name: Name,
    /// Evaluated inside the new frame, so it may refer to earlier parameters.
    pub default: Option<Expr>,
}

impl MacroParam {
    pub fn required(name: &str) -> Self {
        MacroParam {
            name: name.into(),
            default: None,
        }
    }

    pub fn optional(name: &str, default: Expr) -> Self {
        MacroParam {
            name: name.into(),
            default: Some(default),
        }
    }
}

/// A macro or function definition.
#[derive(Debug)]
pub struct MacroDef {
    id: MacroId,
    pub name: Name,
    pub kind: MacroKind,
    pub params: Vec<MacroParam>,
    /// Receives arguments that match no declared parameter.
    pub catch_all: Option<Name>,
    pub body: Instruction,
}

impl MacroDef {
    pub fn new(
        name: &str,
        kind: MacroKind,
        params: Vec<MacroParam>,
        catch_all: Option<&str>,
        body: Instruction,
    ) -> Self {
        MacroDef {
            id: MacroId::fresh(),
            name: name.into(),
            kind,
            params,
            catch_all: catch_all.map(Name::from),
            body,
        }
    }

    #[inline]
    pub fn id(&self) -> MacroId {
        self.id
    }

    pub fn is_function(&self) -> bool {
        self.kind == MacroKind::Function
    }

    pub fn param(&self, name: &str) -> Option<&MacroParam> {
        self.params.iter().find(|p| &*p.name == name)
    }
}
