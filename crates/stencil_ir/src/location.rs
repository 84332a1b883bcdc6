//! Source positions for diagnostics.

use std::fmt;

use crate::Name;

/// Position of an instruction in its template.
///
/// Lines and columns are 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub template: Name,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(template: impl Into<Name>, line: u32, column: u32) -> Self {
        Location {
            template: template.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "template {:?}, line {}, column {}",
            self.template, self.line, self.column
        )
    }
}
