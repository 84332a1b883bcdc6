//! Instruction nodes.

use std::sync::Arc;

use crate::{Expr, Location, MacroDef, Name};

/// Where an assignment stores its value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssignTarget {
    /// Nearest scope that already declares the name, else the current namespace.
    Unqualified,
    /// Declares the name in the innermost scope.
    Block,
    /// The innermost macro frame.
    Local,
    /// The render-wide global table.
    Global,
    /// A namespace value (`assign x = 1 in lib`).
    Namespace(Expr),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub target: AssignTarget,
    pub name: Name,
    pub value: Expr,
}

#[derive(Clone, Debug)]
pub struct ConditionalBranch {
    pub condition: Expr,
    pub body: Instruction,
}

/// A `case` of a switch; `value: None` is the `default` case.
#[derive(Clone, Debug)]
pub struct Case {
    pub value: Option<Expr>,
    pub body: Instruction,
}

/// Invocation of a macro as a directive.
#[derive(Clone, Debug)]
pub struct MacroCall {
    pub callee: Expr,
    pub positional: Vec<Expr>,
    pub named: Vec<(Name, Expr)>,
    /// Content the macro may render with `nested`, in the caller's scope.
    pub nested: Option<Arc<Instruction>>,
    /// Names bound to the values a `nested` instruction passes back.
    pub loop_vars: Vec<Name>,
}

impl MacroCall {
    pub fn new(callee: Expr) -> Self {
        MacroCall {
            callee,
            positional: Vec::new(),
            named: Vec::new(),
            nested: None,
            loop_vars: Vec::new(),
        }
    }

    #[must_use]
    pub fn positional(mut self, args: Vec<Expr>) -> Self {
        self.positional = args;
        self
    }

    #[must_use]
    pub fn named(mut self, name: &str, value: Expr) -> Self {
        self.named.push((name.into(), value));
        self
    }

    #[must_use]
    pub fn nested(mut self, content: Instruction) -> Self {
        self.nested = Some(Arc::new(content));
        self
    }

    #[must_use]
    pub fn loop_vars(mut self, names: &[&str]) -> Self {
        self.loop_vars = names.iter().map(|n| Name::from(*n)).collect();
        self
    }
}

/// A node of the compiled template tree.
#[derive(Clone, Debug)]
pub enum Instruction {
    Text(Name),
    /// `${expr}`
    Interpolation(Expr),
    /// A sequence of instructions sharing the enclosing scope.
    Block(Vec<Instruction>),
    If {
        branches: Vec<ConditionalBranch>,
        otherwise: Option<Box<Instruction>>,
    },
    List {
        source: Expr,
        var: Name,
        body: Box<Instruction>,
        /// Rendered when the source is empty.
        otherwise: Option<Box<Instruction>>,
    },
    /// Cases fall through until a `Break`.
    Switch { value: Expr, cases: Vec<Case> },
    Break,
    Return(Option<Expr>),
    Assign(Assignment),
    MacroDefinition(Arc<MacroDef>),
    MacroCall(MacroCall),
    /// Render the caller-supplied content of the innermost macro call.
    Nested(Vec<Expr>),
    Attempt {
        attempt: Box<Instruction>,
        recover: Box<Instruction>,
    },
    Stop(Option<Expr>),
    Include { template: Expr, fresh_namespace: bool },
    Import {
        template: Expr,
        alias: Name,
        global: bool,
    },
    Visit { node: Expr, namespaces: Vec<Expr> },
    /// Visit the children of `node` (default: the node being visited).
    Recurse {
        node: Option<Expr>,
        namespaces: Vec<Expr>,
    },
    /// Continue the handler search for the current node after the handler
    /// that is running.
    Fallback,
    Setting { name: Name, value: Expr },
    /// Attaches a source position to errors raised by the inner instruction.
    Located {
        location: Location,
        body: Box<Instruction>,
    },
}

impl Instruction {
    pub fn text(text: &str) -> Instruction {
        Instruction::Text(text.into())
    }

    pub fn block(children: Vec<Instruction>) -> Instruction {
        Instruction::Block(children)
    }

    pub fn assign(target: AssignTarget, name: &str, value: Expr) -> Instruction {
        Instruction::Assign(Assignment {
            target,
            name: name.into(),
            value,
        })
    }

    pub fn if_else(condition: Expr, then: Instruction, otherwise: Option<Instruction>) -> Instruction {
        Instruction::If {
            branches: vec![ConditionalBranch {
                condition,
                body: then,
            }],
            otherwise: otherwise.map(Box::new),
        }
    }

    pub fn list(source: Expr, var: &str, body: Instruction) -> Instruction {
        Instruction::List {
            source,
            var: var.into(),
            body: Box::new(body),
            otherwise: None,
        }
    }

    pub fn attempt(attempt: Instruction, recover: Instruction) -> Instruction {
        Instruction::Attempt {
            attempt: Box::new(attempt),
            recover: Box::new(recover),
        }
    }

    #[must_use]
    pub fn at(self, location: Location) -> Instruction {
        Instruction::Located {
            location,
            body: Box::new(self),
        }
    }

    /// Whether executing this instruction pushes a block scope for its body.
    ///
    /// Loops and macro calls push their own specialized scopes and report
    /// `false` here.
    pub fn introduces_new_scope(&self) -> bool {
        matches!(
            self,
            Instruction::If { .. } | Instruction::Switch { .. } | Instruction::Attempt { .. }
        )
    }

    /// Short label used for diagnostic stack frames.
    pub fn label(&self) -> &'static str {
        match self {
            Instruction::Text(_) => "text",
            Instruction::Interpolation(_) => "${...}",
            Instruction::Block(_) => "block",
            Instruction::If { .. } => "#if",
            Instruction::List { .. } => "#list",
            Instruction::Switch { .. } => "#switch",
            Instruction::Break => "#break",
            Instruction::Return(_) => "#return",
            Instruction::Assign(a) => match a.target {
                AssignTarget::Unqualified | AssignTarget::Namespace(_) => "#assign",
                AssignTarget::Block => "#var",
                AssignTarget::Local => "#local",
                AssignTarget::Global => "#global",
            },
            Instruction::MacroDefinition(def) if def.is_function() => "#function",
            Instruction::MacroDefinition(_) => "#macro",
            Instruction::MacroCall(_) => "@call",
            Instruction::Nested(_) => "#nested",
            Instruction::Attempt { .. } => "#attempt",
            Instruction::Stop(_) => "#stop",
            Instruction::Include { .. } => "#include",
            Instruction::Import { .. } => "#import",
            Instruction::Visit { .. } => "#visit",
            Instruction::Recurse { .. } => "#recurse",
            Instruction::Fallback => "#fallback",
            Instruction::Setting { .. } => "#setting",
            Instruction::Located { body, .. } => body.label(),
        }
    }

    /// Top-level macro definitions, looking through plain blocks and
    /// location wrappers but not into control-flow bodies.
    pub fn top_level_definitions(&self) -> Vec<&Arc<MacroDef>> {
        fn collect<'a>(instr: &'a Instruction, out: &mut Vec<&'a Arc<MacroDef>>) {
            match instr {
                Instruction::MacroDefinition(def) => out.push(def),
                Instruction::Block(children) => {
                    for child in children {
                        collect(child, out);
                    }
                }
                Instruction::Located { body, .. } => collect(body, out),
                _ => {}
            }
        }
        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }
}
