//! Conditionals, loops and switches.

use stencil_ir::{BinaryOp, Case, ConditionalBranch, Expr, Instruction, Name};
use stencil_value::{type_mismatch, undefined_variable, RenderResult};

use super::{Flow, Renderer};
use crate::environment::{LoopState, ScopeKind};

impl Renderer {
    pub(crate) fn exec_if(
        &mut self,
        branches: &[ConditionalBranch],
        otherwise: Option<&Instruction>,
    ) -> RenderResult<Flow> {
        for branch in branches {
            if self.eval_bool(&branch.condition)? {
                return self.execute(&branch.body);
            }
        }
        match otherwise {
            Some(body) => self.execute(body),
            None => Ok(Flow::Normal),
        }
    }

    /// Iterate a sequence in a loop scope that republishes the loop
    /// variable, `<var>_index` and `<var>_has_next` each iteration.
    pub(crate) fn exec_list(
        &mut self,
        source: &Expr,
        var: &Name,
        body: &Instruction,
        otherwise: Option<&Instruction>,
    ) -> RenderResult<Flow> {
        let items = self.eval(source)?;
        let Some(len) = items.seq_len() else {
            return Err(type_mismatch("sequence", items.type_name()));
        };
        if len == 0 {
            return match otherwise {
                Some(body) => self.execute(body),
                None => Ok(Flow::Normal),
            };
        }

        let mut scoped = self.scoped(ScopeKind::Loop(LoopState {
            var: Name::clone(var),
        }));
        let scope = scoped.current_scope;
        for index in 0..len {
            let item = items
                .get_index(index)
                .ok_or_else(|| undefined_variable(&format!("{source}[{index}]")))?;
            scoped
                .scopes
                .publish_iteration(scope, item, index, index + 1 < len);
            match scoped.execute(body)? {
                Flow::Normal => {}
                Flow::Break => break,
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
        Ok(Flow::Normal)
    }

    /// Jump to the first matching case (or the default) and fall through
    /// until a `break`.
    pub(crate) fn exec_switch(&mut self, value: &Expr, cases: &[Case]) -> RenderResult<Flow> {
        let value = self.eval(value)?;
        let mut start = None;
        for (i, case) in cases.iter().enumerate() {
            let Some(candidate) = &case.value else {
                continue;
            };
            let candidate = self.eval(candidate)?;
            if self.compare_values(BinaryOp::Eq, &value, &candidate)? {
                start = Some(i);
                break;
            }
        }
        let Some(start) = start.or_else(|| cases.iter().position(|c| c.value.is_none())) else {
            return Ok(Flow::Normal);
        };
        for case in &cases[start..] {
            match self.execute(&case.body)? {
                Flow::Normal => {}
                Flow::Break => return Ok(Flow::Normal),
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
        Ok(Flow::Normal)
    }
}
