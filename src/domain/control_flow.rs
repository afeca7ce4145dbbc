//! Control Flow Views
//!
//! The tree does not execute anything. These helpers expose the shape of
//! conditional chains and loops to evaluators and code generators.

use crate::domain::arena::Ast;
use crate::domain::ast::{ExprId, Statement, StmtId};
use crate::domain::error::{AstError, Result};

/// One arm of an if / else-if / else chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfArm {
    /// `None` for the terminal `else`
    pub condition: Option<ExprId>,
    pub body: Option<StmtId>,
    /// True when this is the terminal `else`
    pub is_else: bool,
}

/// Iterator over the arms of a conditional chain, outermost first.
pub struct ConditionalChain<'a> {
    ast: &'a Ast,
    next: Option<StmtId>,
}

impl<'a> ConditionalChain<'a> {
    /// Start at `head`, which must be a `Conditional`.
    pub fn new(ast: &'a Ast, head: StmtId) -> Result<Self> {
        match ast.stmt(head) {
            Some(Statement::Conditional(_)) => Ok(Self { ast, next: Some(head) }),
            Some(_) => Err(AstError::NotAConditional(head)),
            None => Err(AstError::UnknownNode { kind: "statement", index: head.0 }),
        }
    }
}

impl<'a> Iterator for ConditionalChain<'a> {
    type Item = IfArm;

    fn next(&mut self) -> Option<IfArm> {
        let current = self.next.take()?;
        match self.ast.stmt(current)? {
            Statement::Conditional(cond) => {
                self.next = cond.alternative;
                Some(IfArm {
                    condition: cond.condition,
                    body: cond.consequence,
                    is_else: false,
                })
            }
            // Anything else in alternative position is the terminal else body.
            _ => Some(IfArm {
                condition: None,
                body: Some(current),
                is_else: true,
            }),
        }
    }
}

/// Walk a conditional chain with `eval` deciding each condition.
///
/// Returns the body of the first arm whose condition holds, the terminal
/// else body if none does, or `None` when the chain has no else. Conditions
/// after the selected arm are never evaluated.
pub fn select_branch<F>(ast: &Ast, head: StmtId, mut eval: F) -> Result<Option<StmtId>>
where
    F: FnMut(&Ast, ExprId) -> Result<bool>,
{
    for arm in ConditionalChain::new(ast, head)? {
        if arm.is_else {
            return Ok(arm.body);
        }
        let condition = arm
            .condition
            .ok_or(AstError::MissingExpression { context: "if condition" })?;
        if eval(ast, condition)? {
            return arm
                .body
                .map(Some)
                .ok_or(AstError::MissingStatement { context: "if consequence" });
        }
    }
    Ok(None)
}

/// Uniform view of `WhileLoop` and `ForLoop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopParts {
    pub init: Option<StmtId>,
    pub condition: Option<ExprId>,
    pub post_action: Option<ExprId>,
    pub body: Option<StmtId>,
}

impl LoopParts {
    pub fn of(ast: &Ast, id: StmtId) -> Result<Self> {
        match ast.stmt(id) {
            Some(Statement::While(w)) => Ok(Self {
                init: None,
                condition: w.condition,
                post_action: None,
                body: w.body,
            }),
            Some(Statement::For(f)) => Ok(Self {
                init: f.init,
                condition: f.condition,
                post_action: f.post_action,
                body: f.body,
            }),
            Some(other) => Err(AstError::Malformed(format!(
                "statement {} is a {}, not a loop",
                id,
                other.node_kind()
            ))),
            None => Err(AstError::UnknownNode { kind: "statement", index: id.0 }),
        }
    }
}
