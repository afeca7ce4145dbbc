use thiserror::Error;

use crate::domain::ast::{ExprId, StmtId};
use crate::domain::symbol_table::ScopeId;

pub type Result<T> = std::result::Result<T, AstError>;

/// Errors reported while building or querying the tree.
///
/// None of these are fatal on their own; the caller decides whether to
/// abort the enclosing scope or record the error and continue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AstError {
    #[error("duplicate symbol '{name}' in scope {scope} (first declared on line {previous_line})")]
    DuplicateSymbol {
        name: String,
        scope: ScopeId,
        previous_line: u32,
    },
    #[error("undefined symbol '{name}' (searched from scope {scope})")]
    UndefinedSymbol { name: String, scope: ScopeId },
    #[error("missing expression: {context}")]
    MissingExpression { context: &'static str },
    #[error("missing statement: {context}")]
    MissingStatement { context: &'static str },
    #[error("expression {expr} carries the invalid type tag ({context})")]
    TypeTagInvalid { expr: ExprId, context: &'static str },
    #[error("expression {expr} has no resolved type ({context})")]
    UnresolvedType { expr: ExprId, context: &'static str },
    #[error("expression {expr} is already resolved to {current}")]
    TypeAlreadyResolved { expr: ExprId, current: String },
    #[error("unknown scope {0}")]
    UnknownScope(ScopeId),
    #[error("unknown {kind} node #{index}")]
    UnknownNode { kind: &'static str, index: u32 },
    #[error("{kind} node #{index} is already linked into a parent")]
    AlreadyLinked { kind: &'static str, index: u32 },
    #[error("statement {0} is not a code block")]
    NotACodeBlock(StmtId),
    #[error("statement {0} is not a function declaration")]
    NotAFunction(StmtId),
    #[error("statement {0} is not a conditional")]
    NotAConditional(StmtId),
    #[error("entry point conflict: '{candidate}' cannot replace '{existing}'")]
    EntryPointConflict { existing: String, candidate: String },
    #[error("malformed tree: {0}")]
    Malformed(String),
}

impl AstError {
    /// Short classification string used in log fields.
    pub fn category(&self) -> &'static str {
        match self {
            AstError::DuplicateSymbol { .. } | AstError::UndefinedSymbol { .. } => "symbol",
            AstError::MissingExpression { .. } | AstError::MissingStatement { .. } => "missing-child",
            AstError::TypeTagInvalid { .. }
            | AstError::UnresolvedType { .. }
            | AstError::TypeAlreadyResolved { .. } => "type-tag",
            AstError::UnknownScope(_)
            | AstError::UnknownNode { .. }
            | AstError::AlreadyLinked { .. }
            | AstError::Malformed(_) => "structure",
            AstError::NotACodeBlock(_)
            | AstError::NotAFunction(_)
            | AstError::NotAConditional(_)
            | AstError::EntryPointConflict { .. } => "shape",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_and_categories() {
        let err = AstError::DuplicateSymbol {
            name: "x".to_string(),
            scope: ScopeId::GLOBAL,
            previous_line: 3,
        };
        assert_eq!(err.category(), "symbol");
        assert!(err.to_string().contains("'x'"));
        assert!(err.to_string().contains("line 3"));

        let err = AstError::MissingExpression { context: "return value" };
        assert_eq!(err.category(), "missing-child");
        assert_eq!(err.to_string(), "missing expression: return value");
    }
}
