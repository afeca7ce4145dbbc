//! Program Root
//!
//! `ProgramBuilder` is the only way to construct a `Program`. The builder
//! hands out the arena for bottom-up construction; `finish` freezes it into
//! a `Program`, which exposes read access only (apart from filling
//! unresolved type slots).

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::arena::{Ast, Checkpoint};
use crate::domain::ast::{ExprId, FunctionDecl, Statement, StmtId};
use crate::domain::data_type::DataType;
use crate::domain::error::{AstError, Result};
use crate::domain::symbol_table::{ScopeId, SymbolEntry, SymbolTable};

/// Root of a finished tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    ast: Ast,
    statements: Vec<StmtId>,
    entry_point: Option<StmtId>,
}

impl Program {
    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::new()
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Top-level statements in source order.
    pub fn statements(&self) -> &[StmtId] {
        &self.statements
    }

    pub fn global_scope(&self) -> ScopeId {
        ScopeId::GLOBAL
    }

    pub fn global_symbols(&self) -> &SymbolTable {
        self.ast.scopes().global()
    }

    pub fn symbols(&self, scope: ScopeId) -> Result<&SymbolTable> {
        self.ast.scopes().table(scope)
    }

    pub fn lookup(&self, scope: ScopeId, name: &str) -> Result<&SymbolEntry> {
        self.ast.lookup(scope, name)
    }

    pub fn entry_point_id(&self) -> Option<StmtId> {
        self.entry_point
    }

    pub fn entry_point(&self) -> Option<&FunctionDecl> {
        self.entry_point.and_then(|id| self.ast.function(id).ok())
    }

    /// Top-level function declarations in source order.
    pub fn functions(&self) -> impl Iterator<Item = (StmtId, &FunctionDecl)> {
        self.statements.iter().filter_map(move |&id| match self.ast.stmt(id) {
            Some(Statement::Function(func)) => Some((id, func)),
            _ => None,
        })
    }

    /// Fill an unresolved type slot on behalf of a semantic pass.
    pub fn resolve_type(&mut self, expr: ExprId, data_type: DataType) -> Result<()> {
        self.ast.resolve_type(expr, data_type)
    }

    /// Re-check every structural invariant of the tree.
    pub fn validate(&self) -> Result<()> {
        self.ast.check(&self.statements)?;
        if let Some(entry) = self.entry_point {
            let func = self.ast.function(entry)?;
            if !func.is_entry_point || !self.statements.contains(&entry) {
                return Err(AstError::Malformed(format!(
                    "entry point {} is not a top-level entry function",
                    entry
                )));
            }
        }
        Ok(())
    }
}

/// Builder-side marker, see `ProgramBuilder::rollback`.
#[derive(Debug, Clone, Copy)]
pub struct BuilderCheckpoint {
    ast: Checkpoint,
    statements: usize,
    entry_point: Option<StmtId>,
}

/// Single-threaded, bottom-up constructor for a `Program`.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    ast: Ast,
    statements: Vec<StmtId>,
    entry_point: Option<StmtId>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_scope(&self) -> ScopeId {
        ScopeId::GLOBAL
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn ast_mut(&mut self) -> &mut Ast {
        &mut self.ast
    }

    /// Append a finished top-level statement.
    ///
    /// A function flagged as entry point becomes the program's entry point;
    /// a second one is rejected and not appended.
    pub fn push(&mut self, stmt: StmtId) -> Result<()> {
        let is_entry = matches!(
            self.ast.stmt(stmt),
            Some(Statement::Function(f)) if f.is_entry_point
        );
        if is_entry {
            self.check_entry_slot(stmt)?;
        }
        self.ast.claim_root(stmt)?;
        self.statements.push(stmt);
        if is_entry {
            self.entry_point = Some(stmt);
        }
        Ok(())
    }

    /// Designate an already appended entry function as entry point.
    pub fn set_entry_point(&mut self, stmt: StmtId) -> Result<()> {
        let func = self.ast.function(stmt)?;
        if !func.is_entry_point || !self.statements.contains(&stmt) {
            return Err(AstError::Malformed(format!(
                "'{}' is not a top-level entry function",
                func.prototype.name
            )));
        }
        self.check_entry_slot(stmt)?;
        self.entry_point = Some(stmt);
        Ok(())
    }

    fn check_entry_slot(&self, candidate: StmtId) -> Result<()> {
        match self.entry_point {
            Some(existing) if existing != candidate => {
                let name_of = |id| {
                    self.ast
                        .function(id)
                        .map(|f| f.prototype.name.clone())
                        .unwrap_or_else(|_| id.to_string())
                };
                Err(AstError::EntryPointConflict {
                    existing: name_of(existing),
                    candidate: name_of(candidate),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn checkpoint(&self) -> BuilderCheckpoint {
        BuilderCheckpoint {
            ast: self.ast.checkpoint(),
            statements: self.statements.len(),
            entry_point: self.entry_point,
        }
    }

    /// Discard everything built or appended since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: BuilderCheckpoint) {
        let cutoff = checkpoint.ast.first_discarded_stmt();
        for root in self.statements.split_off(checkpoint.statements.min(self.statements.len())) {
            if root.index() < cutoff {
                self.ast.release_root(root);
            }
        }
        self.entry_point = checkpoint.entry_point;
        self.ast.rollback(checkpoint.ast);
    }

    pub fn finish(self) -> Program {
        info!(
            statements = self.statements.len(),
            nodes = self.ast.expr_count() + self.ast.stmt_count(),
            scopes = self.ast.scopes().len(),
            "program built"
        );
        if let Some(entry) = self.entry_point {
            debug!(entry = %entry, "entry point designated");
        }
        Program {
            ast: self.ast,
            statements: self.statements,
            entry_point: self.entry_point,
        }
    }
}
