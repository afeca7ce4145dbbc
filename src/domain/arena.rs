//! Node Arena
//!
//! `Ast` owns every expression, statement and symbol table of one program.
//! Nodes are appended bottom-up: a child must exist before the parent that
//! links it, and a child may be linked into exactly one parent. Once linked,
//! nodes are never moved or rewired.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::ast::*;
use crate::domain::data_type::DataType;
use crate::domain::error::{AstError, Result};
use crate::domain::symbol_table::{Declaration, ScopeId, ScopeMark, ScopeTree, SymbolEntry};
use crate::domain::token::Token;

/// Position in the arena's history, see `Ast::rollback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    exprs: usize,
    stmts: usize,
    scopes: ScopeMark,
}

impl Checkpoint {
    pub(crate) fn first_discarded_stmt(&self) -> usize {
        self.stmts
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ast {
    exprs: Vec<Expression>,
    stmts: Vec<Statement>,
    // One flag per node: set once the node has a parent.
    expr_linked: Vec<bool>,
    stmt_linked: Vec<bool>,
    scopes: ScopeTree,
    // Scopes already owned by a CodeBlock.
    block_scopes: BTreeSet<ScopeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn expr(&self, id: ExprId) -> Option<&Expression> {
        self.exprs.get(id.index())
    }

    pub fn stmt(&self, id: StmtId) -> Option<&Statement> {
        self.stmts.get(id.index())
    }

    /// Resolve a required expression slot.
    pub fn require_expr(&self, slot: Option<ExprId>, context: &'static str) -> Result<&Expression> {
        slot.and_then(|id| self.expr(id))
            .ok_or(AstError::MissingExpression { context })
    }

    /// Resolve a required statement slot.
    pub fn require_stmt(&self, slot: Option<StmtId>, context: &'static str) -> Result<&Statement> {
        slot.and_then(|id| self.stmt(id))
            .ok_or(AstError::MissingStatement { context })
    }

    pub fn data_type(&self, id: ExprId) -> Option<DataType> {
        self.expr(id).map(|e| e.data_type)
    }

    /// The expression's type, failing if no concrete type is known.
    pub fn require_concrete_type(&self, id: ExprId, context: &'static str) -> Result<DataType> {
        let ty = self
            .data_type(id)
            .ok_or(AstError::UnknownNode { kind: "expression", index: id.0 })?;
        match ty {
            DataType::Unresolved => Err(AstError::UnresolvedType { expr: id, context }),
            DataType::Invalid => Err(AstError::TypeTagInvalid { expr: id, context }),
            DataType::Int
            | DataType::Float
            | DataType::Byte
            | DataType::Bool
            | DataType::Void
            | DataType::String => Ok(ty),
        }
    }

    /// Look up a statement that must be a code block.
    pub fn block(&self, id: StmtId) -> Result<&CodeBlock> {
        match self.stmt(id) {
            Some(Statement::Block(block)) => Ok(block),
            Some(_) => Err(AstError::NotACodeBlock(id)),
            None => Err(AstError::UnknownNode { kind: "statement", index: id.0 }),
        }
    }

    /// Look up a statement that must be a function declaration.
    pub fn function(&self, id: StmtId) -> Result<&FunctionDecl> {
        match self.stmt(id) {
            Some(Statement::Function(func)) => Ok(func),
            Some(_) => Err(AstError::NotAFunction(id)),
            None => Err(AstError::UnknownNode { kind: "statement", index: id.0 }),
        }
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    pub fn exprs(&self) -> impl Iterator<Item = (ExprId, &Expression)> {
        self.exprs.iter().enumerate().map(|(i, e)| (ExprId(i as u32), e))
    }

    pub fn stmts(&self) -> impl Iterator<Item = (StmtId, &Statement)> {
        self.stmts.iter().enumerate().map(|(i, s)| (StmtId(i as u32), s))
    }

    pub fn is_expr_linked(&self, id: ExprId) -> bool {
        self.expr_linked.get(id.index()).copied().unwrap_or(false)
    }

    pub fn is_stmt_linked(&self, id: StmtId) -> bool {
        self.stmt_linked.get(id.index()).copied().unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    /// Open a scope nested in `parent`, to be owned by a future `code_block`.
    pub fn open_scope(&mut self, parent: ScopeId) -> Result<ScopeId> {
        self.scopes.open(parent)
    }

    pub fn declare(&mut self, scope: ScopeId, decl: Declaration) -> Result<&SymbolEntry> {
        self.scopes.declare(scope, decl)
    }

    pub fn lookup(&self, scope: ScopeId, name: &str) -> Result<&SymbolEntry> {
        self.scopes.lookup(scope, name)
    }

    pub fn local_lookup(&self, scope: ScopeId, name: &str) -> Result<Option<&SymbolEntry>> {
        self.scopes.local_lookup(scope, name)
    }

    /// Declare every parameter of `prototype` in `scope`, normally the scope
    /// of the function body.
    pub fn declare_parameters(&mut self, scope: ScopeId, prototype: &Prototype, line: u32) -> Result<()> {
        for param in &prototype.params {
            self.scopes.declare(
                scope,
                Declaration::parameter(param.name.clone(), param.data_type, line),
            )?;
        }
        Ok(())
    }

    /// The symbol a `let` statement introduces.
    pub fn let_declaration(&self, id: StmtId) -> Result<Declaration> {
        let let_decl = match self.stmt(id) {
            Some(Statement::Let(l)) => l,
            Some(other) => {
                return Err(AstError::Malformed(format!(
                    "statement {} is a {}, not a let declaration",
                    id,
                    other.node_kind()
                )))
            }
            None => return Err(AstError::UnknownNode { kind: "statement", index: id.0 }),
        };

        let variable = self.require_expr(let_decl.variable, "let variable")?;
        let name = match &variable.kind {
            ExprKind::Variable(v) => v.name.clone(),
            ExprKind::Identifier(i) => i.name.clone(),
            _ => {
                return Err(AstError::Malformed(format!(
                    "let statement {} declares a {}",
                    id,
                    variable.node_kind()
                )))
            }
        };
        Ok(Declaration::variable(name, variable.data_type, let_decl.declared_line))
    }

    // ------------------------------------------------------------------
    // Expression construction
    // ------------------------------------------------------------------

    pub fn integer(&mut self, value: i64) -> ExprId {
        self.push_expr(ExprKind::Integer(IntegerLiteral { value }), DataType::Int)
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.push_expr(ExprKind::Float(FloatLiteral { value }), DataType::Float)
    }

    pub fn boolean(&mut self, value: bool) -> ExprId {
        self.push_expr(ExprKind::Boolean(BooleanLiteral { value }), DataType::Bool)
    }

    pub fn identifier(&mut self, name: impl Into<String>, data_type: DataType) -> ExprId {
        self.push_expr(ExprKind::Identifier(Identifier { name: name.into() }), data_type)
    }

    pub fn variable(&mut self, name: impl Into<String>, data_type: DataType) -> ExprId {
        self.push_expr(ExprKind::Variable(Variable { name: name.into() }), data_type)
    }

    pub fn binary(&mut self, op: Token, left: Option<ExprId>, right: Option<ExprId>) -> Result<ExprId> {
        self.claim(&[left, right], &[])?;
        Ok(self.push_expr(ExprKind::Binary(Binary { op, left, right }), DataType::Unresolved))
    }

    pub fn assignment(&mut self, op: Token, target: Option<ExprId>, value: Option<ExprId>) -> Result<ExprId> {
        self.claim(&[target, value], &[])?;
        Ok(self.push_expr(
            ExprKind::Assignment(Assignment { op, target, value }),
            DataType::Unresolved,
        ))
    }

    pub fn call(&mut self, name: impl Into<String>, args: Vec<Option<ExprId>>) -> Result<ExprId> {
        self.claim(&args, &[])?;
        Ok(self.push_expr(
            ExprKind::Call(FunctionCall { name: name.into(), args }),
            DataType::Unresolved,
        ))
    }

    // ------------------------------------------------------------------
    // Statement construction
    // ------------------------------------------------------------------

    pub fn expression_stmt(&mut self, token: Token, expr: Option<ExprId>) -> Result<StmtId> {
        self.claim(&[expr], &[])?;
        Ok(self.push_stmt(Statement::Expression(ExpressionStatement { token, expr })))
    }

    pub fn let_decl(
        &mut self,
        token: Token,
        variable: Option<ExprId>,
        declared_line: u32,
        initializer: Option<ExprId>,
    ) -> Result<StmtId> {
        self.claim(&[variable, initializer], &[])?;
        Ok(self.push_stmt(Statement::Let(LetDecl {
            token,
            variable,
            declared_line,
            initializer,
        })))
    }

    pub fn return_stmt(&mut self, token: Token, value: Option<ExprId>) -> Result<StmtId> {
        self.claim(&[value], &[])?;
        Ok(self.push_stmt(Statement::Return(ReturnStmt { token, value })))
    }

    pub fn conditional(
        &mut self,
        token: Token,
        condition: Option<ExprId>,
        consequence: Option<StmtId>,
        alternative: Option<StmtId>,
        parent: ScopeId,
    ) -> Result<StmtId> {
        self.scopes.table(parent)?;
        self.claim(&[condition], &[consequence, alternative])?;
        Ok(self.push_stmt(Statement::Conditional(Conditional {
            token,
            condition,
            consequence,
            alternative,
            parent,
        })))
    }

    pub fn while_loop(
        &mut self,
        token: Token,
        condition: Option<ExprId>,
        body: Option<StmtId>,
        parent: ScopeId,
    ) -> Result<StmtId> {
        self.scopes.table(parent)?;
        self.claim(&[condition], &[body])?;
        Ok(self.push_stmt(Statement::While(WhileLoop {
            token,
            condition,
            body,
            parent,
        })))
    }

    pub fn for_loop(
        &mut self,
        token: Token,
        init: Option<StmtId>,
        condition: Option<ExprId>,
        post_action: Option<ExprId>,
        body: Option<StmtId>,
        parent: ScopeId,
    ) -> Result<StmtId> {
        self.scopes.table(parent)?;
        self.claim(&[condition, post_action], &[init, body])?;
        Ok(self.push_stmt(Statement::For(ForLoop {
            token,
            init,
            condition,
            post_action,
            body,
            parent,
        })))
    }

    /// Close `scope` into a block owning `statements`.
    pub fn code_block(&mut self, scope: ScopeId, statements: Vec<StmtId>) -> Result<StmtId> {
        let table = self.scopes.table(scope)?;
        if table.is_global() {
            return Err(AstError::Malformed("the global scope cannot belong to a block".to_string()));
        }
        if self.block_scopes.contains(&scope) {
            return Err(AstError::Malformed(format!("scope {} already belongs to a block", scope)));
        }
        let slots: Vec<Option<StmtId>> = statements.iter().copied().map(Some).collect();
        self.claim(&[], &slots)?;
        self.block_scopes.insert(scope);
        Ok(self.push_stmt(Statement::Block(CodeBlock { statements, scope })))
    }

    pub fn function_decl(
        &mut self,
        is_entry_point: bool,
        prototype: Prototype,
        body: Option<StmtId>,
        parent: ScopeId,
    ) -> Result<StmtId> {
        self.scopes.table(parent)?;
        if let Some(body) = body {
            self.block(body)?;
        }
        self.claim(&[], &[body])?;
        debug!(name = %prototype.name, entry = is_entry_point, "function declared");
        Ok(self.push_stmt(Statement::Function(FunctionDecl {
            is_entry_point,
            prototype,
            body,
            parent,
        })))
    }

    // ------------------------------------------------------------------
    // Type slots
    // ------------------------------------------------------------------

    /// Fill an `Unresolved` type slot. Resolved slots are never overwritten.
    pub(crate) fn resolve_type(&mut self, id: ExprId, data_type: DataType) -> Result<()> {
        let expr = self
            .exprs
            .get_mut(id.index())
            .ok_or(AstError::UnknownNode { kind: "expression", index: id.0 })?;
        if expr.data_type != DataType::Unresolved {
            return Err(AstError::TypeAlreadyResolved {
                expr: id,
                current: expr.data_type.to_string(),
            });
        }
        expr.data_type = data_type;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Checkpoints
    // ------------------------------------------------------------------

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            exprs: self.exprs.len(),
            stmts: self.stmts.len(),
            scopes: self.scopes.mark(),
        }
    }

    /// Discard every node, scope and declaration created after `checkpoint`.
    /// Older nodes that were linked into a discarded parent become free again.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        let discarded_stmts = self.stmts.len().saturating_sub(checkpoint.stmts);
        let discarded_exprs = self.exprs.len().saturating_sub(checkpoint.exprs);

        for stmt in self.stmts.split_off(checkpoint.stmts.min(self.stmts.len())) {
            for child in stmt.expr_children().into_iter().flatten() {
                if child.index() < checkpoint.exprs {
                    self.expr_linked[child.index()] = false;
                }
            }
            for child in stmt.stmt_children().into_iter().flatten() {
                if child.index() < checkpoint.stmts {
                    self.stmt_linked[child.index()] = false;
                }
            }
            if let Statement::Block(block) = stmt {
                self.block_scopes.remove(&block.scope);
            }
        }
        for expr in self.exprs.split_off(checkpoint.exprs.min(self.exprs.len())) {
            for child in expr.children().into_iter().flatten() {
                if child.index() < checkpoint.exprs {
                    self.expr_linked[child.index()] = false;
                }
            }
        }
        self.expr_linked.truncate(self.exprs.len());
        self.stmt_linked.truncate(self.stmts.len());

        self.scopes.truncate(checkpoint.scopes);
        let live_scopes = self.scopes.len() as u32;
        self.block_scopes.retain(|s| s.0 < live_scopes);

        debug!(discarded_stmts = discarded_stmts, discarded_exprs = discarded_exprs, "rolled back arena");
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn push_expr(&mut self, kind: ExprKind, data_type: DataType) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        trace!(node = %id, "alloc expression");
        self.exprs.push(Expression { kind, data_type });
        self.expr_linked.push(false);
        id
    }

    fn push_stmt(&mut self, stmt: Statement) -> StmtId {
        let id = StmtId(self.stmts.len() as u32);
        trace!(node = %id, kind = %stmt.node_kind(), "alloc statement");
        self.stmts.push(stmt);
        self.stmt_linked.push(false);
        id
    }

    /// Link children into a new parent. Either every child is linked or,
    /// on error, none is.
    fn claim(&mut self, exprs: &[Option<ExprId>], stmts: &[Option<StmtId>]) -> Result<()> {
        let exprs: Vec<ExprId> = exprs.iter().flatten().copied().collect();
        let stmts: Vec<StmtId> = stmts.iter().flatten().copied().collect();

        for (i, id) in exprs.iter().enumerate() {
            match self.expr_linked.get(id.index()) {
                None => return Err(AstError::UnknownNode { kind: "expression", index: id.0 }),
                Some(true) => return Err(AstError::AlreadyLinked { kind: "expression", index: id.0 }),
                Some(false) if exprs[..i].contains(id) => {
                    return Err(AstError::AlreadyLinked { kind: "expression", index: id.0 })
                }
                Some(false) => {}
            }
        }
        for (i, id) in stmts.iter().enumerate() {
            match self.stmt_linked.get(id.index()) {
                None => return Err(AstError::UnknownNode { kind: "statement", index: id.0 }),
                Some(true) => return Err(AstError::AlreadyLinked { kind: "statement", index: id.0 }),
                Some(false) if stmts[..i].contains(id) => {
                    return Err(AstError::AlreadyLinked { kind: "statement", index: id.0 })
                }
                Some(false) => {}
            }
        }

        for id in exprs {
            self.expr_linked[id.index()] = true;
        }
        for id in stmts {
            self.stmt_linked[id.index()] = true;
        }
        Ok(())
    }

    /// Link a statement as a program root.
    pub(crate) fn claim_root(&mut self, id: StmtId) -> Result<()> {
        self.claim(&[], &[Some(id)])
    }

    pub(crate) fn release_root(&mut self, id: StmtId) {
        if let Some(flag) = self.stmt_linked.get_mut(id.index()) {
            *flag = false;
        }
    }

    /// Recompute ownership from the payloads and compare with the link flags.
    pub(crate) fn check(&self, roots: &[StmtId]) -> Result<()> {
        self.scopes.check()?;
        if self.expr_linked.len() != self.exprs.len() || self.stmt_linked.len() != self.stmts.len() {
            return Err(AstError::Malformed("link table out of sync".to_string()));
        }

        let mut expr_owners = vec![0u32; self.exprs.len()];
        let mut stmt_owners = vec![0u32; self.stmts.len()];
        let count_expr = |id: ExprId, owners: &mut Vec<u32>| -> Result<()> {
            let slot = owners
                .get_mut(id.index())
                .ok_or(AstError::UnknownNode { kind: "expression", index: id.0 })?;
            *slot += 1;
            Ok(())
        };

        // Children are always allocated before their parent.
        for (id, expr) in self.exprs() {
            for child in expr.children().into_iter().flatten() {
                if child >= id {
                    return Err(AstError::Malformed(format!("{} links later node {}", id, child)));
                }
                count_expr(child, &mut expr_owners)?;
            }
        }
        let mut block_scopes = BTreeSet::new();
        for (id, stmt) in self.stmts() {
            for child in stmt.expr_children().into_iter().flatten() {
                count_expr(child, &mut expr_owners)?;
            }
            for child in stmt.stmt_children().into_iter().flatten() {
                if child >= id {
                    return Err(AstError::Malformed(format!("{} links later node {}", id, child)));
                }
                let slot = stmt_owners
                    .get_mut(child.index())
                    .ok_or(AstError::UnknownNode { kind: "statement", index: child.0 })?;
                *slot += 1;
            }
            if let Some(scope) = stmt.scope() {
                self.scopes.table(scope)?;
            }
            match stmt {
                Statement::Block(block) => {
                    if block.scope == ScopeId::GLOBAL {
                        return Err(AstError::Malformed(format!(
                            "block {} claims the global scope",
                            id
                        )));
                    }
                    if !block_scopes.insert(block.scope) {
                        return Err(AstError::Malformed(format!(
                            "scope {} owned by more than one block",
                            block.scope
                        )));
                    }
                }
                Statement::Function(func) => {
                    if let Some(body) = func.body {
                        self.block(body)?;
                    }
                }
                _ => {}
            }
        }
        if block_scopes != self.block_scopes {
            return Err(AstError::Malformed("block scope registry out of sync".to_string()));
        }
        for root in roots {
            let slot = stmt_owners
                .get_mut(root.index())
                .ok_or(AstError::UnknownNode { kind: "statement", index: root.0 })?;
            *slot += 1;
        }

        for (i, owners) in expr_owners.iter().enumerate() {
            if *owners > 1 || (*owners == 1) != self.expr_linked[i] {
                return Err(AstError::Malformed(format!("expression e{} has {} owners", i, owners)));
            }
        }
        for (i, owners) in stmt_owners.iter().enumerate() {
            if *owners > 1 || (*owners == 1) != self.stmt_linked[i] {
                return Err(AstError::Malformed(format!("statement s{} has {} owners", i, owners)));
            }
        }
        Ok(())
    }
}
