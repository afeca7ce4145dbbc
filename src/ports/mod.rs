//! Traversal contract.
//!
//! A visitor implements one method per node variant. There are no default
//! bodies: adding a variant breaks every visitor until it handles it.
//! Missing child slots are dispatched to `visit_missing_*` instead of being
//! skipped.

use crate::domain::arena::Ast;
use crate::domain::ast::*;

pub mod dot_exporter;
pub mod tree_printer;

pub trait ExprVisitor {
    type Output;

    fn visit_integer(&mut self, ast: &Ast, id: ExprId, node: &IntegerLiteral) -> Self::Output;
    fn visit_float(&mut self, ast: &Ast, id: ExprId, node: &FloatLiteral) -> Self::Output;
    fn visit_boolean(&mut self, ast: &Ast, id: ExprId, node: &BooleanLiteral) -> Self::Output;
    fn visit_identifier(&mut self, ast: &Ast, id: ExprId, node: &Identifier) -> Self::Output;
    fn visit_variable(&mut self, ast: &Ast, id: ExprId, node: &Variable) -> Self::Output;
    fn visit_binary(&mut self, ast: &Ast, id: ExprId, node: &Binary) -> Self::Output;
    fn visit_assignment(&mut self, ast: &Ast, id: ExprId, node: &Assignment) -> Self::Output;
    fn visit_call(&mut self, ast: &Ast, id: ExprId, node: &FunctionCall) -> Self::Output;
    fn visit_missing_expr(&mut self, ast: &Ast) -> Self::Output;
}

pub trait StmtVisitor {
    type Output;

    fn visit_expression_stmt(&mut self, ast: &Ast, id: StmtId, node: &ExpressionStatement) -> Self::Output;
    fn visit_let(&mut self, ast: &Ast, id: StmtId, node: &LetDecl) -> Self::Output;
    fn visit_return(&mut self, ast: &Ast, id: StmtId, node: &ReturnStmt) -> Self::Output;
    fn visit_conditional(&mut self, ast: &Ast, id: StmtId, node: &Conditional) -> Self::Output;
    fn visit_while(&mut self, ast: &Ast, id: StmtId, node: &WhileLoop) -> Self::Output;
    fn visit_for(&mut self, ast: &Ast, id: StmtId, node: &ForLoop) -> Self::Output;
    fn visit_block(&mut self, ast: &Ast, id: StmtId, node: &CodeBlock) -> Self::Output;
    fn visit_function(&mut self, ast: &Ast, id: StmtId, node: &FunctionDecl) -> Self::Output;
    fn visit_missing_stmt(&mut self, ast: &Ast) -> Self::Output;
}

/// Dispatch an expression slot to `visitor`.
pub fn walk_expr<V: ExprVisitor>(visitor: &mut V, ast: &Ast, slot: Option<ExprId>) -> V::Output {
    let Some((id, expr)) = slot.and_then(|id| ast.expr(id).map(|e| (id, e))) else {
        return visitor.visit_missing_expr(ast);
    };
    match &expr.kind {
        ExprKind::Integer(n) => visitor.visit_integer(ast, id, n),
        ExprKind::Float(n) => visitor.visit_float(ast, id, n),
        ExprKind::Boolean(n) => visitor.visit_boolean(ast, id, n),
        ExprKind::Identifier(n) => visitor.visit_identifier(ast, id, n),
        ExprKind::Variable(n) => visitor.visit_variable(ast, id, n),
        ExprKind::Binary(n) => visitor.visit_binary(ast, id, n),
        ExprKind::Assignment(n) => visitor.visit_assignment(ast, id, n),
        ExprKind::Call(n) => visitor.visit_call(ast, id, n),
    }
}

/// Dispatch a statement slot to `visitor`.
pub fn walk_stmt<V: StmtVisitor>(visitor: &mut V, ast: &Ast, slot: Option<StmtId>) -> V::Output {
    let Some((id, stmt)) = slot.and_then(|id| ast.stmt(id).map(|s| (id, s))) else {
        return visitor.visit_missing_stmt(ast);
    };
    match stmt {
        Statement::Expression(n) => visitor.visit_expression_stmt(ast, id, n),
        Statement::Let(n) => visitor.visit_let(ast, id, n),
        Statement::Return(n) => visitor.visit_return(ast, id, n),
        Statement::Conditional(n) => visitor.visit_conditional(ast, id, n),
        Statement::While(n) => visitor.visit_while(ast, id, n),
        Statement::For(n) => visitor.visit_for(ast, id, n),
        Statement::Block(n) => visitor.visit_block(ast, id, n),
        Statement::Function(n) => visitor.visit_function(ast, id, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::data_type::DataType;
    use crate::domain::symbol_table::ScopeId;
    use crate::domain::token::{Token, TokenKind};

    /// Counts nodes by family, following every child slot.
    #[derive(Default)]
    struct Counter {
        exprs: usize,
        stmts: usize,
        missing: usize,
    }

    impl ExprVisitor for Counter {
        type Output = ();

        fn visit_integer(&mut self, _: &Ast, _: ExprId, _: &IntegerLiteral) {
            self.exprs += 1;
        }
        fn visit_float(&mut self, _: &Ast, _: ExprId, _: &FloatLiteral) {
            self.exprs += 1;
        }
        fn visit_boolean(&mut self, _: &Ast, _: ExprId, _: &BooleanLiteral) {
            self.exprs += 1;
        }
        fn visit_identifier(&mut self, _: &Ast, _: ExprId, _: &Identifier) {
            self.exprs += 1;
        }
        fn visit_variable(&mut self, _: &Ast, _: ExprId, _: &Variable) {
            self.exprs += 1;
        }
        fn visit_binary(&mut self, ast: &Ast, _: ExprId, node: &Binary) {
            self.exprs += 1;
            walk_expr(self, ast, node.left);
            walk_expr(self, ast, node.right);
        }
        fn visit_assignment(&mut self, ast: &Ast, _: ExprId, node: &Assignment) {
            self.exprs += 1;
            walk_expr(self, ast, node.target);
            walk_expr(self, ast, node.value);
        }
        fn visit_call(&mut self, ast: &Ast, _: ExprId, node: &FunctionCall) {
            self.exprs += 1;
            for arg in &node.args {
                walk_expr(self, ast, *arg);
            }
        }
        fn visit_missing_expr(&mut self, _: &Ast) {
            self.missing += 1;
        }
    }

    impl StmtVisitor for Counter {
        type Output = ();

        fn visit_expression_stmt(&mut self, ast: &Ast, _: StmtId, node: &ExpressionStatement) {
            self.stmts += 1;
            walk_expr(self, ast, node.expr);
        }
        fn visit_let(&mut self, ast: &Ast, _: StmtId, node: &LetDecl) {
            self.stmts += 1;
            walk_expr(self, ast, node.variable);
            walk_expr(self, ast, node.initializer);
        }
        fn visit_return(&mut self, ast: &Ast, _: StmtId, node: &ReturnStmt) {
            self.stmts += 1;
            walk_expr(self, ast, node.value);
        }
        fn visit_conditional(&mut self, ast: &Ast, _: StmtId, node: &Conditional) {
            self.stmts += 1;
            walk_expr(self, ast, node.condition);
            walk_stmt(self, ast, node.consequence);
            if node.alternative.is_some() {
                walk_stmt(self, ast, node.alternative);
            }
        }
        fn visit_while(&mut self, ast: &Ast, _: StmtId, node: &WhileLoop) {
            self.stmts += 1;
            walk_expr(self, ast, node.condition);
            walk_stmt(self, ast, node.body);
        }
        fn visit_for(&mut self, ast: &Ast, _: StmtId, node: &ForLoop) {
            self.stmts += 1;
            walk_stmt(self, ast, node.init);
            walk_expr(self, ast, node.condition);
            walk_expr(self, ast, node.post_action);
            walk_stmt(self, ast, node.body);
        }
        fn visit_block(&mut self, ast: &Ast, _: StmtId, node: &CodeBlock) {
            self.stmts += 1;
            for stmt in &node.statements {
                walk_stmt(self, ast, Some(*stmt));
            }
        }
        fn visit_function(&mut self, ast: &Ast, _: StmtId, node: &FunctionDecl) {
            self.stmts += 1;
            walk_stmt(self, ast, node.body);
        }
        fn visit_missing_stmt(&mut self, _: &Ast) {
            self.missing += 1;
        }
    }

    #[test]
    fn test_walk_reaches_every_node() {
        let mut ast = Ast::new();
        let x = ast.variable("x", DataType::Int);
        let one = ast.integer(1);
        let sum = ast
            .binary(Token::synthetic(TokenKind::Plus, "+"), Some(x), Some(one))
            .unwrap();
        let ret = ast
            .return_stmt(Token::synthetic(TokenKind::Return, "return"), Some(sum))
            .unwrap();
        let broken = ast
            .expression_stmt(Token::synthetic(TokenKind::Ident, "f"), None)
            .unwrap();
        let scope = ast.open_scope(ScopeId::GLOBAL).unwrap();
        let block = ast.code_block(scope, vec![ret, broken]).unwrap();

        let mut counter = Counter::default();
        walk_stmt(&mut counter, &ast, Some(block));
        assert_eq!(counter.stmts, 3);
        assert_eq!(counter.exprs, 3);
        assert_eq!(counter.missing, 1);
    }

    #[test]
    fn test_dangling_slot_is_missing() {
        let ast = Ast::new();
        let mut counter = Counter::default();
        walk_expr(&mut counter, &ast, Some(ExprId(42)));
        walk_stmt(&mut counter, &ast, None);
        assert_eq!(counter.missing, 2);
    }
}
