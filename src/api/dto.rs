use serde::{Deserialize, Serialize};

use crate::domain::arena::Ast;
use crate::domain::ast::*;
use crate::domain::program::Program;
use crate::ports::{walk_expr, walk_stmt, ExprVisitor, StmtVisitor};

/// Flat node/edge view of a tree, for JSON consumers and DOT export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstGraphDto {
    pub nodes: Vec<NodeDto>,
    pub edges: Vec<EdgeDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: String,
    pub label: String,
    pub kind: String,
    pub family: NodeFamily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeFamily {
    Statement,
    Expression,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDto {
    pub from: String,
    pub to: String,
    /// Child slot name, e.g. `condition` or `arg0`
    pub label: String,
}

impl From<&Program> for AstGraphDto {
    fn from(program: &Program) -> Self {
        let mut builder = GraphBuilder::default();
        for stmt in program.statements() {
            builder.run(program.ast(), *stmt);
        }
        AstGraphDto {
            nodes: builder.nodes,
            edges: builder.edges,
        }
    }
}

/// A child slot still to be visited.
enum Slot {
    Expr(Option<ExprId>),
    Stmt(Option<StmtId>),
}

struct Pending {
    slot: Slot,
    /// Parent node id and edge label
    parent: Option<(String, String)>,
}

/// Collects nodes in pre-order. Each node is linked to its parent when it
/// is created; pending children live on `pending`, not on the call stack.
#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<NodeDto>,
    edges: Vec<EdgeDto>,
    missing: usize,
    incoming: Option<(String, String)>,
    pending: Vec<Pending>,
}

impl GraphBuilder {
    fn run(&mut self, ast: &Ast, root: StmtId) {
        self.pending.push(Pending {
            slot: Slot::Stmt(Some(root)),
            parent: None,
        });
        while let Some(Pending { slot, parent }) = self.pending.pop() {
            self.incoming = parent;
            match slot {
                Slot::Expr(slot) => walk_expr(self, ast, slot),
                Slot::Stmt(slot) => walk_stmt(self, ast, slot),
            }
        }
    }

    fn node(&mut self, id: String, label: String, kind: NodeKind) -> String {
        let family = if kind.is_expression() {
            NodeFamily::Expression
        } else {
            NodeFamily::Statement
        };
        self.link(&id);
        self.nodes.push(NodeDto {
            id: id.clone(),
            label,
            kind: kind.name().to_string(),
            family,
        });
        id
    }

    fn link(&mut self, to: &str) {
        if let Some((from, label)) = self.incoming.take() {
            self.edges.push(EdgeDto {
                from,
                to: to.to_string(),
                label,
            });
        }
    }

    fn missing_node(&mut self, kind: &str) {
        let id = format!("missing{}", self.missing);
        self.missing += 1;
        self.link(&id);
        self.nodes.push(NodeDto {
            id,
            label: format!("null {}", kind),
            kind: "Missing".to_string(),
            family: NodeFamily::Missing,
        });
    }

    /// Queue `children` of `parent`, visited in the order given.
    fn children(&mut self, parent: &str, children: Vec<(Slot, String)>) {
        for (slot, label) in children.into_iter().rev() {
            self.pending.push(Pending {
                slot,
                parent: Some((parent.to_string(), label)),
            });
        }
    }

    fn type_suffix(ast: &Ast, id: ExprId) -> String {
        ast.data_type(id)
            .map(|ty| format!(": {}", ty))
            .unwrap_or_default()
    }
}

impl ExprVisitor for GraphBuilder {
    type Output = ();

    fn visit_integer(&mut self, ast: &Ast, id: ExprId, node: &IntegerLiteral) {
        let label = format!("{}{}", node.value, Self::type_suffix(ast, id));
        self.node(id.to_string(), label, NodeKind::IntegerLiteral);
    }

    fn visit_float(&mut self, ast: &Ast, id: ExprId, node: &FloatLiteral) {
        let label = format!("{:.6}{}", node.value, Self::type_suffix(ast, id));
        self.node(id.to_string(), label, NodeKind::FloatLiteral);
    }

    fn visit_boolean(&mut self, _: &Ast, id: ExprId, node: &BooleanLiteral) {
        self.node(id.to_string(), node.value.to_string(), NodeKind::BooleanLiteral);
    }

    fn visit_identifier(&mut self, ast: &Ast, id: ExprId, node: &Identifier) {
        let label = format!("{}{}", node.name, Self::type_suffix(ast, id));
        self.node(id.to_string(), label, NodeKind::Identifier);
    }

    fn visit_variable(&mut self, ast: &Ast, id: ExprId, node: &Variable) {
        let label = format!("{}{}", node.name, Self::type_suffix(ast, id));
        self.node(id.to_string(), label, NodeKind::Variable);
    }

    fn visit_binary(&mut self, _: &Ast, id: ExprId, node: &Binary) {
        let me = self.node(id.to_string(), node.op.literal.clone(), NodeKind::Binary);
        self.children(
            &me,
            vec![
                (Slot::Expr(node.left), "left".to_string()),
                (Slot::Expr(node.right), "right".to_string()),
            ],
        );
    }

    fn visit_assignment(&mut self, _: &Ast, id: ExprId, node: &Assignment) {
        let me = self.node(id.to_string(), node.op.literal.clone(), NodeKind::Assignment);
        self.children(
            &me,
            vec![
                (Slot::Expr(node.target), "target".to_string()),
                (Slot::Expr(node.value), "value".to_string()),
            ],
        );
    }

    fn visit_call(&mut self, _: &Ast, id: ExprId, node: &FunctionCall) {
        let me = self.node(id.to_string(), format!("{}()", node.name), NodeKind::FunctionCall);
        let args = node
            .args
            .iter()
            .enumerate()
            .map(|(i, arg)| (Slot::Expr(*arg), format!("arg{}", i)))
            .collect();
        self.children(&me, args);
    }

    fn visit_missing_expr(&mut self, _: &Ast) {
        self.missing_node("expr");
    }
}

impl StmtVisitor for GraphBuilder {
    type Output = ();

    fn visit_expression_stmt(&mut self, _: &Ast, id: StmtId, node: &ExpressionStatement) {
        let me = self.node(id.to_string(), "expr".to_string(), NodeKind::ExpressionStatement);
        self.children(&me, vec![(Slot::Expr(node.expr), "expr".to_string())]);
    }

    fn visit_let(&mut self, _: &Ast, id: StmtId, node: &LetDecl) {
        let me = self.node(id.to_string(), node.token.literal.clone(), NodeKind::LetDecl);
        self.children(
            &me,
            vec![
                (Slot::Expr(node.variable), "variable".to_string()),
                (Slot::Expr(node.initializer), "initializer".to_string()),
            ],
        );
    }

    fn visit_return(&mut self, _: &Ast, id: StmtId, node: &ReturnStmt) {
        let me = self.node(id.to_string(), node.token.literal.clone(), NodeKind::ReturnStmt);
        self.children(&me, vec![(Slot::Expr(node.value), "value".to_string())]);
    }

    fn visit_conditional(&mut self, _: &Ast, id: StmtId, node: &Conditional) {
        let me = self.node(id.to_string(), node.token.literal.clone(), NodeKind::Conditional);
        let mut children = vec![
            (Slot::Expr(node.condition), "condition".to_string()),
            (Slot::Stmt(node.consequence), "then".to_string()),
        ];
        // No else is not a defect, so no placeholder.
        if node.alternative.is_some() {
            children.push((Slot::Stmt(node.alternative), "else".to_string()));
        }
        self.children(&me, children);
    }

    fn visit_while(&mut self, _: &Ast, id: StmtId, node: &WhileLoop) {
        let me = self.node(id.to_string(), node.token.literal.clone(), NodeKind::WhileLoop);
        self.children(
            &me,
            vec![
                (Slot::Expr(node.condition), "condition".to_string()),
                (Slot::Stmt(node.body), "body".to_string()),
            ],
        );
    }

    fn visit_for(&mut self, _: &Ast, id: StmtId, node: &ForLoop) {
        let me = self.node(id.to_string(), node.token.literal.clone(), NodeKind::ForLoop);
        self.children(
            &me,
            vec![
                (Slot::Stmt(node.init), "init".to_string()),
                (Slot::Expr(node.condition), "condition".to_string()),
                (Slot::Expr(node.post_action), "post".to_string()),
                (Slot::Stmt(node.body), "body".to_string()),
            ],
        );
    }

    fn visit_block(&mut self, _: &Ast, id: StmtId, node: &CodeBlock) {
        let me = self.node(id.to_string(), format!("block {}", node.scope), NodeKind::CodeBlock);
        let statements = node
            .statements
            .iter()
            .enumerate()
            .map(|(i, stmt)| (Slot::Stmt(Some(*stmt)), i.to_string()))
            .collect();
        self.children(&me, statements);
    }

    fn visit_function(&mut self, _: &Ast, id: StmtId, node: &FunctionDecl) {
        let proto = &node.prototype;
        let params: Vec<String> = proto
            .params
            .iter()
            .map(|p| format!("{} {}", p.data_type, p.name))
            .collect();
        let keyword = if node.is_entry_point { "entry" } else { "define" };
        let label = format!("{} {} {}({})", keyword, proto.return_type, proto.name, params.join(", "));
        let me = self.node(id.to_string(), label, NodeKind::FunctionDecl);
        self.children(&me, vec![(Slot::Stmt(node.body), "body".to_string())]);
    }

    fn visit_missing_stmt(&mut self, _: &Ast) {
        self.missing_node("stmt");
    }
}
