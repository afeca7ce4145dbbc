//! Canonical Tree Printer
//!
//! Renders a tree as deterministic text for debugging and golden tests.
//! The output is stable byte-for-byte for the same tree and options, but it
//! is not source code and cannot be parsed back.

use std::fmt;
use std::io;

use tracing::warn;

use crate::domain::arena::Ast;
use crate::domain::ast::*;
use crate::domain::program::Program;
use crate::ports::{walk_expr, walk_stmt, ExprVisitor, StmtVisitor};

/// Placeholder for an absent expression slot.
pub const NULL_EXPR: &str = "null expr";
/// Placeholder for an absent statement slot.
pub const NULL_STMT: &str = "null stmt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    /// Spaces per nesting level
    pub indent_width: usize,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

/// Pending work while assembling one expression's text.
enum ExprTask {
    Node(Option<ExprId>),
    Text(String),
}

/// Pending work while emitting statement lines.
enum StmtTask {
    Node(Option<StmtId>),
    Line(String),
    /// Contents of a bracketed body, one level deeper
    Body(Option<StmtId>),
    Indent,
    Dedent,
}

/// Renders through explicit work stacks, so output depth is bounded by
/// memory rather than by the call stack.
pub struct AstPrinter {
    options: PrintOptions,
    depth: usize,
    lines: Vec<String>,
    text: String,
    expr_tasks: Vec<ExprTask>,
    stmt_tasks: Vec<StmtTask>,
}

impl AstPrinter {
    pub fn new(options: PrintOptions) -> Self {
        Self {
            options,
            depth: 0,
            lines: Vec::new(),
            text: String::new(),
            expr_tasks: Vec::new(),
            stmt_tasks: Vec::new(),
        }
    }

    /// Render a whole program with default options.
    pub fn render(program: &Program) -> String {
        Self::render_with(program, PrintOptions::default())
    }

    pub fn render_with(program: &Program, options: PrintOptions) -> String {
        let mut printer = Self::new(options);
        for stmt in program.statements() {
            printer.stmt(program.ast(), Some(*stmt));
        }
        printer.finish()
    }

    /// Render one statement subtree, e.g. a single function.
    pub fn render_stmt(ast: &Ast, stmt: StmtId, options: PrintOptions) -> String {
        let mut printer = Self::new(options);
        printer.stmt(ast, Some(stmt));
        printer.finish()
    }

    /// Render one expression on a single line.
    pub fn render_expr(ast: &Ast, expr: Option<ExprId>) -> String {
        Self::new(PrintOptions::default()).expr(ast, expr)
    }

    /// Write the program dump to a text sink.
    pub fn print_to<W: io::Write>(program: &Program, sink: &mut W) -> io::Result<()> {
        sink.write_all(Self::render(program).as_bytes())
    }

    fn finish(self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn line(&mut self, text: impl AsRef<str>) {
        let indent = " ".repeat(self.depth * self.options.indent_width);
        self.lines.push(format!("{}{}", indent, text.as_ref()));
    }

    /// Text of one expression slot.
    fn expr(&mut self, ast: &Ast, slot: Option<ExprId>) -> String {
        self.expr_tasks.push(ExprTask::Node(slot));
        while let Some(task) = self.expr_tasks.pop() {
            match task {
                ExprTask::Node(slot) => walk_expr(self, ast, slot),
                ExprTask::Text(text) => self.text.push_str(&text),
            }
        }
        std::mem::take(&mut self.text)
    }

    /// Emit the lines of one statement slot.
    fn stmt(&mut self, ast: &Ast, slot: Option<StmtId>) {
        self.stmt_tasks.push(StmtTask::Node(slot));
        while let Some(task) = self.stmt_tasks.pop() {
            match task {
                StmtTask::Node(slot) => walk_stmt(self, ast, slot),
                StmtTask::Line(text) => self.line(text),
                StmtTask::Body(slot) => self.expand_body(ast, slot),
                StmtTask::Indent => self.depth += 1,
                StmtTask::Dedent => self.depth = self.depth.saturating_sub(1),
            }
        }
    }

    /// A block's statements are printed directly; the enclosing construct
    /// draws the brackets.
    fn expand_body(&mut self, ast: &Ast, slot: Option<StmtId>) {
        let mut tasks = vec![StmtTask::Indent];
        match slot.and_then(|id| ast.stmt(id)) {
            Some(Statement::Block(block)) => {
                tasks.extend(block.statements.iter().map(|s| StmtTask::Node(Some(*s))));
            }
            _ => tasks.push(StmtTask::Node(slot)),
        }
        tasks.push(StmtTask::Dedent);
        self.schedule_stmts(tasks);
    }

    // Tasks are given in output order.
    fn schedule_exprs(&mut self, tasks: Vec<ExprTask>) {
        self.expr_tasks.extend(tasks.into_iter().rev());
    }

    fn schedule_stmts(&mut self, tasks: Vec<StmtTask>) {
        self.stmt_tasks.extend(tasks.into_iter().rev());
    }
}

impl ExprVisitor for AstPrinter {
    type Output = ();

    fn visit_integer(&mut self, ast: &Ast, id: ExprId, node: &IntegerLiteral) {
        let ty = ast.data_type(id).unwrap_or_default();
        self.text
            .push_str(&format!("[[ intexpr val: {} type: {} ]]", node.value, ty));
    }

    fn visit_float(&mut self, ast: &Ast, id: ExprId, node: &FloatLiteral) {
        let ty = ast.data_type(id).unwrap_or_default();
        self.text
            .push_str(&format!("[[ floatexpr val: {:.6} type: {} ]]", node.value, ty));
    }

    fn visit_boolean(&mut self, _: &Ast, _: ExprId, node: &BooleanLiteral) {
        self.text.push_str(&format!("[[ boolean val: {} ]]", node.value));
    }

    fn visit_identifier(&mut self, _: &Ast, _: ExprId, node: &Identifier) {
        self.text.push_str(&node.name);
    }

    fn visit_variable(&mut self, ast: &Ast, id: ExprId, node: &Variable) {
        let ty = ast.data_type(id).unwrap_or_default();
        self.text
            .push_str(&format!("[name: '{}' type: '{}']", node.name, ty));
    }

    fn visit_binary(&mut self, _: &Ast, _: ExprId, node: &Binary) {
        self.schedule_exprs(vec![
            ExprTask::Text("[ ".to_string()),
            ExprTask::Node(node.left),
            ExprTask::Text(format!(" ] {} [ ", node.op.literal)),
            ExprTask::Node(node.right),
            ExprTask::Text(" ]".to_string()),
        ]);
    }

    fn visit_assignment(&mut self, _: &Ast, _: ExprId, node: &Assignment) {
        self.schedule_exprs(vec![
            ExprTask::Node(node.target),
            ExprTask::Text(format!(" {} ", node.op.literal)),
            ExprTask::Node(node.value),
        ]);
    }

    fn visit_call(&mut self, _: &Ast, _: ExprId, node: &FunctionCall) {
        let mut tasks = vec![ExprTask::Text(format!("{}(", node.name))];
        for (i, arg) in node.args.iter().enumerate() {
            if i > 0 {
                tasks.push(ExprTask::Text(", ".to_string()));
            }
            tasks.push(ExprTask::Node(*arg));
        }
        tasks.push(ExprTask::Text(")".to_string()));
        self.schedule_exprs(tasks);
    }

    fn visit_missing_expr(&mut self, _: &Ast) {
        warn!("printing a missing expression");
        self.text.push_str(NULL_EXPR);
    }
}

impl StmtVisitor for AstPrinter {
    type Output = ();

    fn visit_expression_stmt(&mut self, ast: &Ast, _: StmtId, node: &ExpressionStatement) {
        let text = self.expr(ast, node.expr);
        self.line(text);
    }

    fn visit_let(&mut self, ast: &Ast, _: StmtId, node: &LetDecl) {
        let variable = self.expr(ast, node.variable);
        let text = match node.initializer {
            Some(_) => {
                let initializer = self.expr(ast, node.initializer);
                format!("{} {} = {}", node.token.literal, variable, initializer)
            }
            None => format!("{} {} invalid variable assignment", node.token.literal, variable),
        };
        self.line(text);
    }

    fn visit_return(&mut self, ast: &Ast, _: StmtId, node: &ReturnStmt) {
        let value = self.expr(ast, node.value);
        self.line(format!("{} {}", node.token.literal, value));
    }

    fn visit_conditional(&mut self, ast: &Ast, _: StmtId, node: &Conditional) {
        let condition = self.expr(ast, node.condition);
        self.line(format!("{} ({}) {{", node.token.literal, condition));

        let mut tasks = Vec::new();
        let (mut consequence, mut alternative) = (node.consequence, node.alternative);
        loop {
            tasks.push(StmtTask::Body(consequence));
            let Some(alternative_id) = alternative else {
                tasks.push(StmtTask::Line("} end [if]".to_string()));
                break;
            };
            match ast.stmt(alternative_id) {
                Some(Statement::Conditional(next)) => {
                    let condition = self.expr(ast, next.condition);
                    tasks.push(StmtTask::Line(format!(
                        "}} else {} ({}) {{",
                        next.token.literal, condition
                    )));
                    consequence = next.consequence;
                    alternative = next.alternative;
                }
                _ => {
                    tasks.push(StmtTask::Line("} else {".to_string()));
                    tasks.push(StmtTask::Body(Some(alternative_id)));
                    tasks.push(StmtTask::Line("} end [if]".to_string()));
                    break;
                }
            }
        }
        self.schedule_stmts(tasks);
    }

    fn visit_while(&mut self, ast: &Ast, _: StmtId, node: &WhileLoop) {
        let condition = self.expr(ast, node.condition);
        self.line(format!("{} ({}) {{", node.token.literal, condition));
        self.schedule_stmts(vec![
            StmtTask::Body(node.body),
            StmtTask::Line("} end [while]".to_string()),
        ]);
    }

    fn visit_for(&mut self, ast: &Ast, _: StmtId, node: &ForLoop) {
        self.line(format!("{} (", node.token.literal));
        let condition = self.expr(ast, node.condition);
        let post_action = self.expr(ast, node.post_action);
        self.schedule_stmts(vec![
            StmtTask::Indent,
            StmtTask::Node(node.init),
            StmtTask::Line(condition),
            StmtTask::Line(post_action),
            StmtTask::Dedent,
            StmtTask::Line(") {".to_string()),
            StmtTask::Body(node.body),
            StmtTask::Line("} end [for]".to_string()),
        ]);
    }

    fn visit_block(&mut self, _: &Ast, id: StmtId, _: &CodeBlock) {
        self.line("{");
        self.schedule_stmts(vec![
            StmtTask::Body(Some(id)),
            StmtTask::Line("} end [block]".to_string()),
        ]);
    }

    fn visit_function(&mut self, _: &Ast, _: StmtId, node: &FunctionDecl) {
        let keyword = if node.is_entry_point { "entry" } else { "define" };
        let proto = &node.prototype;
        let params: Vec<String> = proto
            .params
            .iter()
            .map(|p| format!("{} {}", p.data_type, p.name))
            .collect();
        self.line(format!(
            "{} {} {} ({}) {{",
            keyword,
            proto.return_type,
            proto.name,
            params.join(", ")
        ));
        self.schedule_stmts(vec![
            StmtTask::Body(node.body),
            StmtTask::Line(format!("}} end [{}]", proto.name)),
        ]);
    }

    fn visit_missing_stmt(&mut self, _: &Ast) {
        warn!("printing a missing statement");
        self.line(NULL_STMT);
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&AstPrinter::render(self))
    }
}
