// Node types for the ThunderBird tree.
// Children are referenced by arena index; an empty slot is an explicit `None`.

use serde::{Deserialize, Serialize};

use crate::domain::data_type::DataType;
use crate::domain::symbol_table::ScopeId;
use crate::domain::token::Token;

/// Index of an expression in its `Ast`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExprId(pub(crate) u32);

/// Index of a statement in its `Ast`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StmtId(pub(crate) u32);

impl ExprId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl StmtId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ExprId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl std::fmt::Display for StmtId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Structural kind of a node, for dispatch without looking at payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // Expressions
    IntegerLiteral,
    FloatLiteral,
    BooleanLiteral,
    Identifier,
    Variable,
    Binary,
    Assignment,
    FunctionCall,

    // Statements
    ExpressionStatement,
    LetDecl,
    ReturnStmt,
    Conditional,
    WhileLoop,
    ForLoop,
    CodeBlock,
    FunctionDecl,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::IntegerLiteral => "IntegerLiteral",
            NodeKind::FloatLiteral => "FloatLiteral",
            NodeKind::BooleanLiteral => "BooleanLiteral",
            NodeKind::Identifier => "Identifier",
            NodeKind::Variable => "Variable",
            NodeKind::Binary => "Binary",
            NodeKind::Assignment => "Assignment",
            NodeKind::FunctionCall => "FunctionCall",
            NodeKind::ExpressionStatement => "ExpressionStatement",
            NodeKind::LetDecl => "LetDecl",
            NodeKind::ReturnStmt => "ReturnStmt",
            NodeKind::Conditional => "Conditional",
            NodeKind::WhileLoop => "WhileLoop",
            NodeKind::ForLoop => "ForLoop",
            NodeKind::CodeBlock => "CodeBlock",
            NodeKind::FunctionDecl => "FunctionDecl",
        }
    }

    pub fn is_expression(&self) -> bool {
        match self {
            NodeKind::IntegerLiteral
            | NodeKind::FloatLiteral
            | NodeKind::BooleanLiteral
            | NodeKind::Identifier
            | NodeKind::Variable
            | NodeKind::Binary
            | NodeKind::Assignment
            | NodeKind::FunctionCall => true,
            NodeKind::ExpressionStatement
            | NodeKind::LetDecl
            | NodeKind::ReturnStmt
            | NodeKind::Conditional
            | NodeKind::WhileLoop
            | NodeKind::ForLoop
            | NodeKind::CodeBlock
            | NodeKind::FunctionDecl => false,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// An expression node: payload plus its type slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExprKind,
    pub data_type: DataType,
}

impl Expression {
    pub fn node_kind(&self) -> NodeKind {
        match &self.kind {
            ExprKind::Integer(_) => NodeKind::IntegerLiteral,
            ExprKind::Float(_) => NodeKind::FloatLiteral,
            ExprKind::Boolean(_) => NodeKind::BooleanLiteral,
            ExprKind::Identifier(_) => NodeKind::Identifier,
            ExprKind::Variable(_) => NodeKind::Variable,
            ExprKind::Binary(_) => NodeKind::Binary,
            ExprKind::Assignment(_) => NodeKind::Assignment,
            ExprKind::Call(_) => NodeKind::FunctionCall,
        }
    }

    /// Child slots in source order.
    pub fn children(&self) -> Vec<Option<ExprId>> {
        match &self.kind {
            ExprKind::Integer(_)
            | ExprKind::Float(_)
            | ExprKind::Boolean(_)
            | ExprKind::Identifier(_)
            | ExprKind::Variable(_) => Vec::new(),
            ExprKind::Binary(b) => vec![b.left, b.right],
            ExprKind::Assignment(a) => vec![a.target, a.value],
            ExprKind::Call(c) => c.args.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Integer(IntegerLiteral),
    Float(FloatLiteral),
    Boolean(BooleanLiteral),
    Identifier(Identifier),
    Variable(Variable),
    Binary(Binary),
    Assignment(Assignment),
    Call(FunctionCall),
}

/// Integer literal like `1` or `300`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegerLiteral {
    pub value: i64,
}

/// Floating point literal like `3.14`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatLiteral {
    #[serde(with = "float_repr")]
    pub value: f64,
}

/// Text formats have no literal for `inf` or `NaN`, so those values are
/// written as strings there. Binary formats keep the raw `f64`.
mod float_repr {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if !serializer.is_human_readable() || value.is_finite() {
            return serializer.serialize_f64(*value);
        }
        let text = if value.is_nan() {
            "NaN"
        } else if *value > 0.0 {
            "inf"
        } else {
            "-inf"
        };
        serializer.serialize_str(text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(FloatVisitor)
        } else {
            f64::deserialize(deserializer)
        }
    }

    struct FloatVisitor;

    impl<'de> Visitor<'de> for FloatVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number, \"inf\", \"-inf\" or \"NaN\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanLiteral {
    pub value: bool,
}

/// Bare reference to a declared name (variable or function).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
}

/// Typed variable reference, e.g. the declared side of a `let`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
}

/// Infix operation `left op right`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binary {
    pub op: Token,
    pub left: Option<ExprId>,
    pub right: Option<ExprId>,
}

/// `target = value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub op: Token,
    pub target: Option<ExprId>,
    pub value: Option<ExprId>,
}

/// `name(args...)`; an argument the parser could not build is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Option<ExprId>>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Expression(ExpressionStatement),
    Let(LetDecl),
    Return(ReturnStmt),
    Conditional(Conditional),
    While(WhileLoop),
    For(ForLoop),
    Block(CodeBlock),
    Function(FunctionDecl),
}

impl Statement {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            Statement::Expression(_) => NodeKind::ExpressionStatement,
            Statement::Let(_) => NodeKind::LetDecl,
            Statement::Return(_) => NodeKind::ReturnStmt,
            Statement::Conditional(_) => NodeKind::Conditional,
            Statement::While(_) => NodeKind::WhileLoop,
            Statement::For(_) => NodeKind::ForLoop,
            Statement::Block(_) => NodeKind::CodeBlock,
            Statement::Function(_) => NodeKind::FunctionDecl,
        }
    }

    /// Expression slots owned directly by this statement.
    pub fn expr_children(&self) -> Vec<Option<ExprId>> {
        match self {
            Statement::Expression(s) => vec![s.expr],
            Statement::Let(s) => vec![s.variable, s.initializer],
            Statement::Return(s) => vec![s.value],
            Statement::Conditional(s) => vec![s.condition],
            Statement::While(s) => vec![s.condition],
            Statement::For(s) => vec![s.condition, s.post_action],
            Statement::Block(_) | Statement::Function(_) => Vec::new(),
        }
    }

    /// Statement slots owned directly by this statement.
    pub fn stmt_children(&self) -> Vec<Option<StmtId>> {
        match self {
            Statement::Expression(_) | Statement::Let(_) | Statement::Return(_) => Vec::new(),
            Statement::Conditional(s) => vec![s.consequence, s.alternative],
            Statement::While(s) => vec![s.body],
            Statement::For(s) => vec![s.init, s.body],
            Statement::Block(b) => b.statements.iter().copied().map(Some).collect(),
            Statement::Function(f) => vec![f.body],
        }
    }

    /// Scope a body-carrying statement was built in or owns.
    pub fn scope(&self) -> Option<ScopeId> {
        match self {
            Statement::Expression(_) | Statement::Let(_) | Statement::Return(_) => None,
            Statement::Conditional(s) => Some(s.parent),
            Statement::While(s) => Some(s.parent),
            Statement::For(s) => Some(s.parent),
            Statement::Block(b) => Some(b.scope),
            Statement::Function(f) => Some(f.parent),
        }
    }
}

/// Wrapper so an expression such as `x + 15;` stands on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    /// First token of the expression
    pub token: Token,
    pub expr: Option<ExprId>,
}

/// `let int x = 3;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetDecl {
    pub token: Token,
    pub variable: Option<ExprId>,
    pub declared_line: u32,
    pub initializer: Option<ExprId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub token: Token,
    pub value: Option<ExprId>,
}

/// One link of an if / else-if / else chain.
///
/// `alternative` is `None` for a bare `if`, another `Conditional` for
/// `else if`, and any other statement for a terminal `else`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditional {
    pub token: Token,
    pub condition: Option<ExprId>,
    pub consequence: Option<StmtId>,
    pub alternative: Option<StmtId>,
    /// Enclosing scope (non-owning)
    pub parent: ScopeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhileLoop {
    pub token: Token,
    pub condition: Option<ExprId>,
    pub body: Option<StmtId>,
    pub parent: ScopeId,
}

/// `for (init; condition; post_action) body`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForLoop {
    pub token: Token,
    pub init: Option<StmtId>,
    pub condition: Option<ExprId>,
    pub post_action: Option<ExprId>,
    pub body: Option<StmtId>,
    pub parent: ScopeId,
}

/// Statements between `{` and `}` plus the scope they declare into.
/// The enclosing scope is the parent of `scope` in the scope tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub statements: Vec<StmtId>,
    pub scope: ScopeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub data_type: DataType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Function signature; owned by its `FunctionDecl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prototype {
    pub name: String,
    pub return_type: DataType,
    pub params: Vec<Parameter>,
}

impl Prototype {
    pub fn new(name: impl Into<String>, return_type: DataType, params: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            return_type,
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub is_entry_point: bool,
    pub prototype: Prototype,
    /// Always a `CodeBlock` when present
    pub body: Option<StmtId>,
    /// Scope the function is declared in (global for top-level functions)
    pub parent: ScopeId,
}
