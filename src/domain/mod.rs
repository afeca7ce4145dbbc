// Core data model: tokens, type tags, nodes, scopes and the program root.

pub mod arena;
pub mod ast;
pub mod control_flow;
pub mod data_type;
pub mod error;
pub mod program;
pub mod symbol_table;
pub mod token;

pub use arena::{Ast, Checkpoint};
pub use data_type::DataType;
pub use error::{AstError, Result};
pub use program::{Program, ProgramBuilder};
pub use symbol_table::{Declaration, ScopeId, SymbolEntry, SymbolKind, SymbolTable};
pub use token::{Token, TokenKind};
