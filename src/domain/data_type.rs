/// Data Type Tag Module
///
/// The closed set of value types an expression or declaration can carry.

use serde::{Deserialize, Serialize};

/// Value type attached to expressions and symbol entries.
///
/// `Unresolved` marks a slot no semantic pass has filled yet. `Invalid` is
/// reserved for slots a pass found to be genuinely ill-typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Int,
    Float,
    Byte,
    Bool,
    Void,
    String,
    Unresolved,
    Invalid,
}

impl DataType {
    /// Parse a type keyword as written in source.
    pub fn from_keyword(s: &str) -> Option<DataType> {
        match s {
            "int" => Some(DataType::Int),
            "float" => Some(DataType::Float),
            "byte" => Some(DataType::Byte),
            "bool" => Some(DataType::Bool),
            "void" => Some(DataType::Void),
            "string" => Some(DataType::String),
            _ => None,
        }
    }

    /// Name used by the printer.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Byte => "byte",
            DataType::Bool => "bool",
            DataType::Void => "void",
            DataType::String => "string",
            DataType::Unresolved => "unresolved",
            DataType::Invalid => "invalid",
        }
    }

    /// True for every tag a value can actually have at runtime.
    pub fn is_concrete(&self) -> bool {
        match self {
            DataType::Int
            | DataType::Float
            | DataType::Byte
            | DataType::Bool
            | DataType::Void
            | DataType::String => true,
            DataType::Unresolved | DataType::Invalid => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        match self {
            DataType::Int | DataType::Float | DataType::Byte => true,
            DataType::Bool
            | DataType::Void
            | DataType::String
            | DataType::Unresolved
            | DataType::Invalid => false,
        }
    }
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Unresolved
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
