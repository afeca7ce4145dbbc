//! Lexical Token Module
//!
//! Tokens are produced by the lexer and handed to the tree builder as-is.
//! The core stores them on nodes (operators, leading keywords) and reads
//! their literal text when printing.

use serde::{Deserialize, Serialize};

/// Classification of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals and names
    Ident,
    Int,
    Float,
    True,
    False,

    // Keywords
    Let,
    Return,
    If,
    Else,
    While,
    For,
    Define,
    Entry,

    // Operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Assign,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    Eof,
    Illegal,
}

impl TokenKind {
    /// Keyword lookup for an identifier-shaped lexeme.
    pub fn keyword(lexeme: &str) -> Option<TokenKind> {
        match lexeme {
            "let" => Some(TokenKind::Let),
            "return" => Some(TokenKind::Return),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "for" => Some(TokenKind::For),
            "define" => Some(TokenKind::Define),
            "entry" => Some(TokenKind::Entry),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            _ => None,
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Asterisk
                | TokenKind::Slash
                | TokenKind::Assign
                | TokenKind::Eq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::LtEq
                | TokenKind::GtEq
        )
    }
}

/// A token as emitted by the lexer: kind, literal text and source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    /// 1-based source line
    pub line: u32,
    /// 1-based source column
    pub column: u32,
    /// Made up by a compiler pass rather than read from source
    #[serde(default)]
    pub synthetic: bool,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            literal: literal.into(),
            line,
            column,
            synthetic: false,
        }
    }

    /// Token with no source position, for synthesized nodes.
    pub fn synthetic(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            synthetic: true,
            ..Self::new(kind, literal, 0, 0)
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.literal)
    }
}
