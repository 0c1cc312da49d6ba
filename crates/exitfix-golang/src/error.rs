use thiserror::Error;

use crate::ast::AstError;

/// Source that does not parse as Go.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrintError {
    #[error("cannot print {found} as {context}")]
    Unexpected {
        context: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum GoError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("print error: {0}")]
    Print(#[from] PrintError),

    #[error("tree edit failed: {0}")]
    Ast(#[from] AstError),
}

pub type Result<T> = std::result::Result<T, GoError>;
