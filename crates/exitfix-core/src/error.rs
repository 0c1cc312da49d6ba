use exitfix_golang::{GoError, SyntaxError};
use thiserror::Error;

/// Why a file could not be fixed.
#[derive(Debug, Error)]
pub enum FixError {
    #[error("{path}:{source}")]
    Syntax { path: String, source: SyntaxError },

    /// A rule produced a tree that could not be printed or parsed again.
    #[error("{path}: rewrite {rule} failed: {source}")]
    InternalRewrite {
        path: String,
        rule: String,
        source: GoError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("rule {0} is registered twice")]
    DuplicateRule(String),

    #[error("rule {rule} has invalid date {date:?}, expected YYYY-MM-DD")]
    InvalidDate { rule: String, date: String },
}

pub type Result<T> = std::result::Result<T, FixError>;
