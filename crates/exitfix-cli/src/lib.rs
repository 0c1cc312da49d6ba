//! exitfix CLI library
//!
//! Finds Go files, runs the fix engine over them and writes the results back,
//! to standard output, or as diffs.

pub mod cli;
pub mod commands;
pub mod diff;
pub mod utils;

pub mod error {
    use exitfix_core::FixError;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum CliError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Configuration error: {0}")]
        Config(String),

        #[error(transparent)]
        Fix(#[from] FixError),

        #[error("Walk error: {0}")]
        Walk(#[from] walkdir::Error),

        #[error("computing diff: {0}")]
        Diff(String),
    }

    pub type Result<T> = std::result::Result<T, CliError>;
}

pub use error::{CliError, Result};
