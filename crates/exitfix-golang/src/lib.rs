//! Go syntax support for exitfix.
//!
//! Source is parsed with tree-sitter into an editable arena tree, walked and
//! rewritten through [`apply`], and printed back with [`GoPrinter`].

pub mod apply;
pub mod ast;
pub mod astutil;
pub mod error;
pub mod parser;
pub mod printer;
mod resolve;

pub use apply::{apply, Cursor};
pub use ast::{Ast, Field, Location, Node, NodeId};
pub use error::{GoError, PrintError, Result, SyntaxError};
pub use parser::GoParser;
pub use printer::GoPrinter;

#[cfg(test)]
mod tests;
