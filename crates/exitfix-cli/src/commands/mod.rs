//! Command implementations for the exitfix CLI

pub mod fix;

pub use fix::{fix_command, Driver, FixArgs, FixReport};
