//! Rule registry and fix engine of exitfix.

pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod fixes;
pub mod registry;
pub mod rule;

pub use config::{FixesConfig, LogFatalConfig};
pub use engine::{canonicalize, FixEngine, FixOutcome, RewriteLog};
pub use error::{FixError, RegistryError, Result};
pub use filter::{parse_rule_list, RuleFilter};
pub use registry::RuleRegistry;
pub use rule::{Fix, Rule};
