//! Built-in rewrites.

pub mod log_fatal;

pub use log_fatal::LogFatal;

use crate::config::FixesConfig;
use crate::error::RegistryError;
use crate::rule::Rule;

/// Every rule shipped with exitfix, configured from `config`.
pub fn builtin_rules(config: &FixesConfig) -> Result<Vec<Rule>, RegistryError> {
    Ok(vec![LogFatal::rule(&config.log_fatal)?])
}
