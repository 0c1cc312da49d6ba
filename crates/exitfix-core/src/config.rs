//! Settings of the built-in fixes, read from the `[fixes]` table of the
//! configuration file.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixesConfig {
    pub log_fatal: LogFatalConfig,
}

/// What the `log.Fatal` rule matches and what it writes instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFatalConfig {
    /// Import path of the logging package.
    pub logging_import: String,
    pub fatal_function: String,
    /// Import path of the package providing the assertion call.
    pub assertion_import: String,
    /// Name the assertion package is referred to by.
    pub assertion_package: String,
    pub assertion_function: String,
}

impl Default for LogFatalConfig {
    fn default() -> Self {
        Self {
            logging_import: "log".to_string(),
            fatal_function: "Fatal".to_string(),
            assertion_import: "github.com/Originate/exit".to_string(),
            assertion_package: "exit".to_string(),
            assertion_function: "On".to_string(),
        }
    }
}

impl LogFatalConfig {
    /// Callee of the introduced call, e.g. `exit.On`.
    pub fn assertion_call(&self) -> String {
        format!("{}.{}", self.assertion_package, self.assertion_function)
    }
}
