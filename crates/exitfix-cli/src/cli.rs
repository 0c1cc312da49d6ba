//! CLI configuration and settings management

use crate::{CliError, Result};
use exitfix_core::FixesConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "exitfix.toml";

/// CLI configuration loaded from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Which rules run
    pub rules: RulesConfig,

    /// Settings of the individual fixes
    pub fixes: FixesConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Only these rules run; empty allows all of them
    pub allow: Vec<String>,

    /// Disabled rules to run anyway
    pub force: Vec<String>,
}

impl CliConfig {
    /// Load configuration from `config_path`, or from the first standard
    /// location that holds a file, falling back to defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let candidates = [Some(PathBuf::from(LOCAL_CONFIG)), Self::default_config_path()];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                return Self::load_from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            CliError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("exitfix").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_files_keep_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[rules]\nforce = [\"log.Fatal\"]\n\n[fixes.log_fatal]\nassertion_import = \"github.com/Originate/exit/assert\"\nassertion_package = \"assert\""
        )
        .unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();
        assert!(config.rules.allow.is_empty());
        assert_eq!(config.rules.force, vec!["log.Fatal".to_string()]);
        assert_eq!(config.fixes.log_fatal.assertion_call(), "assert.On");
        assert_eq!(config.fixes.log_fatal.logging_import, "log");
    }

    #[test]
    fn empty_file_is_the_default() {
        let file = NamedTempFile::new().unwrap();
        assert_eq!(
            CliConfig::load_from_file(file.path()).unwrap(),
            CliConfig::default()
        );
    }

    #[test]
    fn bad_files_are_config_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[rules]\nallow = 3").unwrap();
        let err = CliConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, CliError::Config(_)), "{err}");

        let err = CliConfig::load(Some(Path::new("/nonexistent/exitfix.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
