//! Unified diffs between a file and its fixed version.

use crate::{CliError, Result};
use std::io::{ErrorKind, Write};
use std::process::Command;
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// Diff of `old` against `new`, from the system `diff -u` when it is
/// installed and from the built-in differ otherwise.
pub fn unified_diff(name: &str, old: &str, new: &str) -> Result<String> {
    match external_diff(old, new) {
        Err(CliError::Io(err)) if err.kind() == ErrorKind::NotFound => {
            debug!("no diff program found, using the built-in differ");
            Ok(builtin_diff(name, old, new))
        }
        result => result,
    }
}

/// Runs `diff -u` over two temporary copies. `diff` exits non-zero when the
/// inputs differ, which is only an error when it printed nothing.
pub fn external_diff(old: &str, new: &str) -> Result<String> {
    let old_file = temp_copy(old)?;
    let new_file = temp_copy(new)?;

    let output = Command::new("diff")
        .arg("-u")
        .arg(old_file.path())
        .arg(new_file.path())
        .output()?;

    let mut data = output.stdout;
    data.extend_from_slice(&output.stderr);
    if data.is_empty() && !output.status.success() {
        return Err(CliError::Diff(format!("diff exited with {}", output.status)));
    }
    Ok(String::from_utf8_lossy(&data).into_owned())
}

pub fn builtin_diff(name: &str, old: &str, new: &str) -> String {
    similar::TextDiff::from_lines(old, new)
        .unified_diff()
        .header(name, &format!("fixed/{name}"))
        .to_string()
}

fn temp_copy(text: &str) -> Result<NamedTempFile> {
    let mut file = Builder::new().prefix("exitfix").tempfile()?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    Ok(file)
}
