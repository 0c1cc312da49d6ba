use crate::cli::CliConfig;
use crate::diff::unified_diff;
use crate::utils::FileUtils;
use crate::{CliError, Result};
use clap::Args;
use exitfix_core::{parse_rule_list, FixEngine, FixOutcome, RuleFilter, RuleRegistry};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Name reported for source read from standard input.
pub const STDIN_NAME: &str = "standard input";

#[derive(Args, Debug, Clone, Default)]
pub struct FixArgs {
    /// Restrict the rewrites to this comma-separated list
    #[arg(short = 'r', long = "rewrites", value_name = "FIX,...")]
    pub rewrites: Option<String>,

    /// Force these disabled fixes to run
    #[arg(long, value_name = "FIX,...")]
    pub force: Option<String>,

    /// Display diffs instead of rewriting files
    #[arg(long)]
    pub diff: bool,

    /// Files or directories to fix; standard input is fixed when empty
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

impl FixArgs {
    /// Rule lists from the command line, falling back to the configuration.
    pub fn filter(&self, config: &CliConfig) -> RuleFilter {
        let allowed = match &self.rewrites {
            Some(list) => parse_rule_list(list),
            None => config.rules.allow.iter().cloned().collect(),
        };
        let forced = match &self.force {
            Some(list) => parse_rule_list(list),
            None => config.rules.force.iter().cloned().collect(),
        };
        RuleFilter::new().with_allowed(allowed).with_forced(forced)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixReport {
    pub changed: usize,
    pub failed: usize,
}

impl FixReport {
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            2
        } else {
            0
        }
    }
}

/// Feeds sources through the engine and sends the results to their sinks.
/// A failing file is logged and counted; the remaining files are still
/// processed.
pub struct Driver<'r, O, E> {
    engine: FixEngine<'r>,
    diff: bool,
    stdout: O,
    stderr: E,
    report: FixReport,
}

impl<'r, O: Write, E: Write> Driver<'r, O, E> {
    pub fn new(engine: FixEngine<'r>, diff: bool, stdout: O, stderr: E) -> Self {
        Self {
            engine,
            diff,
            stdout,
            stderr,
            report: FixReport::default(),
        }
    }

    pub fn report(&self) -> FixReport {
        self.report
    }

    pub fn finish(mut self) -> Result<FixReport> {
        self.stdout.flush()?;
        self.stderr.flush()?;
        Ok(self.report)
    }

    /// Fixes source read from `input`; the result goes to stdout.
    pub fn fix_reader<R: Read>(&mut self, input: R) {
        let result = self.try_fix_reader(input);
        self.record(STDIN_NAME, result);
    }

    pub fn fix_paths(&mut self, paths: &[PathBuf]) {
        for path in paths {
            self.fix_path(path);
        }
    }

    /// Fixes a file, or every Go file below a directory.
    pub fn fix_path(&mut self, path: &Path) {
        match fs::metadata(path) {
            Err(err) => self.record(&path.display().to_string(), Err(err.into())),
            Ok(metadata) if metadata.is_dir() => {
                for entry in FileUtils::find_go_files(path) {
                    match entry {
                        Ok(file) => self.fix_file(&file),
                        Err(err) => self.record(&path.display().to_string(), Err(err.into())),
                    }
                }
            }
            Ok(_) => self.fix_file(path),
        }
    }

    pub fn fix_file(&mut self, path: &Path) {
        let result = self.try_fix_file(path);
        self.record(&path.display().to_string(), result);
    }

    fn try_fix_reader<R: Read>(&mut self, mut input: R) -> Result<()> {
        let mut source = String::new();
        input.read_to_string(&mut source)?;
        self.fix_source(STDIN_NAME, &source, None)
    }

    fn try_fix_file(&mut self, path: &Path) -> Result<()> {
        let source = fs::read_to_string(path)?;
        self.fix_source(&path.display().to_string(), &source, Some(path))
    }

    /// `file` is where the fixed source is written back to; stdin input has
    /// none and goes to stdout.
    fn fix_source(&mut self, name: &str, source: &str, file: Option<&Path>) -> Result<()> {
        let FixOutcome::Changed { text, log } = self.engine.fix_source(name, source)? else {
            debug!(path = name, "nothing to fix");
            return Ok(());
        };
        writeln!(self.stderr, "{name}: fixed {log}")?;
        self.report.changed += 1;

        if self.diff {
            let data = unified_diff(name, source, &text)?;
            writeln!(self.stdout, "diff {name} fixed/{name}")?;
            self.stdout.write_all(data.as_bytes())?;
            return Ok(());
        }
        match file {
            Some(path) => FileUtils::write_atomic(path, &text)?,
            None => self.stdout.write_all(text.as_bytes())?,
        }
        Ok(())
    }

    fn record(&mut self, name: &str, result: Result<()>) {
        let Err(err) = result else {
            return;
        };
        self.report.failed += 1;
        match err {
            CliError::Fix(_) | CliError::Walk(_) => error!("{err}"),
            _ => error!("{name}: {err}"),
        }
    }
}

/// Runs the fixes over `args.paths`, or over standard input when no path
/// is given.
pub fn fix_command(
    args: &FixArgs,
    config: &CliConfig,
    registry: &RuleRegistry,
) -> eyre::Result<FixReport> {
    let filter = args.filter(config);
    filter.warn_unknown(registry);
    let engine = FixEngine::new(registry, filter)?;

    let mut driver = Driver::new(engine, args.diff, io::stdout(), io::stderr());
    if args.paths.is_empty() {
        driver.fix_reader(io::stdin().lock());
    } else {
        driver.fix_paths(&args.paths);
    }
    Ok(driver.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exitfix_core::{FixesConfig, Rule};
    use exitfix_golang::ast::Node;
    use exitfix_golang::{Ast, GoError};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const BROKEN: &str = "package main\n\nfunc main() {\n";
    const PLAIN: &str = "package main\n\nfunc main() {}\n";
    const FATAL: &str = "package main\n\nimport \"log\"\n\nfunc main() {\n\tif err := run(); err != nil {\n\t\tlog.Fatal(err)\n\t}\n}\n";
    const FIXED: &str = "package main\n\nimport \"github.com/Originate/exit\"\n\nfunc main() {\n\terr := run()\n\texit.On(err)\n}\n";

    fn registry() -> RuleRegistry {
        RuleRegistry::builtin(&FixesConfig::default()).unwrap()
    }

    fn driver(registry: &RuleRegistry, diff: bool) -> Driver<'_, Vec<u8>, Vec<u8>> {
        let engine = FixEngine::new(registry, RuleFilter::new()).unwrap();
        Driver::new(engine, diff, Vec::new(), Vec::new())
    }

    #[test]
    fn directories_are_fixed_in_place() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.go"), FATAL).unwrap();
        fs::write(dir.path().join("b.go"), BROKEN).unwrap();
        fs::write(dir.path().join("c.go"), PLAIN).unwrap();

        let registry = registry();
        let mut driver = driver(&registry, false);
        driver.fix_path(dir.path());
        assert_eq!(driver.report(), FixReport { changed: 1, failed: 1 });
        assert_eq!(driver.report().exit_code(), 2);

        let stderr = String::from_utf8(driver.stderr.clone()).unwrap();
        let a = dir.path().join("a.go");
        assert_eq!(stderr, format!("{}: fixed log.Fatal\n", a.display()));
        assert!(driver.stdout.is_empty());

        assert_eq!(fs::read_to_string(&a).unwrap(), FIXED);
        assert_eq!(fs::read_to_string(dir.path().join("b.go")).unwrap(), BROKEN);
        assert_eq!(fs::read_to_string(dir.path().join("c.go")).unwrap(), PLAIN);
    }

    #[test]
    fn diff_mode_leaves_files_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.go");
        fs::write(&path, FATAL).unwrap();

        let registry = registry();
        let mut driver = driver(&registry, true);
        driver.fix_file(&path);
        let report = driver.report();
        let stdout = String::from_utf8(driver.stdout.clone()).unwrap();

        assert_eq!(report, FixReport { changed: 1, failed: 0 });
        let name = path.display().to_string();
        assert!(stdout.starts_with(&format!("diff {name} fixed/{name}\n")), "{stdout}");
        assert!(stdout.contains("+\texit.On(err)"), "{stdout}");
        assert_eq!(fs::read_to_string(&path).unwrap(), FATAL);
    }

    #[test]
    fn standard_input_goes_to_stdout() {
        let registry = registry();
        let mut driver = driver(&registry, false);
        driver.fix_reader(FATAL.as_bytes());
        assert_eq!(String::from_utf8(driver.stdout.clone()).unwrap(), FIXED);
        assert_eq!(
            String::from_utf8(driver.stderr.clone()).unwrap(),
            "standard input: fixed log.Fatal\n"
        );

        let mut unchanged = self::driver(&registry, false);
        unchanged.fix_reader(PLAIN.as_bytes());
        assert!(unchanged.stdout.is_empty());
        assert_eq!(unchanged.finish().unwrap(), FixReport::default());
    }

    #[test]
    fn missing_paths_fail_but_others_run() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.go");
        fs::write(&path, FATAL).unwrap();

        let registry = registry();
        let mut driver = driver(&registry, false);
        driver.fix_paths(&[dir.path().join("missing.go"), path.clone()]);
        assert_eq!(driver.report(), FixReport { changed: 1, failed: 1 });
        assert_eq!(fs::read_to_string(&path).unwrap(), FIXED);
    }

    #[test]
    fn failed_rewrites_leave_the_file_alone() {
        let mut registry = RuleRegistry::new();
        registry.register(
            Rule::new(
                "garble",
                "2017-01-01",
                "",
                |ast: &mut Ast| -> std::result::Result<bool, GoError> {
                    let target = ast
                        .descendants(ast.root())
                        .find(|&id| ast.ident_name(id) == Some("run"));
                    let Some(target) = target else {
                        return Ok(false);
                    };
                    if let Node::Ident(ident) = ast.node_mut(target) {
                        ident.name = "1 +".to_string();
                    }
                    Ok(true)
                },
            )
            .unwrap(),
        );

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.go");
        fs::write(&path, FATAL).unwrap();

        let mut driver = driver(&registry, false);
        driver.fix_file(&path);
        assert_eq!(driver.report(), FixReport { changed: 0, failed: 1 });
        assert!(driver.stdout.is_empty());
        assert!(driver.stderr.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), FATAL);
    }

    #[test]
    fn flags_override_configured_rule_lists() {
        let mut config = CliConfig::default();
        config.rules.allow = vec!["other".to_string()];
        config.rules.force = vec!["log.Fatal".to_string()];
        let registry = registry();
        let rule = registry.get("log.Fatal").unwrap();

        let from_config = FixArgs::default().filter(&config);
        assert!(!from_config.is_active(rule));

        let args = FixArgs {
            rewrites: Some("log.Fatal".to_string()),
            ..FixArgs::default()
        };
        assert!(args.filter(&config).is_active(rule));
    }
}
