//! Runs the active rules over one Go source file.

use std::fmt;

use exitfix_golang::{GoError, GoParser, GoPrinter};
use itertools::Itertools;
use regex::Regex;
use tracing::{debug, trace, warn};

use crate::error::{FixError, Result};
use crate::filter::RuleFilter;
use crate::registry::RuleRegistry;

/// Names of the rules that fired on a file, in the order they fired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteLog(Vec<String>);

impl RewriteLog {
    pub fn push(&mut self, name: impl Into<String>) {
        self.0.push(name.into());
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RewriteLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Unchanged,
    Changed { text: String, log: RewriteLog },
}

impl FixOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, FixOutcome::Changed { .. })
    }
}

pub struct FixEngine<'r> {
    registry: &'r RuleRegistry,
    filter: RuleFilter,
    parser: GoParser,
    printer: GoPrinter,
}

impl<'r> FixEngine<'r> {
    pub fn new(registry: &'r RuleRegistry, filter: RuleFilter) -> eyre::Result<Self> {
        Ok(Self {
            registry,
            filter,
            parser: GoParser::new()?,
            printer: GoPrinter::new(),
        })
    }

    pub fn registry(&self) -> &'r RuleRegistry {
        self.registry
    }

    pub fn filter(&self) -> &RuleFilter {
        &self.filter
    }

    /// Applies every active rule once, oldest first, to the source of the
    /// file called `path`.
    ///
    /// The tree is printed and parsed again after each rule that changes
    /// it, so later rules see the same tree a fresh run would.
    pub fn fix_source(&mut self, path: &str, source: &str) -> Result<FixOutcome> {
        let mut ast = self.parser.parse(source).map_err(|source| FixError::Syntax {
            path: path.to_string(),
            source,
        })?;

        let registry = self.registry;
        let mut log = RewriteLog::default();
        let mut calls = Vec::new();
        for rule in registry.by_date() {
            if !self.filter.is_active(rule) {
                continue;
            }
            debug!(path, rule = rule.name(), "trying rewrite");
            let fired = rule
                .fix()
                .apply(&mut ast)
                .map_err(|err| internal(path, rule.name(), err))?;
            if !fired {
                continue;
            }
            debug!(path, rule = rule.name(), "rewrite fired");
            log.push(rule.name());
            calls.extend(rule.fix().introduced_calls());

            let printed = self
                .printer
                .print(&ast)
                .map_err(|err| internal(path, rule.name(), err))?;
            trace!(path, rule = rule.name(), "re-parsing rewritten source");
            ast = self
                .parser
                .parse(&printed)
                .map_err(|err| internal(path, rule.name(), err))?;
        }

        let Some(last) = log.names().last() else {
            return Ok(FixOutcome::Unchanged);
        };
        let printed = self
            .printer
            .print(&ast)
            .map_err(|err| internal(path, last, err))?;
        let text = canonicalize(&printed, &calls);
        Ok(FixOutcome::Changed { text, log })
    }
}

fn internal(path: &str, rule: &str, source: impl Into<GoError>) -> FixError {
    FixError::InternalRewrite {
        path: path.to_string(),
        rule: rule.to_string(),
        source: source.into(),
    }
}

/// Drops the blank line directly after a single-line statement calling one
/// of `calls`.
pub fn canonicalize(text: &str, calls: &[String]) -> String {
    let callees = calls.iter().unique().map(|call| regex::escape(call)).join("|");
    if callees.is_empty() {
        return text.to_string();
    }
    let pattern = format!(r"(?m)^(\t*(?:{callees})\(.*\))\n\n");
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, "$1\n").into_owned(),
        Err(err) => {
            warn!(%err, "skipping blank line cleanup");
            text.to_string()
        }
    }
}
