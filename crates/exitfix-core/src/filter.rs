use std::collections::BTreeSet;

use tracing::warn;

use crate::registry::RuleRegistry;
use crate::rule::Rule;

/// Which rules a run applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    /// When set, only these rules run.
    allowed: Option<BTreeSet<String>>,
    /// Disabled rules that run anyway.
    forced: BTreeSet<String>,
}

/// Splits a comma-separated rule list, dropping empty entries.
pub fn parse_rule_list(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl RuleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the run to `names`; an empty list allows every rule.
    pub fn with_allowed<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        self.allowed = if names.is_empty() { None } else { Some(names) };
        self
    }

    pub fn with_forced<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forced = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_active(&self, rule: &Rule) -> bool {
        let allowed = self
            .allowed
            .as_ref()
            .map_or(true, |allowed| allowed.contains(rule.name()));
        allowed && (!rule.is_disabled() || self.forced.contains(rule.name()))
    }

    /// Names given to the filter that no registered rule carries.
    pub fn unknown_names<'a>(&'a self, registry: &RuleRegistry) -> Vec<&'a str> {
        self.allowed
            .iter()
            .flatten()
            .chain(&self.forced)
            .map(String::as_str)
            .filter(|name| !registry.contains(name))
            .collect()
    }

    pub fn warn_unknown(&self, registry: &RuleRegistry) {
        for name in self.unknown_names(registry) {
            warn!(rule = name, "unknown rewrite");
        }
    }
}

#[cfg(test)]
mod tests {
    use exitfix_golang::{Ast, GoError};

    use super::*;

    fn noop(_: &mut Ast) -> Result<bool, GoError> {
        Ok(false)
    }

    #[test]
    fn rule_lists_split_on_commas() {
        let names = parse_rule_list(" log.Fatal, ,other,");
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["log.Fatal".to_string(), "other".to_string()]
        );
        assert!(parse_rule_list("").is_empty());
    }

    #[test]
    fn disabled_rules_need_forcing() {
        let enabled = Rule::new("on", "2017-01-01", "", noop).unwrap();
        let disabled = Rule::new("off", "2017-01-01", "", noop)
            .unwrap()
            .disabled(true);

        let filter = RuleFilter::new();
        assert!(filter.is_active(&enabled));
        assert!(!filter.is_active(&disabled));

        let forced = RuleFilter::new().with_forced(["off"]);
        assert!(forced.is_active(&disabled));

        let allow_list = RuleFilter::new().with_allowed(["off"]).with_forced(["off"]);
        assert!(!allow_list.is_active(&enabled));
        assert!(allow_list.is_active(&disabled));

        let empty_allow_list = RuleFilter::new().with_allowed(Vec::<String>::new());
        assert!(empty_allow_list.is_active(&enabled));
    }

    #[test]
    fn unknown_names_are_reported() {
        let mut registry = RuleRegistry::new();
        registry.register(Rule::new("known", "2017-01-01", "", noop).unwrap());
        let filter = RuleFilter::new()
            .with_allowed(["known", "missing"])
            .with_forced(["ghost"]);
        assert_eq!(filter.unknown_names(&registry), vec!["missing", "ghost"]);
    }
}
