//! The set of rules a run can apply.

use std::fmt::Write as _;

use itertools::Itertools;

use crate::config::FixesConfig;
use crate::error::RegistryError;
use crate::fixes;
use crate::rule::Rule;

/// Rules keyed by their unique name, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in rule.
    pub fn builtin(config: &FixesConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for rule in fixes::builtin_rules(config)? {
            registry.try_register(rule)?;
        }
        Ok(registry)
    }

    pub fn try_register(&mut self, rule: Rule) -> Result<(), RegistryError> {
        if self.contains(rule.name()) {
            return Err(RegistryError::DuplicateRule(rule.name().to_string()));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Registers a rule whose name is known to be unique.
    ///
    /// # Panics
    ///
    /// Panics when a rule with the same name is already registered.
    pub fn register(&mut self, rule: Rule) {
        if let Err(err) = self.try_register(rule) {
            panic!("{err}");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules sorted by name, for listing.
    pub fn by_name(&self) -> Vec<&Rule> {
        self.rules
            .iter()
            .sorted_by(|a, b| a.name().cmp(b.name()))
            .collect()
    }

    /// Rules sorted by introduction date, for application. Rules of the same
    /// date keep their registration order.
    pub fn by_date(&self) -> Vec<&Rule> {
        self.rules.iter().sorted_by_key(|rule| rule.date()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.by_name().into_iter().map(Rule::name).collect()
    }

    /// Help text listing every rule with its description.
    pub fn describe(&self) -> String {
        let mut text = String::from("Available rewrites are:\n");
        for rule in self.by_name() {
            let tag = if rule.is_disabled() { " (disabled)" } else { "" };
            let description = rule.description().trim().replace('\n', "\n\t");
            let _ = write!(text, "\n{}{tag}\n\t{description}\n", rule.name());
        }
        text
    }
}
