use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use exitfix_golang::{Ast, GoError};

use crate::error::RegistryError;

/// The rewrite a rule performs on one syntax tree.
pub trait Fix: Send + Sync {
    /// Rewrites every match in `ast` and reports whether anything changed.
    fn apply(&self, ast: &mut Ast) -> Result<bool, GoError>;

    /// Callees, such as `exit.On`, of the calls this fix introduces.
    fn introduced_calls(&self) -> Vec<String> {
        Vec::new()
    }
}

impl<F> Fix for F
where
    F: Fn(&mut Ast) -> Result<bool, GoError> + Send + Sync,
{
    fn apply(&self, ast: &mut Ast) -> Result<bool, GoError> {
        self(ast)
    }
}

/// A named, dated rewrite.
#[derive(Clone)]
pub struct Rule {
    name: String,
    date: NaiveDate,
    description: String,
    disabled: bool,
    fix: Arc<dyn Fix>,
}

impl Rule {
    /// `date` is the day the rule was introduced, as `YYYY-MM-DD`.
    pub fn new(
        name: impl Into<String>,
        date: &str,
        description: impl Into<String>,
        fix: impl Fix + 'static,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            RegistryError::InvalidDate {
                rule: name.clone(),
                date: date.to_string(),
            }
        })?;
        Ok(Self {
            name,
            date,
            description: description.into(),
            disabled: false,
            fix: Arc::new(fix),
        })
    }

    /// Marks the rule as off unless forced.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn fix(&self) -> &dyn Fix {
        self.fix.as_ref()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("date", &self.date)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Ast) -> Result<bool, GoError> {
        Ok(false)
    }

    #[test]
    fn rule_dates_are_validated() {
        let rule = Rule::new("noop", "2017-09-10", "does nothing", noop).unwrap();
        assert_eq!(rule.date(), NaiveDate::from_ymd_opt(2017, 9, 10).unwrap());
        assert!(!rule.is_disabled());

        let err = Rule::new("noop", "10/09/2017", "does nothing", noop).unwrap_err();
        assert_eq!(
            err,
            RegistryError::InvalidDate {
                rule: "noop".to_string(),
                date: "10/09/2017".to_string(),
            }
        );
    }
}
