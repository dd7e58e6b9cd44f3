//! # Selection Filter
//!
//! Decides which registered rules a run executes. A filter is either an
//! allow-list (`--enabled`), a block-list (`--disabled`), or empty; never a
//! mix of both. Every listed code is checked against the live registry so a
//! typo fails the run instead of silently selecting nothing.

use std::collections::BTreeSet;

use amv_core::ConfigError;

use crate::registry::Registry;
use crate::rule::Rule;

/// Rule selection for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    enabled: BTreeSet<String>,
    disabled: BTreeSet<String>,
}

impl Filter {
    /// Build a filter from raw comma-separated code lists.
    ///
    /// Empty input means an empty list; whitespace around codes is trimmed
    /// and empty fields are ignored.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ConflictingFilters`] if both lists are non-empty.
    /// - [`ConfigError::UnknownRuleCode`] for the first listed code (in
    ///   sorted order) that `registry` does not contain.
    pub fn new(
        disabled_csv: &str,
        enabled_csv: &str,
        registry: &Registry,
    ) -> Result<Self, ConfigError> {
        let disabled = parse_codes(disabled_csv);
        let enabled = parse_codes(enabled_csv);

        if !disabled.is_empty() && !enabled.is_empty() {
            return Err(ConfigError::ConflictingFilters);
        }

        for (list, codes) in [("disabled", &disabled), ("enabled", &enabled)] {
            if let Some(unknown) = codes.iter().find(|code| !registry.contains(code)) {
                return Err(ConfigError::UnknownRuleCode {
                    code: unknown.clone(),
                    list,
                });
            }
        }

        Ok(Self { enabled, disabled })
    }

    /// A filter that selects every rule.
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether `rule` runs under this filter.
    pub fn includes(&self, rule: &Rule) -> bool {
        self.includes_code(rule.code)
    }

    pub fn includes_code(&self, code: &str) -> bool {
        if !self.enabled.is_empty() {
            self.enabled.contains(code)
        } else if !self.disabled.is_empty() {
            !self.disabled.contains(code)
        } else {
            true
        }
    }

    pub fn enabled(&self) -> &BTreeSet<String> {
        &self.enabled
    }

    pub fn disabled(&self) -> &BTreeSet<String> {
        &self.disabled
    }
}

fn parse_codes(csv: &str) -> BTreeSet<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}
