//! # Rule Registry
//!
//! The table of known rules, keyed by code. A registry is filled through
//! `&mut` during start-up and only handed out by shared reference afterwards,
//! so there is no run-time registration and no locking.
//!
//! Registering a code twice is rejected rather than overwriting: a rule that
//! silently shadows another would never run.

use std::collections::BTreeMap;

use amv_core::ConfigError;

use crate::rule::Rule;

/// Registered rules, unique by code.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    rules: BTreeMap<&'static str, Rule>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidRuleCode`] if the code is empty or not ASCII
    ///   alphanumeric.
    /// - [`ConfigError::DuplicateRuleCode`] if the code is already taken. The
    ///   registry is left unchanged.
    pub fn register(&mut self, rule: Rule) -> Result<(), ConfigError> {
        if !is_valid_code(rule.code) {
            return Err(ConfigError::InvalidRuleCode {
                code: rule.code.to_string(),
            });
        }
        if self.rules.contains_key(rule.code) {
            return Err(ConfigError::DuplicateRuleCode {
                code: rule.code.to_string(),
            });
        }
        tracing::trace!(code = rule.code, name = rule.name, "registered rule");
        self.rules.insert(rule.code, rule);
        Ok(())
    }

    /// Every registered rule, ordered by code.
    pub fn all(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.values()
    }

    pub fn get(&self, code: &str) -> Option<&Rule> {
        self.rules.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rules.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric())
}
