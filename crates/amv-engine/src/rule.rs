//! # Rule Contract
//!
//! A [`Rule`] is a flat descriptor around a plain function pointer. Rules do
//! not hold state and cannot observe each other; the only thing they see is
//! the shared, read-only [`MetaBundle`].
//!
//! A runner answers with a [`Verdict`] when it could evaluate the subject
//! (passed or not), and with a [`RuleError`] when it could not.

use std::fmt;

use amv_core::{MetaBundle, RuleError};

/// What a runner returns.
pub type RuleResult = Result<Verdict, RuleError>;

/// The check itself.
pub type Runner = fn(&MetaBundle) -> RuleResult;

/// Outcome of a rule that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    /// Explains a failure. Empty for passes.
    pub message: String,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Pass when `passed` holds, otherwise fail with `message`.
    pub fn check(passed: bool, message: impl Into<String>) -> Self {
        if passed {
            Self::pass()
        } else {
            Self::fail(message)
        }
    }
}

/// An immutable, registrable validation rule.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Stable identifier, e.g. `AM0004`.
    pub code: &'static str,
    /// Short snake_case name.
    pub name: &'static str,
    pub description: &'static str,
    pub runner: Runner,
}

impl Rule {
    pub const fn new(
        code: &'static str,
        name: &'static str,
        description: &'static str,
        runner: Runner,
    ) -> Self {
        Self {
            code,
            name,
            description,
            runner,
        }
    }

    /// Invoke the runner against `subject`.
    pub fn run(&self, subject: &MetaBundle) -> RuleResult {
        (self.runner)(subject)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("code", &self.code)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
