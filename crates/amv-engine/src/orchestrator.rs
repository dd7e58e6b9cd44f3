//! # Validation Orchestrator
//!
//! Runs every selected rule against one subject and folds the outcomes into
//! a [`ValidationReport`].
//!
//! ## Guarantees
//!
//! - Every selected rule runs. A rule that errors or panics is recorded as a
//!   [`HardError`] and the remaining rules still execute.
//! - Findings and hard errors are sorted by rule code, whatever the
//!   registration order or the number of worker threads.
//! - A run succeeds iff there are no findings and no hard errors.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use serde::{Serialize, Serializer};

use amv_core::{MetaBundle, RuleError};

use crate::filter::Filter;
use crate::registry::Registry;
use crate::rule::{Rule, RuleResult};

/// A rule that ran and reported a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub code: String,
    pub name: String,
    pub message: String,
}

/// A rule that could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HardError {
    pub code: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: RuleError,
}

impl std::fmt::Display for HardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.error)
    }
}

fn serialize_display<S: Serializer>(error: &RuleError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Aggregate result of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Number of rules that ran.
    pub executed: usize,
    /// Number of rules that passed.
    pub passed: usize,
    pub failures: Vec<Finding>,
    pub hard_errors: Vec<HardError>,
}

impl ValidationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.hard_errors.is_empty()
    }
}

/// Executes filtered rules, optionally across a bounded number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator {
    jobs: usize,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self { jobs: 1 }
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run rules on up to `jobs` threads. Zero is treated as one.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Run every rule of `registry` that `filter` includes against `subject`.
    pub fn run(
        &self,
        subject: &MetaBundle,
        filter: &Filter,
        registry: &Registry,
    ) -> ValidationReport {
        let selected: Vec<&Rule> = registry.all().filter(|rule| filter.includes(rule)).collect();
        tracing::debug!(
            selected = selected.len(),
            registered = registry.len(),
            jobs = self.jobs,
            "running rules"
        );

        let outcomes = if self.jobs == 1 || selected.len() < 2 {
            selected.iter().map(|rule| invoke(*rule, subject)).collect()
        } else {
            fan_out(&selected, subject, self.jobs)
        };

        aggregate(outcomes)
    }
}

/// Run with a single thread.
pub fn run(subject: &MetaBundle, filter: &Filter, registry: &Registry) -> ValidationReport {
    Orchestrator::new().run(subject, filter, registry)
}

struct Outcome<'r> {
    rule: &'r Rule,
    result: RuleResult,
}

fn invoke<'r>(rule: &'r Rule, subject: &MetaBundle) -> Outcome<'r> {
    tracing::debug!(code = rule.code, name = rule.name, "running rule");
    let result = panic::catch_unwind(AssertUnwindSafe(|| rule.run(subject)))
        .unwrap_or_else(|payload| Err(RuleError::Panicked(panic_message(payload.as_ref()))));
    Outcome { rule, result }
}

fn fan_out<'r>(selected: &[&'r Rule], subject: &MetaBundle, jobs: usize) -> Vec<Outcome<'r>> {
    let chunk_size = selected.len().div_ceil(jobs);
    thread::scope(|scope| {
        let workers: Vec<_> = selected
            .chunks(chunk_size)
            .map(|chunk| {
                let handle = scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|rule| invoke(*rule, subject))
                        .collect::<Vec<_>>()
                });
                (chunk, handle)
            })
            .collect();

        workers
            .into_iter()
            .flat_map(|(chunk, handle)| {
                handle.join().unwrap_or_else(|_| {
                    chunk
                        .iter()
                        .map(|rule| Outcome {
                            rule: *rule,
                            result: Err(RuleError::Panicked("rule worker thread died".to_string())),
                        })
                        .collect()
                })
            })
            .collect()
    })
}

fn aggregate(mut outcomes: Vec<Outcome<'_>>) -> ValidationReport {
    outcomes.sort_by(|a, b| a.rule.code.cmp(b.rule.code));

    let mut report = ValidationReport {
        executed: outcomes.len(),
        ..ValidationReport::default()
    };

    for Outcome { rule, result } in outcomes {
        match result {
            Ok(verdict) if verdict.passed => report.passed += 1,
            Ok(verdict) => {
                tracing::debug!(code = rule.code, message = %verdict.message, "rule failed");
                report.failures.push(Finding {
                    code: rule.code.to_string(),
                    name: rule.name.to_string(),
                    message: verdict.message,
                });
            }
            Err(error) => {
                tracing::warn!(code = rule.code, error = %error, "rule could not complete");
                report.hard_errors.push(HardError {
                    code: rule.code.to_string(),
                    error,
                });
            }
        }
    }

    tracing::info!(
        executed = report.executed,
        passed = report.passed,
        failed = report.failures.len(),
        errors = report.hard_errors.len(),
        "validation finished"
    );
    report
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
