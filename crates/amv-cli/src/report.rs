//! # Report Rendering
//!
//! Writes a [`ValidationRun`] to stdout as text or JSON.
//!
//! Text:
//!
//! ```text
//! FAIL AM0002 label_format: `label` "..." does not match ...
//! ERROR AM0008: malformed input: ...
//! 6/8 rules passed
//! ```

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use serde::Serialize;

use amv_core::Environment;
use amv_engine::{Finding, HardError, ValidationRun};

/// Output format for reports and listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON document for one run.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub environment: Environment,
    /// Version of the validated image set; absent for a static index image.
    pub version: Option<String>,
    pub artifact: &'a str,
    pub index_image: &'a str,
    pub generated_at: String,
    pub executed: usize,
    pub passed: usize,
    pub failures: &'a [Finding],
    pub hard_errors: &'a [HardError],
    pub success: bool,
}

impl<'a> JsonReport<'a> {
    pub fn new(run: &'a ValidationRun, generated_at: DateTime<Utc>) -> Self {
        let subject = &run.subject;
        Self {
            environment: subject.environment,
            version: subject
                .image_set()
                .and_then(|set| set.version())
                .map(|v| v.to_string()),
            artifact: subject.artifact.label(),
            index_image: subject.artifact.index_image(),
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            executed: run.report.executed,
            passed: run.report.passed,
            failures: &run.report.failures,
            hard_errors: &run.report.hard_errors,
            success: run.report.is_success(),
        }
    }
}

/// Write `run` in `format`.
pub fn render(out: &mut impl Write, run: &ValidationRun, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(out, run),
        OutputFormat::Json => write_json(out, run, Utc::now()),
    }
}

pub fn write_text(out: &mut impl Write, run: &ValidationRun) -> Result<()> {
    let report = &run.report;
    for finding in &report.failures {
        writeln!(
            out,
            "FAIL {} {}: {}",
            finding.code, finding.name, finding.message
        )?;
    }
    for error in &report.hard_errors {
        writeln!(out, "ERROR {error}")?;
    }
    writeln!(out, "{}/{} rules passed", report.passed, report.executed)?;
    Ok(())
}

pub fn write_json(
    out: &mut impl Write,
    run: &ValidationRun,
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let doc = JsonReport::new(run, generated_at);
    serde_json::to_writer_pretty(&mut *out, &doc).context("failed to serialize report")?;
    writeln!(out)?;
    Ok(())
}
