//! # List Subcommand
//!
//! Prints every registered rule ordered by code.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use amv_engine::Registry;

use crate::report::OutputFormat;

/// Arguments for the `amv list` subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Listing format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct RuleEntry<'a> {
    code: &'a str,
    name: &'a str,
    description: &'a str,
}

/// Execute the list subcommand.
pub fn run_list(args: &ListArgs) -> Result<u8> {
    let registry = amv_rules::registry().context("failed to assemble the rule registry")?;
    let stdout = std::io::stdout();
    write_list(&mut stdout.lock(), &registry, args.format)?;
    Ok(0)
}

pub fn write_list(out: &mut impl Write, registry: &Registry, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let width = registry.all().map(|r| r.name.len()).max().unwrap_or(0);
            for rule in registry.all() {
                writeln!(out, "{}  {:<width$}  {}", rule.code, rule.name, rule.description)?;
            }
        }
        OutputFormat::Json => {
            let entries: Vec<RuleEntry<'_>> = registry
                .all()
                .map(|r| RuleEntry {
                    code: r.code,
                    name: r.name,
                    description: r.description,
                })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &entries)
                .context("failed to serialize rule list")?;
            writeln!(out)?;
        }
    }
    Ok(())
}
