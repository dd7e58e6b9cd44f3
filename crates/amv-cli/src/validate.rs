//! # Validate Subcommand
//!
//! Validates one addon directory for one environment and version.
//!
//! Operator input is checked before anything is read from the addon: the
//! directory, then `--env`, then `--version`, then the rule registry and the
//! `--enabled`/`--disabled` filter. Only then are settings resolved, the
//! metadata loaded, the artifact resolved and its bundles extracted. The
//! first failure of any step ends the run with exit code 1 and no rule runs.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use amv_core::{ConfigError, Environment, ValidateError, VersionRequest};
use amv_engine::{
    DeadlineExtractor, Filter, FsMetadataLoader, LocalBundleExtractor, Orchestrator, Pipeline,
    Registry,
};

use crate::config::Settings;
use crate::report::{self, OutputFormat};

/// Arguments for the `amv validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Environment to validate: integration, stage or production.
    #[arg(long, default_value = "stage")]
    pub env: String,

    /// Image set version: empty for the declared default, `latest`, or MAJOR.MINOR.PATCH.
    #[arg(long, default_value = "")]
    pub version: String,

    /// Comma-separated rule codes to skip. Cannot be combined with --enabled.
    #[arg(long, default_value = "", value_name = "CODES")]
    pub disabled: String,

    /// Comma-separated rule codes to run exclusively. Cannot be combined with --disabled.
    #[arg(long, default_value = "", value_name = "CODES")]
    pub enabled: String,

    /// Root of the unpacked index image cache.
    #[arg(long, value_name = "DIR")]
    pub bundle_cache: Option<PathBuf>,

    /// Bundle extraction deadline in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum number of rules run concurrently.
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Addon directory containing `metadata/<env>/addon.yaml`.
    #[arg(value_name = "ADDON_DIR")]
    pub addon_dir: PathBuf,
}

/// Operator input that passed every configuration check.
#[derive(Debug)]
pub struct Prepared {
    pub addon_dir: PathBuf,
    pub environment: Environment,
    pub version: VersionRequest,
    pub registry: Registry,
    pub filter: Filter,
}

/// Check operator input in order, stopping at the first problem.
pub fn prepare(args: &ValidateArgs) -> Result<Prepared, ValidateError> {
    let addon_dir = resolve_addon_dir(&args.addon_dir, crate::absolute_path)?;
    let environment: Environment = args.env.parse()?;
    let version = VersionRequest::parse(&args.version)?;
    let registry = amv_rules::registry()?;
    let filter = Filter::new(&args.disabled, &args.enabled, &registry)?;

    Ok(Prepared {
        addon_dir,
        environment,
        version,
        registry,
        filter,
    })
}

fn resolve_addon_dir(
    path: &Path,
    absolute: impl FnOnce(&Path) -> io::Result<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    let resolved = absolute(path).map_err(|e| ConfigError::WorkingDirectory {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !resolved.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(resolved)
}

/// Execute the validate subcommand, writing the report to stdout.
///
/// Returns exit code: 0 when every selected rule passed, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, config: Option<&Path>) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    validate_to(args, config, &mut out)
}

/// Execute the validate subcommand, writing the report to `out`.
pub fn validate_to(
    args: &ValidateArgs,
    config: Option<&Path>,
    out: &mut impl Write,
) -> Result<u8> {
    let prepared = prepare(args).context("a fatal error occurred while preparing validations")?;

    let settings = Settings::load(config)
        .and_then(|s| s.with_overrides(args.bundle_cache.clone(), args.timeout, args.jobs))
        .context("invalid configuration")?;

    let cache = settings.bundle_cache_for(&prepared.addon_dir);
    tracing::info!(
        addon_dir = %prepared.addon_dir.display(),
        env = %prepared.environment,
        version = %prepared.version,
        cache = %cache.display(),
        jobs = settings.jobs,
        "validating addon"
    );

    let extractor = DeadlineExtractor::new(
        Arc::new(LocalBundleExtractor::new(cache)),
        settings.extract_timeout(),
    );
    let loader = FsMetadataLoader::new();
    let run = Pipeline::new(&prepared.registry, &loader, &extractor)
        .with_orchestrator(Orchestrator::new().with_jobs(settings.jobs))
        .run(
            &prepared.addon_dir,
            prepared.environment,
            &prepared.version,
            &prepared.filter,
        )
        .with_context(|| format!("cannot validate {}", prepared.addon_dir.display()))?;

    report::render(out, &run, args.format)?;

    Ok(if run.report.is_success() { 0 } else { 1 })
}
