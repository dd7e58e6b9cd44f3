//! # CLI Configuration
//!
//! Settings that tune how a run obtains bundles and executes rules. Each
//! value is resolved from, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. the YAML file passed with `--config`,
//! 3. environment variables,
//! 4. command-line flags (applied by the subcommand).
//!
//! Variables:
//! - `AMV_BUNDLE_CACHE` (default: `<addon-dir>/bundles`)
//! - `AMV_EXTRACT_TIMEOUT_SECS` (default: 120)
//! - `AMV_JOBS` (default: 1)

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

pub const BUNDLE_CACHE_VAR: &str = "AMV_BUNDLE_CACHE";
pub const EXTRACT_TIMEOUT_VAR: &str = "AMV_EXTRACT_TIMEOUT_SECS";
pub const JOBS_VAR: &str = "AMV_JOBS";

pub const DEFAULT_EXTRACT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_JOBS: usize = 1;

/// Directory under the addon that holds unpacked index images when no cache
/// is configured.
pub const DEFAULT_BUNDLE_DIR: &str = "bundles";

/// Resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root of the unpacked index image cache. `None` means
    /// `<addon-dir>/bundles`.
    pub bundle_cache: Option<PathBuf>,
    /// Deadline for bundle extraction.
    pub extract_timeout_secs: u64,
    /// Upper bound on rule worker threads.
    pub jobs: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bundle_cache: None,
            extract_timeout_secs: DEFAULT_EXTRACT_TIMEOUT_SECS,
            jobs: DEFAULT_JOBS,
        }
    }
}

/// On-disk shape of the `--config` file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    bundle_cache: Option<PathBuf>,
    extract_timeout_secs: Option<u64>,
    jobs: Option<usize>,
}

impl Settings {
    /// Load settings from `config_file` (if any) and the process
    /// environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with(config_file, |var| std::env::var(var).ok())
    }

    /// Like [`Settings::load`], reading variables through `lookup`.
    pub fn load_with(
        config_file: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        if let Some(path) = config_file {
            settings.merge_file(read_file_config(path)?);
        }

        if let Some(cache) = lookup(BUNDLE_CACHE_VAR).filter(|v| !v.is_empty()) {
            settings.bundle_cache = Some(PathBuf::from(cache));
        }
        if let Some(secs) = env_parse(&lookup, EXTRACT_TIMEOUT_VAR)? {
            settings.extract_timeout_secs = secs;
        }
        if let Some(jobs) = env_parse(&lookup, JOBS_VAR)? {
            settings.jobs = jobs;
        }

        settings.check()?;
        Ok(settings)
    }

    fn merge_file(&mut self, file: FileConfig) {
        if file.bundle_cache.is_some() {
            self.bundle_cache = file.bundle_cache;
        }
        if let Some(secs) = file.extract_timeout_secs {
            self.extract_timeout_secs = secs;
        }
        if let Some(jobs) = file.jobs {
            self.jobs = jobs;
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        bundle_cache: Option<PathBuf>,
        extract_timeout_secs: Option<u64>,
        jobs: Option<usize>,
    ) -> Result<Self, SettingsError> {
        if bundle_cache.is_some() {
            self.bundle_cache = bundle_cache;
        }
        if let Some(secs) = extract_timeout_secs {
            self.extract_timeout_secs = secs;
        }
        if let Some(jobs) = jobs {
            self.jobs = jobs;
        }
        self.check()?;
        Ok(self)
    }

    /// Cache root for an addon, falling back to `<addon-dir>/bundles`.
    pub fn bundle_cache_for(&self, addon_dir: &Path) -> PathBuf {
        self.bundle_cache
            .clone()
            .unwrap_or_else(|| addon_dir.join(DEFAULT_BUNDLE_DIR))
    }

    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs)
    }

    fn check(&self) -> Result<(), SettingsError> {
        if self.extract_timeout_secs == 0 {
            return Err(SettingsError::NotPositive {
                key: "extract_timeout_secs",
            });
        }
        if self.jobs == 0 {
            return Err(SettingsError::NotPositive { key: "jobs" });
        }
        Ok(())
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn env_parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, SettingsError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::InvalidVar { var, value: raw }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid value {value:?} for {var}")]
    InvalidVar { var: &'static str, value: String },
    #[error("{key} must be greater than zero")]
    NotPositive { key: &'static str },
}
