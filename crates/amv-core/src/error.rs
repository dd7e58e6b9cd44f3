//! # Error Types — Structured Error Hierarchy
//!
//! Every failure a validation run can hit before, during, or around rule
//! execution. All errors use `thiserror` for derive-based `Display` and
//! `Error` implementations.
//!
//! ## Taxonomy
//!
//! - [`ConfigError`]: bad input from the operator or a defective rule table.
//!   Reported before any I/O beyond argument parsing.
//! - [`LoadError`]: the addon metadata could not be read or parsed.
//! - [`ResolutionError`]: no single artifact matches the requested
//!   environment and version.
//! - [`ExtractionError`]: the bundles of the chosen index image could not be
//!   obtained.
//! - [`RuleError`]: one rule could not complete. Isolated per rule, never
//!   aborts the run.
//!
//! A rule that runs and reports a violation is not an error at all; it
//! produces a failing verdict.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::environment::Environment;

/// Top-level error for a validation run. Any of these aborts the run before
/// (or instead of) rule execution.
#[derive(Error, Debug)]
pub enum ValidateError {
    /// Invalid flags, arguments, or rule table.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Addon metadata could not be loaded.
    #[error("metadata load error: {0}")]
    Load(#[from] LoadError),

    /// No single artifact could be selected.
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Bundle extraction failed.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Configuration defects: always fatal, always the operator's (or the rule
/// author's) to fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two rules were registered under the same code.
    #[error("rule code {code} is already registered")]
    DuplicateRuleCode { code: String },

    /// A rule code is empty or contains non-alphanumeric characters.
    #[error("invalid rule code {code:?}: must be non-empty ASCII alphanumeric")]
    InvalidRuleCode { code: String },

    /// `--env` is not one of the supported environments.
    #[error("'{value}' is not a valid environment; must be one of 'integration', 'stage' or 'production'")]
    InvalidEnvironment { value: String },

    /// `--version` is neither empty, `latest`, nor `MAJOR.MINOR.PATCH`.
    #[error("'{value}' is not a valid version; must be one of 'latest' or match 'MAJOR.MINOR.PATCH'")]
    InvalidVersion { value: String },

    /// Both `--enabled` and `--disabled` were given.
    #[error("--enabled and --disabled cannot be combined")]
    ConflictingFilters,

    /// A filter list names a code that no registered rule carries.
    #[error("unknown rule code {code:?} in --{list} list")]
    UnknownRuleCode { code: String, list: &'static str },

    /// The addon path does not exist or is not a directory.
    #[error("'{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// A relative addon path could not be resolved because the current
    /// directory is unavailable.
    #[error("cannot resolve '{}' against the current directory: {reason}", path.display())]
    WorkingDirectory { path: PathBuf, reason: String },
}

/// Failure to read the addon metadata from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A required metadata file was not found.
    #[error("required file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// YAML parsing failed.
    #[error("failed to parse YAML at {}: {source}", path.display())]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// I/O error while reading metadata.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failure to select exactly one artifact for the requested environment and
/// version.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// No version was requested and the metadata declares neither a default
    /// image set version nor a static index image.
    #[error("no version requested and the {env} metadata declares neither addonImageSetVersion nor indexImage")]
    NoDefaultVersion { env: Environment },

    /// The metadata's `addonImageSetVersion` is not `latest` or a strict
    /// semantic version.
    #[error("declared addonImageSetVersion {value:?} must be 'latest' or match 'MAJOR.MINOR.PATCH'")]
    InvalidDeclaredVersion { value: String },

    /// `latest` was requested but the environment has no image sets.
    #[error("no image sets declared for environment {env}")]
    NoImageSets { env: Environment },

    /// No image set carries the requested version.
    #[error("no image set found for environment {env} and version {version}")]
    NotFound { env: Environment, version: String },

    /// More than one image set carries the requested version.
    #[error("ambiguous image sets for environment {env} and version {version}: {}", names.join(", "))]
    Ambiguous {
        env: Environment,
        version: String,
        names: Vec<String>,
    },

    /// An image set name does not encode a version.
    #[error("image set name {name:?} does not match '<addon>.v<MAJOR.MINOR.PATCH>'")]
    MalformedImageSetName { name: String },
}

/// Failure to obtain the operator bundles of an index image.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The index image has no unpacked counterpart in the bundle cache.
    #[error("index image {image} not found in bundle cache {}", cache.display())]
    IndexImageNotFound { image: String, cache: PathBuf },

    /// The index image holds no bundle for the requested operator.
    #[error("index image {image} contains no bundle for operator {operator}")]
    NoBundles { image: String, operator: String },

    /// A bundle manifest or annotations file could not be parsed.
    #[error("failed to parse bundle file {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// I/O error while reading the bundle cache.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Extraction did not finish before the deadline.
    #[error("extraction of {image} timed out after {deadline:?}")]
    Timeout { image: String, deadline: Duration },

    /// The extraction worker went away without reporting a result.
    #[error("extraction of {image} aborted: {reason}")]
    Aborted { image: String, reason: String },
}

/// A rule could not complete. Distinct from a failing verdict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The subject carries data the rule cannot interpret.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The rule itself is defective, e.g. a built-in pattern fails to compile.
    #[error("internal rule error: {0}")]
    Internal(String),

    /// The rule panicked; the payload message is preserved.
    #[error("rule panicked: {0}")]
    Panicked(String),
}
