//! # Version Requests
//!
//! The version an operator asks for is one of three shapes: nothing (use the
//! metadata's declared default), `latest`, or a strict `MAJOR.MINOR.PATCH`.
//! Strict means what `semver` accepts minus pre-release and build metadata:
//! no `v` prefix, no leading zeros, exactly three numeric components.
//!
//! Image set names encode their version as `<addon>.v<MAJOR.MINOR.PATCH>`;
//! [`image_set_version`] extracts it.

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Literal that selects the highest available version.
pub const LATEST: &str = "latest";

/// A parsed `--version` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "version")]
pub enum VersionRequest {
    /// Defer to the metadata's declared default.
    Default,
    /// Highest semantic version available for the environment.
    Latest,
    /// Exactly this version.
    Exact(Version),
}

impl VersionRequest {
    /// Parse a raw version string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidVersion`] naming the string when it is
    /// neither empty, `latest`, nor strict `MAJOR.MINOR.PATCH`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw {
            "" => Ok(VersionRequest::Default),
            LATEST => Ok(VersionRequest::Latest),
            other => parse_strict(other).map(VersionRequest::Exact).ok_or_else(|| {
                ConfigError::InvalidVersion {
                    value: other.to_string(),
                }
            }),
        }
    }
}

impl fmt::Display for VersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRequest::Default => f.write_str("<default>"),
            VersionRequest::Latest => f.write_str(LATEST),
            VersionRequest::Exact(v) => write!(f, "{v}"),
        }
    }
}

/// Parse `MAJOR.MINOR.PATCH` with no pre-release or build suffix.
pub fn parse_strict(raw: &str) -> Option<Version> {
    let version = Version::parse(raw).ok()?;
    (version.pre.is_empty() && version.build.is_empty()).then_some(version)
}

/// Extract the version encoded in an image set name.
///
/// `reference-addon.v1.2.3` yields `1.2.3`. Returns `None` when the name has
/// no `.v` separator or the suffix is not a strict version.
pub fn image_set_version(name: &str) -> Option<Version> {
    let (addon, version) = name.rsplit_once(".v")?;
    if addon.is_empty() {
        return None;
    }
    parse_strict(version)
}
