//! # Operator Bundles
//!
//! An operator bundle as unpacked from an index image: the OLM annotations
//! that identify it and every manifest document it ships. Manifests are kept
//! as JSON values; rules pick out the kinds they care about.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Annotation carrying the bundle's package name.
pub const PACKAGE_ANNOTATION: &str = "operators.operatorframework.io.bundle.package.v1";
/// Annotation carrying the comma-separated channel list.
pub const CHANNELS_ANNOTATION: &str = "operators.operatorframework.io.bundle.channels.v1";
/// Annotation carrying the default channel.
pub const DEFAULT_CHANNEL_ANNOTATION: &str =
    "operators.operatorframework.io.bundle.channel.default.v1";

const CSV_KIND: &str = "ClusterServiceVersion";

/// One extracted operator bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    /// Directory name of the bundle inside the index image.
    pub name: String,
    /// OLM package the bundle belongs to.
    pub package: String,
    pub channels: Vec<String>,
    pub default_channel: Option<String>,
    /// Every manifest document under `manifests/`.
    pub manifests: Vec<Value>,
}

impl Bundle {
    /// All manifests of the `ClusterServiceVersion` kind.
    pub fn csvs(&self) -> impl Iterator<Item = &Value> {
        self.manifests
            .iter()
            .filter(|m| m.get("kind").and_then(Value::as_str) == Some(CSV_KIND))
    }

    /// The single CSV, when there is exactly one.
    pub fn csv(&self) -> Option<&Value> {
        let mut csvs = self.csvs();
        let first = csvs.next()?;
        csvs.next().is_none().then_some(first)
    }
}

/// Split an OLM channel annotation into trimmed, non-empty channel names.
pub fn parse_channels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
