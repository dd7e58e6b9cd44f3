//! # Addon Metadata and Image Sets
//!
//! Typed views of the two YAML documents an addon directory carries per
//! environment: `addon.yaml` (the addon's declared metadata) and the image
//! set files (one deployable version each).
//!
//! Field names follow the on-disk camelCase keys. Only `id` and
//! `operatorName` are required; everything else defaults so that rules, not
//! the parser, decide what a missing field means. Keys this model does not
//! name are preserved in `extra`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::environment::Environment;

/// The addon's declared metadata for one environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonMetadata {
    /// Addon identifier, e.g. `reference-addon`.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Name of the OLM package the addon installs.
    pub operator_name: String,
    /// Cluster label marking the addon as installed.
    #[serde(default)]
    pub label: String,
    /// Base64-encoded PNG icon.
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub default_channel: String,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub target_namespace: String,
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Image reference of the addon's test harness.
    #[serde(default)]
    pub test_harness: String,
    #[serde(default)]
    pub install_mode: String,
    /// Static index image for addons that do not use image sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_image: Option<String>,
    /// Default image set version: `latest` or `MAJOR.MINOR.PATCH`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addon_image_set_version: Option<String>,
    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl AddonMetadata {
    /// Metadata with only the required fields set.
    pub fn new(id: impl Into<String>, operator_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: String::new(),
            operator_name: operator_name.into(),
            label: String::new(),
            icon: String::new(),
            default_channel: String::new(),
            channels: Vec::new(),
            target_namespace: String::new(),
            namespaces: Vec::new(),
            test_harness: String::new(),
            install_mode: String::new(),
            index_image: None,
            addon_image_set_version: None,
            extra: BTreeMap::new(),
        }
    }
}

/// An OLM channel the addon subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub name: String,
    #[serde(default, rename = "currentCSV")]
    pub current_csv: String,
}

/// One concrete, deployable version of the addon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSet {
    /// `<addon>.v<MAJOR.MINOR.PATCH>`.
    pub name: String,
    /// Pull reference of the catalog index image.
    pub index_image: String,
    /// Images of related operators.
    #[serde(default)]
    pub related_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_on_parameters: Option<Vec<AddOnParameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_on_requirements: Option<Vec<AddOnRequirement>>,
    /// Operators whose life cycle the addon's umbrella operator controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_operators: Option<Vec<SubOperator>>,
}

impl ImageSet {
    /// The version encoded in the name, if the name is well-formed.
    pub fn version(&self) -> Option<semver::Version> {
        crate::version::image_set_version(&self.name)
    }
}

/// A user-supplied parameter the addon accepts at install time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOnParameter {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub value_type: String,
    #[serde(default)]
    pub validation: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub default_value: Option<String>,
}

/// A cluster-side precondition for installing the addon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOnRequirement {
    pub id: String,
    pub resource: String,
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
    #[serde(default)]
    pub enabled: bool,
}

/// An operator whose life cycle is owned by the addon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubOperator {
    pub operator_name: String,
    pub operator_namespace: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Everything the loader reads for one environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AddonManifest {
    pub environment: Environment,
    pub metadata: AddonMetadata,
    /// Image sets in file-name order.
    pub image_sets: Vec<ImageSet>,
}
