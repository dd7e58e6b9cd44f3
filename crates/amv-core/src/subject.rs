//! # Subject Under Test
//!
//! [`MetaBundle`] is what every rule receives: the addon metadata, the
//! artifact the resolver picked, and the bundles extracted from that
//! artifact's index image. It is built once per run and only ever shared by
//! reference.

use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;
use crate::environment::Environment;
use crate::metadata::{AddonMetadata, ImageSet};

/// The artifact a run validates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum Artifact {
    /// A versioned image set.
    ImageSet(ImageSet),
    /// A static index image declared directly in the metadata.
    StaticIndexImage { index_image: String },
}

impl Artifact {
    /// Pull reference of the index image to extract bundles from.
    pub fn index_image(&self) -> &str {
        match self {
            Artifact::ImageSet(set) => &set.index_image,
            Artifact::StaticIndexImage { index_image } => index_image,
        }
    }

    pub fn image_set(&self) -> Option<&ImageSet> {
        match self {
            Artifact::ImageSet(set) => Some(set),
            Artifact::StaticIndexImage { .. } => None,
        }
    }

    /// Short human label: the image set name or the static image reference.
    pub fn label(&self) -> &str {
        match self {
            Artifact::ImageSet(set) => &set.name,
            Artifact::StaticIndexImage { index_image } => index_image,
        }
    }
}

/// The fully-resolved subject passed to every rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaBundle {
    pub environment: Environment,
    pub addon: AddonMetadata,
    pub artifact: Artifact,
    pub bundles: Vec<Bundle>,
}

impl MetaBundle {
    pub fn new(
        environment: Environment,
        addon: AddonMetadata,
        artifact: Artifact,
        bundles: Vec<Bundle>,
    ) -> Self {
        Self {
            environment,
            addon,
            artifact,
            bundles,
        }
    }

    /// The resolved image set, when the addon uses image sets.
    pub fn image_set(&self) -> Option<&ImageSet> {
        self.artifact.image_set()
    }
}
