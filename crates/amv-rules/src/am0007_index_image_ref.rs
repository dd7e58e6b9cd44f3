//! AM0007: the index image lives under `quay.io/osd-addons/` and image sets
//! carry their related images.

use std::sync::OnceLock;

use regex::Regex;

use amv_core::{Artifact, ConfigError, MetaBundle};
use amv_engine::{Registry, Rule, RuleResult, Verdict};

pub const AM0007: Rule = Rule::new(
    "AM0007",
    "index_image_ref",
    "Ensure that the index image is hosted under quay.io/osd-addons and that image sets list their related images",
    validate_index_image_ref,
);

const INDEX_IMAGE_PATTERN: &str = r"^quay\.io/osd-addons/[a-z-]+";

static INDEX_IMAGE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

pub fn register(registry: &mut Registry) -> Result<(), ConfigError> {
    registry.register(AM0007)
}

pub fn validate_index_image_ref(mb: &MetaBundle) -> RuleResult {
    let re = crate::pattern(&INDEX_IMAGE, INDEX_IMAGE_PATTERN)?;
    let mut problems = Vec::new();

    let index_image = mb.artifact.index_image();
    if !re.is_match(index_image) {
        problems.push(format!(
            "index image {index_image:?} does not match {INDEX_IMAGE_PATTERN:?}"
        ));
    }

    if let Artifact::ImageSet(set) = &mb.artifact {
        if set.related_images.is_empty() {
            problems.push(format!("image set {} lists no `relatedImages`", set.name));
        }
    }

    Ok(Verdict::check(problems.is_empty(), problems.join("; ")))
}
