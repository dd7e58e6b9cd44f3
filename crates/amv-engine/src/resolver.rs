//! # Artifact Resolver
//!
//! Picks exactly one artifact for an (environment, version) request and
//! builds the [`MetaBundle`] every rule will see.
//!
//! ## Selection
//!
//! 1. An explicit request (`latest` or `MAJOR.MINOR.PATCH`) is used as is.
//! 2. No request defers to `addonImageSetVersion`; an addon that declares no
//!    default version but a static `indexImage` validates that image.
//! 3. Every image set name must encode a version. The sets matching the
//!    target version are counted: none is [`ResolutionError::NotFound`], more
//!    than one is [`ResolutionError::Ambiguous`]. Nothing is ever picked
//!    arbitrarily.
//!
//! Bundles are extracted only once the artifact is known. An extraction
//! failure aborts the run; there is no partial subject.

use semver::Version;

use amv_core::{
    AddonManifest, Artifact, ImageSet, MetaBundle, ResolutionError, ValidateError, VersionRequest,
};

use crate::extractor::BundleExtractor;

enum Target {
    Latest,
    Exact(Version),
}

/// Select the artifact for `request` without touching the network or disk.
pub fn select_artifact(
    manifest: &AddonManifest,
    request: &VersionRequest,
) -> Result<Artifact, ResolutionError> {
    let target = match request {
        VersionRequest::Latest => Target::Latest,
        VersionRequest::Exact(version) => Target::Exact(version.clone()),
        VersionRequest::Default => match default_target(manifest)? {
            Some(target) => target,
            None => {
                return static_index_image(manifest)
                    .map(|index_image| Artifact::StaticIndexImage { index_image })
                    .ok_or(ResolutionError::NoDefaultVersion {
                        env: manifest.environment,
                    });
            }
        },
    };

    let versioned = versioned_image_sets(&manifest.image_sets)?;
    let env = manifest.environment;

    let version = match target {
        Target::Exact(version) => version,
        Target::Latest => versioned
            .iter()
            .map(|(version, _)| version)
            .max()
            .cloned()
            .ok_or(ResolutionError::NoImageSets { env })?,
    };

    let matches: Vec<&ImageSet> = versioned
        .iter()
        .filter(|(v, _)| *v == version)
        .map(|(_, set)| *set)
        .collect();

    match matches.as_slice() {
        [] => Err(ResolutionError::NotFound {
            env,
            version: version.to_string(),
        }),
        [set] => Ok(Artifact::ImageSet((*set).clone())),
        many => Err(ResolutionError::Ambiguous {
            env,
            version: version.to_string(),
            names: many.iter().map(|set| set.name.clone()).collect(),
        }),
    }
}

/// Select the artifact, extract its bundles, and assemble the subject.
pub fn resolve(
    manifest: AddonManifest,
    request: &VersionRequest,
    extractor: &dyn BundleExtractor,
) -> Result<MetaBundle, ValidateError> {
    let artifact = select_artifact(&manifest, request)?;
    tracing::info!(
        addon = %manifest.metadata.id,
        env = %manifest.environment,
        requested = %request,
        artifact = artifact.label(),
        "resolved artifact"
    );

    let bundles =
        extractor.extract_bundles(artifact.index_image(), &manifest.metadata.operator_name)?;

    Ok(MetaBundle::new(
        manifest.environment,
        manifest.metadata,
        artifact,
        bundles,
    ))
}

/// The target named by `addonImageSetVersion`, or `None` when the metadata
/// declares no default.
fn default_target(manifest: &AddonManifest) -> Result<Option<Target>, ResolutionError> {
    let Some(declared) = manifest
        .metadata
        .addon_image_set_version
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
    else {
        return Ok(None);
    };

    match VersionRequest::parse(declared) {
        Ok(VersionRequest::Latest) => Ok(Some(Target::Latest)),
        Ok(VersionRequest::Exact(version)) => Ok(Some(Target::Exact(version))),
        Ok(VersionRequest::Default) | Err(_) => Err(ResolutionError::InvalidDeclaredVersion {
            value: declared.to_string(),
        }),
    }
}

fn static_index_image(manifest: &AddonManifest) -> Option<String> {
    manifest
        .metadata
        .index_image
        .as_deref()
        .map(str::trim)
        .filter(|image| !image.is_empty())
        .map(str::to_string)
}

fn versioned_image_sets(sets: &[ImageSet]) -> Result<Vec<(Version, &ImageSet)>, ResolutionError> {
    sets.iter()
        .map(|set| {
            set.version()
                .map(|version| (version, set))
                .ok_or_else(|| ResolutionError::MalformedImageSetName {
                    name: set.name.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use amv_core::{AddonMetadata, Bundle, Environment, ExtractionError};

    fn metadata() -> AddonMetadata {
        AddonMetadata::new("reference-addon", "reference-addon")
    }

    fn image_set(version: &str) -> ImageSet {
        ImageSet {
            name: format!("reference-addon.v{version}"),
            index_image: format!("quay.io/osd-addons/reference-addon-index:v{version}"),
            related_images: Vec::new(),
            add_on_parameters: None,
            add_on_requirements: None,
            sub_operators: None,
        }
    }

    fn manifest(versions: &[&str]) -> AddonManifest {
        AddonManifest {
            environment: Environment::Stage,
            metadata: metadata(),
            image_sets: versions.iter().map(|v| image_set(v)).collect(),
        }
    }

    fn exact(v: &str) -> VersionRequest {
        VersionRequest::parse(v).unwrap()
    }

    fn selected_name(artifact: Artifact) -> String {
        artifact.image_set().unwrap().name.clone()
    }

    #[test]
    fn exact_version_selects_matching_set() {
        let m = manifest(&["1.0.0", "1.1.0", "2.0.0"]);
        let artifact = select_artifact(&m, &exact("1.1.0")).unwrap();
        assert_eq!(selected_name(artifact), "reference-addon.v1.1.0");
    }

    #[test]
    fn latest_is_numerically_highest() {
        let m = manifest(&["1.9.0", "1.10.0", "1.2.0"]);
        let artifact = select_artifact(&m, &VersionRequest::Latest).unwrap();
        assert_eq!(selected_name(artifact), "reference-addon.v1.10.0");
    }

    #[test]
    fn missing_version_is_not_found() {
        let m = manifest(&["1.0.0"]);
        assert_eq!(
            select_artifact(&m, &exact("2.0.0")),
            Err(ResolutionError::NotFound {
                env: Environment::Stage,
                version: "2.0.0".to_string()
            })
        );
    }

    #[test]
    fn latest_without_sets_is_no_image_sets() {
        let m = manifest(&[]);
        assert_eq!(
            select_artifact(&m, &VersionRequest::Latest),
            Err(ResolutionError::NoImageSets {
                env: Environment::Stage
            })
        );
    }

    #[test]
    fn duplicate_versions_are_ambiguous() {
        let mut m = manifest(&["1.0.0", "1.0.0"]);
        m.image_sets[1].name = "reference-addon-copy.v1.0.0".to_string();

        for request in [exact("1.0.0"), VersionRequest::Latest] {
            let err = select_artifact(&m, &request).unwrap_err();
            assert_eq!(
                err,
                ResolutionError::Ambiguous {
                    env: Environment::Stage,
                    version: "1.0.0".to_string(),
                    names: vec![
                        "reference-addon.v1.0.0".to_string(),
                        "reference-addon-copy.v1.0.0".to_string()
                    ],
                }
            );
        }
    }

    #[test]
    fn malformed_set_name_fails_resolution() {
        let mut m = manifest(&["1.0.0"]);
        m.image_sets[0].name = "reference-addon-latest".to_string();
        assert!(matches!(
            select_artifact(&m, &VersionRequest::Latest),
            Err(ResolutionError::MalformedImageSetName { .. })
        ));
    }

    #[test]
    fn default_uses_declared_version() {
        let mut m = manifest(&["1.0.0", "2.0.0"]);
        m.metadata.addon_image_set_version = Some("1.0.0".to_string());
        let artifact = select_artifact(&m, &VersionRequest::Default).unwrap();
        assert_eq!(selected_name(artifact), "reference-addon.v1.0.0");

        m.metadata.addon_image_set_version = Some("latest".to_string());
        let artifact = select_artifact(&m, &VersionRequest::Default).unwrap();
        assert_eq!(selected_name(artifact), "reference-addon.v2.0.0");
    }

    #[test]
    fn explicit_request_overrides_declared_default() {
        let mut m = manifest(&["1.0.0", "2.0.0"]);
        m.metadata.addon_image_set_version = Some("1.0.0".to_string());
        let artifact = select_artifact(&m, &VersionRequest::Latest).unwrap();
        assert_eq!(selected_name(artifact), "reference-addon.v2.0.0");
    }

    #[test]
    fn invalid_declared_default_is_rejected() {
        let mut m = manifest(&["1.0.0"]);
        m.metadata.addon_image_set_version = Some("1.0".to_string());
        assert_eq!(
            select_artifact(&m, &VersionRequest::Default),
            Err(ResolutionError::InvalidDeclaredVersion {
                value: "1.0".to_string()
            })
        );
    }

    #[test]
    fn default_falls_back_to_static_index_image() {
        let mut m = manifest(&[]);
        m.metadata.index_image = Some("quay.io/osd-addons/legacy-index:v1".to_string());
        assert_eq!(
            select_artifact(&m, &VersionRequest::Default),
            Ok(Artifact::StaticIndexImage {
                index_image: "quay.io/osd-addons/legacy-index:v1".to_string()
            })
        );
    }

    #[test]
    fn default_without_declaration_or_static_image_fails() {
        let m = manifest(&["1.0.0"]);
        assert_eq!(
            select_artifact(&m, &VersionRequest::Default),
            Err(ResolutionError::NoDefaultVersion {
                env: Environment::Stage
            })
        );
    }

    struct CountingExtractor {
        calls: AtomicUsize,
        fail: bool,
    }

    impl BundleExtractor for CountingExtractor {
        fn extract_bundles(
            &self,
            index_image: &str,
            operator_name: &str,
        ) -> Result<Vec<Bundle>, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ExtractionError::IndexImageNotFound {
                    image: index_image.to_string(),
                    cache: "/nowhere".into(),
                });
            }
            Ok(vec![Bundle {
                name: format!("{operator_name}.v1.0.0"),
                package: operator_name.to_string(),
                channels: Vec::new(),
                default_channel: None,
                manifests: Vec::new(),
            }])
        }
    }

    #[test]
    fn resolve_extracts_from_selected_index_image() {
        let extractor = CountingExtractor {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        let subject = resolve(manifest(&["1.0.0"]), &exact("1.0.0"), &extractor).unwrap();

        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            subject.artifact.index_image(),
            "quay.io/osd-addons/reference-addon-index:v1.0.0"
        );
        assert_eq!(subject.bundles.len(), 1);
    }

    #[test]
    fn resolution_errors_skip_extraction() {
        let extractor = CountingExtractor {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        let err = resolve(manifest(&["1.0.0"]), &exact("3.0.0"), &extractor).unwrap_err();

        assert!(matches!(err, ValidateError::Resolution(_)));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn extraction_errors_surface_as_extraction() {
        let extractor = CountingExtractor {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let err = resolve(manifest(&["1.0.0"]), &exact("1.0.0"), &extractor).unwrap_err();
        assert!(matches!(err, ValidateError::Extraction(_)));
    }
}
