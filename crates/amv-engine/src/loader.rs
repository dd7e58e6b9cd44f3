//! # Metadata Loader
//!
//! Reads an addon directory into an [`AddonManifest`] for one environment.
//!
//! ## Layout
//!
//! ```text
//! <addon-dir>/
//!   metadata/<env>/addon.yaml
//!   addonimagesets/<env>/*.yaml | *.yml   (optional)
//! ```
//!
//! Image set files are read in file-name order so the manifest is the same
//! on every platform.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use amv_core::{AddonManifest, AddonMetadata, Environment, ImageSet, LoadError};

/// Supplies addon metadata and the environment's image sets.
pub trait MetadataLoader {
    fn load(&self, addon_dir: &Path, environment: Environment) -> Result<AddonManifest, LoadError>;
}

/// [`MetadataLoader`] over the on-disk addon directory layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMetadataLoader;

impl FsMetadataLoader {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataLoader for FsMetadataLoader {
    fn load(&self, addon_dir: &Path, environment: Environment) -> Result<AddonManifest, LoadError> {
        let metadata_path = metadata_path(addon_dir, environment);
        let metadata: AddonMetadata = load_yaml_typed(&metadata_path)?;

        let image_set_dir = image_set_dir(addon_dir, environment);
        let mut image_sets = Vec::new();
        for path in yaml_files(&image_set_dir)? {
            image_sets.push(load_yaml_typed::<ImageSet>(&path)?);
        }

        tracing::debug!(
            addon = %metadata.id,
            env = %environment,
            image_sets = image_sets.len(),
            "loaded addon metadata"
        );

        Ok(AddonManifest {
            environment,
            metadata,
            image_sets,
        })
    }
}

/// `<addon-dir>/metadata/<env>/addon.yaml`
pub fn metadata_path(addon_dir: &Path, environment: Environment) -> PathBuf {
    addon_dir
        .join("metadata")
        .join(environment.as_str())
        .join("addon.yaml")
}

/// `<addon-dir>/addonimagesets/<env>/`
pub fn image_set_dir(addon_dir: &Path, environment: Environment) -> PathBuf {
    addon_dir.join("addonimagesets").join(environment.as_str())
}

/// Load a YAML file into a strongly-typed struct.
pub(crate) fn load_yaml_typed<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    serde_yaml::from_str(&content).map_err(|e| LoadError::YamlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Sorted `*.yaml` / `*.yml` files directly under `dir`. A missing directory
/// yields no files.
fn yaml_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && has_yaml_extension(&path) {
            files.push(path);
        } else {
            tracing::trace!(path = %path.display(), "skipping non-YAML entry");
        }
    }
    files.sort();
    Ok(files)
}

pub(crate) fn has_yaml_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    const ADDON: &str = "id: reference-addon\noperatorName: reference-addon\n";

    #[test]
    fn loads_metadata_and_sorted_image_sets() {
        let dir = tempfile::tempdir().unwrap();
        write(&metadata_path(dir.path(), Environment::Stage), ADDON);
        let sets = image_set_dir(dir.path(), Environment::Stage);
        write(
            &sets.join("b.yaml"),
            "name: reference-addon.v1.1.0\nindexImage: quay.io/osd-addons/reference-addon-index:v1.1.0\n",
        );
        write(
            &sets.join("a.yml"),
            "name: reference-addon.v1.0.0\nindexImage: quay.io/osd-addons/reference-addon-index:v1.0.0\n",
        );
        write(&sets.join("README.md"), "not an image set");

        let manifest = FsMetadataLoader.load(dir.path(), Environment::Stage).unwrap();

        assert_eq!(manifest.environment, Environment::Stage);
        assert_eq!(manifest.metadata.id, "reference-addon");
        let names: Vec<_> = manifest.image_sets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["reference-addon.v1.0.0", "reference-addon.v1.1.0"]);
    }

    #[test]
    fn missing_image_set_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        write(&metadata_path(dir.path(), Environment::Production), ADDON);

        let manifest = FsMetadataLoader
            .load(dir.path(), Environment::Production)
            .unwrap();
        assert!(manifest.image_sets.is_empty());
    }

    #[test]
    fn missing_metadata_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write(&metadata_path(dir.path(), Environment::Stage), ADDON);

        let err = FsMetadataLoader
            .load(dir.path(), Environment::Integration)
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::FileNotFound { ref path } if path.ends_with("integration/addon.yaml")
        ));
    }

    #[test]
    fn malformed_image_set_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write(&metadata_path(dir.path(), Environment::Stage), ADDON);
        write(
            &image_set_dir(dir.path(), Environment::Stage).join("broken.yaml"),
            "name: [unterminated\n",
        );

        let err = FsMetadataLoader.load(dir.path(), Environment::Stage).unwrap_err();
        assert!(matches!(err, LoadError::YamlParse { .. }));
    }
}
