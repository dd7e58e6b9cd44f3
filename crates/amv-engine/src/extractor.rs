//! # Bundle Extraction
//!
//! Turns an index image reference into the operator bundles it carries.
//!
//! [`LocalBundleExtractor`] reads a cache of already-unpacked index images:
//!
//! ```text
//! <cache>/<sanitized index image>/<bundle>/
//!   manifests/*.yaml | *.yml | *.json
//!   metadata/annotations.yaml
//! ```
//!
//! [`DeadlineExtractor`] bounds any extractor in time. Extraction is the only
//! step of a run that may block on something outside the process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use amv_core::bundle::{
    parse_channels, CHANNELS_ANNOTATION, DEFAULT_CHANNEL_ANNOTATION, PACKAGE_ANNOTATION,
};
use amv_core::{Bundle, ExtractionError};

/// Supplies the operator bundles of an index image.
pub trait BundleExtractor: Send + Sync {
    /// Bundles in `index_image` that belong to `operator_name`.
    fn extract_bundles(
        &self,
        index_image: &str,
        operator_name: &str,
    ) -> Result<Vec<Bundle>, ExtractionError>;
}

/// Cache directory name for an image reference: `/`, `:` and `@` become `_`.
pub fn sanitize_image_ref(image: &str) -> String {
    image
        .chars()
        .map(|c| match c {
            '/' | ':' | '@' => '_',
            other => other,
        })
        .collect()
}

/// [`BundleExtractor`] over a directory of unpacked index images.
#[derive(Debug, Clone)]
pub struct LocalBundleExtractor {
    cache_root: PathBuf,
}

#[derive(Debug, Deserialize)]
struct AnnotationsFile {
    #[serde(default)]
    annotations: BTreeMap<String, String>,
}

impl LocalBundleExtractor {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
        }
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Read one bundle directory. `Ok(None)` when it carries no package
    /// annotation and so cannot belong to any operator.
    fn read_bundle(&self, dir: &Path) -> Result<Option<Bundle>, ExtractionError> {
        let annotations_path = dir.join("metadata").join("annotations.yaml");
        if !annotations_path.is_file() {
            tracing::warn!(
                bundle = %dir.display(),
                "bundle has no metadata/annotations.yaml, skipping"
            );
            return Ok(None);
        }
        let file: AnnotationsFile = serde_yaml::from_str(&read(&annotations_path)?).map_err(|e| {
            ExtractionError::Manifest {
                path: annotations_path.clone(),
                source: e,
            }
        })?;
        let mut annotations = file.annotations;
        let Some(package) = annotations.remove(PACKAGE_ANNOTATION) else {
            tracing::warn!(bundle = %dir.display(), "bundle has no package annotation, skipping");
            return Ok(None);
        };

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Some(Bundle {
            name,
            package,
            channels: annotations
                .get(CHANNELS_ANNOTATION)
                .map(|raw| parse_channels(raw))
                .unwrap_or_default(),
            default_channel: annotations.remove(DEFAULT_CHANNEL_ANNOTATION),
            manifests: read_manifests(&dir.join("manifests"))?,
        }))
    }
}

impl BundleExtractor for LocalBundleExtractor {
    fn extract_bundles(
        &self,
        index_image: &str,
        operator_name: &str,
    ) -> Result<Vec<Bundle>, ExtractionError> {
        let image_dir = self.cache_root.join(sanitize_image_ref(index_image));
        if !image_dir.is_dir() {
            return Err(ExtractionError::IndexImageNotFound {
                image: index_image.to_string(),
                cache: self.cache_root.clone(),
            });
        }

        let mut bundles = Vec::new();
        for dir in sorted_entries(&image_dir)? {
            if !dir.is_dir() {
                continue;
            }
            match self.read_bundle(&dir)? {
                Some(bundle) if bundle.package == operator_name => bundles.push(bundle),
                Some(bundle) => {
                    tracing::trace!(
                        bundle = %bundle.name,
                        package = %bundle.package,
                        "bundle belongs to another package"
                    );
                }
                None => {}
            }
        }

        if bundles.is_empty() {
            return Err(ExtractionError::NoBundles {
                image: index_image.to_string(),
                operator: operator_name.to_string(),
            });
        }

        tracing::info!(
            image = index_image,
            operator = operator_name,
            bundles = bundles.len(),
            "extracted bundles"
        );
        Ok(bundles)
    }
}

/// Bounds an inner extractor by a deadline.
///
/// The inner call runs on a worker thread; if it has not answered when the
/// deadline passes, [`ExtractionError::Timeout`] is returned and the worker
/// is left to finish on its own.
#[derive(Clone)]
pub struct DeadlineExtractor {
    inner: Arc<dyn BundleExtractor>,
    deadline: Duration,
}

impl DeadlineExtractor {
    pub fn new(inner: Arc<dyn BundleExtractor>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

impl BundleExtractor for DeadlineExtractor {
    fn extract_bundles(
        &self,
        index_image: &str,
        operator_name: &str,
    ) -> Result<Vec<Bundle>, ExtractionError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let image = index_image.to_string();
        let operator = operator_name.to_string();

        thread::Builder::new()
            .name("bundle-extract".to_string())
            .spawn(move || {
                // The receiver is gone once the deadline has passed.
                let _ = tx.send(inner.extract_bundles(&image, &operator));
            })
            .map_err(|e| ExtractionError::Aborted {
                image: index_image.to_string(),
                reason: format!("failed to spawn extraction worker: {e}"),
            })?;

        match rx.recv_timeout(self.deadline) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ExtractionError::Timeout {
                image: index_image.to_string(),
                deadline: self.deadline,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(ExtractionError::Aborted {
                image: index_image.to_string(),
                reason: "extraction worker exited without a result".to_string(),
            }),
        }
    }
}

fn read(path: &Path) -> Result<String, ExtractionError> {
    std::fs::read_to_string(path).map_err(|e| ExtractionError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let io_err = |source| ExtractionError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        entries.push(entry.map_err(io_err)?.path());
    }
    entries.sort();
    Ok(entries)
}

/// Every YAML document in every manifest file under `dir`, in file-name
/// order. Empty documents are dropped.
fn read_manifests(dir: &Path) -> Result<Vec<Value>, ExtractionError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut manifests = Vec::new();
    for path in sorted_entries(dir)? {
        let is_manifest = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml") | Some("json")
        );
        if !path.is_file() || !is_manifest {
            continue;
        }
        let content = read(&path)?;
        for document in serde_yaml::Deserializer::from_str(&content) {
            let value = Value::deserialize(document).map_err(|e| ExtractionError::Manifest {
                path: path.clone(),
                source: e,
            })?;
            if !value.is_null() {
                manifests.push(value);
            }
        }
    }
    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: &str = "quay.io/osd-addons/reference-addon-index@sha256:abc";

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn write_bundle(cache: &Path, bundle: &str, package: &str) {
        let dir = cache.join(sanitize_image_ref(IMAGE)).join(bundle);
        write(
            &dir.join("metadata/annotations.yaml"),
            &format!(
                "annotations:\n  {PACKAGE_ANNOTATION}: {package}\n  {CHANNELS_ANNOTATION}: alpha,beta\n  {DEFAULT_CHANNEL_ANNOTATION}: alpha\n"
            ),
        );
        write(
            &dir.join("manifests/csv.yaml"),
            "kind: ClusterServiceVersion\nspec:\n  version: 0.1.0\n---\nkind: Service\n",
        );
    }

    #[test]
    fn sanitizes_registry_separators() {
        assert_eq!(
            sanitize_image_ref("quay.io/osd-addons/x-index:v1@sha256:ab"),
            "quay.io_osd-addons_x-index_v1_sha256_ab"
        );
    }

    #[test]
    fn extracts_only_the_operator_package() {
        let cache = tempfile::tempdir().unwrap();
        write_bundle(cache.path(), "reference-addon.v0.2.0", "reference-addon");
        write_bundle(cache.path(), "reference-addon.v0.1.0", "reference-addon");
        write_bundle(cache.path(), "other.v1.0.0", "other");

        let bundles = LocalBundleExtractor::new(cache.path())
            .extract_bundles(IMAGE, "reference-addon")
            .unwrap();

        let names: Vec<_> = bundles.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["reference-addon.v0.1.0", "reference-addon.v0.2.0"]);
        assert_eq!(bundles[0].channels, vec!["alpha", "beta"]);
        assert_eq!(bundles[0].default_channel.as_deref(), Some("alpha"));
        assert_eq!(bundles[0].manifests.len(), 2);
        assert!(bundles[0].csv().is_some());
    }

    #[test]
    fn missing_image_is_not_found() {
        let cache = tempfile::tempdir().unwrap();
        let err = LocalBundleExtractor::new(cache.path())
            .extract_bundles(IMAGE, "reference-addon")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::IndexImageNotFound { .. }));
    }

    #[test]
    fn no_matching_package_is_no_bundles() {
        let cache = tempfile::tempdir().unwrap();
        write_bundle(cache.path(), "other.v1.0.0", "other");

        let err = LocalBundleExtractor::new(cache.path())
            .extract_bundles(IMAGE, "reference-addon")
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::NoBundles { ref operator, .. } if operator == "reference-addon"
        ));
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let cache = tempfile::tempdir().unwrap();
        write_bundle(cache.path(), "reference-addon.v0.1.0", "reference-addon");
        write(
            &cache
                .path()
                .join(sanitize_image_ref(IMAGE))
                .join("reference-addon.v0.1.0/manifests/zz-broken.yaml"),
            "kind: [unterminated\n",
        );

        let err = LocalBundleExtractor::new(cache.path())
            .extract_bundles(IMAGE, "reference-addon")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Manifest { .. }));
    }

    struct Slow;

    impl BundleExtractor for Slow {
        fn extract_bundles(&self, _: &str, _: &str) -> Result<Vec<Bundle>, ExtractionError> {
            thread::sleep(Duration::from_secs(5));
            Ok(Vec::new())
        }
    }

    struct Panics;

    impl BundleExtractor for Panics {
        fn extract_bundles(&self, _: &str, _: &str) -> Result<Vec<Bundle>, ExtractionError> {
            panic!("registry exploded");
        }
    }

    #[test]
    fn deadline_times_out_slow_extractors() {
        let extractor = DeadlineExtractor::new(Arc::new(Slow), Duration::from_millis(50));
        let err = extractor.extract_bundles(IMAGE, "reference-addon").unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Timeout { deadline, .. } if deadline == Duration::from_millis(50)
        ));
        assert!(err.to_string().ends_with("timed out after 50ms"));
    }

    #[test]
    fn deadline_passes_results_through() {
        let cache = tempfile::tempdir().unwrap();
        write_bundle(cache.path(), "reference-addon.v0.1.0", "reference-addon");
        let extractor = DeadlineExtractor::new(
            Arc::new(LocalBundleExtractor::new(cache.path())),
            Duration::from_secs(10),
        );
        let bundles = extractor.extract_bundles(IMAGE, "reference-addon").unwrap();
        assert_eq!(bundles.len(), 1);
    }

    #[test]
    fn deadline_reports_a_crashed_worker() {
        let extractor = DeadlineExtractor::new(Arc::new(Panics), Duration::from_secs(10));
        let err = extractor.extract_bundles(IMAGE, "reference-addon").unwrap_err();
        assert!(matches!(err, ExtractionError::Aborted { .. }));
    }
}
