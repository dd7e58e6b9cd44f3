//! On-disk addon fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use tempfile::TempDir;

use amv_engine::extractor::sanitize_image_ref;

pub const ADDON_ID: &str = "reference-addon";

/// An addon directory with its own bundle cache under `bundles/`.
pub struct AddonFixture {
    root: TempDir,
}

impl AddonFixture {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    pub fn dir(&self) -> &Path {
        self.root.path()
    }

    pub fn cache(&self) -> PathBuf {
        self.dir().join("bundles")
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn addon(&self, env: &str, yaml: &str) -> &Self {
        self.write(&format!("metadata/{env}/addon.yaml"), yaml);
        self
    }

    pub fn image_set(&self, env: &str, version: &str) -> &Self {
        self.write(
            &format!("addonimagesets/{env}/{ADDON_ID}.v{version}.yaml"),
            &image_set_yaml(ADDON_ID, version),
        );
        self
    }

    /// Unpack one bundle of `package` into the cache entry of `index_image`.
    pub fn bundle(&self, index_image: &str, package: &str, version: &str) -> &Self {
        let bundle_dir = format!(
            "bundles/{}/{package}.v{version}",
            sanitize_image_ref(index_image)
        );
        self.write(
            &format!("{bundle_dir}/metadata/annotations.yaml"),
            &format!(
                "annotations:\n  \
                 operators.operatorframework.io.bundle.package.v1: {package}\n  \
                 operators.operatorframework.io.bundle.channels.v1: alpha\n  \
                 operators.operatorframework.io.bundle.channel.default.v1: alpha\n"
            ),
        );
        self.write(
            &format!("{bundle_dir}/manifests/{package}.clusterserviceversion.yaml"),
            &format!(
                "apiVersion: operators.coreos.com/v1alpha1\n\
                 kind: ClusterServiceVersion\n\
                 metadata:\n  name: {package}.v{version}\n\
                 spec:\n  version: {version}\n"
            ),
        );
        self
    }

    /// A complete addon for `env` that passes every built-in rule at `version`.
    pub fn valid(env: &str, version: &str) -> Self {
        let fixture = Self::new();
        fixture
            .addon(env, &addon_yaml(&png_icon()))
            .image_set(env, version)
            .bundle(&index_image(version), ADDON_ID, version);
        fixture
    }
}

pub fn index_image(version: &str) -> String {
    format!("quay.io/osd-addons/{ADDON_ID}-index:v{version}")
}

pub fn image_set_yaml(addon: &str, version: &str) -> String {
    format!(
        "name: {addon}.v{version}\n\
         indexImage: quay.io/osd-addons/{addon}-index:v{version}\n\
         relatedImages:\n  - quay.io/osd-addons/{addon}-manager:v{version}\n"
    )
}

/// `addon.yaml` passing every metadata rule. An empty `icon` leaves the key
/// out.
pub fn addon_yaml(icon: &str) -> String {
    let icon = if icon.is_empty() {
        String::new()
    } else {
        format!("icon: {icon}\n")
    };
    format!(
        "id: {ADDON_ID}\n\
         name: Reference Addon\n\
         description: An addon used to test addon validation.\n\
         operatorName: {ADDON_ID}\n\
         label: api.openshift.com/addon-{ADDON_ID}\n\
         {icon}\
         defaultChannel: alpha\n\
         channels:\n  - name: alpha\n    currentCSV: {ADDON_ID}.v0.1.0\n\
         targetNamespace: {ADDON_ID}\n\
         namespaces:\n  - {ADDON_ID}\n\
         testHarness: quay.io/osd-addons/{ADDON_ID}-test-harness:latest\n\
         installMode: OwnNamespace\n\
         addonImageSetVersion: latest\n"
    )
}

/// A 2x2 PNG, base64 encoded.
pub fn png_icon() -> String {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, 2, 2);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[0, 64, 128, 255]).unwrap();
    }
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
