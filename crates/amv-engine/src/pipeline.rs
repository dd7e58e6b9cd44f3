//! # Validation Pipeline
//!
//! One validation run end to end: load the metadata, resolve the subject,
//! run the filtered rules. The collaborators are passed in so a run can be
//! driven from the CLI, from tests, or from another front end with a
//! different loader or extractor.

use std::path::Path;

use amv_core::{Environment, MetaBundle, ValidateError, VersionRequest};

use crate::extractor::BundleExtractor;
use crate::filter::Filter;
use crate::loader::MetadataLoader;
use crate::orchestrator::{Orchestrator, ValidationReport};
use crate::registry::Registry;
use crate::resolver;

/// The subject a run validated and what the rules said about it.
#[derive(Debug, Clone)]
pub struct ValidationRun {
    pub subject: MetaBundle,
    pub report: ValidationReport,
}

/// Wires a registry to its metadata and bundle sources.
pub struct Pipeline<'a> {
    registry: &'a Registry,
    loader: &'a dyn MetadataLoader,
    extractor: &'a dyn BundleExtractor,
    orchestrator: Orchestrator,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        registry: &'a Registry,
        loader: &'a dyn MetadataLoader,
        extractor: &'a dyn BundleExtractor,
    ) -> Self {
        Self {
            registry,
            loader,
            extractor,
            orchestrator: Orchestrator::new(),
        }
    }

    pub fn with_orchestrator(mut self, orchestrator: Orchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    /// Validate the addon in `addon_dir`.
    ///
    /// `filter` must have been built against the same registry. No rule runs
    /// unless loading, resolution and extraction all succeed.
    ///
    /// # Errors
    ///
    /// Returns the first load, resolution or extraction error. Rule failures
    /// and rule errors are not errors here; they are in the report.
    pub fn run(
        &self,
        addon_dir: &Path,
        environment: Environment,
        version: &VersionRequest,
        filter: &Filter,
    ) -> Result<ValidationRun, ValidateError> {
        let manifest = self.loader.load(addon_dir, environment)?;
        let subject = resolver::resolve(manifest, version, self.extractor)?;
        let report = self.orchestrator.run(&subject, filter, self.registry);
        Ok(ValidationRun { subject, report })
    }
}
