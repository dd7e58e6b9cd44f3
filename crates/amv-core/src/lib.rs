//! # amv-core — Foundational Types for the Addon Metadata Validator
//!
//! Every other crate in the workspace depends on `amv-core`; it depends on
//! nothing internal.
//!
//! ## Contents
//!
//! - [`Environment`]: the closed set of deployment environments.
//! - [`VersionRequest`]: a parsed `--version` value (default, latest, exact).
//! - [`AddonMetadata`], [`ImageSet`], [`AddonManifest`]: the addon's
//!   declared metadata and its versioned image sets.
//! - [`Bundle`]: an operator bundle extracted from an index image.
//! - [`MetaBundle`]: the immutable subject every rule validates.
//! - [`error`]: the error taxonomy shared by loader, resolver, extractor,
//!   and rules.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `amv-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod bundle;
pub mod environment;
pub mod error;
pub mod metadata;
pub mod subject;
pub mod version;

pub use bundle::Bundle;
pub use environment::Environment;
pub use error::{ConfigError, ExtractionError, LoadError, ResolutionError, RuleError, ValidateError};
pub use metadata::{
    AddOnParameter, AddOnRequirement, AddonManifest, AddonMetadata, Channel, ImageSet, SubOperator,
};
pub use subject::{Artifact, MetaBundle};
pub use version::VersionRequest;
