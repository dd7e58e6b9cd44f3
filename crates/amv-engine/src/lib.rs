//! # amv-engine — Validation Engine
//!
//! Runs independently-registered rules against a fully-resolved addon.
//!
//! ## Architecture
//!
//! ```text
//! MetadataLoader --> resolver --> MetaBundle --> Orchestrator --> ValidationReport
//!                       |                           ^
//!               BundleExtractor            Registry ∩ Filter
//! ```
//!
//! - [`Registry`]: rules keyed by unique code, filled once at start-up.
//! - [`Filter`]: allow-list or block-list selection, checked against the
//!   registry.
//! - [`resolver`]: picks exactly one image set (or static index image) and
//!   extracts its bundles.
//! - [`Orchestrator`]: runs the selected rules, isolating each one, and
//!   reports sorted findings.
//! - [`Pipeline`]: the whole run with pluggable loader and extractor.

pub mod extractor;
pub mod filter;
pub mod loader;
pub mod orchestrator;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod rule;

pub use extractor::{BundleExtractor, DeadlineExtractor, LocalBundleExtractor};
pub use filter::Filter;
pub use loader::{FsMetadataLoader, MetadataLoader};
pub use orchestrator::{Finding, HardError, Orchestrator, ValidationReport};
pub use pipeline::{Pipeline, ValidationRun};
pub use registry::Registry;
pub use rule::{Rule, RuleResult, Runner, Verdict};
