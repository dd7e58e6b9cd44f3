//! # amv-rules — Built-in Rules
//!
//! Every rule the `amv` binary ships. Each module exposes its [`Rule`] as a
//! `const` and a `register` function; [`registry`] is the only place the full
//! set is assembled.
//!
//! | code   | name             |
//! |--------|------------------|
//! | AM0001 | default_channel  |
//! | AM0002 | label_format     |
//! | AM0003 | operator_name    |
//! | AM0004 | icon_base64      |
//! | AM0005 | test_harness     |
//! | AM0006 | target_namespace |
//! | AM0007 | index_image_ref  |
//! | AM0008 | csv_version      |
//!
//! Adding a rule means adding a module and one line to [`register_all`].

pub mod am0001_default_channel;
pub mod am0002_label_format;
pub mod am0003_operator_name;
pub mod am0004_icon_base64;
pub mod am0005_test_harness;
pub mod am0006_target_namespace;
pub mod am0007_index_image_ref;
pub mod am0008_csv_version;

use std::sync::OnceLock;

use regex::Regex;

use amv_core::{ConfigError, RuleError};
use amv_engine::{Registry, Rule};

/// Register every built-in rule into `registry`.
///
/// # Errors
///
/// Fails on the first code that is invalid or already present.
pub fn register_all(registry: &mut Registry) -> Result<(), ConfigError> {
    am0001_default_channel::register(registry)?;
    am0002_label_format::register(registry)?;
    am0003_operator_name::register(registry)?;
    am0004_icon_base64::register(registry)?;
    am0005_test_harness::register(registry)?;
    am0006_target_namespace::register(registry)?;
    am0007_index_image_ref::register(registry)?;
    am0008_csv_version::register(registry)?;
    Ok(())
}

/// A fresh registry holding every built-in rule.
pub fn registry() -> Result<Registry, ConfigError> {
    let mut registry = Registry::new();
    register_all(&mut registry)?;
    tracing::debug!(rules = registry.len(), "registered built-in rules");
    Ok(registry)
}

/// Every built-in rule, ordered by code.
pub fn builtin() -> [Rule; 8] {
    [
        am0001_default_channel::AM0001,
        am0002_label_format::AM0002,
        am0003_operator_name::AM0003,
        am0004_icon_base64::AM0004,
        am0005_test_harness::AM0005,
        am0006_target_namespace::AM0006,
        am0007_index_image_ref::AM0007,
        am0008_csv_version::AM0008,
    ]
}

/// Compile `source` once per process.
pub(crate) fn pattern(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    source: &str,
) -> Result<&'static Regex, RuleError> {
    cell.get_or_init(|| Regex::new(source))
        .as_ref()
        .map_err(|e| RuleError::Internal(format!("pattern {source:?} does not compile: {e}")))
}


#[cfg(test)]
mod tests {
    use super::*;
    use amv_engine::Filter;

    #[test]
    fn registry_holds_every_builtin_rule() {
        let registry = registry().unwrap();
        let codes: Vec<_> = registry.all().map(|r| r.code).collect();
        assert_eq!(
            codes,
            ["AM0001", "AM0002", "AM0003", "AM0004", "AM0005", "AM0006", "AM0007", "AM0008"]
        );
    }

    #[test]
    fn builtin_is_ordered_and_matches_registry() {
        let registry = registry().unwrap();
        for (rule, registered) in builtin().iter().zip(registry.all()) {
            assert_eq!(rule.code, registered.code);
            assert_eq!(rule.name, registered.name);
            assert!(!rule.description.is_empty());
        }
    }

    #[test]
    fn registering_twice_is_a_config_error() {
        let mut registry = registry().unwrap();
        let err = register_all(&mut registry).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateRuleCode {
                code: "AM0001".to_string()
            }
        );
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn valid_subject_passes_every_rule() {
        let registry = registry().unwrap();
        let report =
            amv_engine::orchestrator::run(&fixtures::valid_subject(), &Filter::all(), &registry);
        assert!(report.is_success(), "{report:?}");
        assert_eq!(report.passed, 8);
    }

    #[test]
    fn bad_pattern_is_an_internal_error() {
        static BROKEN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
        let err = pattern(&BROKEN, "(unclosed").unwrap_err();
        assert!(matches!(err, RuleError::Internal(_)));
    }
}
