//! AM0008: every bundle ships exactly one ClusterServiceVersion whose
//! `spec.version` is a semantic version.
//!
//! A CSV whose `spec` is not a mapping cannot be inspected at all and is
//! reported as a hard error rather than a failure.

use serde_json::Value;

use amv_core::{Bundle, ConfigError, MetaBundle, RuleError};
use amv_engine::{Registry, Rule, RuleResult, Verdict};

pub const AM0008: Rule = Rule::new(
    "AM0008",
    "csv_version",
    "Ensure that every bundle carries exactly one ClusterServiceVersion with a semantic `spec.version`",
    validate_csv_version,
);

pub fn register(registry: &mut Registry) -> Result<(), ConfigError> {
    registry.register(AM0008)
}

pub fn validate_csv_version(mb: &MetaBundle) -> RuleResult {
    let mut problems = Vec::new();
    for bundle in &mb.bundles {
        if let Some(problem) = check_bundle(bundle)? {
            problems.push(problem);
        }
    }
    Ok(Verdict::check(problems.is_empty(), problems.join("; ")))
}

fn check_bundle(bundle: &Bundle) -> Result<Option<String>, RuleError> {
    let count = bundle.csvs().count();
    let Some(csv) = bundle.csv() else {
        return Ok(Some(format!(
            "bundle {} carries {count} ClusterServiceVersions, expected exactly one",
            bundle.name
        )));
    };

    let spec = match csv.get("spec") {
        None | Some(Value::Null) => {
            return Ok(Some(format!(
                "ClusterServiceVersion of bundle {} has no `spec`",
                bundle.name
            )))
        }
        Some(Value::Object(spec)) => spec,
        Some(other) => {
            return Err(RuleError::MalformedInput(format!(
                "`spec` of the ClusterServiceVersion in bundle {} is a {}, not a mapping",
                bundle.name,
                kind_of(other)
            )))
        }
    };

    let problem = match spec.get("version") {
        Some(Value::String(raw)) if semver::Version::parse(raw).is_ok() => None,
        Some(Value::String(raw)) => Some(format!(
            "`spec.version` {raw:?} of bundle {} is not a semantic version",
            bundle.name
        )),
        Some(_) => Some(format!("`spec.version` of bundle {} is not a string", bundle.name)),
        None => Some(format!("`spec.version` missing in bundle {}", bundle.name)),
    };
    Ok(problem)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
