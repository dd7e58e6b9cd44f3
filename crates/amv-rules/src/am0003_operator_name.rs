//! AM0003: the extracted bundles belong to the declared operator.

use amv_core::{ConfigError, MetaBundle};
use amv_engine::{Registry, Rule, RuleResult, Verdict};

pub const AM0003: Rule = Rule::new(
    "AM0003",
    "operator_name",
    "Ensure that `operatorName` matches the package of every bundle in the index image",
    validate_operator_name,
);

pub fn register(registry: &mut Registry) -> Result<(), ConfigError> {
    registry.register(AM0003)
}

pub fn validate_operator_name(mb: &MetaBundle) -> RuleResult {
    let operator = &mb.addon.operator_name;
    if mb.bundles.is_empty() {
        return Ok(Verdict::fail(format!(
            "no bundle found for `operatorName` {operator:?} in {}",
            mb.artifact.index_image()
        )));
    }

    let strays: Vec<String> = mb
        .bundles
        .iter()
        .filter(|b| &b.package != operator)
        .map(|b| format!("{} (package {:?})", b.name, b.package))
        .collect();

    Ok(Verdict::check(
        strays.is_empty(),
        format!(
            "bundles do not belong to `operatorName` {operator:?}: {}",
            strays.join(", ")
        ),
    ))
}
