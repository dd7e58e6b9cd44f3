//! AM0006: the target namespace is one of the addon's namespaces.

use amv_core::{ConfigError, MetaBundle};
use amv_engine::{Registry, Rule, RuleResult, Verdict};

pub const AM0006: Rule = Rule::new(
    "AM0006",
    "target_namespace",
    "Ensure that `targetNamespace` is listed in `namespaces`",
    validate_target_namespace,
);

pub fn register(registry: &mut Registry) -> Result<(), ConfigError> {
    registry.register(AM0006)
}

pub fn validate_target_namespace(mb: &MetaBundle) -> RuleResult {
    let addon = &mb.addon;
    if addon.target_namespace.is_empty() {
        return Ok(Verdict::fail(format!(
            "`targetNamespace` not found under the addon metadata of {}",
            addon.id
        )));
    }

    Ok(Verdict::check(
        addon.namespaces.contains(&addon.target_namespace),
        format!(
            "`targetNamespace` {:?} is not listed in `namespaces` [{}] under the addon metadata of {}",
            addon.target_namespace,
            addon.namespaces.join(", "),
            addon.id
        ),
    ))
}
