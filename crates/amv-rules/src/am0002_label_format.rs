//! AM0002: the addon label follows `api.openshift.com/addon-<id>`.

use amv_core::{ConfigError, MetaBundle};
use amv_engine::{Registry, Rule, RuleResult, Verdict};

pub const AM0002: Rule = Rule::new(
    "AM0002",
    "label_format",
    "Ensure that `label` follows the format 'api.openshift.com/addon-<id>'",
    validate_label_format,
);

const LABEL_PREFIX: &str = "api.openshift.com/addon-";

pub fn register(registry: &mut Registry) -> Result<(), ConfigError> {
    registry.register(AM0002)
}

pub fn validate_label_format(mb: &MetaBundle) -> RuleResult {
    let addon = &mb.addon;
    let expected = format!("{LABEL_PREFIX}{}", addon.id);
    Ok(Verdict::check(
        addon.label == expected,
        format!(
            "`label` {:?} does not match the expected {expected:?} under the addon metadata of {}",
            addon.label, addon.id
        ),
    ))
}
