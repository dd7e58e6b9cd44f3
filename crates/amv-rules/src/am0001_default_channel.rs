//! AM0001: the default channel must be one of the declared channels.

use amv_core::{ConfigError, MetaBundle};
use amv_engine::{Registry, Rule, RuleResult, Verdict};

pub const AM0001: Rule = Rule::new(
    "AM0001",
    "default_channel",
    "Ensure that `defaultChannel` is one of the channels listed in the addon metadata",
    validate_default_channel,
);

pub fn register(registry: &mut Registry) -> Result<(), ConfigError> {
    registry.register(AM0001)
}

pub fn validate_default_channel(mb: &MetaBundle) -> RuleResult {
    let addon = &mb.addon;
    if addon.default_channel.is_empty() {
        return Ok(Verdict::fail(format!(
            "`defaultChannel` not found under the addon metadata of {}",
            addon.id
        )));
    }

    let listed = addon.channels.iter().any(|c| c.name == addon.default_channel);
    Ok(Verdict::check(
        listed,
        format!(
            "`defaultChannel` {:?} is not one of the channels listed under the addon metadata of {}",
            addon.default_channel, addon.id
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::valid_subject;

    #[test]
    fn listed_channel_passes() {
        assert!(validate_default_channel(&valid_subject()).unwrap().passed);
    }

    #[test]
    fn unlisted_channel_fails() {
        let mut mb = valid_subject();
        mb.addon.default_channel = "stable".to_string();
        let verdict = validate_default_channel(&mb).unwrap();
        assert!(!verdict.passed);
        assert!(verdict.message.contains("\"stable\""));
    }

    #[test]
    fn missing_default_channel_fails() {
        let mut mb = valid_subject();
        mb.addon.default_channel.clear();
        let verdict = validate_default_channel(&mb).unwrap();
        assert!(verdict.message.starts_with("`defaultChannel` not found"));
    }
}
