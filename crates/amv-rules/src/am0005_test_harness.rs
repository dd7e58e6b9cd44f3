//! AM0005: the test harness is an image hosted on quay.io.

use std::sync::OnceLock;

use regex::Regex;

use amv_core::{ConfigError, MetaBundle};
use amv_engine::{Registry, Rule, RuleResult, Verdict};

pub const AM0005: Rule = Rule::new(
    "AM0005",
    "test_harness",
    "Ensure that `testHarness` is a quay.io/<org>/<repo> image reference with an optional tag or digest",
    validate_test_harness,
);

const TEST_HARNESS_PATTERN: &str =
    r"^quay\.io/[a-z0-9][a-z0-9._-]*/[a-z0-9][a-z0-9._/-]*(:[A-Za-z0-9_][A-Za-z0-9._-]{0,127}|@sha256:[a-f0-9]{64})?$";

static TEST_HARNESS: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

pub fn register(registry: &mut Registry) -> Result<(), ConfigError> {
    registry.register(AM0005)
}

pub fn validate_test_harness(mb: &MetaBundle) -> RuleResult {
    let addon = &mb.addon;
    if addon.test_harness.is_empty() {
        return Ok(Verdict::fail(format!(
            "`testHarness` not found under the addon metadata of {}",
            addon.id
        )));
    }

    let re = crate::pattern(&TEST_HARNESS, TEST_HARNESS_PATTERN)?;
    Ok(Verdict::check(
        re.is_match(&addon.test_harness),
        format!(
            "`testHarness` {:?} is not a quay.io image reference under the addon metadata of {}",
            addon.test_harness, addon.id
        ),
    ))
}
