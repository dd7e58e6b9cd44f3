//! AM0004: the addon icon is a base64-encoded PNG image.
//!
//! The icon must decode with the standard alphabet (line breaks are
//! tolerated) and the decoded bytes must be a complete PNG. A PNG signature
//! followed by garbage fails. So does a PNG whose decoded frame would exceed
//! [`MAX_ICON_BYTES`]; the header alone decides, nothing is allocated for it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use amv_core::{ConfigError, MetaBundle};
use amv_engine::{Registry, Rule, RuleResult, Verdict};

/// Largest decoded icon frame, in bytes, the rule is willing to allocate.
pub const MAX_ICON_BYTES: usize = 16 * 1024 * 1024;

pub const AM0004: Rule = Rule::new(
    "AM0004",
    "icon_base64",
    "Ensure that `icon` in the addon metadata is a base64-encoded PNG image",
    validate_icon_base64,
);

pub fn register(registry: &mut Registry) -> Result<(), ConfigError> {
    registry.register(AM0004)
}

pub fn validate_icon_base64(mb: &MetaBundle) -> RuleResult {
    let addon = &mb.addon;
    if addon.icon.is_empty() {
        return Ok(Verdict::fail(format!(
            "`icon` not found under the addon metadata of {}",
            addon.id
        )));
    }

    let encoded: String = addon.icon.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
    let Ok(decoded) = STANDARD.decode(encoded) else {
        return Ok(Verdict::fail(format!(
            "`icon` found to be improperly base64 populated under the addon metadata of {}",
            addon.id
        )));
    };

    Ok(Verdict::check(
        is_png(&decoded),
        format!(
            "`icon`'s base64 value found to correspond to a non-png data under the addon metadata of {}",
            addon.id
        ),
    ))
}

fn is_png(bytes: &[u8]) -> bool {
    let limits = png::Limits {
        bytes: MAX_ICON_BYTES,
    };
    let Ok(mut reader) = png::Decoder::new_with_limits(bytes, limits).read_info() else {
        return false;
    };
    let size = reader.output_buffer_size();
    if size > MAX_ICON_BYTES {
        tracing::debug!(size, limit = MAX_ICON_BYTES, "icon frame exceeds the size limit");
        return false;
    }
    let mut frame = vec![0; size];
    match reader.next_frame(&mut frame) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(error = %e, "icon is not a decodable png");
            false
        }
    }
}
