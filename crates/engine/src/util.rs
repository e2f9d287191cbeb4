//! Internal helpers for input normalization.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

pub(crate) const MIN_SYNC_DAYS: u32 = 1;
pub(crate) const MAX_SYNC_DAYS: u32 = 90;

/// Trimmed display name; errors when empty.
pub(crate) fn normalize_display_name(value: &str, label: &str) -> ResultEngine<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(collapsed)
}

/// Key used for uniqueness: NFKC, lowercase, single spaces.
pub(crate) fn normalize_name_key(display: &str) -> String {
    display
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Sync look-back, clamped to `[1, 90]` whatever the caller asked for.
pub fn clamp_days_back(days_back: i64) -> u32 {
    days_back.clamp(i64::from(MIN_SYNC_DAYS), i64::from(MAX_SYNC_DAYS)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_back_is_clamped() {
        assert_eq!(clamp_days_back(500), 90);
        assert_eq!(clamp_days_back(0), 1);
        assert_eq!(clamp_days_back(-3), 1);
        assert_eq!(clamp_days_back(30), 30);
    }

    #[test]
    fn name_key_ignores_case_and_spacing() {
        assert_eq!(normalize_name_key("Eating  Out"), normalize_name_key("eating out"));
        assert_eq!(normalize_name_key("Ｃafé"), "café");
    }

    #[test]
    fn empty_names_are_rejected() {
        assert!(normalize_display_name("   ", "category").is_err());
        assert_eq!(
            normalize_display_name("  Eating   out ", "category").unwrap(),
            "Eating out"
        );
    }
}
