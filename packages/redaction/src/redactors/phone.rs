//! Phone number redactor.

use regex::Regex;

use super::{compile_pattern, strip_non_digits, PatternRedactor};
use crate::error::ConfigError;
use crate::types::PiiCategory;

/// Matches (123) 456-7890, 123-456-7890, 123.456.7890, 1234567890, and
/// +1 variants of each.
const PATTERN: &str = r"(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b";

pub struct PhoneRedactor {
    pattern: Regex,
}

impl PhoneRedactor {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: compile_pattern(&PiiCategory::Phone, PATTERN)?,
        })
    }
}

impl PatternRedactor for PhoneRedactor {
    fn category(&self) -> PiiCategory {
        PiiCategory::Phone
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn validate(&self, candidate: &str) -> bool {
        // 10 digits, or 11 with the country code
        matches!(strip_non_digits(candidate).len(), 10 | 11)
    }

    fn max_match_len(&self) -> usize {
        24
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_common_forms() {
        let redactor = PhoneRedactor::new().unwrap();
        for text in [
            "call (555) 123-4567 after noon",
            "fax: 555-123-4567",
            "cell 555.123.4567",
            "raw 5551234567",
            "intl +1 555 123 4567",
        ] {
            assert_eq!(redactor.detect(text).len(), 1, "missed in: {text}");
        }
    }

    #[test]
    fn test_ignores_short_number_runs() {
        let redactor = PhoneRedactor::new().unwrap();
        assert!(redactor.detect("room 123-4567 is free").is_empty());
        assert!(redactor.detect("order #12345").is_empty());
    }
}
