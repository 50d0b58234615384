//! Caller-registered pattern redactor.

use regex::Regex;

use super::{compile_pattern, PatternRedactor};
use crate::error::ConfigError;
use crate::types::PiiCategory;

const DEFAULT_MAX_MATCH_LEN: usize = 128;

/// A redactor built from a caller-supplied label and pattern.
///
/// Matches are taken as-is; callers needing validation beyond the pattern
/// can implement [`PatternRedactor`] directly.
#[derive(Debug)]
pub struct CustomRedactor {
    category: PiiCategory,
    pattern: Regex,
    max_match_len: usize,
}

impl CustomRedactor {
    /// Builds a redactor for `label`, failing fast on an invalid label or
    /// a pattern that does not compile.
    pub fn new(label: &str, pattern: &str) -> Result<Self, ConfigError> {
        let category = PiiCategory::custom(label)?;
        let pattern = compile_pattern(&category, pattern)?;
        Ok(Self {
            category,
            pattern,
            max_match_len: DEFAULT_MAX_MATCH_LEN,
        })
    }

    /// Overrides the chunk-margin sizing hint for patterns whose matches
    /// can exceed the default.
    pub fn with_max_match_len(mut self, bytes: usize) -> Self {
        self.max_match_len = bytes;
        self
    }
}

impl PatternRedactor for CustomRedactor {
    fn category(&self) -> PiiCategory {
        self.category.clone()
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn max_match_len(&self) -> usize {
        self.max_match_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_with_custom_label() {
        let redactor = CustomRedactor::new("employee id", r"\bEMP-\d{5}\b").unwrap();
        let detections = redactor.detect("assigned to EMP-00421 yesterday");
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].category.label(), "EMPLOYEE_ID");
    }

    #[test]
    fn test_invalid_pattern_fails_construction() {
        let err = CustomRedactor::new("broken", r"[unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_invalid_label_fails_construction() {
        let err = CustomRedactor::new("", r"\d+").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCategoryLabel { .. }));
    }
}
