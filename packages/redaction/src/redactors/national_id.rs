//! National identification number redactor (US social security numbers).

use regex::Regex;

use super::{compile_pattern, strip_non_digits, PatternRedactor};
use crate::error::ConfigError;
use crate::types::PiiCategory;

/// Matches 123-45-6789, 123 45 6789, and 123456789.
const PATTERN: &str = r"\b\d{3}[-\s]?\d{2}[-\s]?\d{4}\b";

pub struct NationalIdRedactor {
    pattern: Regex,
}

impl NationalIdRedactor {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: compile_pattern(&PiiCategory::NationalId, PATTERN)?,
        })
    }
}

impl PatternRedactor for NationalIdRedactor {
    fn category(&self) -> PiiCategory {
        PiiCategory::NationalId
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn validate(&self, candidate: &str) -> bool {
        let digits = strip_non_digits(candidate);
        if digits.len() != 9 {
            return false;
        }
        let (Ok(area), Ok(group), Ok(serial)) = (
            digits[..3].parse::<u16>(),
            digits[3..5].parse::<u16>(),
            digits[5..9].parse::<u16>(),
        ) else {
            return false;
        };
        // Area 000, 666, and 900-999 are never issued; group 00 and
        // serial 0000 are likewise reserved
        area != 0 && area != 666 && area < 900 && group != 0 && serial != 0
    }

    fn max_match_len(&self) -> usize {
        11
    }
}
