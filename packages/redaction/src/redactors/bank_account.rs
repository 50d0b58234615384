//! Bank account number redactor.

use regex::Regex;

use super::{compile_pattern, strip_non_digits, PatternRedactor};
use crate::error::ConfigError;
use crate::types::PiiCategory;

/// Matches 8-17 digit account numbers, contiguous or grouped with dashes
/// or spaces.
const PATTERN: &str = r"\b\d{4}[-\s]?\d{4}[-\s]?\d{2,9}\b|\b\d{8,17}\b";

pub struct BankAccountRedactor {
    pattern: Regex,
}

impl BankAccountRedactor {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: compile_pattern(&PiiCategory::BankAccount, PATTERN)?,
        })
    }
}

impl PatternRedactor for BankAccountRedactor {
    fn category(&self) -> PiiCategory {
        PiiCategory::BankAccount
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn validate(&self, candidate: &str) -> bool {
        let digits = strip_non_digits(candidate);
        if !(8..=17).contains(&digits.len()) {
            return false;
        }
        // A single repeated digit is a placeholder, not an account
        let mut chars = digits.chars();
        let first = chars.next();
        !chars.all(|c| Some(c) == first)
    }

    fn max_match_len(&self) -> usize {
        19
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_grouped_and_contiguous_forms() {
        let redactor = BankAccountRedactor::new().unwrap();
        for text in ["acct 12345678", "acct 1234-5678-9012", "acct 12345678901234567"] {
            assert_eq!(redactor.detect(text).len(), 1, "missed in: {text}");
        }
    }

    #[test]
    fn test_rejects_repeated_digit_runs() {
        let redactor = BankAccountRedactor::new().unwrap();
        assert!(redactor.detect("acct 00000000").is_empty());
        assert!(redactor.detect("acct 111111111111").is_empty());
    }

    #[test]
    fn test_rejects_out_of_range_lengths() {
        let redactor = BankAccountRedactor::new().unwrap();
        assert!(redactor.detect("pin 1234567").is_empty());
    }
}
