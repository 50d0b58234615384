//! Payment card number redactor.

use regex::Regex;

use super::{compile_pattern, strip_non_digits, PatternRedactor};
use crate::error::ConfigError;
use crate::types::PiiCategory;

/// Matches 1234-5678-9012-3456, 1234 5678 9012 3456, and 1234567890123456.
const PATTERN: &str = r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b";

pub struct PaymentCardRedactor {
    pattern: Regex,
}

impl PaymentCardRedactor {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: compile_pattern(&PiiCategory::PaymentCard, PATTERN)?,
        })
    }
}

impl PatternRedactor for PaymentCardRedactor {
    fn category(&self) -> PiiCategory {
        PiiCategory::PaymentCard
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn validate(&self, candidate: &str) -> bool {
        let digits = strip_non_digits(candidate);
        (13..=19).contains(&digits.len()) && luhn_valid(&digits)
    }

    fn max_match_len(&self) -> usize {
        23
    }
}

/// Luhn checksum over a digit string.
fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}
