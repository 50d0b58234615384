//! Travel document (passport) number redactor.

use regex::Regex;

use super::{compile_pattern, PatternRedactor};
use crate::error::ConfigError;
use crate::types::PiiCategory;

/// US-style one or two letters plus digits, bare 9-digit numbers, and
/// generic 6-9 character alphanumeric document numbers.
const PATTERN: &str = r"\b[A-Z]{1,2}\d{6,9}\b|\b\d{9}\b|\b[A-Z0-9]{6,9}\b";

pub struct TravelDocumentRedactor {
    pattern: Regex,
}

impl TravelDocumentRedactor {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: compile_pattern(&PiiCategory::TravelDocument, PATTERN)?,
        })
    }
}

impl PatternRedactor for TravelDocumentRedactor {
    fn category(&self) -> PiiCategory {
        PiiCategory::TravelDocument
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn validate(&self, candidate: &str) -> bool {
        if !(6..=9).contains(&candidate.len()) {
            return false;
        }
        if !candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        // A real document number carries at least one digit; plain
        // uppercase words are not documents
        candidate.chars().any(|c| c.is_ascii_digit())
    }

    fn max_match_len(&self) -> usize {
        11
    }
}
