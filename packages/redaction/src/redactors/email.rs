//! Email address redactor.

use regex::Regex;

use super::{compile_pattern, PatternRedactor};
use crate::error::ConfigError;
use crate::types::PiiCategory;

const PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

pub struct EmailRedactor {
    pattern: Regex,
}

impl EmailRedactor {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: compile_pattern(&PiiCategory::Email, PATTERN)?,
        })
    }
}

impl PatternRedactor for EmailRedactor {
    fn category(&self) -> PiiCategory {
        PiiCategory::Email
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn validate(&self, candidate: &str) -> bool {
        let Some((local, domain)) = candidate.split_once('@') else {
            return false;
        };
        if local.is_empty() || local.len() > 64 {
            return false;
        }
        // Domain must be dotted with non-empty parts
        !domain.is_empty()
            && domain.contains('.')
            && domain.split('.').all(|part| !part.is_empty())
    }

    fn max_match_len(&self) -> usize {
        254
    }
}
