//! Redaction call results.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::RedactionToken;

/// Whether a result reflects every requested detection source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionOutcome {
    /// All requested sources contributed
    Full,
    /// At least one provider failed or timed out; local patterns still ran
    Degraded,
}

/// Why a provider's detections are missing from a degraded result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradationWarning {
    pub provider: String,
    pub detail: String,
}

/// Outcome of redacting one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionResult {
    /// Input text with every detected value replaced by a placeholder
    pub redacted_text: String,
    /// Ledger of substitutions, ordered by position in the original text
    pub tokens: Vec<RedactionToken>,
    pub outcome: RedactionOutcome,
    /// One entry per failed provider; empty when `outcome` is `Full`
    pub warnings: Vec<DegradationWarning>,
}

impl RedactionResult {
    pub fn is_degraded(&self) -> bool {
        self.outcome == RedactionOutcome::Degraded
    }

    /// Placeholder-to-original-value view of the token ledger.
    pub fn token_map(&self) -> HashMap<&str, &str> {
        self.tokens
            .iter()
            .map(|t| (t.placeholder.as_str(), t.original_value.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DetectionSource, PiiCategory};
    use chrono::Utc;

    fn sample_token(placeholder: &str, value: &str) -> RedactionToken {
        RedactionToken {
            placeholder: placeholder.to_string(),
            original_value: value.to_string(),
            category: PiiCategory::Email,
            start: 0,
            end: value.len(),
            confidence: 1.0,
            source: DetectionSource::Pattern,
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_map_keys_by_placeholder() {
        let result = RedactionResult {
            redacted_text: "[EMAIL_aaaaaaaa]".to_string(),
            tokens: vec![sample_token("[EMAIL_aaaaaaaa]", "a@b.com")],
            outcome: RedactionOutcome::Full,
            warnings: vec![],
        };
        let map = result.token_map();
        assert_eq!(map.get("[EMAIL_aaaaaaaa]"), Some(&"a@b.com"));
        assert!(!result.is_degraded());
    }
}
