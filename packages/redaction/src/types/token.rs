//! Reversible redaction tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DetectionSource, PiiCategory};

/// One substitution recorded in a result's token ledger.
///
/// Serialization carries `original_value` in the clear so a ledger can be
/// persisted and later fed back to `unmask`; guarding serialized ledgers is
/// the caller's responsibility. `Debug` masks the value so tokens can be
/// logged without leaking the PII they replaced.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionToken {
    /// Placeholder substituted into the text, e.g. `[EMAIL_a1b2c3d4]`
    pub placeholder: String,
    /// The exact text that was replaced
    pub original_value: String,
    pub category: PiiCategory,
    /// Byte range of the original value in the pre-redaction text
    pub start: usize,
    pub end: usize,
    /// Confidence of the winning detection; 1.0 for pattern matches
    pub confidence: f64,
    pub source: DetectionSource,
    pub detected_at: DateTime<Utc>,
}

impl fmt::Debug for RedactionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactionToken")
            .field("placeholder", &self.placeholder)
            .field("original_value", &"[masked]")
            .field("category", &self.category)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("confidence", &self.confidence)
            .field("source", &self.source)
            .field("detected_at", &self.detected_at)
            .finish()
    }
}
