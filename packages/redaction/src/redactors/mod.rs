//! Local pattern redactors.
//!
//! Each redactor pairs a compiled regex with a validation hook that rejects
//! structurally plausible but invalid candidates (a 16-digit number that
//! fails its checksum, a social security number from a reserved block).
//! Detection is pure and synchronous so scans can run inline or fan out
//! across the chunk worker pool.

mod bank_account;
mod custom;
mod email;
mod ip_address;
mod national_id;
mod payment_card;
mod phone;
mod travel_document;

pub use bank_account::BankAccountRedactor;
pub use custom::CustomRedactor;
pub use email::EmailRedactor;
pub use ip_address::IpAddressRedactor;
pub use national_id::NationalIdRedactor;
pub use payment_card::PaymentCardRedactor;
pub use phone::PhoneRedactor;
pub use travel_document::TravelDocumentRedactor;

use regex::Regex;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::types::{Detection, PiiCategory};

/// A local detector for one PII category.
pub trait PatternRedactor: Send + Sync {
    /// Category stamped on every detection this redactor emits.
    fn category(&self) -> PiiCategory;

    /// Compiled pattern producing candidate matches.
    fn pattern(&self) -> &Regex;

    /// Accepts or rejects a raw candidate match. The default accepts all.
    fn validate(&self, _candidate: &str) -> bool {
        true
    }

    /// Longest match this redactor can emit, in bytes. Chunked scans take
    /// the largest hint across registered redactors when sizing the
    /// context margin, so a match near a chunk cut is still seen whole
    /// with its surrounding characters.
    fn max_match_len(&self) -> usize;

    /// Scans `text` and returns validated detections in match order.
    fn detect(&self, text: &str) -> Vec<Detection> {
        self.pattern()
            .find_iter(text)
            .filter(|m| self.validate(m.as_str()))
            .map(|m| Detection::pattern(m.start(), m.end(), self.category()))
            .collect()
    }
}

/// Compiles a pattern, tagging failures with the owning category.
pub(crate) fn compile_pattern(
    category: &PiiCategory,
    pattern: &str,
) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        category: category.label().to_string(),
        source,
    })
}

/// Digits of `candidate` with separators removed.
pub(crate) fn strip_non_digits(candidate: &str) -> String {
    candidate.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// The built-in redactor set.
///
/// Registration order is part of the merge contract: when two pattern
/// detections claim the same range, the earlier-registered category wins.
pub fn builtin_redactors() -> Result<Vec<Arc<dyn PatternRedactor>>, ConfigError> {
    Ok(vec![
        Arc::new(EmailRedactor::new()?),
        Arc::new(PhoneRedactor::new()?),
        Arc::new(NationalIdRedactor::new()?),
        Arc::new(PaymentCardRedactor::new()?),
        Arc::new(BankAccountRedactor::new()?),
        Arc::new(IpAddressRedactor::new()?),
        Arc::new(TravelDocumentRedactor::new()?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_set_compiles_and_covers_seven_categories() {
        let redactors = builtin_redactors().unwrap();
        assert_eq!(redactors.len(), 7);

        let categories: Vec<_> = redactors.iter().map(|r| r.category()).collect();
        assert!(categories.contains(&PiiCategory::Email));
        assert!(categories.contains(&PiiCategory::TravelDocument));
    }

    #[test]
    fn test_strip_non_digits() {
        assert_eq!(strip_non_digits("123-45-6789"), "123456789");
        assert_eq!(strip_non_digits("(555) 123.4567"), "5551234567");
        assert_eq!(strip_non_digits("no digits"), "");
    }
}
