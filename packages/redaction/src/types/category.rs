//! PII category taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// Kind of personally identifiable information a detection refers to.
///
/// The first seven categories are covered by built-in pattern redactors.
/// The free-text categories (`PersonName`, `Address`, `Organization`,
/// `DateTime`, `Credential`) are only ever produced by cloud detection
/// providers. `Custom` carries the label of a caller-registered pattern or
/// a provider entity type with no built-in equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    Email,
    Phone,
    NationalId,
    PaymentCard,
    BankAccount,
    IpAddress,
    TravelDocument,
    PersonName,
    Address,
    Organization,
    DateTime,
    Credential,
    Custom(String),
}

impl PiiCategory {
    /// Builds a custom category from a caller-supplied label.
    ///
    /// The label is normalized to the placeholder alphabet (uppercase
    /// ASCII, digits, underscores; spaces and hyphens become underscores)
    /// and must start with a letter after normalization.
    pub fn custom(label: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = label.into();
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        let valid = normalized
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
            && normalized
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(ConfigError::InvalidCategoryLabel { label: raw });
        }

        Ok(Self::Custom(normalized))
    }

    /// Uppercase label used inside placeholders, e.g. `EMAIL` in
    /// `[EMAIL_a1b2c3d4]`.
    pub fn label(&self) -> &str {
        match self {
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::NationalId => "NATIONAL_ID",
            Self::PaymentCard => "PAYMENT_CARD",
            Self::BankAccount => "BANK_ACCOUNT",
            Self::IpAddress => "IP_ADDRESS",
            Self::TravelDocument => "TRAVEL_DOCUMENT",
            Self::PersonName => "PERSON_NAME",
            Self::Address => "ADDRESS",
            Self::Organization => "ORGANIZATION",
            Self::DateTime => "DATE_TIME",
            Self::Credential => "CREDENTIAL",
            Self::Custom(label) => label,
        }
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_labels_are_placeholder_safe() {
        let categories = [
            PiiCategory::Email,
            PiiCategory::Phone,
            PiiCategory::NationalId,
            PiiCategory::PaymentCard,
            PiiCategory::BankAccount,
            PiiCategory::IpAddress,
            PiiCategory::TravelDocument,
            PiiCategory::PersonName,
            PiiCategory::Address,
            PiiCategory::Organization,
            PiiCategory::DateTime,
            PiiCategory::Credential,
        ];
        for category in categories {
            assert!(category
                .label()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_custom_label_normalization() {
        let category = PiiCategory::custom("employee id").unwrap();
        assert_eq!(category.label(), "EMPLOYEE_ID");

        let category = PiiCategory::custom("api-key-2").unwrap();
        assert_eq!(category.label(), "API_KEY_2");
    }

    #[test]
    fn test_custom_label_rejects_invalid() {
        assert!(PiiCategory::custom("").is_err());
        assert!(PiiCategory::custom("   ").is_err());
        assert!(PiiCategory::custom("9lives").is_err());
        assert!(PiiCategory::custom("bad!label").is_err());
    }

    #[test]
    fn test_display_matches_label() {
        assert_eq!(PiiCategory::PaymentCard.to_string(), "PAYMENT_CARD");
    }
}
