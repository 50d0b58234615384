//! Placeholder generation, substitution, and reversal.

use chrono::Utc;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::error::TokenMismatch;
use crate::types::{Detection, RedactionToken};

/// Matches anything shaped like a placeholder, e.g. `[EMAIL_a1b2c3d4]`.
fn placeholder_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| {
        Regex::new(r"\[[A-Z][A-Z0-9_]*_[0-9a-f]{8}\]").expect("placeholder shape pattern compiles")
    })
}

/// Generates placeholders that are unpredictable across calls and unique
/// within one.
///
/// Each tokenizer carries a random salt, so the same value redacted in two
/// different calls yields different placeholders and ledgers from separate
/// calls cannot be cross-applied by accident.
pub struct Tokenizer {
    salt: String,
    counter: u64,
    issued: HashSet<String>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            salt: Uuid::new_v4().simple().to_string(),
            counter: 0,
            issued: HashSet::new(),
        }
    }

    fn next_placeholder(&mut self, label: &str, value: &str) -> String {
        loop {
            self.counter += 1;
            let mut hasher = Sha256::new();
            hasher.update(self.salt.as_bytes());
            hasher.update(self.counter.to_le_bytes());
            hasher.update(value.as_bytes());
            let digest = hasher.finalize();
            let suffix: String = digest[..4].iter().map(|b| format!("{b:02x}")).collect();
            let placeholder = format!("[{label}_{suffix}]");
            if self.issued.insert(placeholder.clone()) {
                return placeholder;
            }
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a resolved detection plan to `text`.
///
/// The plan must be sorted and non-overlapping (the resolver's output).
/// Returns the redacted text and its token ledger, ordered by position in
/// the original text.
pub fn apply(
    text: &str,
    plan: &[Detection],
    tokenizer: &mut Tokenizer,
) -> (String, Vec<RedactionToken>) {
    let mut redacted = String::with_capacity(text.len());
    let mut tokens = Vec::with_capacity(plan.len());
    let mut cursor = 0;

    for detection in plan {
        debug_assert!(cursor <= detection.start && detection.end <= text.len());
        redacted.push_str(&text[cursor..detection.start]);

        let value = &text[detection.start..detection.end];
        let placeholder = tokenizer.next_placeholder(detection.category.label(), value);
        redacted.push_str(&placeholder);

        tokens.push(RedactionToken {
            placeholder,
            original_value: value.to_string(),
            category: detection.category.clone(),
            start: detection.start,
            end: detection.end,
            confidence: detection.confidence,
            source: detection.source.clone(),
            detected_at: Utc::now(),
        });
        cursor = detection.end;
    }
    redacted.push_str(&text[cursor..]);

    (redacted, tokens)
}

/// Reverses a redaction, substituting every token's original value back.
///
/// Fails with [`TokenMismatch`] when a token's placeholder is absent from
/// `redacted` or when a literal segment of `redacted` contains a
/// placeholder-shaped substring no token accounts for. On failure nothing
/// is returned; there is no partially restored text.
pub fn restore(redacted: &str, tokens: &[RedactionToken]) -> Result<String, TokenMismatch> {
    // Locate every placeholder first so the ledger order does not matter
    let mut placements: Vec<(usize, &RedactionToken)> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match redacted.find(&token.placeholder) {
            Some(at) => placements.push((at, token)),
            None => {
                return Err(TokenMismatch::MissingPlaceholder {
                    placeholder: token.placeholder.clone(),
                })
            }
        }
    }
    placements.sort_by_key(|(at, _)| *at);

    let mut restored = String::with_capacity(redacted.len());
    let mut cursor = 0;
    for (at, token) in placements {
        if at < cursor {
            // Two tokens claimed the same placeholder occurrence
            return Err(TokenMismatch::MissingPlaceholder {
                placeholder: token.placeholder.clone(),
            });
        }
        check_for_orphans(&redacted[cursor..at])?;
        restored.push_str(&redacted[cursor..at]);
        restored.push_str(&token.original_value);
        cursor = at + token.placeholder.len();
    }
    check_for_orphans(&redacted[cursor..])?;
    restored.push_str(&redacted[cursor..]);

    Ok(restored)
}

fn check_for_orphans(segment: &str) -> Result<(), TokenMismatch> {
    if let Some(found) = placeholder_shape().find(segment) {
        return Err(TokenMismatch::OrphanPlaceholder {
            placeholder: found.as_str().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PiiCategory;

    fn plan_for(text: &str, value: &str, category: PiiCategory) -> Vec<Detection> {
        let start = text.find(value).unwrap();
        vec![Detection::pattern(start, start + value.len(), category)]
    }

    #[test]
    fn test_apply_replaces_and_records() {
        let text = "Contact: a@b.com";
        let plan = plan_for(text, "a@b.com", PiiCategory::Email);
        let mut tokenizer = Tokenizer::new();

        let (redacted, tokens) = apply(text, &plan, &mut tokenizer);

        assert!(!redacted.contains("a@b.com"));
        assert!(redacted.starts_with("Contact: [EMAIL_"));
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].original_value, "a@b.com");
        assert_eq!((tokens[0].start, tokens[0].end), (9, 16));
        assert_eq!(redacted, format!("Contact: {}", tokens[0].placeholder));
    }

    #[test]
    fn test_placeholders_unique_for_repeated_values() {
        let text = "a@b.com and a@b.com";
        let plan = vec![
            Detection::pattern(0, 7, PiiCategory::Email),
            Detection::pattern(12, 19, PiiCategory::Email),
        ];
        let mut tokenizer = Tokenizer::new();
        let (_, tokens) = apply(text, &plan, &mut tokenizer);
        assert_ne!(tokens[0].placeholder, tokens[1].placeholder);
    }

    #[test]
    fn test_salts_differ_across_tokenizers() {
        let text = "a@b.com";
        let plan = vec![Detection::pattern(0, 7, PiiCategory::Email)];
        let (_, first) = apply(text, &plan, &mut Tokenizer::new());
        let (_, second) = apply(text, &plan, &mut Tokenizer::new());
        assert_ne!(first[0].placeholder, second[0].placeholder);
    }

    #[test]
    fn test_restore_round_trip() {
        let text = "Contact: a@b.com or call 555-123-4567.";
        let plan = vec![
            Detection::pattern(9, 16, PiiCategory::Email),
            Detection::pattern(25, 37, PiiCategory::Phone),
        ];
        let mut tokenizer = Tokenizer::new();
        let (redacted, tokens) = apply(text, &plan, &mut tokenizer);

        assert_eq!(restore(&redacted, &tokens).unwrap(), text);
    }

    #[test]
    fn test_restore_accepts_unordered_ledger() {
        let text = "a@b.com then 555-123-4567";
        let plan = vec![
            Detection::pattern(0, 7, PiiCategory::Email),
            Detection::pattern(13, 25, PiiCategory::Phone),
        ];
        let mut tokenizer = Tokenizer::new();
        let (redacted, mut tokens) = apply(text, &plan, &mut tokenizer);
        tokens.reverse();

        assert_eq!(restore(&redacted, &tokens).unwrap(), text);
    }

    #[test]
    fn test_restore_missing_placeholder_fails() {
        let text = "Contact: a@b.com";
        let plan = plan_for(text, "a@b.com", PiiCategory::Email);
        let mut tokenizer = Tokenizer::new();
        let (_, tokens) = apply(text, &plan, &mut tokenizer);

        let err = restore("unrelated text", &tokens).unwrap_err();
        assert!(matches!(err, TokenMismatch::MissingPlaceholder { .. }));
    }

    #[test]
    fn test_restore_orphan_placeholder_fails() {
        let err = restore("found [EMAIL_deadbeef] here", &[]).unwrap_err();
        match err {
            TokenMismatch::OrphanPlaceholder { placeholder } => {
                assert_eq!(placeholder, "[EMAIL_deadbeef]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_restore_duplicate_token_claims_fail() {
        let text = "Contact: a@b.com";
        let plan = plan_for(text, "a@b.com", PiiCategory::Email);
        let mut tokenizer = Tokenizer::new();
        let (redacted, tokens) = apply(text, &plan, &mut tokenizer);

        let doubled: Vec<_> = tokens.iter().chain(tokens.iter()).cloned().collect();
        assert!(restore(&redacted, &doubled).is_err());
    }

    #[test]
    fn test_literal_brackets_round_trip() {
        let text = "see [a@b.com] for details";
        let plan = plan_for(text, "a@b.com", PiiCategory::Email);
        let mut tokenizer = Tokenizer::new();
        let (redacted, tokens) = apply(text, &plan, &mut tokenizer);

        assert_eq!(restore(&redacted, &tokens).unwrap(), text);
    }

    #[test]
    fn test_unicode_text_round_trip() {
        let text = "díga a café@exemplo.com olá";
        let start = text.find("café@exemplo.com").unwrap();
        let plan = vec![Detection::pattern(
            start,
            start + "café@exemplo.com".len(),
            PiiCategory::Email,
        )];
        let mut tokenizer = Tokenizer::new();
        let (redacted, tokens) = apply(text, &plan, &mut tokenizer);

        assert!(!redacted.contains("café@exemplo.com"));
        assert_eq!(restore(&redacted, &tokens).unwrap(), text);
    }
}
