//! Cloud detection providers.
//!
//! Providers send text to a remote PII detection service and translate its
//! entity annotations into [`Detection`] spans over the submitted text.
//! Every failure is reported as a [`DetectError`](crate::error::DetectError)
//! variant; the orchestrator recovers from all of them by falling back to
//! local-only detection.

mod comprehend;
mod credentials;
mod language_service;
mod rate_limited;

pub use comprehend::ComprehendProvider;
pub use credentials::{
    CredentialStore, EnvCredentialStore, ProviderCredentials, SecretString, StaticCredentialStore,
};
pub use language_service::AzureLanguageProvider;
pub use rate_limited::{ProviderExt, RateLimitedProvider};

use async_trait::async_trait;

use crate::error::DetectResult;
use crate::types::Detection;

/// A remote PII detection service.
#[async_trait]
pub trait DetectionProvider: Send + Sync {
    /// Stable name used in options, warnings, and detection sources.
    fn name(&self) -> &str;

    /// Detects PII in `text`.
    ///
    /// Returned spans are byte offsets into `text` on UTF-8 character
    /// boundaries; implementations must drop or repair entity offsets
    /// that do not satisfy this before returning.
    async fn detect(&self, text: &str) -> DetectResult<Vec<Detection>>;

    /// Largest payload this provider submits in one request, in bytes.
    /// Adapters split longer texts into multiple requests and re-base the
    /// returned offsets onto the whole text.
    fn max_payload_bytes(&self) -> usize {
        100_000
    }
}

/// Splits `text` into ordered non-overlapping slices of at most
/// `max_bytes`, cut on character boundaries, each tagged with its byte
/// offset in the whole text.
pub(crate) fn split_for_payload(text: &str, max_bytes: usize) -> Vec<(usize, &str)> {
    let mut slices = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + max_bytes).min(text.len());
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // Limit smaller than one character: take the character anyway
            end = start + 1;
            while end < text.len() && !text.is_char_boundary(end) {
                end += 1;
            }
        }
        slices.push((start, &text[start..end]));
        start = end;
    }
    slices
}

/// Keeps only entity spans that are usable against `text`: in bounds,
/// non-empty, and on character boundaries.
pub(crate) fn clamp_entity_spans(provider: &str, text: &str, spans: Vec<Detection>) -> Vec<Detection> {
    spans
        .into_iter()
        .filter(|d| {
            let ok = d.start < d.end
                && d.end <= text.len()
                && text.is_char_boundary(d.start)
                && text.is_char_boundary(d.end);
            if !ok {
                tracing::warn!(
                    provider,
                    start = d.start,
                    end = d.end,
                    "Dropping entity with unusable offsets"
                );
            }
            ok
        })
        .collect()
}
