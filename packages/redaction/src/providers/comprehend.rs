//! AWS Comprehend PII detection provider.
//!
//! Speaks the `DetectPiiEntities` JSON protocol. Comprehend reports
//! `BeginOffset`/`EndOffset` as UTF-8 byte offsets, which is exactly what
//! the merge stage consumes. Texts over the request cap are split on
//! character boundaries and submitted as parallel requests. Authentication
//! uses a bearer token fetched from the credential store on every call, so
//! deployments front the service with a signing proxy or token gateway
//! rather than embedding SigV4 material here.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{
    clamp_entity_spans, split_for_payload, CredentialStore, DetectionProvider, ProviderCredentials,
};
use crate::error::{DetectError, DetectResult};
use crate::types::{Detection, PiiCategory};

const TARGET: &str = "Comprehend_20171127.DetectPiiEntities";
// DetectPiiEntities accepts up to 100KB of UTF-8 text
const MAX_DOCUMENT_BYTES: usize = 100_000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetectRequest {
    text: String,
    language_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectResponse {
    #[serde(default)]
    entities: Vec<PiiEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PiiEntity {
    score: f64,
    #[serde(rename = "Type")]
    entity_type: String,
    begin_offset: usize,
    end_offset: usize,
}

/// Provider backed by AWS Comprehend's PII entity detection.
pub struct ComprehendProvider {
    client: reqwest::Client,
    store: Arc<dyn CredentialStore>,
    language_code: String,
}

impl ComprehendProvider {
    pub const NAME: &'static str = "comprehend";

    /// Builds a provider that resolves credentials from `store` on every
    /// call.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            store,
            language_code: "en".to_string(),
        }
    }

    pub fn with_language_code(mut self, code: impl Into<String>) -> Self {
        self.language_code = code.into();
        self
    }

    /// Regional Comprehend URL from the credential entry; an explicit
    /// `endpoint` (e.g. a signing proxy) overrides the region.
    fn endpoint_for(credentials: &ProviderCredentials) -> Option<String> {
        match (&credentials.endpoint, &credentials.region) {
            (Some(endpoint), _) => Some(endpoint.trim_end_matches('/').to_string()),
            (None, Some(region)) => Some(format!("https://comprehend.{region}.amazonaws.com")),
            (None, None) => None,
        }
    }

    fn map_entity_type(entity_type: &str) -> Option<PiiCategory> {
        let mapped = match entity_type {
            "EMAIL" => PiiCategory::Email,
            "PHONE" => PiiCategory::Phone,
            "SSN" => PiiCategory::NationalId,
            "CREDIT_DEBIT_NUMBER" | "CREDIT_DEBIT_CVV" | "CREDIT_DEBIT_EXPIRY" => {
                PiiCategory::PaymentCard
            }
            "IP_ADDRESS" | "MAC_ADDRESS" => PiiCategory::IpAddress,
            "PASSPORT_NUMBER" => PiiCategory::TravelDocument,
            "BANK_ACCOUNT_NUMBER" | "BANK_ROUTING" => PiiCategory::BankAccount,
            "NAME" => PiiCategory::PersonName,
            "ADDRESS" => PiiCategory::Address,
            "DATE_TIME" => PiiCategory::DateTime,
            "PASSWORD" | "USERNAME" | "PIN" | "AWS_ACCESS_KEY" | "AWS_SECRET_KEY" => {
                PiiCategory::Credential
            }
            other => match PiiCategory::custom(other) {
                Ok(custom) => custom,
                Err(_) => {
                    tracing::warn!(entity_type, "Skipping entity with unusable type");
                    return None;
                }
            },
        };
        Some(mapped)
    }

    fn map_status(status: StatusCode, body: String) -> DetectError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DetectError::Authentication {
                provider: Self::NAME.to_string(),
                message: format!("status {status}"),
            },
            StatusCode::TOO_MANY_REQUESTS => DetectError::RateLimited {
                provider: Self::NAME.to_string(),
            },
            StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => {
                DetectError::UnsupportedPayload {
                    provider: Self::NAME.to_string(),
                    message: body,
                }
            }
            other => DetectError::Transient {
                provider: Self::NAME.to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("comprehend error: {other}"),
                )),
            },
        }
    }

    /// Submits one document slice and returns its spans re-based by `base`.
    async fn detect_document(
        &self,
        endpoint: &str,
        credentials: &ProviderCredentials,
        text: &str,
        base: usize,
    ) -> DetectResult<Vec<Detection>> {
        let request = DetectRequest {
            text: text.to_string(),
            language_code: self.language_code.clone(),
        };

        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/x-amz-json-1.1")
            .header("X-Amz-Target", TARGET)
            .header(
                "Authorization",
                format!("Bearer {}", credentials.api_key.expose()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| DetectError::Transient {
                provider: Self::NAME.to_string(),
                source: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, body));
        }

        let detected: DetectResponse =
            response.json().await.map_err(|e| DetectError::Transient {
                provider: Self::NAME.to_string(),
                source: Box::new(e),
            })?;

        let spans = detected
            .entities
            .into_iter()
            .filter_map(|entity| {
                let category = Self::map_entity_type(&entity.entity_type)?;
                Some(Detection::provider(
                    entity.begin_offset,
                    entity.end_offset,
                    category,
                    entity.score,
                    Self::NAME,
                ))
            })
            .collect();

        Ok(clamp_entity_spans(Self::NAME, text, spans)
            .into_iter()
            .map(|d| d.rebase(base))
            .collect())
    }
}

#[async_trait]
impl DetectionProvider for ComprehendProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn detect(&self, text: &str) -> DetectResult<Vec<Detection>> {
        let credentials =
            self.store
                .credentials(Self::NAME)
                .ok_or_else(|| DetectError::Authentication {
                    provider: Self::NAME.to_string(),
                    message: "no credentials in store".to_string(),
                })?;
        let endpoint =
            Self::endpoint_for(&credentials).ok_or_else(|| DetectError::Authentication {
                provider: Self::NAME.to_string(),
                message: "no endpoint or region configured".to_string(),
            })?;

        if text.len() <= self.max_payload_bytes() {
            return self.detect_document(&endpoint, &credentials, text, 0).await;
        }

        let slices = split_for_payload(text, self.max_payload_bytes());
        tracing::debug!(
            bytes = text.len(),
            documents = slices.len(),
            "Splitting oversized text across requests"
        );
        let calls = slices
            .iter()
            .map(|(base, slice)| self.detect_document(&endpoint, &credentials, slice, *base));
        let mut spans = Vec::new();
        for outcome in join_all(calls).await {
            spans.extend(outcome?);
        }
        spans.sort_by_key(|d| (d.start, d.end));
        Ok(spans)
    }

    fn max_payload_bytes(&self) -> usize {
        MAX_DOCUMENT_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::StaticCredentialStore;

    #[test]
    fn test_entity_type_mapping() {
        assert_eq!(
            ComprehendProvider::map_entity_type("EMAIL"),
            Some(PiiCategory::Email)
        );
        assert_eq!(
            ComprehendProvider::map_entity_type("CREDIT_DEBIT_NUMBER"),
            Some(PiiCategory::PaymentCard)
        );
        assert_eq!(
            ComprehendProvider::map_entity_type("NAME"),
            Some(PiiCategory::PersonName)
        );
        assert_eq!(
            ComprehendProvider::map_entity_type("AWS_SECRET_KEY"),
            Some(PiiCategory::Credential)
        );
    }

    #[test]
    fn test_unknown_entity_type_becomes_custom() {
        let mapped = ComprehendProvider::map_entity_type("LICENSE_PLATE").unwrap();
        assert_eq!(mapped.label(), "LICENSE_PLATE");
    }

    #[test]
    fn test_region_builds_default_endpoint() {
        let credentials = ProviderCredentials::new("key").with_region("us-east-1");
        assert_eq!(
            ComprehendProvider::endpoint_for(&credentials).as_deref(),
            Some("https://comprehend.us-east-1.amazonaws.com")
        );
    }

    #[test]
    fn test_explicit_endpoint_overrides_region() {
        let credentials = ProviderCredentials::new("key")
            .with_endpoint("https://signing-proxy.internal/comprehend/")
            .with_region("us-east-1");
        assert_eq!(
            ComprehendProvider::endpoint_for(&credentials).as_deref(),
            Some("https://signing-proxy.internal/comprehend")
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_are_authentication_error() {
        let provider = ComprehendProvider::new(Arc::new(StaticCredentialStore::new()));
        let err = provider.detect("hello").await.unwrap_err();
        assert!(matches!(err, DetectError::Authentication { .. }));
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"Entities":[{"Score":0.99,"Type":"EMAIL","BeginOffset":9,"EndOffset":25}]}"#;
        let parsed: DetectResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.entities.len(), 1);
        assert_eq!(parsed.entities[0].entity_type, "EMAIL");
        assert_eq!(parsed.entities[0].begin_offset, 9);
    }
}
