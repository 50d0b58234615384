//! Azure AI Language PII detection provider.
//!
//! Calls the Language service's `PiiEntityRecognition` task and maps the
//! returned entities onto byte spans. Requests ask for `Utf8CodeUnit`
//! string indexing so entity offsets line up with Rust string indices
//! without conversion. Texts over the per-document cap are split on
//! character boundaries and submitted as parallel requests, with the
//! returned offsets re-based onto the whole text. Credentials are fetched
//! from the store on every call and never held beyond it.

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

const API_VERSION: &str = "2023-04-01";
// The service caps each document at 5,120 characters; a byte bound at the
// same figure stays under it for any UTF-8 input
const MAX_DOCUMENT_BYTES: usize = 5_120;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    kind: &'static str,
    analysis_input: AnalysisInput,
    parameters: AnalyzeParameters,
}

#[derive(Debug, Serialize)]
struct AnalysisInput {
    documents: Vec<InputDocument>,
}

#[derive(Debug, Serialize)]
struct InputDocument {
    id: &'static str,
    language: String,
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeParameters {
    model_version: &'static str,
    string_index_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    results: AnalyzeResults,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResults {
    #[serde(default)]
    documents: Vec<ResultDocument>,
}

#[derive(Debug, Deserialize)]
struct ResultDocument {
    #[serde(default)]
    entities: Vec<PiiEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PiiEntity {
    category: String,
    offset: usize,
    length: usize,
    confidence_score: f64,
}

/// Provider backed by the Azure AI Language PII recognition task.
pub struct AzureLanguageProvider {
    client: reqwest::Client,
    store: Arc<dyn CredentialStore>,
    language: String,
}

impl AzureLanguageProvider {
    pub const NAME: &'static str = "azure_language";

    /// Builds a provider that resolves credentials from `store` on every
    /// call.
    ///
    /// The store entry must carry the Language resource URL in its
    /// `endpoint`; calls without credentials or an endpoint fail with an
    /// authentication error naming the gap, and the result degrades.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            store,
            language: "en".to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn endpoint_for(credentials: &ProviderCredentials) -> Option<String> {
        credentials
            .endpoint
            .as_deref()
            .map(|endpoint| endpoint.trim_end_matches('/').to_string())
    }

    fn map_category(category: &str) -> Option<PiiCategory> {
        let mapped = match category {
            "Email" => PiiCategory::Email,
            "PhoneNumber" => PiiCategory::Phone,
            "CreditCardNumber" => PiiCategory::PaymentCard,
            "IPAddress" => PiiCategory::IpAddress,
            "Person" => PiiCategory::PersonName,
            "Organization" => PiiCategory::Organization,
            "Address" => PiiCategory::Address,
            "DateTime" => PiiCategory::DateTime,
            "USSocialSecurityNumber" => PiiCategory::NationalId,
            "USBankAccountNumber" | "InternationalBankingAccountNumber" | "ABARoutingNumber" => {
                PiiCategory::BankAccount
            }
            "USUKPassportNumber" => PiiCategory::TravelDocument,
            "Password" => PiiCategory::Credential,
            other => match PiiCategory::custom(other) {
                Ok(custom) => custom,
                Err(_) => {
                    tracing::warn!(category, "Skipping entity with unusable category");
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
                    format!("language service error: {other}"),
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
        let request = AnalyzeRequest {
            kind: "PiiEntityRecognition",
            analysis_input: AnalysisInput {
                documents: vec![InputDocument {
                    id: "1",
                    language: self.language.clone(),
                    text: text.to_string(),
                }],
            },
            parameters: AnalyzeParameters {
                model_version: "latest",
                string_index_type: "Utf8CodeUnit",
            },
        };

        let response = self
            .client
            .post(format!(
                "{endpoint}/language/:analyze-text?api-version={API_VERSION}"
            ))
            .header("Ocp-Apim-Subscription-Key", credentials.api_key.expose())
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

        let analyzed: AnalyzeResponse =
            response.json().await.map_err(|e| DetectError::Transient {
                provider: Self::NAME.to_string(),
                source: Box::new(e),
            })?;

        let spans = analyzed
            .results
            .documents
            .into_iter()
            .flat_map(|doc| doc.entities)
            .filter_map(|entity| {
                let category = Self::map_category(&entity.category)?;
                Some(Detection::provider(
                    entity.offset,
                    entity.offset + entity.length,
                    category,
                    entity.confidence_score,
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
impl DetectionProvider for AzureLanguageProvider {
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
                message: "no endpoint configured".to_string(),
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
