//! Redaction service facade.
//!
//! [`RedactionService`] ties detection, merging and tokenization together
//! behind `redact`, `redact_many` and `unmask`. Construction goes through
//! [`RedactionServiceBuilder`], where every configuration error surfaces
//! before the first call.

use futures::future::join_all;
use std::sync::Arc;

use crate::error::{ConfigError, Result};
use crate::orchestrator::Orchestrator;
use crate::pipeline::{self, Tokenizer};
use crate::providers::{
    AzureLanguageProvider, ComprehendProvider, CredentialStore, DetectionProvider,
};
use crate::redactors::{builtin_redactors, CustomRedactor, PatternRedactor};
use crate::types::{
    RedactionOptions, RedactionOutcome, RedactionResult, RedactionToken,
};

/// Redacts PII from text, reversibly.
///
/// Each call detects PII with the configured pattern redactors (and cloud
/// providers, when enabled), replaces every detected value with a
/// placeholder and returns the redacted text together with a token ledger.
/// The ledger belongs to the caller; the service keeps no state between
/// calls, so the same service can be shared across tasks freely.
#[derive(Debug)]
pub struct RedactionService {
    orchestrator: Orchestrator,
}

impl RedactionService {
    /// Create a service with the builtin redactors and no providers.
    pub fn new(options: RedactionOptions) -> std::result::Result<Self, ConfigError> {
        RedactionServiceBuilder::new().with_options(options).build()
    }

    /// Start building a service.
    pub fn builder() -> RedactionServiceBuilder {
        RedactionServiceBuilder::new()
    }

    /// The options this service was built with.
    pub fn options(&self) -> &RedactionOptions {
        self.orchestrator.options()
    }

    /// Redact one text.
    ///
    /// Returns the redacted text and its token ledger. When a provider
    /// fails or times out the result is `Degraded` and carries one warning
    /// per failed provider; local detections are always included. Errors
    /// only on a redactor fault.
    pub async fn redact(&self, text: &str) -> Result<RedactionResult> {
        if text.is_empty() {
            return Ok(RedactionResult {
                redacted_text: String::new(),
                tokens: Vec::new(),
                outcome: RedactionOutcome::Full,
                warnings: Vec::new(),
            });
        }

        tracing::debug!(len = text.len(), "Detecting");
        let (detections, warnings) = self.orchestrator.detect(text).await?;

        tracing::debug!(spans = detections.len(), "Merging");
        let plan = pipeline::resolve(detections);

        tracing::debug!(spans = plan.len(), "Tokenizing");
        let mut tokenizer = Tokenizer::new();
        let (redacted_text, tokens) = pipeline::apply(text, &plan, &mut tokenizer);

        let outcome = if warnings.is_empty() {
            RedactionOutcome::Full
        } else {
            RedactionOutcome::Degraded
        };
        tracing::info!(
            tokens = tokens.len(),
            degraded = !warnings.is_empty(),
            "Redaction complete"
        );

        Ok(RedactionResult {
            redacted_text,
            tokens,
            outcome,
            warnings,
        })
    }

    /// Redact a batch of texts concurrently.
    ///
    /// Output order always equals input order, whatever order the texts
    /// finish in. Provider calls across the whole batch share the service's
    /// concurrency limit. Fails on the first redactor fault; provider
    /// failures degrade only the texts they affected.
    pub async fn redact_many<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<RedactionResult>> {
        let calls = texts.iter().map(|text| self.redact(text.as_ref()));
        join_all(calls).await.into_iter().collect()
    }

    /// Stop waiting on in-flight provider calls.
    ///
    /// Calls already past detection finish normally; calls still waiting on
    /// a provider complete `Degraded`. Local detection always runs to
    /// completion.
    pub fn shutdown(&self) {
        self.orchestrator.shutdown();
    }
}

/// Restores the original text from a redacted string and its token ledger.
///
/// Substitutes each token's original value back into the text it was
/// redacted from. Ledger order does not matter. Fails with a
/// [`TokenMismatch`](crate::error::TokenMismatch) error when a placeholder
/// is missing from the text or the text carries a placeholder the ledger
/// does not account for; nothing is returned on failure.
pub fn unmask(redacted_text: &str, tokens: &[RedactionToken]) -> Result<String> {
    pipeline::restore(redacted_text, tokens).map_err(Into::into)
}

/// Builder for a [`RedactionService`].
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(EnvCredentialStore::new());
/// let service = RedactionService::builder()
///     .with_options(RedactionOptions::default().with_cloud_detection(true))
///     .with_custom_pattern("EMPLOYEE_ID", r"\bEMP-\d{6}\b")
///     .with_cloud_provider("azure_language", store)
///     .build()?;
/// ```
pub struct RedactionServiceBuilder {
    options: RedactionOptions,
    builtins: bool,
    redactors: Vec<Arc<dyn PatternRedactor>>,
    custom_patterns: Vec<(String, String)>,
    providers: Vec<Arc<dyn DetectionProvider>>,
    cloud_providers: Vec<(String, Arc<dyn CredentialStore>)>,
}

impl RedactionServiceBuilder {
    pub fn new() -> Self {
        Self {
            options: RedactionOptions::default(),
            builtins: true,
            redactors: Vec::new(),
            custom_patterns: Vec::new(),
            providers: Vec::new(),
            cloud_providers: Vec::new(),
        }
    }

    /// Set the execution options.
    pub fn with_options(mut self, options: RedactionOptions) -> Self {
        self.options = options;
        self
    }

    /// Include or exclude the builtin pattern redactors. On by default.
    pub fn with_builtin_redactors(mut self, enabled: bool) -> Self {
        self.builtins = enabled;
        self
    }

    /// Register an additional pattern redactor.
    pub fn with_redactor(mut self, redactor: Arc<dyn PatternRedactor>) -> Self {
        self.redactors.push(redactor);
        self
    }

    /// Register a custom pattern by label and regex.
    ///
    /// The pattern compiles at [`build`](Self::build); an invalid label or
    /// regex fails construction, never a later call.
    pub fn with_custom_pattern(
        mut self,
        label: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        self.custom_patterns.push((label.into(), pattern.into()));
        self
    }

    /// Register a cloud detection provider.
    pub fn with_provider(mut self, provider: Arc<dyn DetectionProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Register a cloud provider by name, resolving credentials from
    /// `store` on every detection call.
    ///
    /// Known names are [`AzureLanguageProvider::NAME`] and
    /// [`ComprehendProvider::NAME`]; any other name fails
    /// [`build`](Self::build) with [`ConfigError::UnknownProvider`]. A name
    /// the store holds no credentials for still builds; its calls then fail
    /// authentication and results degrade instead of erroring.
    pub fn with_cloud_provider(
        mut self,
        name: impl Into<String>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        self.cloud_providers.push((name.into(), store));
        self
    }

    /// Build the service, validating all configuration.
    pub fn build(self) -> std::result::Result<RedactionService, ConfigError> {
        let mut redactors = if self.builtins {
            builtin_redactors()?
        } else {
            Vec::new()
        };
        redactors.extend(self.redactors);
        for (label, pattern) in &self.custom_patterns {
            redactors.push(Arc::new(CustomRedactor::new(label, pattern)?));
        }

        let mut providers = self.providers;
        for (name, store) in self.cloud_providers {
            let provider: Arc<dyn DetectionProvider> = match name.as_str() {
                AzureLanguageProvider::NAME => Arc::new(AzureLanguageProvider::new(store)),
                ComprehendProvider::NAME => Arc::new(ComprehendProvider::new(store)),
                _ => return Err(ConfigError::UnknownProvider { name }),
            };
            providers.push(provider);
        }

        let orchestrator = Orchestrator::new(redactors, providers, self.options)?;
        Ok(RedactionService { orchestrator })
    }
}

impl Default for RedactionServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
