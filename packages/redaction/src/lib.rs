//! Reversible PII Redaction Engine
//!
//! Detects personally identifiable information in arbitrary text and
//! replaces each value with an opaque placeholder, returning a token ledger
//! that can restore the original text exactly. Detection combines local
//! pattern redactors (regex plus validation, always on) with optional cloud
//! detection providers; overlapping findings are merged into one
//! non-overlapping plan before anything is rewritten.
//!
//! - Local-first: pattern redactors always run; providers only add to them
//! - Reversible: `unmask` restores the exact original from the ledger
//! - Degraded, never silent: a failed provider becomes a warning on the
//!   result, not a missing detection nobody hears about
//! - Scales both ways: big texts scan chunk-parallel on a worker pool,
//!   provider calls fan out concurrently under one semaphore
//!
//! # Usage
//!
//! ```rust,ignore
//! use redaction::{unmask, RedactionOptions, RedactionService};
//!
//! let service = RedactionService::builder()
//!     .with_options(RedactionOptions::default())
//!     .with_custom_pattern("EMPLOYEE_ID", r"\bEMP-\d{6}\b")
//!     .build()?;
//!
//! let result = service.redact("Contact: jane.doe@example.com").await?;
//! assert!(!result.redacted_text.contains("jane.doe@example.com"));
//!
//! // Later, with the ledger the caller kept:
//! let original = unmask(&result.redacted_text, &result.tokens)?;
//! ```
//!
//! # Modules
//!
//! - [`redactors`] - Local pattern redactors and the registry
//! - [`providers`] - Cloud detection provider adapters and credentials
//! - [`pipeline`] - Chunking, merge/conflict resolution, tokenization
//! - [`types`] - Detections, options, results, the token ledger
//! - [`error`] - Configuration, detection, and redaction errors
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod pipeline;
pub mod providers;
pub mod redactors;
pub mod service;
pub mod testing;
pub mod types;

mod orchestrator;

// Re-export the service surface at crate root
pub use service::{unmask, RedactionService, RedactionServiceBuilder};

// Re-export core types
pub use error::{
    ConfigError, DetectError, DetectResult, RedactionError, Result, TokenMismatch,
};
pub use types::{
    DegradationWarning, Detection, DetectionSource, PiiCategory, RedactionOptions,
    RedactionOutcome, RedactionResult, RedactionToken,
};

// Re-export redactors
pub use redactors::{
    builtin_redactors, BankAccountRedactor, CustomRedactor, EmailRedactor, IpAddressRedactor,
    NationalIdRedactor, PatternRedactor, PaymentCardRedactor, PhoneRedactor,
    TravelDocumentRedactor,
};

// Re-export providers
pub use providers::{
    AzureLanguageProvider, ComprehendProvider, CredentialStore, DetectionProvider,
    EnvCredentialStore, ProviderCredentials, ProviderExt, RateLimitedProvider, SecretString,
    StaticCredentialStore,
};

// Re-export testing utilities
pub use testing::{ConcurrencyGauge, MockProvider, PanickingRedactor};
