//! Typed errors for the redaction engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to keep the three
//! failure classes distinct: configuration faults that fail fast at
//! construction, provider faults that are recovered by degrading to
//! local-only detection, and fatal faults that abort a call.

use thiserror::Error;

/// Errors raised while assembling a service or registering patterns.
///
/// These always surface at construction time; a successfully built service
/// never reports a configuration error from `redact` or `unmask`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A redactor pattern failed to compile
    #[error("invalid pattern for category '{category}': {source}")]
    InvalidPattern {
        category: String,
        #[source]
        source: regex::Error,
    },

    /// A custom category label is empty or not placeholder-safe
    #[error("invalid category label: '{label}'")]
    InvalidCategoryLabel { label: String },

    /// Size threshold must be at least one byte
    #[error("invalid size threshold: {value}")]
    InvalidThreshold { value: usize },

    /// Worker count must be at least one
    #[error("invalid worker count: {value}")]
    InvalidWorkerCount { value: usize },

    /// Provider concurrency limit must be at least one
    #[error("invalid provider concurrency limit: {value}")]
    InvalidConcurrencyLimit { value: usize },

    /// Provider timeout must be non-zero
    #[error("invalid timeout: must be non-zero")]
    InvalidTimeout,

    /// Options name a provider that was never registered
    #[error("unknown provider: '{name}'")]
    UnknownProvider { name: String },

    /// Cloud detection is enabled with no providers registered
    #[error("cloud detection is enabled but no providers are registered")]
    NoProviders,

    /// The chunk worker pool could not be built
    #[error("failed to build worker pool: {message}")]
    WorkerPool { message: String },
}

/// Errors local to the cloud-detection path.
///
/// Adapters translate transport failures into these variants; the
/// orchestrator recovers from all of them by degrading the affected text to
/// local-only detection and annotating the result. They never fail a call.
#[derive(Debug, Error)]
pub enum DetectError {
    /// Credential was rejected or could not be obtained
    #[error("authentication failed for provider '{provider}': {message}")]
    Authentication { provider: String, message: String },

    /// Provider throttled the request
    #[error("provider '{provider}' rate limited the request")]
    RateLimited { provider: String },

    /// Network failure or provider-side 5xx
    #[error("transient failure calling provider '{provider}': {source}")]
    Transient {
        provider: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Provider rejected the payload itself (size, encoding, schema)
    #[error("provider '{provider}' rejected payload: {message}")]
    UnsupportedPayload { provider: String, message: String },
}

impl DetectError {
    /// Name of the provider that produced this error.
    pub fn provider(&self) -> &str {
        match self {
            Self::Authentication { provider, .. }
            | Self::RateLimited { provider }
            | Self::Transient { provider, .. }
            | Self::UnsupportedPayload { provider, .. } => provider,
        }
    }
}

/// Integrity failures raised by `unmask`.
///
/// Both variants indicate a caller bug or a tampered/mismatched token set
/// and are fatal: `unmask` never returns partially restored text.
#[derive(Debug, Error)]
pub enum TokenMismatch {
    /// A token's placeholder could not be located in the redacted text
    #[error("placeholder '{placeholder}' not found in redacted text")]
    MissingPlaceholder { placeholder: String },

    /// The redacted text holds a placeholder-shaped substring with no token
    #[error("redacted text contains '{placeholder}' with no matching token")]
    OrphanPlaceholder { placeholder: String },
}

/// Top-level errors for redaction operations.
#[derive(Debug, Error)]
pub enum RedactionError {
    /// Construction-time configuration fault
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// `unmask` integrity failure
    #[error("token mismatch: {0}")]
    TokenMismatch(#[from] TokenMismatch),

    /// A pattern redactor panicked on valid input; reported immediately
    /// and never retried
    #[error("pattern redactor fault: {detail}")]
    RedactorFault { detail: String },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Result type alias for provider detection calls.
pub type DetectResult<T> = std::result::Result<T, DetectError>;
