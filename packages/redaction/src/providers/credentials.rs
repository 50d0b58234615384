//! Provider credentials and the stores that supply them.
//!
//! API keys travel in a `secrecy`-backed wrapper so they cannot leak
//! through logging or debug output. Providers never read credentials from
//! the environment themselves; they ask a [`CredentialStore`] on every
//! call and hold nothing between calls, so rotated credentials take
//! effect immediately.

use secrecy::{ExposeSecret, SecretBox};
use std::collections::HashMap;
use std::fmt;

/// An API key or token that renders as `[REDACTED]` everywhere.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Reveal the wrapped value.
    ///
    /// Pass the result straight into a request header rather than holding
    /// it in an intermediate.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Connection material for one detection provider.
#[derive(Clone)]
pub struct ProviderCredentials {
    /// API key or bearer token (secret)
    pub api_key: SecretString,

    /// Service endpoint URL, for providers with per-resource endpoints
    pub endpoint: Option<String>,

    /// Service region, for providers addressed by region
    pub region: Option<String>,
}

impl ProviderCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            endpoint: None,
            region: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish()
    }
}

/// Source of provider credentials, keyed by provider name.
pub trait CredentialStore: Send + Sync {
    /// Returns credentials for `provider`, or `None` if the store has
    /// nothing for it.
    fn credentials(&self, provider: &str) -> Option<ProviderCredentials>;
}

/// Reads credentials from environment variables.
///
/// For a provider named `comprehend` it reads `COMPREHEND_API_KEY`,
/// `COMPREHEND_ENDPOINT`, and `COMPREHEND_REGION`; hyphens in the name
/// become underscores.
#[derive(Debug, Default)]
pub struct EnvCredentialStore;

impl EnvCredentialStore {
    pub fn new() -> Self {
        Self
    }

    fn var_prefix(provider: &str) -> String {
        provider
            .chars()
            .map(|c| match c {
                '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl CredentialStore for EnvCredentialStore {
    fn credentials(&self, provider: &str) -> Option<ProviderCredentials> {
        let prefix = Self::var_prefix(provider);
        let api_key = std::env::var(format!("{prefix}_API_KEY")).ok()?;
        let mut credentials = ProviderCredentials::new(api_key);
        if let Ok(endpoint) = std::env::var(format!("{prefix}_ENDPOINT")) {
            credentials = credentials.with_endpoint(endpoint);
        }
        if let Ok(region) = std::env::var(format!("{prefix}_REGION")) {
            credentials = credentials.with_region(region);
        }
        Some(credentials)
    }
}

/// In-memory credential store for tests and embedded deployments.
#[derive(Default)]
pub struct StaticCredentialStore {
    entries: HashMap<String, ProviderCredentials>,
}

impl StaticCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(
        mut self,
        provider: impl Into<String>,
        credentials: ProviderCredentials,
    ) -> Self {
        self.entries.insert(provider.into(), credentials);
        self
    }
}

impl CredentialStore for StaticCredentialStore {
    fn credentials(&self, provider: &str) -> Option<ProviderCredentials> {
        self.entries.get(provider).cloned()
    }
}
