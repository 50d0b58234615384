//! Rate-limited provider wrapper.
//!
//! Wraps any DetectionProvider with client-side rate limiting using the
//! governor crate, for deployments that would otherwise trip provider
//! throttling under batch load.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::DetectionProvider;
use crate::error::DetectResult;
use crate::types::Detection;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A provider wrapper that enforces a request rate before each call.
pub struct RateLimitedProvider<P: DetectionProvider> {
    inner: P,
    limiter: Arc<DefaultRateLimiter>,
}

impl<P: DetectionProvider> RateLimitedProvider<P> {
    /// Create a new rate-limited provider.
    ///
    /// # Arguments
    /// * `provider` - The underlying provider to wrap
    /// * `requests_per_second` - Maximum requests per second
    pub fn new(provider: P, requests_per_second: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).expect("requests_per_second must be > 0"),
        );
        Self {
            inner: provider,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Create with burst support.
    pub fn with_burst(provider: P, requests_per_second: u32, burst: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).expect("requests_per_second must be > 0"),
        )
        .allow_burst(NonZeroU32::new(burst).expect("burst must be > 0"));
        Self {
            inner: provider,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

#[async_trait]
impl<P: DetectionProvider> DetectionProvider for RateLimitedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn detect(&self, text: &str) -> DetectResult<Vec<Detection>> {
        // Wait for a permit before each request
        self.limiter.until_ready().await;
        self.inner.detect(text).await
    }

    fn max_payload_bytes(&self) -> usize {
        self.inner.max_payload_bytes()
    }
}

/// Extension trait for easy rate limiting.
pub trait ProviderExt: DetectionProvider + Sized {
    /// Wrap this provider with rate limiting.
    fn rate_limited(self, requests_per_second: u32) -> RateLimitedProvider<Self> {
        RateLimitedProvider::new(self, requests_per_second)
    }

    /// Wrap with rate limiting and burst support.
    fn rate_limited_with_burst(
        self,
        requests_per_second: u32,
        burst: u32,
    ) -> RateLimitedProvider<Self> {
        RateLimitedProvider::with_burst(self, requests_per_second, burst)
    }
}

impl<P: DetectionProvider + Sized> ProviderExt for P {}
