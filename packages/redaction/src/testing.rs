//! Mock detection providers and redactors for tests.
//!
//! Lets applications exercise degradation, concurrency limits and provider
//! selection without real network calls or cloud credentials.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{DetectError, DetectResult};
use crate::providers::DetectionProvider;
use crate::redactors::PatternRedactor;
use crate::types::{Detection, PiiCategory};
use regex::Regex;

/// How a [`MockProvider`] responds to detect calls.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return these detections.
    Succeed(Vec<Detection>),
    /// Fail with an authentication error.
    AuthFailure,
    /// Fail with a rate-limit error.
    RateLimited,
    /// Fail with a transient error.
    Transient,
    /// Fail with an unsupported-payload error.
    UnsupportedPayload,
}

/// A mock detection provider for testing.
///
/// Returns deterministic, configurable responses without making network
/// requests. Failure modes cover every recoverable provider error.
pub struct MockProvider {
    name: String,

    /// Response behavior, swappable between calls
    behavior: Arc<RwLock<MockBehavior>>,

    /// Artificial latency before each response
    delay: Option<Duration>,

    /// Advertised payload ceiling
    max_payload_bytes: usize,

    /// In-flight call gauge, shared across providers when set
    gauge: Option<ConcurrencyGauge>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockProvider {
    /// Create a new mock provider that succeeds with no detections.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behavior: Arc::new(RwLock::new(MockBehavior::Succeed(Vec::new()))),
            delay: None,
            max_payload_bytes: 100_000,
            gauge: None,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Succeed with these detections.
    pub fn with_detections(self, detections: Vec<Detection>) -> Self {
        *self.behavior.write().unwrap() = MockBehavior::Succeed(detections);
        self
    }

    /// Fail every call with an authentication error.
    pub fn fail_with_auth(self) -> Self {
        *self.behavior.write().unwrap() = MockBehavior::AuthFailure;
        self
    }

    /// Fail every call with a rate-limit error.
    pub fn fail_with_rate_limit(self) -> Self {
        *self.behavior.write().unwrap() = MockBehavior::RateLimited;
        self
    }

    /// Fail every call with a transient error.
    pub fn fail_with_transient(self) -> Self {
        *self.behavior.write().unwrap() = MockBehavior::Transient;
        self
    }

    /// Fail every call with an unsupported-payload error.
    pub fn fail_with_unsupported_payload(self) -> Self {
        *self.behavior.write().unwrap() = MockBehavior::UnsupportedPayload;
        self
    }

    /// Sleep this long before responding.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Advertise a payload ceiling.
    pub fn with_max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = limit;
        self
    }

    /// Track in-flight calls on a shared gauge.
    pub fn with_concurrency_gauge(mut self, gauge: ConcurrencyGauge) -> Self {
        self.gauge = Some(gauge);
        self
    }

    /// Swap the behavior after construction.
    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.write().unwrap() = behavior;
    }

    /// Get every text this mock was called with.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of detect calls made.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl DetectionProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn detect(&self, text: &str) -> DetectResult<Vec<Detection>> {
        self.calls.write().unwrap().push(text.to_string());
        let _in_flight = self.gauge.as_ref().map(|g| g.enter());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let behavior = self.behavior.read().unwrap().clone();
        match behavior {
            MockBehavior::Succeed(detections) => Ok(detections),
            MockBehavior::AuthFailure => Err(DetectError::Authentication {
                provider: self.name.clone(),
                message: "mock credentials rejected".to_string(),
            }),
            MockBehavior::RateLimited => Err(DetectError::RateLimited {
                provider: self.name.clone(),
            }),
            MockBehavior::Transient => Err(DetectError::Transient {
                provider: self.name.clone(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "mock connection refused",
                )),
            }),
            MockBehavior::UnsupportedPayload => Err(DetectError::UnsupportedPayload {
                provider: self.name.clone(),
                message: "mock rejected payload".to_string(),
            }),
        }
    }

    fn max_payload_bytes(&self) -> usize {
        self.max_payload_bytes
    }
}

/// Tracks concurrent in-flight calls across any number of mocks.
///
/// Clones share state, so one gauge can watch a whole provider fleet.
#[derive(Clone, Default)]
pub struct ConcurrencyGauge {
    inner: Arc<GaugeInner>,
}

#[derive(Default)]
struct GaugeInner {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencyGauge {
    /// Create a new gauge with no recorded calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a call as in flight until the returned guard drops.
    pub fn enter(&self) -> InFlightGuard {
        let now = self.inner.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Calls in flight right now.
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous calls observed.
    pub fn peak(&self) -> usize {
        self.inner.peak.load(Ordering::SeqCst)
    }
}

/// Decrements the active count when dropped.
pub struct InFlightGuard {
    inner: Arc<GaugeInner>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A pattern redactor that panics on every scan.
///
/// Exercises the fault isolation path without poisoning real redactors.
pub struct PanickingRedactor {
    category: PiiCategory,
    pattern: Regex,
}

impl PanickingRedactor {
    pub fn new() -> Self {
        Self {
            category: PiiCategory::Custom("FAULTY".to_string()),
            pattern: Regex::new("x^").unwrap(),
        }
    }
}

impl Default for PanickingRedactor {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternRedactor for PanickingRedactor {
    fn category(&self) -> PiiCategory {
        self.category.clone()
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn max_match_len(&self) -> usize {
        64
    }

    fn detect(&self, _text: &str) -> Vec<Detection> {
        panic!("mock redactor fault");
    }
}
