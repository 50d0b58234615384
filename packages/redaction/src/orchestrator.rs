//! Execution strategy selection and scheduling.
//!
//! The orchestrator decides how each call runs: small texts are scanned
//! inline on the calling task, large texts fan out across a fixed rayon
//! pool, and provider requests run concurrently with the local scan under
//! a shared semaphore. Provider failures and timeouts degrade the call to
//! local-only results; they never fail it.

use futures::future::join_all;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{ConfigError, DetectError, RedactionError, Result};
use crate::pipeline::{margin_for, split_with_margin};
use crate::providers::DetectionProvider;
use crate::redactors::PatternRedactor;
use crate::types::{DegradationWarning, Detection, RedactionOptions};

pub(crate) struct Orchestrator {
    redactors: Arc<Vec<Arc<dyn PatternRedactor>>>,
    providers: Vec<Arc<dyn DetectionProvider>>,
    options: RedactionOptions,
    margin: usize,
    scan_pool: Arc<rayon::ThreadPool>,
    provider_permits: Arc<Semaphore>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("options", &self.options)
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub(crate) fn new(
        redactors: Vec<Arc<dyn PatternRedactor>>,
        providers: Vec<Arc<dyn DetectionProvider>>,
        options: RedactionOptions,
    ) -> std::result::Result<Self, ConfigError> {
        options.validate()?;
        for name in &options.providers {
            if !providers.iter().any(|p| p.name() == name.as_str()) {
                return Err(ConfigError::UnknownProvider { name: name.clone() });
            }
        }
        if options.use_cloud_detection && providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }

        let scan_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.worker_count)
            .thread_name(|i| format!("redaction-scan-{i}"))
            .build()
            .map_err(|e| ConfigError::WorkerPool {
                message: e.to_string(),
            })?;

        let margin = margin_for(&redactors);
        Ok(Self {
            redactors: Arc::new(redactors),
            providers,
            provider_permits: Arc::new(Semaphore::new(options.provider_concurrency_limit)),
            options,
            margin,
            scan_pool: Arc::new(scan_pool),
            shutdown: CancellationToken::new(),
        })
    }

    pub(crate) fn options(&self) -> &RedactionOptions {
        &self.options
    }

    /// Stops waiting on in-flight provider calls. Local detection is
    /// unaffected; affected calls degrade.
    pub(crate) fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Runs every detection source against `text` and returns the raw
    /// spans plus warnings for any provider that contributed nothing.
    pub(crate) async fn detect(
        &self,
        text: &str,
    ) -> Result<(Vec<Detection>, Vec<DegradationWarning>)> {
        if !self.options.use_cloud_detection {
            let local = self.detect_local(text).await?;
            return Ok((local, Vec::new()));
        }

        let (local, remote) = tokio::join!(self.detect_local(text), self.detect_remote(text));
        let mut detections = local?;
        let (remote_detections, warnings) = remote;
        detections.extend(remote_detections);
        Ok((detections, warnings))
    }

    /// Pattern scan, inline for small texts and chunked across the worker
    /// pool beyond the size threshold.
    async fn detect_local(&self, text: &str) -> Result<Vec<Detection>> {
        if text.len() <= self.options.size_threshold {
            return catch_unwind(AssertUnwindSafe(|| scan_text(&self.redactors, text)))
                .map_err(|payload| RedactionError::RedactorFault {
                    detail: panic_detail(payload),
                });
        }

        tracing::debug!(
            len = text.len(),
            threshold = self.options.size_threshold,
            "Scanning in chunks"
        );

        let owned: Arc<str> = Arc::from(text);
        let redactors = Arc::clone(&self.redactors);
        let pool = Arc::clone(&self.scan_pool);
        let chunk_size = self.options.size_threshold;
        let margin = self.margin;

        let scanned = tokio::task::spawn_blocking(move || {
            catch_unwind(AssertUnwindSafe(|| {
                scan_chunked(&pool, &redactors, &owned, chunk_size, margin)
            }))
            .map_err(|payload| RedactionError::RedactorFault {
                detail: panic_detail(payload),
            })
        })
        .await
        .map_err(|e| RedactionError::RedactorFault {
            detail: format!("scan task failed: {e}"),
        })?;

        scanned
    }

    /// Fans out to every selected provider concurrently, bounded by the
    /// shared permit pool and one deadline for the whole fan-out.
    /// Failures become warnings, never errors.
    async fn detect_remote(&self, text: &str) -> (Vec<Detection>, Vec<DegradationWarning>) {
        let selected: Vec<_> = self
            .providers
            .iter()
            .filter(|p| {
                self.options.providers.is_empty()
                    || self
                        .options
                        .providers
                        .iter()
                        .any(|name| name.as_str() == p.name())
            })
            .cloned()
            .collect();

        let deadline = Instant::now() + self.options.timeout;
        let calls = selected
            .iter()
            .map(|provider| self.call_provider(Arc::clone(provider), text, deadline));
        let outcomes = join_all(calls).await;

        let mut detections = Vec::new();
        let mut warnings = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(spans) => detections.extend(spans),
                Err(warning) => {
                    tracing::warn!(
                        provider = %warning.provider,
                        detail = %warning.detail,
                        "Provider degraded"
                    );
                    warnings.push(warning);
                }
            }
        }
        (detections, warnings)
    }

    /// One provider call under the shared deadline. The deadline covers
    /// the permit wait as well as the request, so queued calls cannot
    /// stack timeouts behind slow ones.
    async fn call_provider(
        &self,
        provider: Arc<dyn DetectionProvider>,
        text: &str,
        deadline: Instant,
    ) -> std::result::Result<Vec<Detection>, DegradationWarning> {
        let name = provider.name().to_string();

        let acquired = tokio::time::timeout_at(
            deadline,
            Arc::clone(&self.provider_permits).acquire_owned(),
        )
        .await;
        let permit = match acquired {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                return Err(DegradationWarning {
                    provider: name,
                    detail: "concurrency permits closed".to_string(),
                })
            }
            Err(_) => {
                return Err(DegradationWarning {
                    provider: name,
                    detail: format!(
                        "timed out after {}ms awaiting a concurrency permit",
                        self.options.timeout.as_millis()
                    ),
                })
            }
        };

        let outcome = tokio::select! {
            _ = self.shutdown.cancelled() => Err(DegradationWarning {
                provider: name.clone(),
                detail: "cancelled by shutdown".to_string(),
            }),
            waited = tokio::time::timeout_at(deadline, provider.detect(text)) => {
                match waited {
                    // The merge stage requires in-bounds offsets on char
                    // boundaries, whatever the implementation returned
                    Ok(Ok(spans)) => Ok(crate::providers::clamp_entity_spans(&name, text, spans)),
                    Ok(Err(err)) => Err(degradation_for(&name, err)),
                    Err(_) => Err(DegradationWarning {
                        provider: name.clone(),
                        detail: format!(
                            "timed out after {}ms",
                            self.options.timeout.as_millis()
                        ),
                    }),
                }
            }
        };
        drop(permit);
        outcome
    }
}

fn degradation_for(provider: &str, err: DetectError) -> DegradationWarning {
    DegradationWarning {
        provider: provider.to_string(),
        detail: err.to_string(),
    }
}

/// Sequential scan with every registered redactor.
fn scan_text(redactors: &[Arc<dyn PatternRedactor>], text: &str) -> Vec<Detection> {
    redactors.iter().flat_map(|r| r.detect(text)).collect()
}

/// Splits the text, scans the chunks in parallel on `pool`, rebases the
/// hits to whole-text offsets, and keeps each hit from the one chunk that
/// owns its start.
fn scan_chunked(
    pool: &rayon::ThreadPool,
    redactors: &[Arc<dyn PatternRedactor>],
    text: &str,
    chunk_size: usize,
    margin: usize,
) -> Vec<Detection> {
    let chunks = split_with_margin(text, chunk_size, margin);
    pool.install(|| {
        chunks
            .par_iter()
            .flat_map_iter(|chunk| {
                scan_text(redactors, chunk.text)
                    .into_iter()
                    .map(move |d| d.rebase(chunk.offset))
                    .filter(move |d| chunk.owns(d.start))
            })
            .collect()
    })
}

fn panic_detail(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "redactor panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redactors::builtin_redactors;
    use crate::testing::{ConcurrencyGauge, MockProvider, PanickingRedactor};
    use crate::types::PiiCategory;
    use std::time::Duration;

    fn local_only(options: RedactionOptions) -> Orchestrator {
        Orchestrator::new(builtin_redactors().unwrap(), vec![], options).unwrap()
    }

    #[tokio::test]
    async fn test_inline_scan_finds_builtin_categories() {
        let orchestrator = local_only(RedactionOptions::default());
        let (detections, warnings) = orchestrator
            .detect("mail a@b.com or call 555-123-4567")
            .await
            .unwrap();
        assert!(warnings.is_empty());
        assert!(detections
            .iter()
            .any(|d| d.category == PiiCategory::Email));
        assert!(detections
            .iter()
            .any(|d| d.category == PiiCategory::Phone));
    }

    #[tokio::test]
    async fn test_chunked_scan_resolves_to_same_plan_as_inline() {
        let mut text = String::new();
        for i in 0..40 {
            text.push_str("some filler words with nothing sensitive in them at all. ");
            if i % 7 == 0 {
                text.push_str(&format!("contact person{i}@example.com now. "));
            }
        }

        let inline = local_only(RedactionOptions::default().with_size_threshold(1_000_000));
        let chunked = local_only(
            RedactionOptions::default()
                .with_size_threshold(200)
                .with_worker_count(3),
        );

        let (inline_spans, _) = inline.detect(&text).await.unwrap();
        let (chunked_spans, _) = chunked.detect(&text).await.unwrap();

        // Execution strategy must not change what the caller sees
        let inline_plan = crate::pipeline::resolve(inline_spans);
        let chunked_plan = crate::pipeline::resolve(chunked_spans);
        assert_eq!(inline_plan, chunked_plan);
        assert_eq!(
            inline_plan
                .iter()
                .filter(|d| d.category == PiiCategory::Email)
                .count(),
            6
        );
    }

    #[tokio::test]
    async fn test_value_straddling_chunk_boundary_resolved_once() {
        // Place an email right across the 300-byte stride boundary
        let mut text = "x".repeat(295);
        text.push_str(" boundary.person@example.com ");
        text.push_str(&"y".repeat(300));

        let orchestrator = local_only(
            RedactionOptions::default()
                .with_size_threshold(300)
                .with_worker_count(2),
        );
        let (detections, _) = orchestrator.detect(&text).await.unwrap();

        let plan = crate::pipeline::resolve(detections);
        let emails: Vec<_> = plan
            .iter()
            .filter(|d| d.category == PiiCategory::Email)
            .collect();
        assert_eq!(emails.len(), 1);
        let d = emails[0];
        assert_eq!(&text[d.start..d.end], "boundary.person@example.com");
    }

    #[tokio::test]
    async fn test_digit_run_across_stride_cut_matches_inline_scan() {
        // A 20-digit run crossing the first stride cut at byte 600. A cut
        // mid-run must not look like a word boundary to the anchored
        // patterns, which would turn the run's tail into an account hit
        // that no sequential scan reports.
        let mut text = "x".repeat(594);
        text.push(' ');
        text.push_str("98765432109876543210");
        text.push(' ');
        text.push_str(&"x".repeat(1_184));
        assert_eq!(text.len(), 1_800);

        let inline = local_only(RedactionOptions::default().with_size_threshold(1_000_000));
        let chunked = local_only(
            RedactionOptions::default()
                .with_size_threshold(600)
                .with_worker_count(2),
        );
        let (inline_spans, _) = inline.detect(&text).await.unwrap();
        let (chunked_spans, _) = chunked.detect(&text).await.unwrap();

        let inline_plan = crate::pipeline::resolve(inline_spans);
        let chunked_plan = crate::pipeline::resolve(chunked_spans);
        assert_eq!(inline_plan, chunked_plan);
        assert_eq!(chunked_plan.len(), 1);
        assert_eq!(chunked_plan[0].category, PiiCategory::Phone);
        assert_eq!((chunked_plan[0].start, chunked_plan[0].end), (605, 615));
    }

    #[tokio::test]
    async fn test_redactor_panic_is_fatal() {
        let orchestrator = Orchestrator::new(
            vec![Arc::new(PanickingRedactor::new())],
            vec![],
            RedactionOptions::default(),
        )
        .unwrap();
        let err = orchestrator.detect("anything").await.unwrap_err();
        assert!(matches!(err, RedactionError::RedactorFault { .. }));
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_with_warning() {
        let mock = Arc::new(MockProvider::new("mock").fail_with_rate_limit());
        let orchestrator = Orchestrator::new(
            builtin_redactors().unwrap(),
            vec![mock],
            RedactionOptions::default().with_cloud_detection(true),
        )
        .unwrap();

        let (detections, warnings) = orchestrator.detect("mail a@b.com").await.unwrap();
        assert!(detections.iter().any(|d| d.category == PiiCategory::Email));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].provider, "mock");
        assert!(warnings[0].detail.contains("rate limited"));
    }

    #[tokio::test]
    async fn test_provider_timeout_degrades_and_keeps_local() {
        let mock = Arc::new(
            MockProvider::new("slow").with_delay(Duration::from_millis(250)),
        );
        let orchestrator = Orchestrator::new(
            builtin_redactors().unwrap(),
            vec![mock],
            RedactionOptions::default()
                .with_cloud_detection(true)
                .with_timeout(Duration::from_millis(20)),
        )
        .unwrap();

        let (detections, warnings) = orchestrator.detect("mail a@b.com").await.unwrap();
        assert!(detections.iter().any(|d| d.category == PiiCategory::Email));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].detail.contains("timed out"));
    }

    #[tokio::test]
    async fn test_queued_providers_share_one_deadline() {
        // Three slow providers behind a single permit: the deadline covers
        // the permit queue, so they cannot burn one timeout each in turn
        let providers: Vec<Arc<dyn DetectionProvider>> = (0..3)
            .map(|i| {
                Arc::new(
                    MockProvider::new(format!("slow-{i}")).with_delay(Duration::from_secs(2)),
                ) as Arc<dyn DetectionProvider>
            })
            .collect();
        let orchestrator = Orchestrator::new(
            builtin_redactors().unwrap(),
            providers,
            RedactionOptions::default()
                .with_cloud_detection(true)
                .with_provider_concurrency_limit(1)
                .with_timeout(Duration::from_millis(200)),
        )
        .unwrap();

        let started = Instant::now();
        let (detections, warnings) = orchestrator.detect("mail a@b.com").await.unwrap();
        let elapsed = started.elapsed();

        assert!(
            elapsed < Duration::from_millis(450),
            "remote phase took {elapsed:?}"
        );
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().all(|w| w.detail.contains("timed out")));
        assert!(detections.iter().any(|d| d.category == PiiCategory::Email));
    }

    #[tokio::test]
    async fn test_unknown_provider_name_fails_construction() {
        let err = Orchestrator::new(
            builtin_redactors().unwrap(),
            vec![],
            RedactionOptions::default()
                .with_cloud_detection(true)
                .with_providers(vec!["ghost".to_string()]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider { .. }));
    }

    #[tokio::test]
    async fn test_cloud_without_providers_fails_construction() {
        let err = Orchestrator::new(
            builtin_redactors().unwrap(),
            vec![],
            RedactionOptions::default().with_cloud_detection(true),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoProviders));
    }

    #[tokio::test]
    async fn test_concurrency_cap_respected_across_providers() {
        let gauge = ConcurrencyGauge::new();
        let slow = Duration::from_millis(40);
        let providers: Vec<Arc<dyn DetectionProvider>> = (0..4)
            .map(|i| {
                Arc::new(
                    MockProvider::new(format!("mock-{i}"))
                        .with_delay(slow)
                        .with_concurrency_gauge(gauge.clone()),
                ) as Arc<dyn DetectionProvider>
            })
            .collect();
        let orchestrator = Orchestrator::new(
            builtin_redactors().unwrap(),
            providers,
            RedactionOptions::default()
                .with_cloud_detection(true)
                .with_provider_concurrency_limit(2),
        )
        .unwrap();

        orchestrator.detect("no pii").await.unwrap();
        assert!(gauge.peak() >= 1);
        assert!(gauge.peak() <= 2, "peak {}", gauge.peak());
    }

    #[tokio::test]
    async fn test_shutdown_degrades_in_flight_providers() {
        let mock = Arc::new(
            MockProvider::new("slow").with_delay(Duration::from_secs(5)),
        );
        let orchestrator = Arc::new(
            Orchestrator::new(
                builtin_redactors().unwrap(),
                vec![mock],
                RedactionOptions::default().with_cloud_detection(true),
            )
            .unwrap(),
        );

        let task = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.detect("mail a@b.com").await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        orchestrator.shutdown();

        let (detections, warnings) = task.await.unwrap().unwrap();
        assert!(detections.iter().any(|d| d.category == PiiCategory::Email));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].detail.contains("cancelled"));
    }
}
