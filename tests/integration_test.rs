//! Integration tests for Completion Foundation
//!
//! These tests drive the public API the way a completion client would.

use completion_foundation::prelude::*;
use completion_foundation::metrics::nearest_rank;
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use std::time::{Duration, Instant};

// =============================================================================
// Test Loaders
// =============================================================================

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A loader whose per-plugin result is fixed up front
#[derive(Debug, Default)]
struct FixedLoader {
    memory: Option<SetupError>,
    summary: Option<SetupError>,
    calls: AtomicUsize,
}

impl FixedLoader {
    fn failing_memory(err: SetupError) -> Self {
        Self {
            memory: Some(err),
            ..Self::default()
        }
    }

    fn failing_both() -> Self {
        Self {
            memory: Some(SetupError::from("memory backend refused connection")),
            summary: Some(SetupError::dependency_unavailable("summarizer", "not installed")),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginLoader for FixedLoader {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn setup(&self, plugin: PluginKind, _config: &FoundationConfig) -> SetupResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failure = match plugin {
            PluginKind::Memory => &self.memory,
            PluginKind::Summary => &self.summary,
        };
        match failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn connection() -> ProviderConnection {
    ProviderConnection::new()
        .with_endpoint("https://llm.internal/v1")
        .with_credential("sk-integration-secret")
        .with_deployment("chat-large")
}

fn both_plugins() -> FoundationConfig {
    FoundationConfig::new()
        .with_memory_plugin()
        .with_summary_plugin()
        .with_connection(connection())
}

// =============================================================================
// Fast Path
// =============================================================================

#[tokio::test]
async fn test_no_plugins_is_a_true_noop() {
    init_tracing();
    let loader = FixedLoader::default();

    let foundation = Foundation::initialize(FoundationConfig::new(), &loader)
        .await
        .unwrap();

    assert!(foundation.outcomes().is_empty());
    assert_eq!(foundation.totals(), Totals::default());
    assert_eq!(loader.calls(), 0);
    assert_eq!(foundation.check(false).status, HealthStatus::Ok);
}

#[tokio::test]
async fn test_fast_path_p90_under_50ms() {
    init_tracing();
    let loader = FixedLoader::default();
    let mut runs = Vec::with_capacity(100);

    for _ in 0..100 {
        let started = Instant::now();
        let foundation = Foundation::initialize(FoundationConfig::new(), &loader)
            .await
            .unwrap();
        runs.push(started.elapsed().as_secs_f64() * 1000.0);
        assert!(foundation.outcomes().is_empty());
    }

    runs.sort_by(f64::total_cmp);
    let p90 = nearest_rank(&runs, 0.9).unwrap();
    assert!(p90 < 50.0, "fast path p90 was {p90} ms");
}

// =============================================================================
// Soft Mode
// =============================================================================

#[tokio::test]
async fn test_soft_mode_partial_success() {
    init_tracing();
    let loader = FixedLoader::failing_memory(SetupError::dependency_unavailable(
        "vector-index",
        "shared library missing",
    ));

    let foundation = Foundation::initialize(both_plugins(), &loader).await.unwrap();

    let totals = foundation.totals();
    assert_eq!(totals.attempted_count, 2);
    assert_eq!(totals.active_count, 1);
    assert_eq!(totals.failure_count, 1);
    assert_eq!(totals.active_count + totals.failure_count, totals.attempted_count);

    let memory = foundation.outcomes().get(PluginKind::Memory).unwrap();
    let detail = memory.error_detail().unwrap();
    assert_eq!(memory.error_code(), detail.code.as_str());
    assert_eq!(detail.code, ErrorCode::DependencyUnavailable);
    assert_eq!(detail.severity, Severity::Error);
    assert!(foundation.is_active(PluginKind::Summary));
}

#[tokio::test]
async fn test_soft_mode_zero_active_plugins_still_usable() {
    init_tracing();
    let loader = FixedLoader::failing_both();

    let mut foundation = Foundation::initialize(both_plugins(), &loader).await.unwrap();
    assert!(foundation.active_plugins().is_empty());
    assert_eq!(loader.calls(), 2);

    let reply: Result<String, std::io::Error> = foundation
        .complete(|| async { Ok("still answering".to_string()) })
        .await;
    assert_eq!(reply.unwrap(), "still answering");

    let report = foundation.check(true);
    assert_eq!(report.status, HealthStatus::Degraded);
    assert_eq!(report.plugin_init_metrics.unwrap().totals.failure_count, 2);
}

#[tokio::test]
async fn test_missing_connection_is_a_warning() {
    init_tracing();
    let loader = FixedLoader::default();
    let config = FoundationConfig::new()
        .with_summary_plugin()
        .with_connection(ProviderConnection::new().with_credential("sk-integration-secret"));

    let foundation = Foundation::initialize(config, &loader).await.unwrap();

    let summary = foundation.outcomes().get(PluginKind::Summary).unwrap();
    let detail = summary.error_detail().unwrap();
    assert_eq!(summary.error_code(), "missing_configuration");
    assert_eq!(detail.legacy_code(), "missing_configuration");
    assert_eq!(detail.severity, Severity::Warning);
    assert_eq!(loader.calls(), 0);

    let rendered = serde_json::to_string(detail).unwrap();
    assert!(!rendered.contains("sk-integration-secret"));
    assert!(rendered.contains("\"have_credential\":true"));
    assert!(rendered.contains("\"have_endpoint\":false"));
}

// =============================================================================
// Strict Mode
// =============================================================================

#[tokio::test]
async fn test_strict_mode_stops_at_memory() {
    init_tracing();
    let loader = FixedLoader::failing_both();

    let err = Foundation::initialize(both_plugins().strict(), &loader)
        .await
        .unwrap_err();

    let FoundationError::StrictInitialization {
        plugin,
        error,
        outcomes,
    } = &err;
    assert_eq!(*plugin, PluginKind::Memory);
    assert_eq!(error.code, ErrorCode::InitializationException);
    assert_eq!(outcomes.plugins(), &[PluginKind::Memory]);
    assert_eq!(loader.calls(), 1);
    assert!(err.to_string().contains("memory"));
}

#[tokio::test]
async fn test_strict_mode_success_matches_soft_mode() {
    init_tracing();
    let loader = FixedLoader::default();

    let foundation = Foundation::initialize(both_plugins().strict(), &loader)
        .await
        .unwrap();

    assert_eq!(
        foundation.active_plugins(),
        vec![PluginKind::Memory, PluginKind::Summary]
    );
    assert_eq!(foundation.check(false).status, HealthStatus::Ok);
}

// =============================================================================
// Completion Calls and Health
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_latency_percentiles_from_completion_calls() {
    init_tracing();
    let loader = FixedLoader::default();
    let mut foundation = Foundation::initialize(FoundationConfig::new(), &loader)
        .await
        .unwrap();

    for ms in [10u64, 20, 30, 40, 50] {
        let _: Result<(), ()> = foundation
            .complete(|| async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(())
            })
            .await;
    }

    let snapshot = foundation.snapshot();
    assert_eq!(snapshot.count, 5);
    let p50 = snapshot.p50_ms.unwrap();
    let p90 = snapshot.p90_ms.unwrap();
    assert!((30.0..40.0).contains(&p50), "p50 was {p50}");
    assert!(p90 >= 50.0, "p90 was {p90}");
    assert_eq!(snapshot.p99_ms, snapshot.max_ms);
}

#[tokio::test]
async fn test_failed_call_is_recorded_and_propagated() {
    init_tracing();
    let loader = FixedLoader::default();
    let mut foundation = Foundation::initialize(FoundationConfig::new(), &loader)
        .await
        .unwrap();

    let result: Result<(), std::io::Error> = foundation
        .complete(|| async {
            Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "provider timed out",
            ))
        })
        .await;

    assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::TimedOut);
    assert_eq!(foundation.snapshot().count, 1);
}

#[tokio::test]
async fn test_health_report_payload_shape() {
    init_tracing();
    let loader = FixedLoader::failing_memory(SetupError::from("boom"));
    let mut foundation = Foundation::initialize(both_plugins(), &loader).await.unwrap();
    foundation.record_call(Duration::from_millis(12), true);

    let shallow = foundation.check(false).to_json();
    assert!(shallow.get("plugin_init_metrics").is_none());
    assert_eq!(shallow["status"], "degraded");
    assert_eq!(
        shallow["correlation_id"],
        foundation.correlation_id().to_string()
    );
    assert_eq!(shallow["performance"]["avg_ms"], 12.0);
    assert_eq!(shallow["performance"]["p90_ms"], 12.0);

    let deep = foundation.check(true).to_json();
    let metrics = &deep["plugin_init_metrics"];
    assert_eq!(metrics["memory"]["error"], "initialization_exception");
    assert_eq!(metrics["memory"]["attempted"], true);
    assert_eq!(metrics["summary"]["error"], "");
    assert_eq!(metrics["summary"]["active"], true);
    assert_eq!(metrics["totals"]["attempted_count"], 2);
}

#[tokio::test]
async fn test_deep_check_after_noop_init_has_metrics() {
    init_tracing();
    let loader = FixedLoader::default();
    let foundation = Foundation::initialize(FoundationConfig::new(), &loader)
        .await
        .unwrap();

    let report = foundation.check(true);
    let metrics = report.plugin_init_metrics.unwrap();
    assert!(metrics.plugins.is_empty());
    assert_eq!(metrics.totals, Totals::default());
}

// =============================================================================
// Event Stream
// =============================================================================

#[tokio::test]
async fn test_event_stream_end_to_end() {
    init_tracing();
    let loader = FixedLoader::failing_memory(SetupError::from("boom"));
    let (sender, stream) = create_stream::<FoundationEvent>();
    let id = CorrelationId::new();

    let mut foundation = Foundation::builder(both_plugins())
        .correlation_id(id)
        .events(sender)
        .initialize(&loader)
        .await
        .unwrap();

    let _: Result<(), ()> = foundation.complete(|| async { Err(()) }).await;
    drop(foundation);

    let events: Vec<FoundationEvent> = stream.collect().await;
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.correlation_id() == id));
    assert!(matches!(
        events[0],
        FoundationEvent::PluginInitialized {
            plugin: PluginKind::Memory,
            active: false,
            error_code: Some(ErrorCode::InitializationException),
            ..
        }
    ));
    assert!(matches!(
        events[2],
        FoundationEvent::CompletionRecorded { success: false, .. }
    ));
}

#[test]
fn test_config_from_host_loader_json() {
    let config: FoundationConfig = serde_json::from_value(serde_json::json!({
        "enable_memory_plugin": true,
        "strict_plugin_init": true,
        "connection": {
            "endpoint": "https://llm.internal/v1",
            "credential": "sk-integration-secret",
            "deployment": "chat-large"
        }
    }))
    .unwrap();

    assert!(config.enable_memory_plugin());
    assert!(config.strict_plugin_init());
    assert!(config.connection().is_complete());
    assert!(!format!("{config:?}").contains("sk-integration-secret"));
}
