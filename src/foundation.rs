//! The foundation instance: initialized plugins, timed completion calls and
//! health reporting for one logical session.
//!
//! A [`Foundation`] only exists once initialization has succeeded. In strict
//! mode a plugin failure returns an error instead, so there is never a
//! half-initialized instance to guard against.
//!
//! The instance has a single owner. Recording goes through `&mut self`;
//! hosts that share one across tasks wrap it in a mutex themselves.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::FoundationConfig;
use crate::correlation::CorrelationId;
use crate::error::FoundationResult;
use crate::health::HealthReport;
use crate::metrics::{LatencyRecorder, PercentileSnapshot};
use crate::orchestrator::Orchestrator;
use crate::plugin::{PluginKind, PluginLoader};
use crate::registry::{duration_ms, OutcomeMap, Totals};
use crate::stream::{EventSender, FoundationEvent};

/// With performance logging on, a percentile summary is logged after every
/// this many recorded calls.
pub const SUMMARY_INTERVAL: usize = 100;

/// Builder for [`Foundation`] instances.
///
/// # Example
///
/// ```rust
/// use completion_foundation::prelude::*;
///
/// #[derive(Debug)]
/// struct NoPlugins;
///
/// #[async_trait]
/// impl PluginLoader for NoPlugins {
///     async fn setup(&self, _plugin: PluginKind, _config: &FoundationConfig) -> SetupResult<()> {
///         Ok(())
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), FoundationError> {
/// let foundation = FoundationBuilder::new(FoundationConfig::new())
///     .initialize(&NoPlugins)
///     .await?;
///
/// assert!(foundation.outcomes().is_empty());
/// assert!(foundation.check(false).status.is_ok());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FoundationBuilder {
    config: FoundationConfig,
    correlation_id: Option<CorrelationId>,
    events: Option<EventSender<FoundationEvent>>,
}

impl FoundationBuilder {
    /// Create a builder for `config`.
    pub fn new(config: FoundationConfig) -> Self {
        Self {
            config,
            correlation_id: None,
            events: None,
        }
    }

    /// Use a host-issued correlation id instead of generating one.
    pub fn correlation_id(mut self, id: CorrelationId) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Publish diagnostic events to `sender`.
    pub fn events(mut self, sender: EventSender<FoundationEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Run plugin initialization and produce the instance.
    pub async fn initialize(self, loader: &dyn PluginLoader) -> FoundationResult<Foundation> {
        let correlation_id = self.correlation_id.unwrap_or_default();
        let outcomes = Orchestrator::new(&self.config, loader, correlation_id)
            .with_events(self.events.as_ref())
            .run()
            .await?;

        Ok(Foundation {
            config: self.config,
            correlation_id,
            outcomes,
            latencies: LatencyRecorder::new(),
            events: self.events,
        })
    }
}

/// One initialized foundation instance.
#[derive(Debug)]
pub struct Foundation {
    config: FoundationConfig,
    correlation_id: CorrelationId,
    outcomes: OutcomeMap,
    latencies: LatencyRecorder,
    events: Option<EventSender<FoundationEvent>>,
}

impl Foundation {
    /// Create a builder for `config`.
    pub fn builder(config: FoundationConfig) -> FoundationBuilder {
        FoundationBuilder::new(config)
    }

    /// Initialize with a generated correlation id and no event stream.
    pub async fn initialize(
        config: FoundationConfig,
        loader: &dyn PluginLoader,
    ) -> FoundationResult<Self> {
        FoundationBuilder::new(config).initialize(loader).await
    }

    /// Get the configuration this instance was built from.
    pub fn config(&self) -> &FoundationConfig {
        &self.config
    }

    /// Get the correlation id attached to every diagnostic.
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Get the plugin initialization outcomes.
    pub fn outcomes(&self) -> &OutcomeMap {
        &self.outcomes
    }

    /// Get totals derived from the outcomes.
    pub fn totals(&self) -> Totals {
        self.outcomes.totals()
    }

    /// Check if a plugin came up during initialization.
    pub fn is_active(&self, plugin: PluginKind) -> bool {
        self.outcomes
            .get(plugin)
            .map(|outcome| outcome.is_active())
            .unwrap_or(false)
    }

    /// Get the plugins that came up, in evaluation order.
    pub fn active_plugins(&self) -> Vec<PluginKind> {
        self.outcomes.active_plugins()
    }

    /// Run one provider request and record how long it took.
    ///
    /// The duration is recorded whether the call succeeds or fails; the
    /// call's own result is returned unchanged. A call that is dropped before
    /// completing records nothing.
    pub async fn complete<F, Fut, T, E>(&mut self, call: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let started = Instant::now();
        let result = call().await;
        self.record_call(started.elapsed(), result.is_ok());
        result
    }

    /// Record a call timed by the host.
    pub fn record_call(&mut self, elapsed: Duration, success: bool) {
        let elapsed_ms = duration_ms(elapsed);
        if !self.latencies.record(elapsed_ms) {
            debug!(
                correlation_id = %self.correlation_id,
                elapsed_ms,
                "dropping non-finite latency sample"
            );
            return;
        }

        if self.config.log_performance_metrics() {
            debug!(
                correlation_id = %self.correlation_id,
                elapsed_ms,
                success,
                "completion call finished"
            );
        }
        self.emit(FoundationEvent::CompletionRecorded {
            correlation_id: self.correlation_id,
            elapsed_ms,
            success,
        });

        if self.config.log_performance_metrics() && self.latencies.len() % SUMMARY_INTERVAL == 0 {
            self.log_performance_summary();
        }
    }

    /// Latency statistics over every recorded call.
    pub fn snapshot(&self) -> PercentileSnapshot {
        self.latencies.snapshot()
    }

    /// Readiness report. Never fails and never changes state.
    pub fn check(&self, include_plugin_metrics: bool) -> HealthReport {
        HealthReport::from_state(
            self.correlation_id,
            &self.outcomes,
            &self.latencies.snapshot(),
            include_plugin_metrics,
        )
    }

    /// Log and publish a percentile summary now.
    pub fn log_performance_summary(&self) -> PercentileSnapshot {
        let snapshot = self.latencies.snapshot();
        info!(
            correlation_id = %self.correlation_id,
            count = snapshot.count,
            min_ms = ?snapshot.min_ms,
            max_ms = ?snapshot.max_ms,
            avg_ms = ?snapshot.avg_ms,
            p50_ms = ?snapshot.p50_ms,
            p90_ms = ?snapshot.p90_ms,
            p99_ms = ?snapshot.p99_ms,
            "completion latency summary"
        );
        self.emit(FoundationEvent::PerformanceSummary {
            correlation_id: self.correlation_id,
            snapshot,
        });
        snapshot
    }

    fn emit(&self, event: FoundationEvent) {
        if let Some(events) = self.events.as_ref().filter(|events| !events.is_closed()) {
            if events.try_send(event).is_err() {
                debug!(correlation_id = %self.correlation_id, "event channel full or closed");
            }
        }
    }
}
