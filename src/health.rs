//! Read-only health reporting.
//!
//! A [`HealthReport`] is assembled from borrowed foundation state and never
//! changes it. Plugin failures degrade the status but never make the check
//! itself fail.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::correlation::CorrelationId;
use crate::metrics::PercentileSnapshot;
use crate::registry::{OutcomeMap, Totals};

/// Overall readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Every attempted plugin came up
    Ok,
    /// At least one attempted plugin failed; completions still work
    Degraded,
}

impl HealthStatus {
    /// Check if the status is `ok`.
    pub fn is_ok(&self) -> bool {
        matches!(self, HealthStatus::Ok)
    }
}

/// Latency headline figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub avg_ms: Option<f64>,
    pub p90_ms: Option<f64>,
}

impl From<&PercentileSnapshot> for PerformanceSummary {
    fn from(snapshot: &PercentileSnapshot) -> Self {
        Self {
            avg_ms: snapshot.avg_ms,
            p90_ms: snapshot.p90_ms,
        }
    }
}

/// Health view of one plugin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginMetrics {
    pub attempted: bool,
    pub active: bool,
    /// Flat error code, empty when the plugin did not fail
    pub error: &'static str,
    pub elapsed_ms: f64,
}

/// Per-plugin initialization metrics plus their totals.
///
/// Plugins serialize as sibling keys of `totals`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginInitMetrics {
    #[serde(flatten)]
    pub plugins: BTreeMap<&'static str, PluginMetrics>,
    pub totals: Totals,
}

impl From<&OutcomeMap> for PluginInitMetrics {
    fn from(outcomes: &OutcomeMap) -> Self {
        let plugins = outcomes
            .iter()
            .map(|(plugin, outcome)| {
                (
                    plugin.name(),
                    PluginMetrics {
                        attempted: outcome.attempted(),
                        active: outcome.is_active(),
                        error: outcome.error_code(),
                        elapsed_ms: outcome.elapsed_ms(),
                    },
                )
            })
            .collect();

        Self {
            plugins,
            totals: outcomes.totals(),
        }
    }
}

/// Serializable readiness report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub correlation_id: CorrelationId,
    pub performance: PerformanceSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_init_metrics: Option<PluginInitMetrics>,
}

impl HealthReport {
    /// Build a report from the current outcomes and latency snapshot.
    ///
    /// `include_plugin_metrics` controls whether the per-plugin section is
    /// attached; routine polling should leave it off.
    pub fn from_state(
        correlation_id: CorrelationId,
        outcomes: &OutcomeMap,
        snapshot: &PercentileSnapshot,
        include_plugin_metrics: bool,
    ) -> Self {
        let status = if outcomes.totals().failure_count == 0 {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        };

        Self {
            status,
            correlation_id,
            performance: PerformanceSummary::from(snapshot),
            plugin_init_metrics: include_plugin_metrics.then(|| PluginInitMetrics::from(outcomes)),
        }
    }

    /// Render the report as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        // Every field is a plain value or string-keyed map; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
