//! Per-plugin initialization outcomes.
//!
//! An [`OutcomeMap`] holds one [`PluginOutcome`] per plugin the orchestrator
//! looked at, in evaluation order. [`Totals`] are recomputed from the map on
//! every call and never cached.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::error::StructuredError;
use crate::plugin::PluginKind;

/// Result of initializing one plugin. Immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginOutcome {
    attempted: bool,
    active: bool,
    error: Option<StructuredError>,
    elapsed_ms: f64,
}

impl PluginOutcome {
    /// A plugin that was not enabled and therefore never attempted.
    pub fn skipped() -> Self {
        Self {
            attempted: false,
            active: false,
            error: None,
            elapsed_ms: 0.0,
        }
    }

    /// A plugin that came up successfully.
    pub fn active(elapsed: Duration) -> Self {
        Self {
            attempted: true,
            active: true,
            error: None,
            elapsed_ms: duration_ms(elapsed),
        }
    }

    /// A plugin whose setup failed.
    pub fn failed(error: StructuredError, elapsed: Duration) -> Self {
        Self {
            attempted: true,
            active: false,
            error: Some(error),
            elapsed_ms: duration_ms(elapsed),
        }
    }

    /// Check if setup was attempted.
    pub fn attempted(&self) -> bool {
        self.attempted
    }

    /// Check if the plugin came up.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns true if setup was attempted and did not succeed.
    pub fn is_failure(&self) -> bool {
        self.attempted && !self.active
    }

    /// Flat error code, or an empty string when there was no error.
    pub fn error_code(&self) -> &'static str {
        self.error.as_ref().map(|e| e.legacy_code()).unwrap_or("")
    }

    /// Get the structured error, if setup failed.
    pub fn error_detail(&self) -> Option<&StructuredError> {
        self.error.as_ref()
    }

    /// Get the setup duration in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }
}

pub(crate) fn duration_ms(elapsed: Duration) -> f64 {
    elapsed.as_nanos() as f64 / 1_000_000.0
}

/// Aggregates derived from an [`OutcomeMap`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub attempted_count: usize,
    pub active_count: usize,
    pub failure_count: usize,
    pub total_elapsed_ms: f64,
}

/// Outcomes keyed by plugin, iterated in recording order.
///
/// # Example
///
/// ```rust
/// use completion_foundation::{OutcomeMap, PluginKind, PluginOutcome};
/// use std::time::Duration;
///
/// let mut outcomes = OutcomeMap::new();
/// outcomes.record(PluginKind::Memory, PluginOutcome::active(Duration::from_millis(4)));
///
/// assert!(outcomes.get(PluginKind::Memory).unwrap().is_active());
/// assert_eq!(outcomes.totals().active_count, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeMap {
    outcomes: HashMap<PluginKind, PluginOutcome>,
    ordered: Vec<PluginKind>,
}

impl OutcomeMap {
    /// Create an empty map. Does not allocate.
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            ordered: Vec::new(),
        }
    }

    /// Record the outcome for `plugin`.
    ///
    /// Outcomes are written once per orchestration; recording a plugin twice
    /// keeps its original position and replaces the outcome.
    pub fn record(&mut self, plugin: PluginKind, outcome: PluginOutcome) {
        if !self.outcomes.contains_key(&plugin) {
            self.ordered.push(plugin);
        }
        self.outcomes.insert(plugin, outcome);
    }

    /// Get the outcome for a plugin.
    pub fn get(&self, plugin: PluginKind) -> Option<&PluginOutcome> {
        self.outcomes.get(&plugin)
    }

    /// Check if an outcome was recorded for a plugin.
    pub fn contains(&self, plugin: PluginKind) -> bool {
        self.outcomes.contains_key(&plugin)
    }

    /// Plugins in the order they were recorded.
    pub fn plugins(&self) -> &[PluginKind] {
        &self.ordered
    }

    /// Plugins that came up successfully.
    pub fn active_plugins(&self) -> Vec<PluginKind> {
        self.iter()
            .filter(|(_, outcome)| outcome.is_active())
            .map(|(plugin, _)| plugin)
            .collect()
    }

    /// Iterate over outcomes in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (PluginKind, &PluginOutcome)> {
        self.ordered
            .iter()
            .filter_map(move |plugin| self.outcomes.get(plugin).map(|o| (*plugin, o)))
    }

    /// Get the number of recorded outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Check if no outcome was recorded.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Sum the outcomes. Computed fresh on each call.
    pub fn totals(&self) -> Totals {
        self.iter().fold(Totals::default(), |mut totals, (_, outcome)| {
            if outcome.attempted() {
                totals.attempted_count += 1;
            }
            if outcome.is_active() {
                totals.active_count += 1;
            }
            if outcome.is_failure() {
                totals.failure_count += 1;
            }
            totals.total_elapsed_ms += outcome.elapsed_ms();
            totals
        })
    }
}
