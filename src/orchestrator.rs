//! Plugin initialization orchestrator.
//!
//! Walks [`PluginKind::EVALUATION_ORDER`], times each enabled plugin's setup
//! and records a [`PluginOutcome`] for it. In soft mode failures are recorded
//! and the walk continues; in strict mode the first failure ends it.

use tokio::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

use crate::config::FoundationConfig;
use crate::correlation::CorrelationId;
use crate::error::{FoundationError, FoundationResult, SetupError, StructuredError};
use crate::plugin::{PluginKind, PluginLoader};
use crate::registry::{OutcomeMap, PluginOutcome};
use crate::stream::{EventSender, FoundationEvent};

/// Runs plugin initialization for one foundation instance.
#[derive(Debug)]
pub struct Orchestrator<'a> {
    config: &'a FoundationConfig,
    loader: &'a dyn PluginLoader,
    correlation_id: CorrelationId,
    events: Option<&'a EventSender<FoundationEvent>>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a FoundationConfig,
        loader: &'a dyn PluginLoader,
        correlation_id: CorrelationId,
    ) -> Self {
        Self {
            config,
            loader,
            correlation_id,
            events: None,
        }
    }

    /// Publish one event per attempted plugin to `events`.
    pub fn with_events(mut self, events: Option<&'a EventSender<FoundationEvent>>) -> Self {
        self.events = events;
        self
    }

    /// Initialize every enabled plugin.
    ///
    /// With no plugin enabled this returns an empty map without touching the
    /// loader or allocating.
    pub async fn run(&self) -> FoundationResult<OutcomeMap> {
        if !self.config.any_plugin_enabled() {
            return Ok(OutcomeMap::new());
        }

        let span = info_span!("plugin_init", correlation_id = %self.correlation_id);
        self.run_plugins().instrument(span).await
    }

    async fn run_plugins(&self) -> FoundationResult<OutcomeMap> {
        let strict = self.config.strict_plugin_init();
        let mut outcomes = OutcomeMap::new();

        for plugin in PluginKind::EVALUATION_ORDER {
            if !plugin.is_enabled(self.config) {
                outcomes.record(plugin, PluginOutcome::skipped());
                continue;
            }

            let started = Instant::now();
            let result = self.setup(plugin).await;
            let elapsed = started.elapsed();

            let outcome = match result {
                Ok(()) => PluginOutcome::active(elapsed),
                Err(err) => PluginOutcome::failed(self.classify(plugin, &err), elapsed),
            };
            self.report(plugin, &outcome, strict);

            let failure = outcome.error_detail().cloned();
            outcomes.record(plugin, outcome);

            if let (true, Some(error)) = (strict, failure) {
                return Err(FoundationError::StrictInitialization {
                    plugin,
                    error,
                    outcomes,
                });
            }
        }

        let totals = outcomes.totals();
        info!(
            correlation_id = %self.correlation_id,
            attempted = totals.attempted_count,
            active = totals.active_count,
            failed = totals.failure_count,
            total_elapsed_ms = totals.total_elapsed_ms,
            "plugin initialization complete"
        );
        Ok(outcomes)
    }

    async fn setup(&self, plugin: PluginKind) -> Result<(), SetupError> {
        if let Some(&field) = self.config.connection().missing_fields().first() {
            return Err(SetupError::MissingConfiguration { field });
        }
        if !self.loader.supports(plugin) {
            return Err(SetupError::dependency_unavailable(
                plugin.name(),
                format!("loader `{}` does not provide this plugin", self.loader.name()),
            ));
        }
        self.loader.setup(plugin, self.config).await
    }

    fn classify(&self, plugin: PluginKind, err: &SetupError) -> StructuredError {
        let error = StructuredError::from_setup_error(plugin, err);
        match err {
            SetupError::MissingConfiguration { .. } => {
                error.with_detail(self.config.connection().presence())
            }
            _ => error,
        }
    }

    fn report(&self, plugin: PluginKind, outcome: &PluginOutcome, strict: bool) {
        let elapsed_ms = outcome.elapsed_ms();
        match outcome.error_detail() {
            None => info!(
                correlation_id = %self.correlation_id,
                plugin = %plugin,
                outcome = "active",
                elapsed_ms,
                "plugin initialized"
            ),
            Some(err) if strict => error!(
                correlation_id = %self.correlation_id,
                plugin = %plugin,
                outcome = "failed",
                elapsed_ms,
                error_code = err.legacy_code(),
                error = %err,
                "plugin initialization failed, aborting in strict mode"
            ),
            Some(err) => warn!(
                correlation_id = %self.correlation_id,
                plugin = %plugin,
                outcome = "failed",
                elapsed_ms,
                error_code = err.legacy_code(),
                error = %err,
                "plugin initialization failed, continuing without it"
            ),
        }

        if let Some(events) = self.events.filter(|events| !events.is_closed()) {
            let event = FoundationEvent::PluginInitialized {
                correlation_id: self.correlation_id,
                plugin,
                active: outcome.is_active(),
                error_code: outcome.error_detail().map(|e| e.code),
                elapsed_ms,
            };
            if events.try_send(event).is_err() {
                tracing::debug!(correlation_id = %self.correlation_id, "event channel full or closed");
            }
        }
    }
}
