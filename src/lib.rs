//! # Completion Foundation
//!
//! **Completion Foundation** is the layer beneath an AI completion client that
//! brings up optional capability plugins, records how each attempt went, times
//! completion calls and reports readiness.
//!
//! ## Overview
//!
//! - **Plugin orchestration**: the memory and conversation-summary plugins are
//!   initialized in a fixed order, each timed and classified on failure
//! - **Soft or strict**: failures degrade gracefully by default, or abort on
//!   the first one for validation pipelines
//! - **Zero-cost when idle**: with no plugin enabled, initialization does no
//!   per-plugin work
//! - **Latency telemetry**: nearest-rank p50/p90/p99 over every completion call
//! - **Health surface**: a cheap, serializable readiness report
//!
//! ## Components
//!
//! ```text
//! Foundation      - Owner-facing instance: complete(), check(), snapshot()
//! Orchestrator    - Plugin initialization in evaluation order
//! StructuredError - Closed failure taxonomy with sanitized detail
//! LatencyRecorder - Append-only samples, nearest-rank percentiles
//! HealthReport    - Read-only readiness view
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use completion_foundation::prelude::*;
//!
//! let config = FoundationConfig::new()
//!     .with_memory_plugin()
//!     .with_connection(connection);
//!
//! let mut foundation = Foundation::initialize(config, &loader).await?;
//!
//! let reply = foundation.complete(|| client.chat(request)).await?;
//!
//! let report = foundation.check(true);
//! println!("{}", report.to_json());
//! ```
//!
//! The crate emits `tracing` events tagged with the instance's correlation id
//! but never installs a subscriber.

mod config;
mod correlation;
mod error;
mod foundation;
mod health;
pub mod metrics;
mod orchestrator;
mod plugin;
mod registry;
pub mod stream;

pub mod prelude;

// Re-export core types
pub use config::{FoundationConfig, ProviderConnection};
pub use correlation::CorrelationId;
pub use error::{
    ErrorCode, FoundationError, FoundationResult, SetupError, SetupResult, Severity,
    StructuredError,
};
pub use foundation::{Foundation, FoundationBuilder, SUMMARY_INTERVAL};
pub use health::{HealthReport, HealthStatus, PerformanceSummary, PluginInitMetrics, PluginMetrics};
pub use metrics::{LatencyRecorder, PercentileSnapshot};
pub use orchestrator::Orchestrator;
pub use plugin::{PluginKind, PluginLoader};
pub use registry::{OutcomeMap, PluginOutcome, Totals};
pub use stream::{create_stream, EventSender, EventStream, FoundationEvent, StreamBuilder};

// Re-export async-trait for loader implementations
pub use async_trait::async_trait;
