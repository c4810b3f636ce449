//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use completion_foundation::prelude::*;
//! ```

// Configuration
pub use crate::config::{FoundationConfig, ProviderConnection};

// Instance
pub use crate::correlation::CorrelationId;
pub use crate::foundation::{Foundation, FoundationBuilder};

// Plugins
pub use crate::plugin::{PluginKind, PluginLoader};
pub use crate::registry::{OutcomeMap, PluginOutcome, Totals};

// Telemetry
pub use crate::health::{HealthReport, HealthStatus};
pub use crate::metrics::PercentileSnapshot;
pub use crate::stream::{create_stream, EventSender, EventStream, FoundationEvent, StreamBuilder};

// Errors
pub use crate::error::{
    ErrorCode, FoundationError, FoundationResult, SetupError, SetupResult, Severity,
    StructuredError,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
