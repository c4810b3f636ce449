//! Configuration record for a foundation instance.
//!
//! The record arrives fully resolved; loading it from files, the environment
//! or a CLI is the host's job. Fields are private so a record cannot change
//! once handed to a [`Foundation`](crate::Foundation).

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Connection parameters for the completion provider.
///
/// The credential is never printed: `Debug` shows only whether it is set.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConnection {
    endpoint: Option<String>,
    credential: Option<String>,
    deployment: Option<String>,
}

impl ProviderConnection {
    /// Field names as reported in `missing_configuration` errors.
    pub const ENDPOINT: &'static str = "endpoint";
    pub const CREDENTIAL: &'static str = "credential";
    pub const DEPLOYMENT: &'static str = "deployment";

    /// Create an empty connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the provider credential.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Set the model deployment id.
    pub fn with_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = Some(deployment.into());
        self
    }

    /// Get the endpoint, if set and not blank.
    pub fn endpoint(&self) -> Option<&str> {
        non_blank(&self.endpoint)
    }

    /// Get the credential, if set and not blank.
    pub fn credential(&self) -> Option<&str> {
        non_blank(&self.credential)
    }

    /// Get the model deployment id, if set and not blank.
    pub fn deployment(&self) -> Option<&str> {
        non_blank(&self.deployment)
    }

    /// Names of parameters that are absent or blank, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.endpoint().is_none() {
            missing.push(Self::ENDPOINT);
        }
        if self.credential().is_none() {
            missing.push(Self::CREDENTIAL);
        }
        if self.deployment().is_none() {
            missing.push(Self::DEPLOYMENT);
        }
        missing
    }

    /// Presence flags safe to include in diagnostics.
    pub fn presence(&self) -> Map<String, Value> {
        let mut flags = Map::new();
        flags.insert("have_endpoint".to_string(), self.endpoint().is_some().into());
        flags.insert("have_credential".to_string(), self.credential().is_some().into());
        flags.insert("have_deployment".to_string(), self.deployment().is_some().into());
        flags
    }

    /// Returns true if every parameter is present.
    pub fn is_complete(&self) -> bool {
        self.endpoint().is_some() && self.credential().is_some() && self.deployment().is_some()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl fmt::Debug for ProviderConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConnection")
            .field("endpoint", &self.endpoint)
            .field("have_credential", &self.credential().is_some())
            .field("deployment", &self.deployment)
            .finish()
    }
}

/// Toggles and connection parameters for one foundation instance.
///
/// # Example
///
/// ```rust
/// use completion_foundation::{FoundationConfig, ProviderConnection};
///
/// let config = FoundationConfig::new()
///     .with_memory_plugin()
///     .strict()
///     .with_connection(
///         ProviderConnection::new()
///             .with_endpoint("https://llm.internal")
///             .with_credential("secret")
///             .with_deployment("gpt-large"),
///     );
///
/// assert!(config.enable_memory_plugin());
/// assert!(!config.enable_summary_plugin());
/// assert!(config.strict_plugin_init());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FoundationConfig {
    enable_memory_plugin: bool,
    enable_summary_plugin: bool,
    strict_plugin_init: bool,
    log_performance_metrics: bool,
    connection: ProviderConnection,
}

impl FoundationConfig {
    /// Create a configuration with every toggle off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the memory / retrieval plugin.
    pub fn with_memory_plugin(mut self) -> Self {
        self.enable_memory_plugin = true;
        self
    }

    /// Enable the conversation-summary plugin.
    pub fn with_summary_plugin(mut self) -> Self {
        self.enable_summary_plugin = true;
        self
    }

    /// Abort initialization on the first plugin failure.
    pub fn strict(mut self) -> Self {
        self.strict_plugin_init = true;
        self
    }

    /// Log per-call latency and periodic percentile summaries.
    pub fn log_performance(mut self) -> Self {
        self.log_performance_metrics = true;
        self
    }

    /// Set the provider connection parameters.
    pub fn with_connection(mut self, connection: ProviderConnection) -> Self {
        self.connection = connection;
        self
    }

    /// Check if the memory plugin is enabled.
    pub fn enable_memory_plugin(&self) -> bool {
        self.enable_memory_plugin
    }

    /// Check if the summary plugin is enabled.
    pub fn enable_summary_plugin(&self) -> bool {
        self.enable_summary_plugin
    }

    /// Check if strict plugin initialization is on.
    pub fn strict_plugin_init(&self) -> bool {
        self.strict_plugin_init
    }

    /// Check if performance logging is on.
    pub fn log_performance_metrics(&self) -> bool {
        self.log_performance_metrics
    }

    /// Get the provider connection parameters.
    pub fn connection(&self) -> &ProviderConnection {
        &self.connection
    }

    /// Returns true if at least one plugin toggle is on.
    pub fn any_plugin_enabled(&self) -> bool {
        self.enable_memory_plugin || self.enable_summary_plugin
    }
}
