//! Optional completion plugins and the loader seam that sets them up.
//!
//! The set of plugins is closed: [`PluginKind`] has one variant per
//! capability, evaluated in [`PluginKind::EVALUATION_ORDER`]. How a plugin is
//! actually brought up is left to the host through [`PluginLoader`].

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::FoundationConfig;
use crate::error::SetupResult;

/// An optional capability that augments completion calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// Memory / retrieval augmentation
    Memory,
    /// Conversation summarization
    Summary,
}

impl PluginKind {
    /// Order in which plugins are initialized. Strict mode aborts in this order.
    pub const EVALUATION_ORDER: [PluginKind; 2] = [PluginKind::Memory, PluginKind::Summary];

    /// Stable name used in logs and health reports.
    pub fn name(&self) -> &'static str {
        match self {
            PluginKind::Memory => "memory",
            PluginKind::Summary => "summary",
        }
    }

    /// Whether `config` asks for this plugin.
    pub fn is_enabled(&self, config: &FoundationConfig) -> bool {
        match self {
            PluginKind::Memory => config.enable_memory_plugin(),
            PluginKind::Summary => config.enable_summary_plugin(),
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sets up plugins on behalf of the orchestrator.
///
/// The orchestrator checks connection parameters before calling
/// [`setup`](PluginLoader::setup), so implementations only deal with the
/// plugin itself.
///
/// # Example
///
/// ```rust
/// use completion_foundation::{async_trait, FoundationConfig, PluginKind, PluginLoader, SetupResult};
///
/// #[derive(Debug)]
/// struct InProcessLoader;
///
/// #[async_trait]
/// impl PluginLoader for InProcessLoader {
///     async fn setup(&self, plugin: PluginKind, _config: &FoundationConfig) -> SetupResult<()> {
///         tracing::debug!(plugin = %plugin, "plugin ready");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait PluginLoader: Send + Sync + fmt::Debug {
    /// Returns the loader name, used in diagnostics.
    fn name(&self) -> &str {
        "default"
    }

    /// Whether this loader knows how to bring up `plugin`.
    ///
    /// Unsupported plugins fail with `dependency_unavailable` without calling
    /// [`setup`](PluginLoader::setup).
    fn supports(&self, _plugin: PluginKind) -> bool {
        true
    }

    /// Bring up `plugin` using the resolved configuration.
    async fn setup(&self, plugin: PluginKind, config: &FoundationConfig) -> SetupResult<()>;
}
