//! Error types for the completion foundation.
//!
//! Plugin failures are classified into a closed taxonomy of [`ErrorCode`]s and
//! captured as [`StructuredError`] values. Raw loader failures arrive as
//! [`SetupError`]; the only error that ever leaves initialization is
//! [`FoundationError`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::plugin::PluginKind;
use crate::registry::OutcomeMap;

/// Detail keys containing any of these as a whole word (split on `_`, `-` or `.`)
/// are treated as secrets.
const SECRET_MARKERS: &[&str] = &["credential", "key", "token", "secret", "password"];

/// Closed taxonomy of plugin failure codes.
///
/// New codes may be added; existing codes are never renamed or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// A required connection parameter is absent or empty.
    MissingConfiguration,
    /// Setup failed for a reason other than a missing dependency.
    InitializationException,
    /// A plugin's external dependency could not be located or loaded.
    DependencyUnavailable,
    /// Reserved. Setup timeouts are not enforced, so this is never produced.
    Timeout,
    /// Reserved catch-all for states that cannot be reached.
    UnexpectedException,
}

impl ErrorCode {
    /// The flat string form used by the legacy `error` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingConfiguration => "missing_configuration",
            ErrorCode::InitializationException => "initialization_exception",
            ErrorCode::DependencyUnavailable => "dependency_unavailable",
            ErrorCode::Timeout => "timeout",
            ErrorCode::UnexpectedException => "unexpected_exception",
        }
    }

    /// Severity assigned when the builder is not told otherwise.
    pub fn default_severity(&self) -> Severity {
        match self {
            ErrorCode::MissingConfiguration => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a structured error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A classified plugin failure with sanitized diagnostics.
///
/// # Example
///
/// ```rust
/// use completion_foundation::{ErrorCode, Severity, StructuredError};
///
/// let err = StructuredError::build(ErrorCode::MissingConfiguration, "endpoint not set");
/// assert_eq!(err.code, ErrorCode::MissingConfiguration);
/// assert_eq!(err.severity, Severity::Warning);
/// assert_eq!(err.legacy_code(), "missing_configuration");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct StructuredError {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_message: Option<String>,
    #[serde(default)]
    pub detail: Map<String, Value>,
}

impl StructuredError {
    /// Build an error with the code's default severity and empty detail.
    pub fn build(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            message: message.into(),
            exception_type: None,
            exception_message: None,
            detail: Map::new(),
        }
    }

    /// Attach the type and message of the underlying failure.
    pub fn with_exception(
        mut self,
        exception_type: impl Into<String>,
        exception_message: impl Into<String>,
    ) -> Self {
        self.exception_type = Some(exception_type.into());
        self.exception_message = Some(exception_message.into());
        self
    }

    /// Merge diagnostic detail, replacing secret-looking entries with presence flags.
    pub fn with_detail(mut self, detail: Map<String, Value>) -> Self {
        for (key, value) in detail {
            if is_secret_key(&key) {
                let flag = if key.starts_with("have_") {
                    key
                } else {
                    format!("have_{key}")
                };
                self.detail.insert(flag, Value::Bool(is_present(&value)));
            } else {
                self.detail.insert(key, value);
            }
        }
        self
    }

    /// Override the default severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// The flat code string kept for older consumers.
    pub fn legacy_code(&self) -> &'static str {
        self.code.as_str()
    }

    /// Classify a raw loader failure for `plugin`.
    pub fn from_setup_error(plugin: PluginKind, err: &SetupError) -> Self {
        let mut detail = Map::new();
        detail.insert("plugin".to_string(), Value::from(plugin.name()));

        match err {
            SetupError::MissingConfiguration { field } => {
                detail.insert("missing".to_string(), Value::from(*field));
                Self::build(
                    ErrorCode::MissingConfiguration,
                    format!("{} plugin requires `{field}`", plugin.name()),
                )
                .with_detail(detail)
            }
            SetupError::DependencyUnavailable { dependency, reason } => {
                detail.insert("dependency".to_string(), Value::from(dependency.as_str()));
                Self::build(
                    ErrorCode::DependencyUnavailable,
                    format!("{} plugin dependency `{dependency}` unavailable", plugin.name()),
                )
                .with_exception("DependencyUnavailable", reason.as_str())
                .with_detail(detail)
            }
            SetupError::Failed {
                type_name,
                message,
            } => Self::build(
                ErrorCode::InitializationException,
                format!("{} plugin setup failed", plugin.name()),
            )
            .with_exception(type_name.as_str(), message.as_str())
            .with_detail(detail),
        }
    }
}

fn is_secret_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    lower
        .split(|c: char| c == '_' || c == '-' || c == '.')
        .any(|word| SECRET_MARKERS.contains(&word))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Bool(b) => *b,
        _ => true,
    }
}

/// Raw failures reported by a [`PluginLoader`](crate::PluginLoader).
#[derive(Error, Debug, Clone)]
pub enum SetupError {
    /// A connection parameter the plugin needs is not configured
    #[error("missing configuration: {field}")]
    MissingConfiguration { field: &'static str },

    /// An external module the plugin depends on could not be loaded
    #[error("dependency `{dependency}` unavailable: {reason}")]
    DependencyUnavailable { dependency: String, reason: String },

    /// Any other setup failure
    #[error("{type_name}: {message}")]
    Failed { type_name: String, message: String },
}

impl SetupError {
    /// Wrap an arbitrary error, keeping its type name for diagnostics.
    pub fn failed<E: std::error::Error>(err: E) -> Self {
        SetupError::Failed {
            type_name: short_type_name::<E>().to_string(),
            message: err.to_string(),
        }
    }

    /// Report a dependency that could not be loaded.
    pub fn dependency_unavailable(dependency: impl Into<String>, reason: impl Into<String>) -> Self {
        SetupError::DependencyUnavailable {
            dependency: dependency.into(),
            reason: reason.into(),
        }
    }
}

impl From<String> for SetupError {
    fn from(message: String) -> Self {
        SetupError::Failed {
            type_name: "SetupError".to_string(),
            message,
        }
    }
}

impl From<&str> for SetupError {
    fn from(message: &str) -> Self {
        SetupError::from(message.to_string())
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    // Keep generics intact; only strip the leading module path.
    let base = full.split('<').next().unwrap_or(full);
    let start = base.rfind("::").map(|i| i + 2).unwrap_or(0);
    &full[start..]
}

/// Errors surfaced by foundation initialization.
#[derive(Error, Debug, Clone)]
pub enum FoundationError {
    /// Strict mode aborted on the first plugin failure
    #[error("strict plugin initialization failed for {plugin}: {error}")]
    StrictInitialization {
        plugin: PluginKind,
        error: StructuredError,
        /// Outcomes recorded up to and including the failing plugin
        outcomes: OutcomeMap,
    },
}

impl FoundationError {
    /// The structured error that caused the failure.
    pub fn structured(&self) -> &StructuredError {
        match self {
            FoundationError::StrictInitialization { error, .. } => error,
        }
    }

    /// Outcomes gathered before the abort.
    pub fn outcomes(&self) -> &OutcomeMap {
        match self {
            FoundationError::StrictInitialization { outcomes, .. } => outcomes,
        }
    }
}

/// Result type alias for plugin setup.
pub type SetupResult<T> = Result<T, SetupError>;

/// Result type alias for foundation operations.
pub type FoundationResult<T> = Result<T, FoundationError>;
