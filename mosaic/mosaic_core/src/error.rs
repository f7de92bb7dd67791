//! Error types for the Mosaic micro-app host.
//!
//! The root error type, `Error`, wraps the subsystem-specific errors. Every
//! payload is an owned string so that errors are `Clone`: one failed load is
//! reported to every caller waiting on the same in-flight cache entry.

use thiserror::Error;

use crate::types::AppStatus;

/// Root error type for the Mosaic system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Resource loading errors
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Lifecycle hook errors
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Lifecycle runner errors
    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    /// General runtime errors
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Errors raised while fetching an app's resources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The entry could not be fetched
    #[error("Failed to fetch entry {entry} for app {app}: {reason}")]
    FetchFailed {
        /// App name
        app: String,
        /// Entry that was requested
        entry: String,
        /// Underlying cause
        reason: String,
    },

    /// The fetched bundle did not export the expected lifecycles
    #[error("App {0} does not export lifecycle hooks")]
    MissingLifecycles(String),
}

/// Errors raised by lifecycle hooks or invalid lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// A hook rejected
    #[error("{phase} hook of {app} failed: {reason}")]
    HookFailed {
        /// App or parcel name
        app: String,
        /// Lifecycle phase the hook belongs to
        phase: String,
        /// Underlying cause
        reason: String,
    },

    /// The operation is not valid in the current state
    #[error("Cannot {operation} while in state {state:?}")]
    InvalidState {
        /// Requested operation
        operation: String,
        /// Status at the time of the request
        state: AppStatus,
    },

    /// The app does not provide an update hook
    #[error("App {0} does not support update")]
    UpdateUnsupported(String),
}

/// Errors in framework configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A value could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// A value is structurally valid but not acceptable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors reported by a lifecycle runner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    /// The runner went away before delivering a result
    #[error("Runner dropped before {0} completed")]
    Dropped(String),
}

impl Error {
    /// Shorthand for a failed hook.
    pub fn hook_failed(
        app: impl Into<String>,
        phase: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        LifecycleError::HookFailed {
            app: app.into(),
            phase: phase.into(),
            reason: reason.into(),
        }
        .into()
    }
}

/// Result type for Mosaic operations.
pub type Result<T> = std::result::Result<T, Error>;
