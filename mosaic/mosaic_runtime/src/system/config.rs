//! Configuration store.
//!
//! Holds the single live [`FrameworkConfig`]. `start` is the only writer: it
//! replaces the configuration with the caller's options merged over the
//! defaults, and the capability probe may afterwards downgrade the sandbox.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tokio::fs;
use tracing::{debug, info, warn};

use mosaic_core::error::ConfigError;
use mosaic_core::types::{FrameworkConfig, StartOptions};
use mosaic_core::Error;

/// Process-wide framework configuration.
pub struct ConfigurationStore {
    config: RwLock<FrameworkConfig>,
    finalized: AtomicBool,
}

impl ConfigurationStore {
    /// Create a store holding the defaults
    pub fn new() -> Self {
        Self {
            config: RwLock::new(FrameworkConfig::default()),
            finalized: AtomicBool::new(false),
        }
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> FrameworkConfig {
        self.config.read().clone()
    }

    /// Whether `finalize` has run at least once.
    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }

    /// Replace the configuration with `options` merged over the defaults.
    pub fn finalize(&self, options: StartOptions) -> FrameworkConfig {
        let config = FrameworkConfig::from_options(options);

        if self.finalized.swap(true, Ordering::AcqRel) {
            warn!("Framework configuration finalized again; apps loaded from now on see the new values");
        }

        debug!("Finalized framework configuration: {:?}", config);
        *self.config.write() = config.clone();
        config
    }

    /// Apply an in-place adjustment, returning the adjusted configuration.
    pub fn update<F>(&self, f: F) -> FrameworkConfig
    where
        F: FnOnce(&mut FrameworkConfig),
    {
        let mut config = self.config.write();
        f(&mut config);
        config.clone()
    }

    /// Load start options from a JSON file.
    ///
    /// A missing path or file yields default options.
    pub async fn load_options(path: Option<&str>) -> Result<StartOptions> {
        let Some(path) = path else {
            info!("No configuration file specified, using defaults");
            return Ok(StartOptions::default());
        };

        info!("Loading configuration from {}", path);

        if !Path::new(path).exists() {
            warn!("Configuration file not found: {}", path);
            return Ok(StartOptions::default());
        }

        let content = fs::read_to_string(path)
            .await
            .context(format!("Failed to read configuration file: {}", path))?;

        let options: StartOptions = serde_json::from_str(&content)
            .map_err(|e| Error::from(ConfigError::ParseFailed(e.to_string())))
            .context(format!("Failed to parse configuration file: {}", path))?;

        options.validate()?;

        Ok(options)
    }
}

impl Default for ConfigurationStore {
    fn default() -> Self {
        Self::new()
    }
}
