//! Capability probing.
//!
//! Runs the isolation probe while the configuration is being finalized and
//! downgrades the sandbox when strict isolation is unavailable. A missing
//! isolation primitive is never an error.

use tracing::{debug, warn};

use mosaic_core::traits::{IsolationProbe, IsolationSupport};

use super::config::ConfigurationStore;

/// What the probe did to the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Sandboxing is disabled, nothing was probed
    Skipped,
    /// Strict isolation is available
    Full,
    /// The sandbox was switched to loose mode
    Downgraded {
        reason: String,
        /// Whether the singular compatibility warning was emitted
        singular_warning: bool,
    },
}

/// Probe isolation support and downgrade the stored sandbox configuration if
/// needed.
pub fn apply_probe(store: &ConfigurationStore, probe: &dyn IsolationProbe) -> ProbeOutcome {
    if !store.snapshot().sandbox.is_enabled() {
        return ProbeOutcome::Skipped;
    }

    match probe.probe() {
        IsolationSupport::Full => {
            debug!("Strict isolation available");
            ProbeOutcome::Full
        }
        IsolationSupport::Degraded(reason) => {
            warn!(
                "Isolation primitive unavailable ({}), sandbox degrades to loose mode",
                reason
            );

            let config = store.update(|config| config.sandbox.downgrade_to_loose());

            let singular_warning = config.singular;
            if singular_warning {
                warn!("Running singular apps under loose isolation may cause unexpected behavior");
            }

            ProbeOutcome::Downgraded {
                reason,
                singular_warning,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::traits::StaticProbe;
    use mosaic_core::types::{SandboxConfig, SandboxOptions, StartOptions};

    #[test]
    fn test_full_support_keeps_config() {
        let store = ConfigurationStore::new();
        store.finalize(StartOptions::new());

        assert_eq!(apply_probe(&store, &StaticProbe::full()), ProbeOutcome::Full);
        assert!(!store.snapshot().sandbox.is_loose());
    }

    #[test]
    fn test_degraded_support_downgrades_sandbox() {
        let store = ConfigurationStore::new();
        store.finalize(StartOptions::new().sandbox(SandboxConfig::Enabled(SandboxOptions {
            experimental_style_isolation: true,
            ..Default::default()
        })));

        let outcome = apply_probe(&store, &StaticProbe::degraded("no proxy"));
        assert_eq!(
            outcome,
            ProbeOutcome::Downgraded {
                reason: "no proxy".to_string(),
                singular_warning: true,
            }
        );

        let sandbox = store.snapshot().sandbox;
        assert!(sandbox.is_loose());
        assert_eq!(
            sandbox,
            SandboxConfig::Enabled(SandboxOptions {
                loose: true,
                experimental_style_isolation: true,
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_non_singular_skips_compat_warning() {
        let store = ConfigurationStore::new();
        store.finalize(StartOptions::new().singular(false));

        let outcome = apply_probe(&store, &StaticProbe::degraded("no proxy"));
        assert!(matches!(
            outcome,
            ProbeOutcome::Downgraded {
                singular_warning: false,
                ..
            }
        ));
    }

    #[test]
    fn test_disabled_sandbox_is_not_probed() {
        let store = ConfigurationStore::new();
        store.finalize(StartOptions::new().sandbox(false));

        assert_eq!(
            apply_probe(&store, &StaticProbe::degraded("no proxy")),
            ProbeOutcome::Skipped
        );
        assert_eq!(store.snapshot().sandbox, SandboxConfig::Disabled);
    }
}
