//! Mosaic Runtime - lifecycle orchestration for Mosaic micro-apps
//!
//! This crate provides [`MicroAppHost`], the orchestrator that registers apps
//! with a lifecycle runner, gates their bootstrap until the host is started,
//! memoizes imperative loads per app instance and wires the one-shot runner
//! effects. It also ships [`router::Router`], an in-process lifecycle runner.

pub mod app;
pub mod effects;
pub mod router;
pub mod system;

#[cfg(test)]
mod testing;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use mosaic_core::traits::{
    IsolationProbe, LifecycleRunner, NoopPrefetch, PrefetchStrategy, ResourceLoader, StaticProbe,
};
use mosaic_core::types::{
    AppDescriptor, FrameworkConfig, FrameworkLifecycles, RunnerStartOptions, StartOptions,
};
use mosaic_core::{Result, SubscriptionId};

use app::{InstanceCache, KeyStrategy, MicroApp, Registry};
use system::{apply_probe, ConfigurationStore, GateState, StartGate};

/// Orchestrator facade of the Mosaic runtime.
///
/// Cloning the host shares its state.
#[derive(Clone)]
pub struct MicroAppHost {
    inner: Arc<HostInner>,
}

struct HostInner {
    /// Engine that matches routes and runs lifecycles
    runner: Arc<dyn LifecycleRunner>,

    /// Warms registered apps on start
    prefetch: Arc<dyn PrefetchStrategy>,

    /// Reports isolation support on start
    probe: Arc<dyn IsolationProbe>,

    /// Live framework configuration
    config: Arc<ConfigurationStore>,

    /// Opened by the first `start`
    gate: Arc<StartGate>,

    /// Declaratively registered apps
    registry: Registry,

    /// Memoized imperative loads
    cache: Arc<InstanceCache>,

    /// Whether `start` has run
    started: AtomicBool,

    /// Whether the runner has been started, by `start` or an early imperative
    /// load
    runner_started: AtomicBool,

    created_at: Instant,
}

/// Builder for [`MicroAppHost`].
pub struct MicroAppHostBuilder {
    loader: Arc<dyn ResourceLoader>,
    runner: Arc<dyn LifecycleRunner>,
    prefetch: Arc<dyn PrefetchStrategy>,
    probe: Arc<dyn IsolationProbe>,
    key_strategy: KeyStrategy,
}

impl MicroAppHostBuilder {
    /// Prefetch strategy invoked by `start`. Defaults to doing nothing.
    pub fn prefetch(mut self, prefetch: impl PrefetchStrategy + 'static) -> Self {
        self.prefetch = Arc::new(prefetch);
        self
    }

    /// Isolation probe run by `start`. Defaults to full isolation support.
    pub fn probe(mut self, probe: impl IsolationProbe + 'static) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    /// Identity of cached imperative loads. Defaults to the container locator.
    pub fn key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }

    pub fn build(self) -> MicroAppHost {
        info!("Initializing micro-app host");

        // Shared by the registry's bootstrap adapters and `start`
        let config = Arc::new(ConfigurationStore::new());
        let gate = Arc::new(StartGate::new());

        let registry = Registry::new(gate.clone(), self.loader.clone(), config.clone());
        let cache = Arc::new(InstanceCache::new(self.loader, self.key_strategy));

        MicroAppHost {
            inner: Arc::new(HostInner {
                runner: self.runner,
                prefetch: self.prefetch,
                probe: self.probe,
                config,
                gate,
                registry,
                cache,
                started: AtomicBool::new(false),
                runner_started: AtomicBool::new(false),
                created_at: Instant::now(),
            }),
        }
    }
}

impl MicroAppHost {
    /// Start building a host around a resource loader and a lifecycle runner.
    pub fn builder(
        loader: Arc<dyn ResourceLoader>,
        runner: Arc<dyn LifecycleRunner>,
    ) -> MicroAppHostBuilder {
        MicroAppHostBuilder {
            loader,
            runner,
            prefetch: Arc::new(NoopPrefetch),
            probe: Arc::new(StaticProbe::default()),
            key_strategy: KeyStrategy::default(),
        }
    }

    /// Create a host with the default prefetch strategy, probe and cache keys.
    pub fn new(loader: Arc<dyn ResourceLoader>, runner: Arc<dyn LifecycleRunner>) -> Self {
        Self::builder(loader, runner).build()
    }

    /// Register apps with the lifecycle runner. Apps whose name is already
    /// registered are ignored.
    ///
    /// The returned count of newly registered apps is informational; a
    /// skipped duplicate is not an error and callers may discard it.
    pub fn register_micro_apps(
        &self,
        apps: Vec<AppDescriptor>,
        lifecycles: Option<FrameworkLifecycles>,
    ) -> usize {
        self.inner
            .registry
            .register_micro_apps(apps, lifecycles, self.inner.runner.as_ref())
    }

    /// Load and mount an app into its container outside of routing.
    ///
    /// Returns immediately; the load runs on the runner's parcel task. Without
    /// `config`, the live configuration is used with `singular` disabled.
    /// Outside a Tokio runtime the parcel never mounts and `when_mounted`
    /// reports the error.
    pub fn load_micro_app(
        &self,
        app: AppDescriptor,
        config: Option<FrameworkConfig>,
        lifecycles: Option<FrameworkLifecycles>,
    ) -> MicroApp {
        let live = self.inner.config.snapshot();

        if !self.inner.started.load(Ordering::Acquire)
            && !self.inner.runner_started.swap(true, Ordering::AcqRel)
        {
            info!("Starting lifecycle runner for imperative load of {}", app.name);
            self.inner.runner.start(RunnerStartOptions {
                url_reroute_only: live.url_reroute_only,
            });
        }

        let config = config.unwrap_or_else(|| live.for_imperative_load());
        let name = app.name.clone();
        let props = app.props.clone();

        debug!("Loading micro app {}", name);
        let loader = self
            .inner
            .cache
            .loader_for(app, config, lifecycles.map(Arc::new));
        let parcel = self.inner.runner.mount_root_parcel(loader, props);

        MicroApp::new(name, parcel)
    }

    /// Start the host.
    ///
    /// Finalizes the configuration, prefetches registered apps, probes
    /// isolation support, starts the runner and finally opens the start gate.
    /// Calling it again re-finalizes the configuration but does not restart
    /// the runner.
    pub fn start(&self, options: StartOptions) -> Result<()> {
        info!("Starting micro-app host");

        options.validate()?;
        let config = self.inner.config.finalize(options);

        if config.prefetch.is_enabled() {
            debug!("Prefetching with mode {:?}", config.prefetch);
            self.inner.prefetch.prefetch(
                self.inner.registry.snapshot(),
                &config.prefetch,
                &config.loader_options,
            );
        }

        let outcome = apply_probe(&self.inner.config, self.inner.probe.as_ref());
        debug!("Isolation probe: {:?}", outcome);

        if !self.inner.runner_started.swap(true, Ordering::AcqRel) {
            self.inner.runner.start(RunnerStartOptions {
                url_reroute_only: config.url_reroute_only,
            });
        }
        self.inner.started.store(true, Ordering::Release);

        // Last, so bootstraps only ever see the finalized configuration
        if self.inner.gate.resolve() {
            info!("Micro-app host started");
        }

        Ok(())
    }

    /// Load start options from a JSON file and start the host.
    pub async fn start_from_file(&self, path: Option<&str>) -> anyhow::Result<()> {
        let options = ConfigurationStore::load_options(path).await?;
        self.start(options)?;
        Ok(())
    }

    /// Navigate to `url` if no app is mounted once the first reroute without
    /// app changes completes.
    pub fn set_default_mount_app(&self, url: impl Into<String>) -> SubscriptionId {
        effects::set_default_mount_app(&self.inner.runner, url)
    }

    /// Run `effect` once, after the first app has mounted.
    pub fn run_after_first_mounted<F>(&self, effect: F) -> SubscriptionId
    where
        F: FnOnce() + Send + 'static,
    {
        effects::run_after_first_mounted(self.inner.runner.as_ref(), self.inner.created_at, effect)
    }

    #[deprecated(note = "use `set_default_mount_app`")]
    #[allow(deprecated)]
    pub fn run_default_mount_effects(&self, url: impl Into<String>) -> SubscriptionId {
        effects::run_default_mount_effects(&self.inner.runner, url)
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::Acquire)
    }

    /// Snapshot of the live configuration.
    pub fn configuration(&self) -> FrameworkConfig {
        self.inner.config.snapshot()
    }

    /// Snapshot of the registered apps, in registration order.
    pub fn registered_apps(&self) -> Vec<AppDescriptor> {
        self.inner.registry.snapshot()
    }

    pub fn start_gate_state(&self) -> GateState {
        self.inner.gate.state()
    }

    pub fn runner(&self) -> Arc<dyn LifecycleRunner> {
        self.inner.runner.clone()
    }
}
