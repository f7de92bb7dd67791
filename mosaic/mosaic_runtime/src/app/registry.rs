//! App registry.
//!
//! Holds every app registered through `register_micro_apps`, at most one per
//! name, and hands each new app to the lifecycle runner wrapped in a
//! bootstrap adapter. The adapter switches the loading indicator on, waits for
//! the start gate, asks the resource loader for the app's hooks and wraps the
//! mount phase with the loading indicator.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::RwLock;
use tracing::{debug, info};

use mosaic_core::traits::{LifecycleRunner, ResourceLoader};
use mosaic_core::types::{
    AppDescriptor, AppLifecycles, AppLoader, AppProps, FrameworkLifecycles, Registration,
};
use mosaic_core::Result;

use super::lifecycle::LifecycleWrapper;
use crate::system::config::ConfigurationStore;
use crate::system::gate::StartGate;

/// Registry of declaratively registered apps.
pub struct Registry {
    apps: RwLock<Vec<AppDescriptor>>,
    gate: Arc<StartGate>,
    loader: Arc<dyn ResourceLoader>,
    config: Arc<ConfigurationStore>,
}

impl Registry {
    pub fn new(
        gate: Arc<StartGate>,
        loader: Arc<dyn ResourceLoader>,
        config: Arc<ConfigurationStore>,
    ) -> Self {
        Self {
            apps: RwLock::new(Vec::new()),
            gate,
            loader,
            config,
        }
    }

    /// Register the apps whose names are not yet known and hand them to
    /// `runner`. Apps with a known name are skipped without error.
    ///
    /// Returns the number of newly registered apps, for logging and tests
    /// only.
    pub fn register_micro_apps(
        &self,
        apps: Vec<AppDescriptor>,
        lifecycles: Option<FrameworkLifecycles>,
        runner: &dyn LifecycleRunner,
    ) -> usize {
        let fresh = {
            let mut registered = self.apps.write();
            let mut names: HashSet<String> = registered.iter().map(|a| a.name.clone()).collect();

            let mut fresh = Vec::new();
            for app in apps {
                if names.insert(app.name.clone()) {
                    fresh.push(app);
                } else {
                    debug!("App {} is already registered, skipping", app.name);
                }
            }

            registered.extend(fresh.iter().cloned());
            fresh
        };

        let lifecycles = lifecycles.map(Arc::new);
        for app in &fresh {
            runner.register_application(Registration {
                name: app.name.clone(),
                loader: self.bootstrap_adapter(app.clone(), lifecycles.clone()),
                active_when: app.active_rule.clone(),
                custom_props: app.props.clone(),
            });
        }

        if !fresh.is_empty() {
            info!("Registered {} micro apps", fresh.len());
        }
        fresh.len()
    }

    /// Build the loader the runner invokes when the app first becomes active.
    fn bootstrap_adapter(
        &self,
        app: AppDescriptor,
        lifecycles: Option<Arc<FrameworkLifecycles>>,
    ) -> AppLoader {
        let gate = self.gate.clone();
        let loader = self.loader.clone();
        let config = self.config.clone();

        Arc::new(
            move |_props: AppProps| -> BoxFuture<'static, Result<AppLifecycles>> {
                let gate = gate.clone();
                let loader = loader.clone();
                let config = config.clone();
                let app = app.clone();
                let lifecycles = lifecycles.clone();

                Box::pin(async move {
                    let indicator = app.loading_indicator();
                    indicator.set(true);

                    gate.wait().await;

                    debug!("Loading resources of {}", app.name);
                    let container = app.container.clone();
                    let factory = loader.load(app, config.snapshot(), lifecycles).await?;
                    let hooks = factory.instantiate(container.as_ref());

                    Ok(LifecycleWrapper::new(indicator).wrap(hooks))
                })
            },
        )
    }

    /// Copy of every registered app, in registration order.
    pub fn snapshot(&self) -> Vec<AppDescriptor> {
        self.apps.read().clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.apps.read().iter().any(|app| app.name == name)
    }

    pub fn len(&self) -> usize {
        self.apps.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.read().is_empty()
    }
}
