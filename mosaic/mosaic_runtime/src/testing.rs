//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use mosaic_core::error::LoadError;
use mosaic_core::traits::{LifecycleFactory, LifecycleRunner, Parcel, ResourceLoader};
use mosaic_core::types::{
    hook, AppDescriptor, AppLifecycles, AppProps, Container, FrameworkConfig, FrameworkLifecycles,
    ParcelLoader, Registration, RunnerStartOptions,
};
use mosaic_core::{EventBus, Result, RunnerEvent};

use crate::router::RootParcel;

#[derive(Default)]
struct Counters {
    bootstraps: AtomicUsize,
    mounts: AtomicUsize,
    mounted_into: Mutex<Vec<Option<String>>>,
}

/// Resource loader counting loads and hook invocations.
#[derive(Default)]
pub struct CountingLoader {
    loads: AtomicUsize,
    failures: AtomicUsize,
    delay: Option<Duration>,
    counters: Arc<Counters>,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail the first `count` loads.
    pub fn failing_first(self, count: usize) -> Self {
        self.failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn bootstraps(&self) -> usize {
        self.counters.bootstraps.load(Ordering::SeqCst)
    }

    pub fn mounts(&self) -> usize {
        self.counters.mounts.load(Ordering::SeqCst)
    }

    pub fn mounted_into(&self) -> Vec<Option<String>> {
        self.counters.mounted_into.lock().clone()
    }
}

#[async_trait]
impl ResourceLoader for CountingLoader {
    async fn load(
        &self,
        app: AppDescriptor,
        _config: FrameworkConfig,
        _lifecycles: Option<Arc<FrameworkLifecycles>>,
    ) -> Result<Arc<dyn LifecycleFactory>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(LoadError::FetchFailed {
                app: app.name,
                entry: app.entry,
                reason: "connection reset".to_string(),
            }
            .into());
        }

        let counters = self.counters.clone();
        let factory = move |container: Option<&Container>| {
            let locator = container.and_then(Container::locator).map(|l| l.to_string());
            let bootstrap = {
                let counters = counters.clone();
                hook(move |_| {
                    counters.bootstraps.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                })
            };
            let mount = {
                let counters = counters.clone();
                hook(move |_| {
                    counters.mounts.fetch_add(1, Ordering::SeqCst);
                    counters.mounted_into.lock().push(locator.clone());
                    async { Ok(()) }
                })
            };
            AppLifecycles::new().with_bootstrap(bootstrap).with_mount(mount)
        };
        Ok(Arc::new(factory))
    }
}

/// Lifecycle runner recording every call it receives.
#[derive(Default)]
pub struct RecordingRunner {
    registrations: Mutex<Vec<Registration>>,
    starts: Mutex<Vec<RunnerStartOptions>>,
    navigations: Mutex<Vec<String>>,
    mounted: Mutex<Vec<String>>,
    events: Arc<EventBus<RunnerEvent>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registered_names(&self) -> Vec<String> {
        self.registrations
            .lock()
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn registration(&self, name: &str) -> Option<Registration> {
        self.registrations
            .lock()
            .iter()
            .find(|r| r.name == name)
            .cloned()
    }

    pub fn starts(&self) -> Vec<RunnerStartOptions> {
        self.starts.lock().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }

    pub fn set_mounted(&self, names: &[&str]) {
        *self.mounted.lock() = names.iter().map(|n| n.to_string()).collect();
    }
}

impl LifecycleRunner for RecordingRunner {
    fn register_application(&self, registration: Registration) {
        self.registrations.lock().push(registration);
    }

    fn start(&self, options: RunnerStartOptions) {
        self.starts.lock().push(options);
    }

    fn mount_root_parcel(&self, loader: ParcelLoader, props: AppProps) -> Arc<dyn Parcel> {
        RootParcel::spawn(loader, props)
    }

    fn navigate_to_url(&self, url: &str) {
        self.navigations.lock().push(url.to_string());
    }

    fn mounted_apps(&self) -> Vec<String> {
        self.mounted.lock().clone()
    }

    fn events(&self) -> Arc<EventBus<RunnerEvent>> {
        self.events.clone()
    }
}
