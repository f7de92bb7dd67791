//! In-process lifecycle runner.
//!
//! [`Router`] keeps a current location and, on every reroute, compares each
//! registered app's active rule against it. Apps that became inactive are
//! unmounted before apps that became active are mounted. Each app is loaded
//! and bootstrapped once. Until the router is started, reroutes only load the
//! active apps.
//!
//! Reroutes run one at a time on spawned tasks. [`Router::navigate`] performs
//! a reroute inline for callers that want to await its completion.

pub mod parcel;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, error, info, warn};

use mosaic_core::traits::{LifecycleRunner, Parcel};
use mosaic_core::types::{
    run_hooks, AppLifecycles, AppProps, AppStatus, ParcelLoader, Registration, RunnerStartOptions,
};
use mosaic_core::{EventBus, Result, RunnerEvent};

pub use parcel::RootParcel;

/// A registered app and its routing state.
struct RoutedApp {
    registration: Registration,
    status: Mutex<AppStatus>,
    lifecycles: Mutex<Option<AppLifecycles>>,
}

impl RoutedApp {
    fn new(registration: Registration) -> Self {
        Self {
            registration,
            status: Mutex::new(AppStatus::NotLoaded),
            lifecycles: Mutex::new(None),
        }
    }

    fn name(&self) -> &str {
        &self.registration.name
    }

    fn status(&self) -> AppStatus {
        *self.status.lock()
    }

    fn set_status(&self, status: AppStatus) {
        *self.status.lock() = status;
    }

    async fn load(&self) -> Result<AppLifecycles> {
        if let Some(hooks) = self.lifecycles.lock().clone() {
            return Ok(hooks);
        }

        self.set_status(AppStatus::LoadingSourceCode);
        match (self.registration.loader)(self.registration.custom_props.clone()).await {
            Ok(hooks) => {
                *self.lifecycles.lock() = Some(hooks.clone());
                self.set_status(AppStatus::NotBootstrapped);
                debug!("Loaded {}", self.name());
                Ok(hooks)
            }
            Err(err) => {
                self.set_status(AppStatus::LoadError);
                Err(err)
            }
        }
    }

    async fn mount(&self) -> Result<()> {
        let hooks = self.load().await?;
        let props = &self.registration.custom_props;

        if self.status() == AppStatus::NotBootstrapped {
            self.set_status(AppStatus::Bootstrapping);
            if let Err(err) = run_hooks(&hooks.bootstrap, props).await {
                self.set_status(AppStatus::Broken);
                return Err(err);
            }
            self.set_status(AppStatus::NotMounted);
        }

        self.set_status(AppStatus::Mounting);
        if let Err(err) = run_hooks(&hooks.mount, props).await {
            self.set_status(AppStatus::Broken);
            return Err(err);
        }

        self.set_status(AppStatus::Mounted);
        Ok(())
    }

    async fn unmount(&self) -> Result<()> {
        let unmount = self
            .lifecycles
            .lock()
            .as_ref()
            .map(|hooks| hooks.unmount.clone())
            .unwrap_or_default();

        self.set_status(AppStatus::Unmounting);
        if let Err(err) = run_hooks(&unmount, &self.registration.custom_props).await {
            self.set_status(AppStatus::Broken);
            return Err(err);
        }

        self.set_status(AppStatus::NotMounted);
        Ok(())
    }
}

struct RouterInner {
    apps: Mutex<Vec<Arc<RoutedApp>>>,
    location: Mutex<String>,
    options: Mutex<RunnerStartOptions>,
    started: AtomicBool,
    first_mounted: AtomicBool,
    reroute_lock: AsyncMutex<()>,
    pending: watch::Sender<usize>,
    events: Arc<EventBus<RunnerEvent>>,
}

impl RouterInner {
    async fn reroute(&self) {
        let _guard = self.reroute_lock.lock().await;

        let location = self.location.lock().clone();
        let started = self.started.load(Ordering::Acquire);
        let apps = self.apps.lock().clone();

        let mut to_unmount = Vec::new();
        let mut to_activate = Vec::new();
        for app in apps {
            let active = app.registration.active_when.matches(&location);
            match app.status() {
                AppStatus::Mounted if !active => to_unmount.push(app),
                AppStatus::NotLoaded | AppStatus::NotBootstrapped | AppStatus::NotMounted
                    if active =>
                {
                    to_activate.push(app)
                }
                _ => {}
            }
        }

        if !started {
            for app in to_activate {
                if app.status() == AppStatus::NotLoaded {
                    if let Err(err) = app.load().await {
                        warn!("Failed to load {}: {}", app.name(), err);
                    }
                }
            }
            return;
        }

        debug!(
            "Rerouting to {}: {} to unmount, {} to mount",
            location,
            to_unmount.len(),
            to_activate.len()
        );

        let changed = !to_unmount.is_empty() || !to_activate.is_empty();

        for app in to_unmount {
            if let Err(err) = app.unmount().await {
                error!("Failed to unmount {}: {}", app.name(), err);
            }
        }

        let mut mounted_any = false;
        for app in to_activate {
            match app.mount().await {
                Ok(()) => {
                    info!("Mounted {}", app.name());
                    mounted_any = true;
                }
                Err(err) => error!("Failed to mount {}: {}", app.name(), err),
            }
        }

        if changed {
            self.events.emit(&RunnerEvent::AppChange);
        } else {
            self.events.emit(&RunnerEvent::NoAppChange);
        }

        if mounted_any && !self.first_mounted.swap(true, Ordering::AcqRel) {
            self.events.emit(&RunnerEvent::FirstMount);
        }
    }
}

/// Lifecycle runner that matches apps against an in-memory location.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    /// Create a router positioned at `location`.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                apps: Mutex::new(Vec::new()),
                location: Mutex::new(location.into()),
                options: Mutex::new(RunnerStartOptions::default()),
                started: AtomicBool::new(false),
                first_mounted: AtomicBool::new(false),
                reroute_lock: AsyncMutex::new(()),
                pending: watch::channel(0).0,
                events: Arc::new(EventBus::new()),
            }),
        }
    }

    pub fn location(&self) -> String {
        self.inner.location.lock().clone()
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::Acquire)
    }

    /// Status of a registered app.
    pub fn app_status(&self, name: &str) -> Option<AppStatus> {
        self.inner
            .apps
            .lock()
            .iter()
            .find(|app| app.name() == name)
            .map(|app| app.status())
    }

    /// Change the location and wait for the resulting reroute.
    pub async fn navigate(&self, url: &str) {
        if self.set_location(url) {
            self.inner.reroute().await;
        }
    }

    /// Wait until no spawned reroute is pending.
    pub async fn settled(&self) {
        let mut rx = self.inner.pending.subscribe();
        let _ = rx.wait_for(|pending| *pending == 0).await;
    }

    /// Returns whether a reroute is needed.
    fn set_location(&self, url: &str) -> bool {
        let mut location = self.inner.location.lock();
        if *location == url && self.inner.options.lock().url_reroute_only {
            return false;
        }
        *location = url.to_string();
        true
    }

    fn spawn_reroute(&self) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = self.inner.clone();
                inner.pending.send_modify(|pending| *pending += 1);
                handle.spawn(async move {
                    inner.reroute().await;
                    inner.pending.send_modify(|pending| *pending -= 1);
                });
            }
            Err(_) => warn!("No async runtime available, reroute skipped"),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new("/")
    }
}

impl LifecycleRunner for Router {
    fn register_application(&self, registration: Registration) {
        debug!("Registering application {}", registration.name);
        self.inner
            .apps
            .lock()
            .push(Arc::new(RoutedApp::new(registration)));
        self.spawn_reroute();
    }

    fn start(&self, options: RunnerStartOptions) {
        if self.inner.started.swap(true, Ordering::AcqRel) {
            debug!("Router already started");
            return;
        }

        info!("Starting router at {}", self.location());
        *self.inner.options.lock() = options;
        self.spawn_reroute();
    }

    fn mount_root_parcel(&self, loader: ParcelLoader, props: AppProps) -> Arc<dyn Parcel> {
        RootParcel::spawn(loader, props)
    }

    fn navigate_to_url(&self, url: &str) {
        if self.set_location(url) {
            self.spawn_reroute();
        }
    }

    fn mounted_apps(&self) -> Vec<String> {
        self.inner
            .apps
            .lock()
            .iter()
            .filter(|app| app.status() == AppStatus::Mounted)
            .map(|app| app.name().to_string())
            .collect()
    }

    fn events(&self) -> Arc<EventBus<RunnerEvent>> {
        self.inner.events.clone()
    }
}
