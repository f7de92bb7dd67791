//! Root parcels.
//!
//! A root parcel is an app instance mounted outside of routing. Spawning one
//! starts a task that polls the deferred loader, runs the bootstrap hooks and
//! then the mount hooks. `mount`, `unmount` and `update` first wait for that
//! task to report its outcome, then serialize on the hook lock.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, error, warn};

use mosaic_core::error::{LifecycleError, RunnerError};
use mosaic_core::traits::Parcel;
use mosaic_core::types::{run_hooks, AppLifecycles, AppProps, AppStatus, ParcelLoader};
use mosaic_core::{Error, ParcelId, Result};

type Outcome = Option<Result<()>>;

/// Parcel implementation shared by the bundled runners.
pub struct RootParcel {
    id: ParcelId,
    status: watch::Sender<AppStatus>,
    lifecycles: AsyncMutex<Option<AppLifecycles>>,
    props: Mutex<AppProps>,
    mounted: watch::Sender<Outcome>,
    unmounted: watch::Sender<Outcome>,
}

impl RootParcel {
    fn new(props: AppProps) -> Self {
        let (status, _) = watch::channel(AppStatus::NotLoaded);
        let (mounted, _) = watch::channel(None);
        let (unmounted, _) = watch::channel(None);

        Self {
            id: ParcelId::new(),
            status,
            lifecycles: AsyncMutex::new(None),
            props: Mutex::new(props),
            mounted,
            unmounted,
        }
    }

    /// Create a parcel and start loading and mounting it in the background.
    ///
    /// Without a Tokio runtime the parcel stays `NotLoaded` and every waiter
    /// receives [`Error::Runtime`].
    pub fn spawn(loader: ParcelLoader, props: AppProps) -> Arc<Self> {
        let parcel = Arc::new(Self::new(props));

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = parcel.clone();
                handle.spawn(async move { task.boot(loader).await });
            }
            Err(_) => {
                error!("No async runtime available, parcel {} cannot mount", parcel.id);
                let unavailable = Error::Runtime(format!(
                    "no async runtime available to mount parcel {}",
                    parcel.id
                ));
                parcel.mounted.send_replace(Some(Err(unavailable)));
            }
        }

        parcel
    }

    async fn boot(self: Arc<Self>, loader: ParcelLoader) {
        let mut lifecycles = self.lifecycles.lock().await;

        self.set_status(AppStatus::LoadingSourceCode);
        let hooks = match loader.await {
            Ok(hooks) => hooks,
            Err(err) => {
                warn!("Parcel {} failed to load: {}", self.id, err);
                self.set_status(AppStatus::LoadError);
                self.mounted.send_replace(Some(Err(err)));
                return;
            }
        };
        self.set_status(AppStatus::NotBootstrapped);

        let result = self.bootstrap_and_mount(&hooks).await;
        *lifecycles = Some(hooks);
        self.mounted.send_replace(Some(result));
    }

    async fn bootstrap_and_mount(&self, hooks: &AppLifecycles) -> Result<()> {
        let props = self.props.lock().clone();

        self.set_status(AppStatus::Bootstrapping);
        if let Err(err) = run_hooks(&hooks.bootstrap, &props).await {
            self.fail("bootstrap", &err);
            return Err(err);
        }
        self.set_status(AppStatus::NotMounted);

        self.run_mount(hooks, &props).await
    }

    async fn run_mount(&self, hooks: &AppLifecycles, props: &AppProps) -> Result<()> {
        self.set_status(AppStatus::Mounting);
        if let Err(err) = run_hooks(&hooks.mount, props).await {
            self.fail("mount", &err);
            return Err(err);
        }

        self.set_status(AppStatus::Mounted);
        debug!("Parcel {} mounted", self.id);
        Ok(())
    }

    fn fail(&self, phase: &str, err: &Error) {
        error!("Parcel {} {} failed: {}", self.id, phase, err);
        self.set_status(AppStatus::Broken);
    }

    fn set_status(&self, status: AppStatus) {
        self.status.send_replace(status);
    }

    fn expect_status(&self, operation: &str, expected: AppStatus) -> Result<()> {
        let state = self.status();
        if state == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidState {
                operation: operation.to_string(),
                state,
            }
            .into())
        }
    }

    async fn wait_outcome(&self, outcome: &watch::Sender<Outcome>, what: &str) -> Result<()> {
        let mut rx = outcome.subscribe();
        let result = match rx.wait_for(Option::is_some).await {
            Ok(result) => result.clone(),
            Err(_) => None,
        };
        result.unwrap_or_else(|| Err(RunnerError::Dropped(what.to_string()).into()))
    }

    /// Wait until the initial load and mount has finished, whatever its
    /// outcome.
    async fn booted(&self) {
        let _ = self.wait_outcome(&self.mounted, "mount").await;
    }
}

#[async_trait]
impl Parcel for RootParcel {
    fn id(&self) -> ParcelId {
        self.id
    }

    fn status(&self) -> AppStatus {
        *self.status.borrow()
    }

    async fn mount(&self) -> Result<()> {
        self.booted().await;
        let lifecycles = self.lifecycles.lock().await;
        self.expect_status("mount", AppStatus::NotMounted)?;

        let Some(hooks) = lifecycles.as_ref() else {
            return Err(LifecycleError::InvalidState {
                operation: "mount".to_string(),
                state: self.status(),
            }
            .into());
        };

        let props = self.props.lock().clone();
        self.run_mount(hooks, &props).await
    }

    async fn unmount(&self) -> Result<()> {
        self.booted().await;
        let lifecycles = self.lifecycles.lock().await;
        self.expect_status("unmount", AppStatus::Mounted)?;

        let unmount = lifecycles
            .as_ref()
            .map(|hooks| hooks.unmount.clone())
            .unwrap_or_default();
        let props = self.props.lock().clone();

        self.set_status(AppStatus::Unmounting);
        let result = run_hooks(&unmount, &props).await;
        match &result {
            Ok(()) => {
                self.set_status(AppStatus::NotMounted);
                debug!("Parcel {} unmounted", self.id);
            }
            Err(err) => self.fail("unmount", err),
        }

        self.unmounted.send_replace(Some(result.clone()));
        result
    }

    async fn update(&self, props: AppProps) -> Result<()> {
        self.booted().await;
        let lifecycles = self.lifecycles.lock().await;
        self.expect_status("update", AppStatus::Mounted)?;

        let Some(update) = lifecycles.as_ref().and_then(|hooks| hooks.update.clone()) else {
            return Err(LifecycleError::UpdateUnsupported(format!("parcel {}", self.id)).into());
        };

        *self.props.lock() = props.clone();

        self.set_status(AppStatus::Updating);
        match update(props).await {
            Ok(()) => {
                self.set_status(AppStatus::Mounted);
                Ok(())
            }
            Err(err) => {
                self.fail("update", &err);
                Err(err)
            }
        }
    }

    async fn when_mounted(&self) -> Result<()> {
        self.wait_outcome(&self.mounted, "mount").await
    }

    async fn when_unmounted(&self) -> Result<()> {
        self.wait_outcome(&self.unmounted, "unmount").await
    }
}
