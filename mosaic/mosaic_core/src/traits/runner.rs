//! Lifecycle runner interface.
//!
//! The runner owns route matching and the execution of lifecycle phases. The
//! host registers apps with it, starts it, and asks it to mount root parcels
//! for imperatively loaded apps.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::events::{EventBus, RunnerEvent};
use crate::id::ParcelId;
use crate::types::{AppProps, AppStatus, ParcelLoader, Registration, RunnerStartOptions};

/// Engine that activates registered apps and runs their lifecycles.
pub trait LifecycleRunner: Send + Sync {
    /// Register an app. The runner calls its loader the first time the app
    /// becomes active.
    fn register_application(&self, registration: Registration);

    /// Start routing. Calling it again has no effect.
    fn start(&self, options: RunnerStartOptions);

    /// Load, bootstrap and mount a parcel outside of routing.
    fn mount_root_parcel(&self, loader: ParcelLoader, props: AppProps) -> Arc<dyn Parcel>;

    /// Change the current location and reroute.
    fn navigate_to_url(&self, url: &str);

    /// Names of the apps currently mounted.
    fn mounted_apps(&self) -> Vec<String>;

    /// Bus on which the runner publishes [`RunnerEvent`]s.
    fn events(&self) -> Arc<EventBus<RunnerEvent>>;
}

/// An imperatively mounted app instance.
#[async_trait]
pub trait Parcel: Send + Sync {
    fn id(&self) -> ParcelId;

    fn status(&self) -> AppStatus;

    /// Mount again after an unmount.
    async fn mount(&self) -> Result<()>;

    async fn unmount(&self) -> Result<()>;

    async fn update(&self, props: AppProps) -> Result<()>;

    /// Resolves once the parcel has mounted, or with the error that stopped it.
    async fn when_mounted(&self) -> Result<()>;

    /// Resolves once the parcel has unmounted.
    async fn when_unmounted(&self) -> Result<()>;
}
