//! Controller returned by `load_micro_app`.

use std::fmt;
use std::sync::Arc;

use mosaic_core::traits::Parcel;
use mosaic_core::types::{AppProps, AppStatus};
use mosaic_core::{ParcelId, Result};

/// Handle to an imperatively loaded app.
///
/// Every operation is delegated to the root parcel the lifecycle runner
/// created for the app. Cloning the handle shares the parcel.
#[derive(Clone)]
pub struct MicroApp {
    name: String,
    parcel: Arc<dyn Parcel>,
}

impl MicroApp {
    pub fn new(name: impl Into<String>, parcel: Arc<dyn Parcel>) -> Self {
        Self {
            name: name.into(),
            parcel,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> ParcelId {
        self.parcel.id()
    }

    pub fn status(&self) -> AppStatus {
        self.parcel.status()
    }

    /// Mount again after an unmount.
    pub async fn mount(&self) -> Result<()> {
        self.parcel.mount().await
    }

    pub async fn unmount(&self) -> Result<()> {
        self.parcel.unmount().await
    }

    /// Pass new props to a mounted app.
    pub async fn update(&self, props: AppProps) -> Result<()> {
        self.parcel.update(props).await
    }

    /// Resolves after the first mount, or with the load or hook error that
    /// prevented it.
    pub async fn when_mounted(&self) -> Result<()> {
        self.parcel.when_mounted().await
    }

    pub async fn when_unmounted(&self) -> Result<()> {
        self.parcel.when_unmounted().await
    }
}

impl fmt::Debug for MicroApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicroApp")
            .field("name", &self.name)
            .field("id", &self.parcel.id())
            .field("status", &self.parcel.status())
            .finish()
    }
}
