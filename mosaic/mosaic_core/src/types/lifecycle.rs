//! Lifecycle hooks and the values exchanged with a lifecycle runner.
//!
//! A micro-app moves through these statuses:
//!
//! - **NotLoaded**: registered, resources not fetched
//! - **LoadingSourceCode**: resources are being fetched
//! - **NotBootstrapped**: hooks are available, bootstrap has not run
//! - **Bootstrapping**: bootstrap hooks are running
//! - **NotMounted**: bootstrapped and detached from any container
//! - **Mounting** / **Mounted** / **Unmounting** / **Updating**
//! - **LoadError**: fetching the resources failed
//! - **Broken**: a lifecycle hook failed

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::app::{ActiveRule, AppProps};
use crate::error::Result;

/// A single asynchronous lifecycle hook.
pub type LifecycleFn = Arc<dyn Fn(AppProps) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Wrap an async closure into a [`LifecycleFn`].
///
/// ```
/// use mosaic_core::types::hook;
///
/// let mount = hook(|_props| async { Ok(()) });
/// # let _ = mount;
/// ```
pub fn hook<F, Fut>(f: F) -> LifecycleFn
where
    F: Fn(AppProps) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |props: AppProps| -> BoxFuture<'static, Result<()>> { Box::pin(f(props)) })
}

/// Run hooks one after another, stopping at the first failure.
pub async fn run_hooks(hooks: &[LifecycleFn], props: &AppProps) -> Result<()> {
    for hook in hooks {
        hook(props.clone()).await?;
    }
    Ok(())
}

/// The hook bundle a micro-app exposes for one container.
#[derive(Clone, Default)]
pub struct AppLifecycles {
    /// One-time initialisation hooks
    pub bootstrap: Vec<LifecycleFn>,

    /// Hooks attaching the app to its container
    pub mount: Vec<LifecycleFn>,

    /// Hooks detaching the app from its container
    pub unmount: Vec<LifecycleFn>,

    /// Optional hook receiving new props while mounted
    pub update: Option<LifecycleFn>,
}

impl AppLifecycles {
    /// Create an empty hook bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bootstrap hook.
    pub fn with_bootstrap(mut self, hook: LifecycleFn) -> Self {
        self.bootstrap.push(hook);
        self
    }

    /// Append a mount hook.
    pub fn with_mount(mut self, hook: LifecycleFn) -> Self {
        self.mount.push(hook);
        self
    }

    /// Append an unmount hook.
    pub fn with_unmount(mut self, hook: LifecycleFn) -> Self {
        self.unmount.push(hook);
        self
    }

    /// Set the update hook.
    pub fn with_update(mut self, hook: LifecycleFn) -> Self {
        self.update = Some(hook);
        self
    }
}

impl fmt::Debug for AppLifecycles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppLifecycles")
            .field("bootstrap", &self.bootstrap.len())
            .field("mount", &self.mount.len())
            .field("unmount", &self.unmount.len())
            .field("update", &self.update.is_some())
            .finish()
    }
}

/// Host-level hooks forwarded untouched to the resource loader.
#[derive(Clone, Default)]
pub struct FrameworkLifecycles {
    pub before_load: Vec<LifecycleFn>,
    pub before_mount: Vec<LifecycleFn>,
    pub after_mount: Vec<LifecycleFn>,
    pub before_unmount: Vec<LifecycleFn>,
    pub after_unmount: Vec<LifecycleFn>,
}

impl fmt::Debug for FrameworkLifecycles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameworkLifecycles")
            .field("before_load", &self.before_load.len())
            .field("before_mount", &self.before_mount.len())
            .field("after_mount", &self.after_mount.len())
            .field("before_unmount", &self.before_unmount.len())
            .field("after_unmount", &self.after_unmount.len())
            .finish()
    }
}

/// Lifecycle status of a registered app or a root parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppStatus {
    NotLoaded,
    LoadingSourceCode,
    NotBootstrapped,
    Bootstrapping,
    NotMounted,
    Mounting,
    Mounted,
    Unmounting,
    Updating,
    LoadError,
    Broken,
}

impl AppStatus {
    /// Whether the app is attached to a container.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Mounted | Self::Updating | Self::Unmounting)
    }
}

/// Produces the hook bundle of a registered app. Invoked by the runner the
/// first time the app becomes active.
pub type AppLoader = Arc<dyn Fn(AppProps) -> BoxFuture<'static, Result<AppLifecycles>> + Send + Sync>;

/// Deferred hook bundle for a root parcel. Nothing runs until the runner
/// polls it.
pub type ParcelLoader = BoxFuture<'static, Result<AppLifecycles>>;

/// An application handed to the lifecycle runner.
#[derive(Clone)]
pub struct Registration {
    /// Unique app name
    pub name: String,

    /// Produces the app's hooks
    pub loader: AppLoader,

    /// Decides whether the app is active for a location
    pub active_when: ActiveRule,

    /// Props passed to every hook
    pub custom_props: AppProps,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("active_when", &self.active_when)
            .field("custom_props", &self.custom_props)
            .finish()
    }
}

/// Options for starting a lifecycle runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerStartOptions {
    /// Only reroute when the location actually changes
    pub url_reroute_only: bool,
}

impl Default for RunnerStartOptions {
    fn default() -> Self {
        Self {
            url_reroute_only: true,
        }
    }
}
