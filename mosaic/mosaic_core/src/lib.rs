//! # Mosaic Core
//!
//! `mosaic_core` provides the building blocks shared by the Mosaic micro-app
//! host: error types, identifiers, the application data model and the traits
//! through which the host talks to its collaborators.
//!
//! ## Collaborators
//!
//! The host never fetches resources, matches routes or builds sandboxes
//! itself. Those concerns sit behind traits:
//!
//! 1. **ResourceLoader**: fetches an app's resources and yields a
//!    [`LifecycleFactory`](traits::LifecycleFactory) that produces lifecycle
//!    hooks for a given container.
//!
//! 2. **LifecycleRunner**: registers apps, matches them against the current
//!    location, runs their lifecycle phases and mounts root parcels.
//!
//! 3. **PrefetchStrategy**: warms resources for registered apps. Called once
//!    per start and never awaited.
//!
//! 4. **IsolationProbe**: reports whether strict sandboxing is available in the
//!    host environment.
//!
//! ## Crate Structure
//!
//! - **error**: Error types for all Mosaic components
//! - **id**: Strongly-typed identifier types
//! - **events**: A generic event bus with one-shot subscriptions
//! - **traits**: Collaborator interfaces
//! - **types**: Data structures used throughout the system
//! - **utils**: Logging helpers

pub mod error;
pub mod events;
pub mod id;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
pub use events::{EventBus, RunnerEvent};
pub use id::{ParcelId, SubscriptionId};
pub use traits::{
    IsolationProbe, IsolationSupport, LifecycleFactory, LifecycleRunner, Parcel, PrefetchStrategy,
    ResourceLoader,
};
pub use types::{
    hook, run_hooks, ActiveRule, AppDescriptor, AppLifecycles, AppLoader, AppProps, AppStatus,
    Container, ContainerLocator, FrameworkConfig, FrameworkLifecycles, LifecycleFn,
    LoaderOptions, LoadingIndicator, ParcelLoader, PrefetchMode, Registration,
    RunnerStartOptions, SandboxConfig, SandboxOptions, StartOptions,
};
pub use utils::LogLevel;
