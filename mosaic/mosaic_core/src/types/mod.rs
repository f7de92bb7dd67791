//! Data structures shared across the Mosaic system.

pub mod app;
pub mod config;
pub mod container;
pub mod lifecycle;

pub use app::{ActiveRule, AppDescriptor, AppProps, LoadingIndicator};
pub use config::{
    FrameworkConfig, LoaderOptions, PrefetchMode, SandboxConfig, SandboxOptions, StartOptions,
};
pub use container::{Container, ContainerLocator, ContainerSegment};
pub use lifecycle::{
    hook, run_hooks, AppLifecycles, AppLoader, AppStatus, FrameworkLifecycles, LifecycleFn,
    ParcelLoader, Registration, RunnerStartOptions,
};
