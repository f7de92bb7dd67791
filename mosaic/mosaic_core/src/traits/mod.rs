//! Collaborator interfaces.
//!
//! The host orchestrates; these traits do the work. Each one is object-safe
//! and is held by the host as an `Arc<dyn Trait>`.

pub mod loader;
pub mod prefetch;
pub mod probe;
pub mod runner;

pub use loader::{LifecycleFactory, ResourceLoader};
pub use prefetch::{NoopPrefetch, PrefetchStrategy};
pub use probe::{IsolationProbe, IsolationSupport, StaticProbe};
pub use runner::{LifecycleRunner, Parcel};
