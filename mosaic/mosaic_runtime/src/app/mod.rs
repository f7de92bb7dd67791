//! Micro-app management: registration, instance caching, lifecycle wrapping
//! and the controller handed to imperative callers.

pub mod cache;
pub mod controller;
pub mod lifecycle;
pub mod registry;

pub use cache::{CacheKey, InstanceCache, KeyStrategy};
pub use controller::MicroApp;
pub use lifecycle::LifecycleWrapper;
pub use registry::Registry;
