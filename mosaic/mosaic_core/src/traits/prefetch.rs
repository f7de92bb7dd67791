//! Prefetch strategies.

use crate::types::{AppDescriptor, LoaderOptions, PrefetchMode};

/// Warms resources for registered apps.
///
/// Called synchronously from `start` and never awaited: implementations that
/// do real work should spawn it.
pub trait PrefetchStrategy: Send + Sync {
    fn prefetch(&self, apps: Vec<AppDescriptor>, mode: &PrefetchMode, options: &LoaderOptions);
}

impl<F> PrefetchStrategy for F
where
    F: Fn(Vec<AppDescriptor>, &PrefetchMode, &LoaderOptions) + Send + Sync,
{
    fn prefetch(&self, apps: Vec<AppDescriptor>, mode: &PrefetchMode, options: &LoaderOptions) {
        self(apps, mode, options)
    }
}

/// Prefetch strategy that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPrefetch;

impl PrefetchStrategy for NoopPrefetch {
    fn prefetch(&self, _apps: Vec<AppDescriptor>, _mode: &PrefetchMode, _options: &LoaderOptions) {}
}
