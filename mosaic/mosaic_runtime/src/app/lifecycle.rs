//! Loading-indicator wrapping of the mount phase.
//!
//! The wrapped mount phase is `[indicator on, ...app hooks, indicator off]`.
//! The runner executes the hooks in order and stops at the first failure, so
//! the indicator is only switched off after every app hook succeeded.

use mosaic_core::types::{hook, AppLifecycles, LifecycleFn, LoadingIndicator};

/// Brackets a loading indicator around mount hooks.
#[derive(Debug, Clone)]
pub struct LifecycleWrapper {
    indicator: LoadingIndicator,
}

impl LifecycleWrapper {
    pub fn new(indicator: LoadingIndicator) -> Self {
        Self { indicator }
    }

    /// Wrap a sequence of mount hooks.
    pub fn wrap_mount(&self, mount: Vec<LifecycleFn>) -> Vec<LifecycleFn> {
        let mut wrapped = Vec::with_capacity(mount.len() + 2);
        wrapped.push(self.toggle(true));
        wrapped.extend(mount);
        wrapped.push(self.toggle(false));
        wrapped
    }

    /// Wrap the mount phase of a hook bundle, leaving the other phases as-is.
    pub fn wrap(&self, mut lifecycles: AppLifecycles) -> AppLifecycles {
        lifecycles.mount = self.wrap_mount(std::mem::take(&mut lifecycles.mount));
        lifecycles
    }

    fn toggle(&self, loading: bool) -> LifecycleFn {
        let indicator = self.indicator.clone();
        hook(move |_| {
            indicator.set(loading);
            async { Ok(()) }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::error::Error;
    use mosaic_core::types::{run_hooks, AppProps};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, LifecycleWrapper) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let wrapper = LifecycleWrapper::new(LoadingIndicator::new({
            let log = log.clone();
            move |loading| log.lock().push(format!("loading:{}", loading))
        }));
        (log, wrapper)
    }

    fn step(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> LifecycleFn {
        let log = log.clone();
        hook(move |_| {
            let log = log.clone();
            async move {
                log.lock().push(name.to_string());
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_indicator_brackets_mount_hooks() {
        let (log, wrapper) = recorder();
        let mount = wrapper.wrap_mount(vec![step(&log, "first"), step(&log, "second")]);
        assert_eq!(mount.len(), 4);

        run_hooks(&mount, &AppProps::Null).await.unwrap();
        assert_eq!(
            *log.lock(),
            vec!["loading:true", "first", "second", "loading:false"]
        );
    }

    #[tokio::test]
    async fn test_failed_hook_leaves_indicator_on() {
        let (log, wrapper) = recorder();
        let failing = hook(|_| async { Err(Error::hook_failed("app", "mount", "boom")) });
        let mount = wrapper.wrap_mount(vec![step(&log, "first"), failing]);

        assert!(run_hooks(&mount, &AppProps::Null).await.is_err());
        assert_eq!(*log.lock(), vec!["loading:true", "first"]);
    }

    #[tokio::test]
    async fn test_wrap_only_touches_mount() {
        let (log, wrapper) = recorder();
        let lifecycles = AppLifecycles::new()
            .with_bootstrap(step(&log, "bootstrap"))
            .with_mount(step(&log, "mount"))
            .with_unmount(step(&log, "unmount"));

        let wrapped = wrapper.wrap(lifecycles);
        assert_eq!(wrapped.bootstrap.len(), 1);
        assert_eq!(wrapped.mount.len(), 3);
        assert_eq!(wrapped.unmount.len(), 1);

        run_hooks(&wrapped.unmount, &AppProps::Null).await.unwrap();
        assert_eq!(*log.lock(), vec!["unmount"]);
    }
}
