//! Instance cache for imperatively loaded apps.
//!
//! Loads are memoized per [`CacheKey`]. The in-flight load is stored under its
//! key before anything awaits it, so every concurrent request for the same key
//! shares one call to the resource loader. When a later request hits a cached
//! entry, the resulting hooks skip bootstrap: the app instance has already
//! been bootstrapped and only needs mounting into the new container.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::debug;

use mosaic_core::traits::{LifecycleFactory, ResourceLoader};
use mosaic_core::types::{AppDescriptor, Container, FrameworkConfig, FrameworkLifecycles, ParcelLoader};
use mosaic_core::Result;

/// How the cache identifies an app instance.
#[derive(Clone, Default)]
pub enum KeyStrategy {
    /// One instance per app name
    ByName,
    /// One instance per app name and container position
    #[default]
    ByContainerLocator,
    /// One instance per app name and caller-supplied container identity
    Custom(Arc<dyn Fn(&AppDescriptor, &Container) -> Option<String> + Send + Sync>),
}

impl KeyStrategy {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&AppDescriptor, &Container) -> Option<String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }
}

impl fmt::Debug for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByName => f.write_str("ByName"),
            Self::ByContainerLocator => f.write_str("ByContainerLocator"),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Identity of a cached app instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Name(String),
    Instance { name: String, locator: String },
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{}", name),
            Self::Instance { name, locator } => write!(f, "{}-{}", name, locator),
        }
    }
}

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<dyn LifecycleFactory>>>>;

/// Memoized loads keyed by app instance.
pub struct InstanceCache {
    entries: Mutex<HashMap<CacheKey, SharedLoad>>,
    loader: Arc<dyn ResourceLoader>,
    strategy: KeyStrategy,
}

impl InstanceCache {
    pub fn new(loader: Arc<dyn ResourceLoader>, strategy: KeyStrategy) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            loader,
            strategy,
        }
    }

    /// Pick the cache key for a load, or `None` when the load must not be
    /// memoized.
    pub fn resolve_key(&self, app: &AppDescriptor, config: &FrameworkConfig) -> Option<CacheKey> {
        if config.cache_lifecycle_by_app_name {
            return Some(CacheKey::Name(app.name.clone()));
        }

        match &self.strategy {
            KeyStrategy::ByName => Some(CacheKey::Name(app.name.clone())),
            KeyStrategy::ByContainerLocator => {
                let locator = app.container.as_ref()?.locator()?;
                Some(CacheKey::Instance {
                    name: app.name.clone(),
                    locator: locator.to_string(),
                })
            }
            KeyStrategy::Custom(identify) => {
                let container = app.container.as_ref()?;
                identify(app, container).map(|locator| CacheKey::Instance {
                    name: app.name.clone(),
                    locator,
                })
            }
        }
    }

    /// Build the deferred loader for one `load_micro_app` call.
    ///
    /// The key is resolved now; the lookup, the resource load and the hook
    /// instantiation happen when the runner polls the returned future.
    pub fn loader_for(
        self: &Arc<Self>,
        app: AppDescriptor,
        config: FrameworkConfig,
        lifecycles: Option<Arc<FrameworkLifecycles>>,
    ) -> ParcelLoader {
        let key = self.resolve_key(&app, &config);
        let cache = Arc::clone(self);

        Box::pin(async move {
            let name = app.name.clone();
            let container = app.container.clone();
            let loader = cache.loader.clone();

            let (entry, cached) = match &key {
                Some(key) => cache.claim(key, || fetch(loader, app, config, lifecycles)),
                None => (fetch(loader, app, config, lifecycles), false),
            };

            let factory = match entry.clone().await {
                Ok(factory) => factory,
                Err(err) => {
                    if let Some(key) = &key {
                        cache.evict(key, &entry);
                    }
                    return Err(err);
                }
            };

            let mut hooks = factory.instantiate(container.as_ref());
            if cached {
                debug!("Reusing loaded instance of {}", name);
                // Already bootstrapped by the instance that populated the entry
                hooks.bootstrap.clear();
            }
            Ok(hooks)
        })
    }

    /// Return the entry for `key`, inserting a fresh load if there is none.
    /// The flag is true when an existing entry was reused.
    fn claim<F>(&self, key: &CacheKey, fetch: F) -> (SharedLoad, bool)
    where
        F: FnOnce() -> SharedLoad,
    {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(key) {
            return (entry.clone(), true);
        }

        debug!("Caching new instance under {}", key);
        let entry = fetch();
        entries.insert(key.clone(), entry.clone());
        (entry, false)
    }

    /// Drop a failed entry so the next load retries, unless it was already
    /// replaced.
    fn evict(&self, key: &CacheKey, failed: &SharedLoad) {
        let mut entries = self.entries.lock();
        if entries.get(key).is_some_and(|current| current.ptr_eq(failed)) {
            debug!("Evicting failed load of {}", key);
            entries.remove(key);
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

fn fetch(
    loader: Arc<dyn ResourceLoader>,
    app: AppDescriptor,
    config: FrameworkConfig,
    lifecycles: Option<Arc<FrameworkLifecycles>>,
) -> SharedLoad {
    let load: BoxFuture<'static, Result<Arc<dyn LifecycleFactory>>> =
        Box::pin(async move { loader.load(app, config, lifecycles).await });
    load.shared()
}
