//! Resource loading.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AppDescriptor, AppLifecycles, Container, FrameworkConfig, FrameworkLifecycles};

/// Produces hook bundles bound to a container.
///
/// One factory is created per load. Instantiating it again for another
/// container reuses the already evaluated app.
pub trait LifecycleFactory: Send + Sync {
    /// Hooks for rendering into `container` (or headless when `None`).
    fn instantiate(&self, container: Option<&Container>) -> AppLifecycles;
}

impl<F> LifecycleFactory for F
where
    F: Fn(Option<&Container>) -> AppLifecycles + Send + Sync,
{
    fn instantiate(&self, container: Option<&Container>) -> AppLifecycles {
        self(container)
    }
}

/// Fetches an app's resources, builds its sandbox and evaluates it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use mosaic_core::error::Result;
/// use mosaic_core::traits::{LifecycleFactory, ResourceLoader};
/// use mosaic_core::types::{AppDescriptor, AppLifecycles, Container, FrameworkConfig, FrameworkLifecycles};
///
/// struct StaticLoader;
///
/// #[async_trait]
/// impl ResourceLoader for StaticLoader {
///     async fn load(
///         &self,
///         _app: AppDescriptor,
///         _config: FrameworkConfig,
///         _lifecycles: Option<Arc<FrameworkLifecycles>>,
///     ) -> Result<Arc<dyn LifecycleFactory>> {
///         Ok(Arc::new(|_: Option<&Container>| AppLifecycles::new()))
///     }
/// }
/// ```
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn load(
        &self,
        app: AppDescriptor,
        config: FrameworkConfig,
        lifecycles: Option<Arc<FrameworkLifecycles>>,
    ) -> Result<Arc<dyn LifecycleFactory>>;
}
