//! One-shot reactions to runner events.
//!
//! Both effects subscribe with [`EventBus::once`](mosaic_core::EventBus::once):
//! the bus drops the listener before invoking it, so each effect runs at most
//! once however often the event fires.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use mosaic_core::traits::LifecycleRunner;
use mosaic_core::{RunnerEvent, SubscriptionId};

/// Navigate to `url` the first time a reroute finishes without any app
/// change, provided nothing is mounted at that point.
pub fn set_default_mount_app(
    runner: &Arc<dyn LifecycleRunner>,
    url: impl Into<String>,
) -> SubscriptionId {
    let url = url.into();
    let weak = Arc::downgrade(runner);

    runner.events().once(RunnerEvent::NoAppChange, move |_| {
        let Some(runner) = weak.upgrade() else {
            return;
        };

        if runner.mounted_apps().is_empty() {
            info!("No app mounted, navigating to default app at {}", url);
            runner.navigate_to_url(&url);
        } else {
            debug!("Apps already mounted, default app {} not needed", url);
        }
    })
}

/// Run `effect` after the first app has mounted.
///
/// `created_at` is the instant the host was created; the time until the first
/// mount is logged.
pub fn run_after_first_mounted<F>(
    runner: &dyn LifecycleRunner,
    created_at: Instant,
    effect: F,
) -> SubscriptionId
where
    F: FnOnce() + Send + 'static,
{
    runner.events().once(RunnerEvent::FirstMount, move |_| {
        debug!("First app mounted after {:?}", created_at.elapsed());
        effect();
    })
}

#[deprecated(note = "use `set_default_mount_app`")]
pub fn run_default_mount_effects(
    runner: &Arc<dyn LifecycleRunner>,
    url: impl Into<String>,
) -> SubscriptionId {
    warn!("run_default_mount_effects is deprecated, use set_default_mount_app instead");
    set_default_mount_app(runner, url)
}
