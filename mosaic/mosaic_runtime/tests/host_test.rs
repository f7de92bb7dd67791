//! End-to-end tests of the micro-app host driving the bundled router.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::NamedTempFile;

use mosaic_core::error::LoadError;
use mosaic_core::traits::{LifecycleFactory, LifecycleRunner, ResourceLoader};
use mosaic_core::types::{
    hook, AppDescriptor, AppLifecycles, AppStatus, Container, FrameworkConfig,
    FrameworkLifecycles, PrefetchMode, StartOptions,
};
use mosaic_core::utils::{init_logging, LogLevel};
use mosaic_core::Result;
use mosaic_runtime::router::Router;
use mosaic_runtime::system::GateState;
use mosaic_runtime::MicroAppHost;

fn init_tracing() {
    init_logging(LogLevel::Debug);
}

type Log = Arc<Mutex<Vec<String>>>;

/// Loader recording loads and hook calls as strings.
struct TrackingLoader {
    log: Log,
    loads: AtomicUsize,
    delay: Duration,
    fail: Vec<String>,
}

impl TrackingLoader {
    fn new(log: Log) -> Self {
        Self {
            log,
            loads: AtomicUsize::new(0),
            delay: Duration::ZERO,
            fail: Vec::new(),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn failing(mut self, app: &str) -> Self {
        self.fail.push(app.to_string());
        self
    }

    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

fn record(log: &Log, entry: String) -> mosaic_core::types::LifecycleFn {
    let log = log.clone();
    hook(move |_| {
        log.lock().push(entry.clone());
        async { Ok(()) }
    })
}

#[async_trait]
impl ResourceLoader for TrackingLoader {
    async fn load(
        &self,
        app: AppDescriptor,
        _config: FrameworkConfig,
        _lifecycles: Option<Arc<FrameworkLifecycles>>,
    ) -> Result<Arc<dyn LifecycleFactory>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push(format!("load:{}", app.name));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail.contains(&app.name) {
            return Err(LoadError::FetchFailed {
                app: app.name,
                entry: app.entry,
                reason: "503".to_string(),
            }
            .into());
        }

        let log = self.log.clone();
        let name = app.name;
        let factory = move |container: Option<&Container>| {
            let place = container
                .and_then(Container::locator)
                .map(|l| format!("@{}", l))
                .unwrap_or_default();
            AppLifecycles::new()
                .with_bootstrap(record(&log, format!("bootstrap:{}", name)))
                .with_mount(record(&log, format!("mount:{}{}", name, place)))
                .with_unmount(record(&log, format!("unmount:{}{}", name, place)))
        };
        Ok(Arc::new(factory))
    }
}

fn slot(index: usize) -> Container {
    Container::root("html").child("body", 1).child("div", index)
}

async fn eventually<F>(condition: F)
where
    F: Fn() -> bool,
{
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn test_bootstrap_waits_for_start() {
    init_tracing();

    let log = Log::default();
    let router = Router::new("/orders");
    let host = MicroAppHost::new(
        Arc::new(TrackingLoader::new(log.clone())),
        Arc::new(router.clone()),
    );

    let indicator = Log::default();
    host.register_micro_apps(
        vec![AppDescriptor::new("orders", "//orders")
            .with_active_rule("/orders")
            .with_loading_indicator({
                let indicator = indicator.clone();
                move |loading| indicator.lock().push(format!("loading:{}", loading))
            })],
        None,
    );

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(host.start_gate_state(), GateState::Pending);
    assert!(log.lock().is_empty());

    host.start(StartOptions::new()).unwrap();
    router.settled().await;

    // Registered after start: passes the gate straight away
    host.register_micro_apps(
        vec![AppDescriptor::new("sidebar", "//sidebar").with_active_rule("/")],
        None,
    );
    router.settled().await;

    assert_eq!(router.mounted_apps(), vec!["orders", "sidebar"]);
    assert_eq!(
        *log.lock(),
        vec![
            "load:orders",
            "bootstrap:orders",
            "mount:orders",
            "load:sidebar",
            "bootstrap:sidebar",
            "mount:sidebar",
        ]
    );

    // The adapter switches the indicator on while loading, the wrapped mount
    // phase brackets the mount hooks
    assert_eq!(
        *indicator.lock(),
        vec!["loading:true", "loading:true", "loading:false"]
    );
}

#[tokio::test]
async fn test_duplicate_registration_keeps_first() {
    let log = Log::default();
    let router = Router::new("/");
    let host = MicroAppHost::new(Arc::new(TrackingLoader::new(log)), Arc::new(router.clone()));

    assert_eq!(
        host.register_micro_apps(vec![AppDescriptor::new("orders", "//orders")], None),
        1
    );
    assert_eq!(
        host.register_micro_apps(
            vec![
                AppDescriptor::new("orders", "//elsewhere"),
                AppDescriptor::new("billing", "//billing"),
            ],
            None,
        ),
        1
    );

    let names: Vec<String> = host.registered_apps().into_iter().map(|a| a.name).collect();
    assert_eq!(names, vec!["orders", "billing"]);
    assert_eq!(host.registered_apps()[0].entry, "//orders");
}

#[tokio::test]
async fn test_default_mount_app() {
    let log = Log::default();
    let router = Router::new("/");
    let host = MicroAppHost::new(Arc::new(TrackingLoader::new(log.clone())), Arc::new(router.clone()));

    host.register_micro_apps(
        vec![AppDescriptor::new("home", "//home").with_active_rule("/home")],
        None,
    );
    host.set_default_mount_app("/home");

    let first_mounts = Arc::new(AtomicUsize::new(0));
    host.run_after_first_mounted({
        let first_mounts = first_mounts.clone();
        move || {
            first_mounts.fetch_add(1, Ordering::SeqCst);
        }
    });

    host.start(StartOptions::new()).unwrap();
    eventually(|| router.mounted_apps() == vec!["home".to_string()]).await;
    assert_eq!(router.location(), "/home");

    router.navigate("/").await;
    router.navigate("/home").await;
    router.navigate("/").await;

    // Neither effect fires twice
    assert_eq!(router.location(), "/");
    assert_eq!(first_mounts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_loads_fetch_once() {
    let log = Log::default();
    let loader = Arc::new(TrackingLoader::new(log.clone()).with_delay(Duration::from_millis(20)));
    let host = MicroAppHost::new(loader.clone(), Arc::new(Router::default()));

    let app = AppDescriptor::new("widget", "//widget").with_container(slot(3));
    let first = host.load_micro_app(app.clone(), None, None);
    let second = host.load_micro_app(app, None, None);

    first.when_mounted().await.unwrap();
    second.when_mounted().await.unwrap();

    assert_eq!(loader.loads(), 1);
    let bootstraps = log.lock().iter().filter(|e| e.starts_with("bootstrap")).count();
    assert_eq!(bootstraps, 1);
}

#[tokio::test]
async fn test_cache_by_app_name_bootstraps_once() {
    let log = Log::default();
    let loader = Arc::new(TrackingLoader::new(log.clone()));
    let host = MicroAppHost::new(loader.clone(), Arc::new(Router::default()));
    host.start(StartOptions::new().cache_lifecycle_by_app_name(true))
        .unwrap();

    let app = AppDescriptor::new("widget", "//widget");
    let left = host.load_micro_app(app.clone().with_container(slot(1)), None, None);
    left.when_mounted().await.unwrap();
    let right = host.load_micro_app(app.with_container(slot(2)), None, None);
    right.when_mounted().await.unwrap();

    assert_eq!(loader.loads(), 1);
    assert_eq!(
        *log.lock(),
        vec![
            "load:widget",
            "bootstrap:widget",
            "mount:widget@/html[1]/body[1]/div[1]",
            "mount:widget@/html[1]/body[1]/div[2]",
        ]
    );

    right.unmount().await.unwrap();
    assert_eq!(right.status(), AppStatus::NotMounted);
    assert_eq!(left.status(), AppStatus::Mounted);
}

#[tokio::test]
async fn test_unmount_immediately_after_load() {
    let log = Log::default();
    let host = MicroAppHost::new(
        Arc::new(TrackingLoader::new(log.clone()).with_delay(Duration::from_millis(10))),
        Arc::new(Router::default()),
    );

    let app = host.load_micro_app(
        AppDescriptor::new("widget", "//widget").with_container(slot(4)),
        None,
        None,
    );
    app.unmount().await.unwrap();

    assert_eq!(app.status(), AppStatus::NotMounted);
    assert_eq!(
        *log.lock(),
        vec![
            "load:widget",
            "bootstrap:widget",
            "mount:widget@/html[1]/body[1]/div[4]",
            "unmount:widget@/html[1]/body[1]/div[4]",
        ]
    );
}

#[tokio::test]
async fn test_failed_imperative_load() {
    let log = Log::default();
    let loader = Arc::new(TrackingLoader::new(log).failing("widget"));
    let host = MicroAppHost::new(loader.clone(), Arc::new(Router::default()));

    let app = AppDescriptor::new("widget", "//widget").with_container(slot(1));
    let first = host.load_micro_app(app.clone(), None, None);
    let err = first.when_mounted().await.unwrap_err();
    assert!(err.to_string().contains("503"));
    assert_eq!(first.status(), AppStatus::LoadError);

    // The failed entry was evicted, so the next load fetches again
    let second = host.load_micro_app(app, None, None);
    assert!(second.when_mounted().await.is_err());
    assert_eq!(loader.loads(), 2);
}

#[tokio::test]
async fn test_imperative_load_before_start_starts_router() {
    let router = Router::new("/");
    let host = MicroAppHost::new(
        Arc::new(TrackingLoader::new(Log::default())),
        Arc::new(router.clone()),
    );

    let app = host.load_micro_app(
        AppDescriptor::new("widget", "//widget").with_container(slot(1)),
        None,
        None,
    );
    app.when_mounted().await.unwrap();

    assert!(router.is_started());
    assert!(!host.is_started());
    assert_eq!(host.start_gate_state(), GateState::Pending);
}

#[tokio::test]
async fn test_start_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "prefetch": "all", "singular": false, "sandbox": {{ "strict_style_isolation": true }}, "fetch_timeout": 5000 }}"#
    )
    .unwrap();

    let host = MicroAppHost::new(
        Arc::new(TrackingLoader::new(Log::default())),
        Arc::new(Router::default()),
    );
    host.start_from_file(file.path().to_str()).await.unwrap();

    let config = host.configuration();
    assert_eq!(config.prefetch, PrefetchMode::All);
    assert!(!config.singular);
    assert!(config.sandbox.is_enabled());
    assert!(config.url_reroute_only);
    assert_eq!(config.loader_options["fetch_timeout"], 5000);
    assert!(host.is_started());
}
