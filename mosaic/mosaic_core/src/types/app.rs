//! Application descriptors.

use std::fmt;
use std::sync::Arc;

use super::config::SandboxConfig;
use super::container::Container;

/// Opaque properties handed to every lifecycle hook of an app.
pub type AppProps = serde_json::Value;

/// Decides whether an app is active for a given location.
///
/// Locations are path strings such as `/orders/42?tab=items#top`.
///
/// ```
/// use mosaic_core::types::ActiveRule;
///
/// let rule = ActiveRule::prefix("/orders");
/// assert!(rule.matches("/orders"));
/// assert!(rule.matches("/orders/42?tab=items"));
/// assert!(!rule.matches("/orders-archive"));
/// ```
#[derive(Clone)]
pub struct ActiveRule {
    description: String,
    predicate: Arc<dyn Fn(&str) -> bool + Send + Sync>,
}

impl ActiveRule {
    /// Active when the location path starts with `prefix` at a segment boundary.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let description = format!("prefix:{}", prefix);
        Self {
            description,
            predicate: Arc::new(move |location: &str| {
                let Some(rest) = location.strip_prefix(prefix.as_str()) else {
                    return false;
                };
                prefix.ends_with('/')
                    || rest.is_empty()
                    || rest.starts_with(['/', '?', '#'])
            }),
        }
    }

    /// Active when the location path, without query or fragment, equals `path`.
    pub fn exact(path: impl Into<String>) -> Self {
        let path = path.into();
        let description = format!("exact:{}", path);
        Self {
            description,
            predicate: Arc::new(move |location: &str| {
                let end = location.find(['?', '#']).unwrap_or(location.len());
                location[..end] == path
            }),
        }
    }

    /// Active when any of `rules` is active.
    pub fn any_of(rules: Vec<ActiveRule>) -> Self {
        let description = rules
            .iter()
            .map(|r| r.description.as_str())
            .collect::<Vec<_>>()
            .join("|");
        Self {
            description,
            predicate: Arc::new(move |location: &str| rules.iter().any(|r| r.matches(location))),
        }
    }

    /// Active whenever `predicate` returns true.
    pub fn custom<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Never active. Used by apps that are only ever loaded imperatively.
    pub fn never() -> Self {
        Self::custom("never", |_| false)
    }

    /// Evaluate the rule against a location.
    pub fn matches(&self, location: &str) -> bool {
        (self.predicate)(location)
    }
}

impl fmt::Debug for ActiveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActiveRule({})", self.description)
    }
}

impl From<&str> for ActiveRule {
    fn from(prefix: &str) -> Self {
        Self::prefix(prefix)
    }
}

impl From<String> for ActiveRule {
    fn from(prefix: String) -> Self {
        Self::prefix(prefix)
    }
}

/// Callback toggled around the loading and mounting of an app.
#[derive(Clone)]
pub struct LoadingIndicator(Arc<dyn Fn(bool) + Send + Sync>);

impl LoadingIndicator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Report whether the app is loading.
    pub fn set(&self, loading: bool) {
        (self.0)(loading)
    }
}

impl fmt::Debug for LoadingIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LoadingIndicator")
    }
}

/// Everything the host knows about a micro-app.
///
/// Descriptors are built by the caller and not modified once handed to the
/// host.
#[derive(Clone)]
pub struct AppDescriptor {
    /// Unique name of the app
    pub name: String,

    /// Entry location handed to the resource loader
    pub entry: String,

    /// When the app is active; only used for registered apps
    pub active_rule: ActiveRule,

    /// Props passed to every lifecycle hook
    pub props: AppProps,

    /// Where the app renders, if anywhere
    pub container: Option<Container>,

    /// Loading indicator callback
    pub loader: Option<LoadingIndicator>,

    /// Per-app sandbox override
    pub sandbox: Option<SandboxConfig>,
}

impl AppDescriptor {
    pub fn new(name: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: entry.into(),
            active_rule: ActiveRule::never(),
            props: AppProps::Object(Default::default()),
            container: None,
            loader: None,
            sandbox: None,
        }
    }

    pub fn with_active_rule(mut self, rule: impl Into<ActiveRule>) -> Self {
        self.active_rule = rule.into();
        self
    }

    pub fn with_props(mut self, props: AppProps) -> Self {
        self.props = props;
        self
    }

    pub fn with_container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    pub fn with_loading_indicator<F>(mut self, f: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.loader = Some(LoadingIndicator::new(f));
        self
    }

    pub fn with_sandbox(mut self, sandbox: SandboxConfig) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    /// The loading indicator, or a no-op when none was supplied.
    pub fn loading_indicator(&self) -> LoadingIndicator {
        self.loader.clone().unwrap_or_else(LoadingIndicator::noop)
    }
}

impl fmt::Debug for AppDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppDescriptor")
            .field("name", &self.name)
            .field("entry", &self.entry)
            .field("active_rule", &self.active_rule)
            .field("props", &self.props)
            .field("container", &self.container)
            .field("sandbox", &self.sandbox)
            .finish()
    }
}
