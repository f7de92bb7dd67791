//! Framework configuration.
//!
//! `StartOptions` holds what the caller supplied to `start`; every recognised
//! key is optional. `FrameworkConfig` is the finalized configuration produced
//! by merging those options over the defaults:
//!
//! ```text
//! { prefetch: true, singular: true, sandbox: true, url_reroute_only: true }
//! ```
//!
//! Unrecognised keys are kept as loader options and forwarded verbatim to the
//! resource loader.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Opaque options forwarded to the resource loader and prefetch strategy.
pub type LoaderOptions = serde_json::Map<String, serde_json::Value>;

/// When and what to prefetch.
///
/// Serialised as `false`, `true`, `"all"` or a list of app names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PrefetchRepr", into = "PrefetchRepr")]
pub enum PrefetchMode {
    /// No prefetching
    Disabled,
    /// Prefetch the remaining apps once the first app has mounted
    AfterFirstMount,
    /// Prefetch every registered app right away
    All,
    /// Prefetch the named apps once the first app has mounted
    Apps(Vec<String>),
}

impl PrefetchMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl Default for PrefetchMode {
    fn default() -> Self {
        Self::AfterFirstMount
    }
}

impl From<bool> for PrefetchMode {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::AfterFirstMount
        } else {
            Self::Disabled
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PrefetchRepr {
    Flag(bool),
    Keyword(String),
    Apps(Vec<String>),
}

impl TryFrom<PrefetchRepr> for PrefetchMode {
    type Error = String;

    fn try_from(repr: PrefetchRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            PrefetchRepr::Flag(enabled) => Ok(enabled.into()),
            PrefetchRepr::Keyword(keyword) if keyword == "all" => Ok(Self::All),
            PrefetchRepr::Keyword(keyword) => Err(format!("unknown prefetch mode: {}", keyword)),
            PrefetchRepr::Apps(apps) => Ok(Self::Apps(apps)),
        }
    }
}

impl From<PrefetchMode> for PrefetchRepr {
    fn from(mode: PrefetchMode) -> Self {
        match mode {
            PrefetchMode::Disabled => Self::Flag(false),
            PrefetchMode::AfterFirstMount => Self::Flag(true),
            PrefetchMode::All => Self::Keyword("all".to_string()),
            PrefetchMode::Apps(apps) => Self::Apps(apps),
        }
    }
}

/// Sandbox tuning knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxOptions {
    /// Snapshot-based isolation instead of proxy-based isolation
    pub loose: bool,

    /// Render each app inside its own shadow root
    pub strict_style_isolation: bool,

    /// Rewrite app styles with a scoping prefix
    pub experimental_style_isolation: bool,

    /// Skip global variable interception for speed
    pub speedy: bool,
}

/// Sandbox configuration.
///
/// Serialised as `true`, `false` or a [`SandboxOptions`] object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SandboxRepr", into = "SandboxRepr")]
pub enum SandboxConfig {
    Disabled,
    Enabled(SandboxOptions),
}

impl SandboxConfig {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    pub fn is_loose(&self) -> bool {
        matches!(self, Self::Enabled(options) if options.loose)
    }

    /// Switch to loose isolation, keeping every other option.
    pub fn downgrade_to_loose(&mut self) {
        match self {
            Self::Enabled(options) => options.loose = true,
            Self::Disabled => {
                *self = Self::Enabled(SandboxOptions {
                    loose: true,
                    ..Default::default()
                })
            }
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self::Enabled(SandboxOptions::default())
    }
}

impl From<bool> for SandboxConfig {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::default()
        } else {
            Self::Disabled
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SandboxRepr {
    Flag(bool),
    Options(SandboxOptions),
}

impl From<SandboxRepr> for SandboxConfig {
    fn from(repr: SandboxRepr) -> Self {
        match repr {
            SandboxRepr::Flag(enabled) => enabled.into(),
            SandboxRepr::Options(options) => Self::Enabled(options),
        }
    }
}

impl From<SandboxConfig> for SandboxRepr {
    fn from(config: SandboxConfig) -> Self {
        match config {
            SandboxConfig::Disabled => Self::Flag(false),
            SandboxConfig::Enabled(options) => Self::Options(options),
        }
    }
}

/// Options supplied to `start`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefetch: Option<PrefetchMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<SandboxConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_reroute_only: Option<bool>,

    /// Cache loaded apps by name only. Experimental.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_lifecycle_by_app_name: Option<bool>,

    /// Everything else, forwarded to the resource loader
    #[serde(flatten)]
    pub loader_options: LoaderOptions,
}

impl StartOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefetch(mut self, mode: impl Into<PrefetchMode>) -> Self {
        self.prefetch = Some(mode.into());
        self
    }

    pub fn singular(mut self, singular: bool) -> Self {
        self.singular = Some(singular);
        self
    }

    pub fn sandbox(mut self, sandbox: impl Into<SandboxConfig>) -> Self {
        self.sandbox = Some(sandbox.into());
        self
    }

    pub fn url_reroute_only(mut self, enabled: bool) -> Self {
        self.url_reroute_only = Some(enabled);
        self
    }

    pub fn cache_lifecycle_by_app_name(mut self, enabled: bool) -> Self {
        self.cache_lifecycle_by_app_name = Some(enabled);
        self
    }

    pub fn loader_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.loader_options.insert(key.into(), value);
        self
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if let Some(PrefetchMode::Apps(apps)) = &self.prefetch {
            if apps.is_empty() {
                return Err(ConfigError::Invalid(
                    "Prefetch app list cannot be empty".to_string(),
                )
                .into());
            }
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}

/// The finalized framework configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkConfig {
    #[serde(default)]
    pub prefetch: PrefetchMode,

    #[serde(default = "default_true")]
    pub singular: bool,

    #[serde(default)]
    pub sandbox: SandboxConfig,

    #[serde(default = "default_true")]
    pub url_reroute_only: bool,

    #[serde(default)]
    pub cache_lifecycle_by_app_name: bool,

    #[serde(flatten)]
    pub loader_options: LoaderOptions,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            prefetch: PrefetchMode::default(),
            singular: true,
            sandbox: SandboxConfig::default(),
            url_reroute_only: true,
            cache_lifecycle_by_app_name: false,
            loader_options: LoaderOptions::new(),
        }
    }
}

impl FrameworkConfig {
    /// Merge `options` over the defaults.
    pub fn from_options(options: StartOptions) -> Self {
        let mut config = Self::default();
        config.merge(options);
        config
    }

    /// Overwrite every key present in `options`.
    pub fn merge(&mut self, options: StartOptions) {
        if let Some(prefetch) = options.prefetch {
            self.prefetch = prefetch;
        }

        if let Some(singular) = options.singular {
            self.singular = singular;
        }

        if let Some(sandbox) = options.sandbox {
            self.sandbox = sandbox;
        }

        if let Some(url_reroute_only) = options.url_reroute_only {
            self.url_reroute_only = url_reroute_only;
        }

        if let Some(by_name) = options.cache_lifecycle_by_app_name {
            self.cache_lifecycle_by_app_name = by_name;
        }

        for (key, value) in options.loader_options {
            self.loader_options.insert(key, value);
        }
    }

    /// The configuration used by imperative loads: same as this one, but never
    /// singular.
    pub fn for_imperative_load(&self) -> Self {
        Self {
            singular: false,
            ..self.clone()
        }
    }
}
