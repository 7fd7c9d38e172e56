//! Configuration schema definitions.
//!
//! This module defines the configuration file structure for the asset server
//! and the resolved [`AssetOptions`] threaded through the core.
//! All file types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable consulted for the default of `production`.
pub const PRODUCTION_ENV: &str = "APP_ENV";

/// Root configuration file for the asset server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetConfig {
    /// Asset source root (required).
    pub root: PathBuf,

    /// Compiled artifact root (default: `<root>/.cache`).
    #[serde(default)]
    pub cache: Option<PathBuf>,

    /// Dependencies root (default: `<root>/.dependencies`). Reserved.
    #[serde(default)]
    pub dependencies: Option<PathBuf>,

    /// Recompile on every request, skipping staleness checks.
    #[serde(default)]
    pub force: bool,

    /// Enable production-only stages (default: from `APP_ENV`).
    #[serde(default)]
    pub production: Option<bool>,

    /// Answer 404 instead of falling through when a route has no source file.
    #[serde(default)]
    pub strict: bool,

    /// Extra extension aliases, `ext = ["alias", ...]`.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,

    /// Declarative routes, registered in order.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    /// Listener configuration for the bundled host.
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AssetConfig {
    /// Minimal configuration for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: None,
            dependencies: None,
            force: false,
            production: None,
            strict: false,
            aliases: BTreeMap::new(),
            routes: Vec::new(),
            listener: ListenerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }

    /// Resolve defaults into the options used by the core.
    ///
    /// This is the only place the environment is consulted.
    pub fn options(&self) -> AssetOptions {
        let mut options = AssetOptions::new(&self.root)
            .force(self.force)
            .strict(self.strict)
            .production(self.production.unwrap_or_else(production_from_env));
        if let Some(cache) = &self.cache {
            options = options.with_cache(cache);
        }
        if let Some(dependencies) = &self.dependencies {
            options = options.with_dependencies(dependencies);
        }
        options
    }

    /// Make relative paths relative to `base` (the config file's directory).
    pub fn rebase(&mut self, base: &Path) {
        for path in [Some(&mut self.root), self.cache.as_mut(), self.dependencies.as_mut()]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// A route declared in the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// URL glob, matched against the request path.
    pub pattern: String,

    /// Source glob override, relative to the root.
    #[serde(default)]
    pub source: Option<String>,

    /// Stages, applied in order.
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

/// A stage declared in the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StageConfig {
    /// Name of a transform in the catalog.
    pub transform: String,

    /// Arguments passed to the transform.
    #[serde(default)]
    pub args: Vec<serde_json::Value>,

    /// Only register this stage in production.
    #[serde(default)]
    pub production_only: bool,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Resolved, immutable options shared by the registry and every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOptions {
    pub root: PathBuf,
    pub cache_root: PathBuf,
    pub dependencies_root: PathBuf,
    pub force: bool,
    pub production: bool,
    pub strict: bool,
}

impl AssetOptions {
    /// Options for `root` with default cache and dependencies roots.
    ///
    /// `production` starts off; only [`AssetConfig::options`] falls back to
    /// [`PRODUCTION_ENV`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            cache_root: root.join(".cache"),
            dependencies_root: root.join(".dependencies"),
            root,
            force: false,
            production: false,
            strict: false,
        }
    }

    pub fn with_cache(mut self, cache_root: impl Into<PathBuf>) -> Self {
        self.cache_root = cache_root.into();
        self
    }

    pub fn with_dependencies(mut self, dependencies_root: impl Into<PathBuf>) -> Self {
        self.dependencies_root = dependencies_root.into();
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

fn production_from_env() -> bool {
    std::env::var(PRODUCTION_ENV).is_ok_and(|env| env == "production")
}
