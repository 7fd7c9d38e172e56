//! Route registration and lookup.
//!
//! # Responsibilities
//! - Own the alias table while routes are being registered
//! - Expand each pattern through the alias table and snapshot it as a [`Route`]
//! - Return every route matching a request path, in registration order
//!
//! # Design Decisions
//! - Registration happens through a builder; the built registry is immutable
//!   and shared across requests without locks
//! - Conditional stages are decided when they are registered, not per request
//! - No filesystem access during registration

use std::sync::Arc;

use serde_json::Value;

use crate::config::AssetOptions;
use crate::pipeline::{Stage, Transform};
use crate::routing::alias::AliasTable;
use crate::routing::matcher::{build_glob, PatternMatcher};
use crate::routing::route::Route;

/// Errors raised while building the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid glob `{pattern}`: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("unknown transform `{0}`")]
    UnknownTransform(String),
}

/// Immutable, ordered collection of routes plus the alias table they were
/// expanded with.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    routes: Vec<Arc<Route>>,
    aliases: AliasTable,
}

impl RouteRegistry {
    /// Start building a registry. The default aliases are pre-registered.
    pub fn builder(options: &AssetOptions) -> RegistryBuilder {
        RegistryBuilder {
            routes: Vec::new(),
            aliases: AliasTable::with_defaults(),
            production: options.production,
        }
    }

    /// Every route whose pattern matches `path`, in registration order.
    pub fn matching(&self, path: &str) -> Vec<Arc<Route>> {
        self.routes
            .iter()
            .filter(|route| route.matches(path))
            .cloned()
            .collect()
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Mutable registration phase of a [`RouteRegistry`].
#[derive(Debug)]
pub struct RegistryBuilder {
    routes: Vec<Arc<Route>>,
    aliases: AliasTable,
    production: bool,
}

impl RegistryBuilder {
    /// Declare `alias` equivalent to `ext` for routes registered afterwards.
    pub fn alias(&mut self, ext: &str, alias: &str) -> Result<&mut Self, RegistryError> {
        self.aliases.alias(ext, alias)?;
        Ok(self)
    }

    /// Merge a whole `ext -> [aliases]` mapping.
    pub fn merge_aliases<I, K, V, A>(&mut self, map: I) -> Result<&mut Self, RegistryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        self.aliases.merge(map)?;
        Ok(self)
    }

    /// Begin a route for `pattern`. The route is added by [`RouteHandle::finish`].
    pub fn register(&mut self, pattern: &str) -> RouteHandle<'_> {
        let pattern = pattern.strip_prefix('/').unwrap_or(pattern);
        RouteHandle {
            pattern: self.aliases.expand(pattern),
            source: None,
            stages: Vec::new(),
            production: self.production,
            builder: self,
        }
    }

    /// Freeze the registration phase.
    pub fn build(self) -> RouteRegistry {
        RouteRegistry {
            routes: self.routes,
            aliases: self.aliases,
        }
    }
}

/// Builder for a single route, borrowed from a [`RegistryBuilder`].
#[must_use = "a route is only registered once `finish` is called"]
pub struct RouteHandle<'a> {
    builder: &'a mut RegistryBuilder,
    pattern: String,
    source: Option<String>,
    stages: Vec<Stage>,
    production: bool,
}

impl RouteHandle<'_> {
    /// Compile from `glob` (relative to the asset root) instead of the
    /// requested file.
    pub fn with_source(mut self, glob: impl Into<String>) -> Self {
        self.source = Some(glob.into());
        self
    }

    /// Append a stage without arguments.
    pub fn using(self, transform: impl Transform + 'static) -> Self {
        self.using_with(transform, Vec::<Value>::new())
    }

    /// Append a stage with arguments.
    pub fn using_with<I, A>(mut self, transform: impl Transform + 'static, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Value>,
    {
        self.stages.push(Stage::new(transform, args));
        self
    }

    /// Append a stage only if `predicate` holds now.
    pub fn using_if(self, predicate: bool, transform: impl Transform + 'static) -> Self {
        self.using_if_with(predicate, transform, Vec::<Value>::new())
    }

    /// Append a stage with arguments only if `predicate` holds now.
    pub fn using_if_with<I, A>(
        self,
        predicate: bool,
        transform: impl Transform + 'static,
        args: I,
    ) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Value>,
    {
        if !predicate {
            return self;
        }
        self.using_with(transform, args)
    }

    /// Append a stage only when the server runs in production mode.
    pub fn production_only(self, transform: impl Transform + 'static) -> Self {
        let production = self.production;
        self.using_if(production, transform)
    }

    /// Validate the globs and add the route to the registry.
    pub fn finish(self) -> Result<(), RegistryError> {
        let matcher = PatternMatcher::new(self.pattern.as_str()).map_err(|source| {
            RegistryError::InvalidGlob {
                pattern: self.pattern.clone(),
                source,
            }
        })?;
        if let Some(source) = &self.source {
            if source.is_empty() {
                return Err(RegistryError::InvalidArgument(
                    "source glob must not be empty".to_string(),
                ));
            }
            build_glob(source).map_err(|err| RegistryError::InvalidGlob {
                pattern: source.clone(),
                source: err,
            })?;
        }

        tracing::debug!(
            pattern = %self.pattern,
            source = ?self.source,
            stages = self.stages.len(),
            "Route registered"
        );
        self.builder
            .routes
            .push(Arc::new(Route::new(matcher, self.source, self.stages)));
        Ok(())
    }
}
