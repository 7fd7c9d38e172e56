//! The asset server: resolution, staleness and compilation for one request.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::Method;
use axum::Router;

use crate::cache::{self, Freshness, SourceMatch};
use crate::config::{AssetConfig, AssetOptions};
use crate::error::AssetError;
use crate::observability::metrics::{self, outcome};
use crate::pipeline::{compiler, TransformCatalog};
use crate::routing::{resolve, RegistryError, RequestContext, RouteRegistry};

/// Resolves asset requests to cached or freshly compiled artifacts.
#[derive(Debug, Clone)]
pub struct AssetServer {
    options: Arc<AssetOptions>,
    registry: Arc<RouteRegistry>,
}

impl AssetServer {
    pub fn new(options: AssetOptions, registry: RouteRegistry) -> Self {
        Self {
            options: Arc::new(options),
            registry: Arc::new(registry),
        }
    }

    /// Build a server from declarative configuration, looking stage
    /// transforms up in `catalog`.
    pub fn from_config(config: &AssetConfig, catalog: &TransformCatalog) -> Result<Self, RegistryError> {
        let options = config.options();
        let mut builder = RouteRegistry::builder(&options);
        builder.merge_aliases(&config.aliases)?;

        for route in &config.routes {
            let mut handle = builder.register(&route.pattern);
            if let Some(source) = &route.source {
                handle = handle.with_source(source.as_str());
            }
            for stage in &route.stages {
                let transform = catalog
                    .get(&stage.transform)
                    .ok_or_else(|| RegistryError::UnknownTransform(stage.transform.clone()))?;
                let enabled = !stage.production_only || options.production;
                handle = handle.using_if_with(enabled, transform, stage.args.iter().cloned());
            }
            handle.finish()?;
        }

        Ok(Self::new(options, builder.build()))
    }

    pub fn options(&self) -> &AssetOptions {
        &self.options
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Resolve a request to the artifact that should be delivered.
    ///
    /// `Ok(None)` means the request is not ours and should fall through.
    pub async fn lookup(&self, method: &Method, path: &str) -> Result<Option<PathBuf>, AssetError> {
        let Some(ctx) = resolve(&self.registry, &self.options, method, path) else {
            tracing::debug!(path = %path, "No routes matching request");
            metrics::record_request(outcome::DECLINED);
            return Ok(None);
        };

        let sources = cache::expand(&ctx.source_glob, &self.options).await?;
        if sources.is_empty() {
            if self.options.strict {
                return Err(AssetError::not_found());
            }
            tracing::debug!(path = %path, source = %ctx.source_glob, "No source files");
            metrics::record_request(outcome::DECLINED);
            return Ok(None);
        }

        let freshness = cache::check(&sources, &ctx.cache_path, self.options.force).await?;
        if freshness == Freshness::Fresh {
            tracing::debug!(cache_path = %ctx.cache_path.display(), "Serving cached artifact");
            metrics::record_request(outcome::HIT);
            return Ok(Some(ctx.cache_path));
        }

        tracing::debug!(
            source = %ctx.source_glob,
            reason = freshness.as_str(),
            stages = ctx.routes.iter().map(|r| r.stages().len()).sum::<usize>(),
            "Compiling"
        );
        match self.compile_detached(&ctx, sources).await? {
            Some(output) => {
                tracing::debug!(
                    source = %ctx.source_glob,
                    output = %output.display(),
                    "Compiled"
                );
                metrics::record_request(outcome::COMPILED);
                Ok(Some(output))
            }
            None => {
                metrics::record_request(outcome::DECLINED);
                Ok(None)
            }
        }
    }

    /// Compile on a separate task, so a dropped request only discards the
    /// result and the pipeline still runs to completion.
    async fn compile_detached(
        &self,
        ctx: &RequestContext,
        sources: Vec<SourceMatch>,
    ) -> Result<Option<PathBuf>, AssetError> {
        let ctx = ctx.clone();
        let options = Arc::clone(&self.options);
        tokio::spawn(async move { compiler::compile(&ctx, &sources, &options).await })
            .await
            .map_err(|err| AssetError::internal(format!("compilation task failed: {err}")))?
    }

    /// Wrap `router` with the asset middleware.
    pub fn attach(self: &Arc<Self>, router: Router) -> Router {
        router.layer(axum::middleware::from_fn_with_state(
            Arc::clone(self),
            crate::http::middleware::asset_middleware,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RouteConfig, StageConfig};

    #[test]
    fn test_from_config_registers_routes() {
        let mut config = AssetConfig::new("/srv/assets");
        config.production = Some(false);
        config.aliases.insert("js".to_string(), vec!["ts".to_string()]);
        config.routes.push(RouteConfig {
            pattern: "libraries.js".to_string(),
            source: Some("js/libraries/*.js".to_string()),
            stages: vec![
                StageConfig {
                    transform: "concat".to_string(),
                    args: vec![serde_json::json!("libraries.js")],
                    production_only: false,
                },
                StageConfig {
                    transform: "minify-css".to_string(),
                    args: Vec::new(),
                    production_only: true,
                },
            ],
        });

        let server = AssetServer::from_config(&config, &TransformCatalog::builtin()).unwrap();
        let routes = server.registry().routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].pattern(), "libraries.{js,coffee,ts}");
        assert_eq!(routes[0].stages().len(), 1);
        assert_eq!(routes[0].stages()[0].name(), "concat");
    }

    #[test]
    fn test_from_config_unknown_transform() {
        let mut config = AssetConfig::new("/srv/assets");
        config.routes.push(RouteConfig {
            pattern: "*.css".to_string(),
            source: None,
            stages: vec![StageConfig {
                transform: "sass".to_string(),
                args: Vec::new(),
                production_only: false,
            }],
        });

        let err = AssetServer::from_config(&config, &TransformCatalog::builtin()).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownTransform(name) if name == "sass"));
    }
}
