//! Pipeline execution and cache materialization.
//!
//! # Responsibilities
//! - Load matched sources as [`AssetFile`] records
//! - Run the concatenated stages of all matched routes
//! - Write the outputs under the cache root, mirroring relative paths
//!
//! # Design Decisions
//! - Stages run on a blocking worker; file I/O stays on the async runtime
//! - Nothing is written unless every stage succeeded
//! - Every output is written to a unique temp file first; renames start only
//!   once all of them are written, so neither a failed compile nor a
//!   concurrent one exposes a partial artifact set

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::cache::SourceMatch;
use crate::config::AssetOptions;
use crate::error::AssetError;
use crate::observability::metrics;
use crate::pipeline::stage::{AssetFile, PluginError, Stage};
use crate::routing::{RequestContext, Route};

/// Stages of every route, in route order. Empty means identity.
pub fn compose(routes: &[Arc<Route>]) -> Vec<Stage> {
    routes
        .iter()
        .flat_map(|route| route.stages().iter().cloned())
        .collect()
}

/// Thread `files` through `stages`, stopping at the first failure.
pub fn run_stages(stages: &[Stage], files: Vec<AssetFile>) -> Result<Vec<AssetFile>, PluginError> {
    stages.iter().try_fold(files, |files, stage| stage.run(files))
}

/// Compile the sources of `ctx` into the cache.
///
/// Returns the path of the last artifact written, or `None` when the
/// pipeline produced no files.
pub async fn compile(
    ctx: &RequestContext,
    sources: &[SourceMatch],
    options: &AssetOptions,
) -> Result<Option<PathBuf>, AssetError> {
    let start = Instant::now();

    let mut files = Vec::with_capacity(sources.len());
    for source in sources {
        let path = options.root.join(&source.relative);
        let contents = tokio::fs::read(&path)
            .await
            .map_err(|err| AssetError::io(&path, err))?;
        files.push(AssetFile::new(&options.root, &source.relative, contents));
    }

    let stages = compose(&ctx.routes);
    let source_glob = ctx.source_glob.to_string();
    let outputs = tokio::task::spawn_blocking(move || run_stages(&stages, files))
        .await
        .map_err(|err| AssetError::internal(format!("compilation task failed: {err}")))?;

    let outputs = match outputs {
        Ok(outputs) => outputs,
        Err(err) => {
            tracing::warn!(
                source = %source_glob,
                plugin = err.plugin.as_deref().unwrap_or("unknown"),
                error = %err,
                "Compilation failed"
            );
            metrics::record_compile_error(err.plugin.as_deref().unwrap_or("unknown"));
            return Err(AssetError::compile(err, &source_glob));
        }
    };

    let result = publish(&options.cache_root, &outputs, &source_glob).await?;

    metrics::record_compile(start);
    Ok(result)
}

/// An output written to its temp file, waiting to be renamed into place.
struct Staged {
    tmp: PathBuf,
    dest: PathBuf,
}

/// Write every output to a temp file, then rename them all into place.
///
/// Nothing is renamed until every temp file is written; on failure the temp
/// files are removed and the cache is left as it was.
async fn publish(
    cache_root: &Path,
    outputs: &[AssetFile],
    source_glob: &str,
) -> Result<Option<PathBuf>, AssetError> {
    for file in outputs {
        if file.relative().file_name().is_none() || !is_contained(file.relative()) {
            let err = PluginError::new(format!(
                "output path `{}` escapes the cache root",
                file.relative().display()
            ))
            .with_kind("OutputError");
            return Err(AssetError::compile(err, source_glob));
        }
    }

    let mut staged = Vec::with_capacity(outputs.len());
    for file in outputs {
        match stage_artifact(cache_root, file).await {
            Ok(artifact) => staged.push(artifact),
            Err(err) => {
                discard(&staged).await;
                return Err(err);
            }
        }
    }

    let mut result = None;
    for (i, artifact) in staged.iter().enumerate() {
        if let Err(err) = tokio::fs::rename(&artifact.tmp, &artifact.dest).await {
            discard(&staged[i..]).await;
            return Err(AssetError::io(&artifact.dest, err));
        }
        result = Some(artifact.dest.clone());
    }
    Ok(result)
}

async fn stage_artifact(cache_root: &Path, file: &AssetFile) -> Result<Staged, AssetError> {
    let dest = cache_root.join(file.relative());
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| AssetError::io(parent, err))?;
    }

    let name = dest
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dest.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()));
    if let Err(err) = tokio::fs::write(&tmp, file.contents()).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(AssetError::io(&tmp, err));
    }
    Ok(Staged { tmp, dest })
}

async fn discard(staged: &[Staged]) {
    for artifact in staged {
        let _ = tokio::fs::remove_file(&artifact.tmp).await;
    }
}

fn is_contained(relative: &Path) -> bool {
    relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}
