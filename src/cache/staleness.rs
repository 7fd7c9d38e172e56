//! Mtime-based staleness detection for compiled artifacts.
//!
//! The artifact at the cache path is fresh when no matched source file is
//! strictly newer than it. There is no in-memory index: every decision is
//! derived from stat calls made for the current request.

use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

use crate::cache::sources::SourceMatch;
use crate::error::AssetError;

/// Outcome of a staleness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The cached artifact can be served as is.
    Fresh,
    /// No artifact exists yet.
    Missing,
    /// A source file is newer than the artifact.
    Stale,
    /// Rebuilds are forced by configuration.
    Forced,
}

impl Freshness {
    pub fn needs_compile(self) -> bool {
        !matches!(self, Freshness::Fresh)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Freshness::Fresh => "fresh",
            Freshness::Missing => "missing",
            Freshness::Stale => "stale",
            Freshness::Forced => "forced",
        }
    }
}

/// Latest modification time among `sources`; ties keep the earlier entry.
pub fn newest(sources: &[SourceMatch]) -> Option<SystemTime> {
    sources
        .iter()
        .filter_map(|source| source.modified)
        .reduce(|a, b| if b > a { b } else { a })
}

/// Decide whether the artifact at `cache_path` must be rebuilt.
///
/// Only a missing artifact is treated as a cache miss; any other stat
/// failure is surfaced as an I/O error.
pub async fn check(
    sources: &[SourceMatch],
    cache_path: &Path,
    force: bool,
) -> Result<Freshness, AssetError> {
    if force {
        return Ok(Freshness::Forced);
    }

    let cached = match tokio::fs::metadata(cache_path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Freshness::Missing),
        Err(err) => return Err(AssetError::io(cache_path, err)),
    };
    let cached_at = cached
        .modified()
        .map_err(|err| AssetError::io(cache_path, err))?;

    Ok(match newest(sources) {
        Some(source_at) if source_at > cached_at => Freshness::Stale,
        Some(_) => Freshness::Fresh,
        // nothing proves the artifact is current
        None => Freshness::Stale,
    })
}
