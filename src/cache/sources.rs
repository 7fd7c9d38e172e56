//! Source file discovery.
//!
//! Walks the asset root and collects every file matching a source glob,
//! together with its modification time.
//!
//! Each pattern is walked from its longest literal directory prefix, and no
//! deeper than its segment count unless it contains `**`. An entry that
//! matches but cannot be read fails the expansion instead of vanishing from
//! the source set.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use crate::config::AssetOptions;
use crate::error::AssetError;
use crate::routing::{PathMatcher, SourceGlob};

/// A source file matched by a glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMatch {
    /// Path relative to the asset root.
    pub relative: PathBuf,
    /// `None` when the file matched but could not be stat'ed.
    pub modified: Option<SystemTime>,
}

/// Expand `glob` against the asset root.
///
/// An empty result means nothing matched. Hidden entries, the cache root and
/// the dependencies root are never walked. Results are sorted by path.
pub async fn expand(glob: &SourceGlob, options: &AssetOptions) -> Result<Vec<SourceMatch>, AssetError> {
    let glob = glob.clone();
    let root = options.root.clone();
    let excluded = [options.cache_root.clone(), options.dependencies_root.clone()];

    tokio::task::spawn_blocking(move || walk(&glob, &root, &excluded))
        .await
        .map_err(|err| AssetError::internal(format!("source walk failed: {err}")))?
}

/// Where to start walking for one pattern, and how deep to go.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WalkPlan {
    /// Literal leading directories, relative to the root.
    prefix: PathBuf,
    /// `None` when the pattern can match at any depth.
    max_depth: Option<usize>,
}

impl WalkPlan {
    fn for_pattern(pattern: &str) -> Self {
        let segments: Vec<&str> = pattern.split('/').collect();
        let (dirs, _) = segments.split_at(segments.len() - 1);
        let literal = dirs
            .iter()
            .take_while(|segment| !segment.contains(['*', '?', '[', ']', '{', '}']))
            .count();

        let prefix: PathBuf = segments[..literal].iter().collect();
        let unbounded = pattern.contains("**") || alternation_spans_dirs(pattern);
        Self {
            prefix,
            max_depth: (!unbounded).then_some(segments.len() - literal),
        }
    }
}

/// Whether a `{..}` group contains a `/`, which makes depth unpredictable.
fn alternation_spans_dirs(pattern: &str) -> bool {
    let mut depth = 0usize;
    for c in pattern.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '/' if depth > 0 => return true,
            _ => {}
        }
    }
    false
}

fn walk(glob: &SourceGlob, root: &Path, excluded: &[PathBuf]) -> Result<Vec<SourceMatch>, AssetError> {
    let mut found = BTreeMap::new();
    for pattern in glob.patterns() {
        let plan = WalkPlan::for_pattern(pattern);
        if plan.prefix.components().any(|c| is_hidden(c.as_os_str())) {
            continue;
        }
        let base = root.join(&plan.prefix);
        if excluded.iter().any(|path| base.starts_with(path)) {
            continue;
        }
        walk_from(glob, root, &base, plan.max_depth, excluded, &mut found)?;
    }

    Ok(found
        .into_iter()
        .map(|(relative, modified)| SourceMatch { relative, modified })
        .collect())
}

fn walk_from(
    glob: &SourceGlob,
    root: &Path,
    base: &Path,
    max_depth: Option<usize>,
    excluded: &[PathBuf],
    found: &mut BTreeMap<PathBuf, Option<SystemTime>>,
) -> Result<(), AssetError> {
    let mut walker = WalkDir::new(base).follow_links(true).sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }
    let walker = walker
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !skipped(entry.path(), excluded));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                if err.depth() == 0 && err.io_error().is_some_and(|e| e.kind() == ErrorKind::NotFound) {
                    // base directory absent: nothing can match
                    return Ok(());
                }
                let Some(path) = err.path().map(Path::to_path_buf) else {
                    tracing::warn!(base = %base.display(), error = %err, "Skipping unreadable entry");
                    continue;
                };
                if skipped(&path, excluded) || !matches(glob, root, &path) {
                    tracing::warn!(path = %path.display(), error = %err, "Skipping unreadable entry");
                    continue;
                }
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("unreadable source entry"));
                return Err(AssetError::io(&path, source));
            }
        };
        if !entry.file_type().is_file() || !matches(glob, root, entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        found
            .entry(relative.to_path_buf())
            .or_insert_with(|| modified(&entry));
    }
    Ok(())
}

fn matches(glob: &SourceGlob, root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .is_ok_and(|relative| glob.matches(&slash_path(relative)))
}

fn modified(entry: &DirEntry) -> Option<SystemTime> {
    match entry.metadata().map_err(std::io::Error::from).and_then(|m| m.modified()) {
        Ok(modified) => Some(modified),
        Err(err) => {
            tracing::debug!(path = %entry.path().display(), error = %err, "Source stat failed");
            None
        }
    }
}

fn skipped(path: &Path, excluded: &[PathBuf]) -> bool {
    path.file_name().is_some_and(is_hidden) || excluded.iter().any(|dir| path == dir)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
