//! Request resolution.
//!
//! # Responsibilities
//! - Decline methods other than GET/HEAD
//! - Select every route matching the trimmed request path
//! - Compute the effective source glob and the cache path of the artifact
//!
//! # Design Decisions
//! - Explicit route sources win; otherwise the requested file itself is the
//!   source, with its extension widened to all aliases
//! - The cache path keeps the requested (unaliased) extension
//! - Paths with empty or dot-prefixed segments never match, which also rules
//!   out `..` traversal

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::Method;

use crate::config::AssetOptions;
use crate::routing::alias::split_extension;
use crate::routing::matcher::{escape, SourceGlob};
use crate::routing::registry::RouteRegistry;
use crate::routing::route::Route;

/// Per-request resolution result. Owned by a single request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request path without leading/trailing slash.
    pub request_path: String,
    /// Matched routes, in registration order.
    pub routes: Vec<Arc<Route>>,
    /// Glob selecting the source files, relative to the asset root.
    pub source_glob: SourceGlob,
    /// Where the compiled artifact lives.
    pub cache_path: PathBuf,
}

/// Strip one leading and one trailing slash.
pub fn trim(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// Resolve a request, or return `None` when the middleware should decline.
pub fn resolve(
    registry: &RouteRegistry,
    options: &AssetOptions,
    method: &Method,
    path: &str,
) -> Option<RequestContext> {
    if method != Method::GET && method != Method::HEAD {
        return None;
    }

    let request_path = trim(path);
    // traversal guard: dot segments (`..`, `.well-known`, dotfiles) never resolve
    if !is_routable(request_path) {
        return None;
    }

    let routes = registry.matching(request_path);
    if routes.is_empty() {
        return None;
    }

    let explicit: Vec<&str> = routes.iter().filter_map(|r| r.source()).collect();
    let source_glob = if explicit.is_empty() {
        SourceGlob::new([derive_source(registry, request_path)])
    } else {
        SourceGlob::new(explicit)
    };
    let source_glob = match source_glob {
        Ok(glob) => glob,
        Err(err) => {
            tracing::debug!(path = %request_path, error = %err, "Unusable source glob");
            return None;
        }
    };

    Some(RequestContext {
        request_path: request_path.to_string(),
        cache_path: options.cache_root.join(request_path),
        routes,
        source_glob,
    })
}

/// The request path as a glob, its extension widened to every alias.
fn derive_source(registry: &RouteRegistry, request_path: &str) -> String {
    if let Some((stem, ext)) = split_extension(request_path) {
        if let Some(group) = registry.aliases().alternation(&ext.to_ascii_lowercase()) {
            return format!("{}.{}", escape(stem), group);
        }
    }
    escape(request_path)
}

fn is_routable(path: &str) -> bool {
    !path.is_empty()
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && !segment.starts_with('.'))
}
