//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use asset_server::{AssetOptions, AssetServer, RouteRegistry};
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

/// Body the host's fallback answers with when the middleware declines.
pub const FALLTHROUGH: &str = "fallthrough";

/// A temporary asset root.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn options(&self) -> AssetOptions {
        AssetOptions::new(self.root()).production(false)
    }

    /// Write a source file with an mtime an hour in the past, so artifacts
    /// compiled afterwards are strictly newer.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        set_mtime(&path, SystemTime::now() - Duration::from_secs(3600));
        path
    }

    pub fn cache_path(&self, relative: &str) -> PathBuf {
        self.options().cache_root.join(relative)
    }

    pub fn read_cache(&self, relative: &str) -> String {
        std::fs::read_to_string(self.cache_path(relative)).unwrap()
    }
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// A host application with the asset middleware in front of a plain 404.
pub fn app(options: AssetOptions, registry: RouteRegistry) -> Router {
    let server = Arc::new(AssetServer::new(options, registry));
    server.attach(Router::new().fallback(|| async { (StatusCode::NOT_FOUND, FALLTHROUGH) }))
}

pub async fn request(app: &Router, method: Method, uri: &str) -> (StatusCode, HeaderMap, String) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    request(app, Method::GET, uri).await
}
