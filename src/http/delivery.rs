//! Artifact delivery.
//!
//! Hands a resolved cache artifact to tower-http's `ServeFile`, which owns
//! content type, length, conditional requests and HEAD handling.

use std::path::Path;

use axum::{body::Body, http::Request, response::Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::AssetError;

/// Serve the file at `path` in response to `req`.
///
/// Directories are refused with [`AssetError::Forbidden`]; a file that has
/// vanished is left to `ServeFile`, which answers 404.
pub async fn deliver(req: Request<Body>, path: &Path) -> Result<Response, AssetError> {
    if let Ok(metadata) = tokio::fs::metadata(path).await {
        if metadata.is_dir() {
            return Err(AssetError::forbidden());
        }
    }

    let response = match ServeFile::new(path).oneshot(req).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    Ok(response.map(Body::new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};

    #[tokio::test]
    async fn test_deliver_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.css");
        std::fs::write(&path, "body{color:red}").unwrap();

        let req = Request::builder().uri("/x.css").body(Body::empty()).unwrap();
        let response = deliver(req, &path).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"body{color:red}");
    }

    #[tokio::test]
    async fn test_deliver_directory_forbidden() {
        let dir = tempfile::tempdir().unwrap();
        let req = Request::builder().uri("/css").body(Body::empty()).unwrap();
        let err = deliver(req, dir.path()).await.unwrap_err();
        assert!(matches!(err, AssetError::Forbidden));
    }
}
