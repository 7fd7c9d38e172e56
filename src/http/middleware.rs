//! The asset middleware.
//!
//! # Responsibilities
//! - Ask the [`AssetServer`] whether a request is an asset request
//! - Deliver the resolved artifact, or pass the request on unchanged
//! - Render failures as JSON error responses
//!
//! # Design Decisions
//! - Declined requests reach the inner service untouched
//! - The request path is used as received; percent-escapes are not decoded

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::assets::AssetServer;
use crate::error::AssetError;
use crate::http::delivery::deliver;
use crate::http::request::RequestIdExt;
use crate::observability::metrics::{self, outcome};

pub async fn asset_middleware(
    State(server): State<Arc<AssetServer>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = req.request_id().to_string();

    let result = match server.lookup(&method, &path).await {
        Ok(Some(artifact)) => {
            tracing::debug!(
                request_id = %request_id,
                path = %path,
                artifact = %artifact.display(),
                "Serving"
            );
            deliver(req, &artifact).await
        }
        Ok(None) => return next.run(req).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(response) => response,
        Err(err) => failure(&request_id, &path, err),
    }
}

fn failure(request_id: &str, path: &str, err: AssetError) -> Response {
    if err.status().is_server_error() {
        tracing::error!(request_id = %request_id, path = %path, error = %err, "Asset request failed");
    } else {
        tracing::debug!(request_id = %request_id, path = %path, error = %err, "Asset request refused");
    }
    metrics::record_request(outcome::ERROR);
    err.into_response()
}
