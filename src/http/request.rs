//! Request identification.
//!
//! # Responsibilities
//! - Name the request-id header shared by the tower-http layers
//! - Read the request id back out for log fields
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A missing or non-ASCII id reads as `"unknown"` rather than failing

use axum::http::{HeaderName, Request};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Access to the request id set by the request-id layer.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}
