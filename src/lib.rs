//! On-demand asset compilation middleware for Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (request id, trace, timeout)
//!                         │
//!                         ▼
//!                     http::middleware ──declined──▶ inner service
//!                         │
//!                         ▼
//!                     routing::resolve (routes, source glob, cache path)
//!                         │
//!                         ▼
//!                     cache::expand + cache::check (mtime staleness)
//!                         │ stale / missing
//!                         ▼
//!                     pipeline::compile (stages, atomic cache write)
//!                         │
//!                         ▼
//!     Client Response ◀── http::delivery (ServeFile on the artifact)
//! ```

pub mod assets;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod routing;

pub use assets::AssetServer;
pub use config::{AssetConfig, AssetOptions};
pub use error::{AssetError, CompileError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{AssetFile, PluginError, Transform, TransformCatalog};
pub use routing::{RegistryError, RouteRegistry};
