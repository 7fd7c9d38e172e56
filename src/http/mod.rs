//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, trace, timeout)
//!     → middleware.rs (asset lookup: resolve, check, compile)
//!         → delivery.rs (ServeFile on the cache artifact)
//!         → inner service (declined requests)
//!     → Send to client
//! ```

pub mod delivery;
pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::asset_middleware;
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
