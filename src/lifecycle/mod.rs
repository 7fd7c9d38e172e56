//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → broadcast → HttpServer stops accepting → drain → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
