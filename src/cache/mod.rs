//! Artifact cache subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext.source_glob
//!     → sources.rs (walk asset root, collect matches + mtimes)
//!     → no matches: decline
//! RequestContext.cache_path
//!     → staleness.rs (force flag, stat artifact, newest source vs artifact)
//!     → Fresh: serve artifact | Missing/Stale/Forced: compile
//! ```
//!
//! # Design Decisions
//! - The filesystem is the only cache index
//! - Compilation is never speculative: only provably absent, stale or forced
//!   artifacts are rebuilt
//! - Concurrent misses for the same artifact each rebuild; the last write wins

pub mod sources;
pub mod staleness;

pub use sources::{expand, SourceMatch};
pub use staleness::{check, newest, Freshness};
