//! Compilation pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! matched SourceMatch[]
//!     → compiler.rs (read files into AssetFile records)
//!     → stages of every matched route, in route order (stage.rs)
//!     → Transform::apply on a blocking worker (transforms.rs, catalog.rs)
//!     → write outputs under cache root (temp file + rename)
//!     → Return: path of the last artifact, or CompileError
//! ```
//!
//! # Design Decisions
//! - Transforms are opaque: they see the whole file set and may merge or rename
//! - A route without stages is an identity pass-through
//! - A failing stage aborts the chain before anything is written

pub mod catalog;
pub mod compiler;
pub mod stage;
pub mod transforms;

pub use catalog::TransformCatalog;
pub use compiler::{compile, compose, run_stages};
pub use stage::{AssetFile, PluginError, Stage, Transform};
pub use transforms::{Concat, FnTransform, MapTransform, MinifyCss};
