//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, rebase relative paths)
//!     → validation.rs (semantic checks)
//!     → AssetConfig (validated)
//!     → AssetConfig::options() (env defaults resolved once)
//!     → AssetOptions (immutable, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Options are immutable once resolved; no ambient environment reads later
//! - Everything but `root` has a default to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AssetConfig;
pub use schema::AssetOptions;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouteConfig;
pub use schema::StageConfig;
