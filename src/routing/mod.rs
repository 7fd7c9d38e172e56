//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     alias(ext, alias)        → alias.rs (symmetric extension groups)
//!     register(pattern)        → registry.rs (alias-expanded pattern)
//!         .with_source/.using  → route.rs (immutable Route snapshot)
//!     build()                  → RouteRegistry (frozen, shared via Arc)
//!
//! Incoming Request (method, path)
//!     → resolver.rs (GET/HEAD only, trim slashes)
//!     → matcher.rs (full glob match against every route)
//!     → Return: RequestContext or decline
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Every matching route contributes, not just the first
//! - Deterministic: same input always yields the same routes, in registration order

pub mod alias;
pub mod matcher;
pub mod registry;
pub mod resolver;
pub mod route;

pub use alias::AliasTable;
pub use matcher::{PathMatcher, SourceGlob};
pub use registry::{RegistryBuilder, RegistryError, RouteHandle, RouteRegistry};
pub use resolver::{resolve, RequestContext};
pub use route::Route;
