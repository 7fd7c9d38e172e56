//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check value ranges (timeouts > 0, addresses parse)
//! - Reject layouts where the cache would shadow the sources
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AssetConfig → Result<(), Vec<ValidationError>>
//! - Transform names are checked later, against the catalog in use

use std::net::SocketAddr;

use crate::config::schema::AssetConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("root must not be empty")]
    EmptyRoot,

    #[error("cache root must differ from the asset root")]
    CacheIsRoot,

    #[error("route #{index}: pattern must not be empty")]
    EmptyPattern { index: usize },

    #[error("route #{index}: stage transform name must not be empty")]
    EmptyTransform { index: usize },

    #[error("invalid {field} `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("listener.request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Validate `config`, collecting every problem found.
pub fn validate_config(config: &AssetConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.root.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyRoot);
    }
    if config.cache.as_ref() == Some(&config.root) {
        errors.push(ValidationError::CacheIsRoot);
    }

    for (index, route) in config.routes.iter().enumerate() {
        if route.pattern.trim().is_empty() {
            errors.push(ValidationError::EmptyPattern { index });
        }
        if route.stages.iter().any(|s| s.transform.trim().is_empty()) {
            errors.push(ValidationError::EmptyTransform { index });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
