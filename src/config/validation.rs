//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ceilings > 0, addresses parse)
//! - Check environment names and asset prefix shapes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: VaultConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::VaultConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &VaultConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.environment != "development" && config.environment != "production" {
        errors.push(ValidationError {
            field: "environment",
            message: format!(
                "must be \"development\" or \"production\", got {:?}",
                config.environment
            ),
        });
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "server.bind_address",
            message: format!("not a valid socket address: {:?}", config.server.bind_address),
        });
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "server.request_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.server.max_body_size == 0 {
        errors.push(ValidationError {
            field: "server.max_body_size",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.auth.session_max_age_secs == 0 {
        errors.push(ValidationError {
            field: "auth.session_max_age_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    let rl = &config.rate_limit;
    for (field, value) in [
        ("rate_limit.write_ceiling", rl.write_ceiling as u64),
        ("rate_limit.write_window_secs", rl.write_window_secs),
        ("rate_limit.login_ceiling", rl.login_ceiling as u64),
        ("rate_limit.login_window_secs", rl.login_window_secs),
        ("rate_limit.sweep_interval_secs", rl.sweep_interval_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError {
                field,
                message: "must be greater than zero".to_string(),
            });
        }
    }

    for prefix in &config.security.asset_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError {
                field: "security.asset_prefixes",
                message: format!("prefix {:?} must start with '/'", prefix),
            });
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!(
                "not a valid socket address: {:?}",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
