//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the vault.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the idea vault service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Deployment environment: "development" or "production".
    pub environment: String,

    /// HTTP server settings (bind address, timeouts, body limit).
    pub server: ServerConfig,

    /// Authentication settings.
    pub auth: AuthConfig,

    /// Rate limiting ceilings and windows.
    pub rate_limit: RateLimitConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,

    /// Idea persistence settings.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            security: SecurityConfig::default(),
            store: StoreConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl VaultConfig {
    /// True when running in the production environment.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_size: 64 * 1024,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared admin password gating all writes.
    ///
    /// Overridden by the `ADMIN_PASSWORD` environment variable. An empty
    /// value makes login fail with a server misconfiguration error.
    pub admin_password: String,

    /// Session cookie lifetime in seconds.
    pub session_max_age_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            admin_password: "dev-secret".to_string(),
            session_max_age_secs: 24 * 60 * 60,
        }
    }
}

/// Rate limiting configuration.
///
/// Two independent limiters: general write throttling and login-attempt
/// throttling. Each owns an isolated keyspace.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum write operations per window per client IP.
    pub write_ceiling: u32,

    /// Write throttling window in seconds.
    pub write_window_secs: u64,

    /// Maximum login attempts per window per client IP.
    pub login_ceiling: u32,

    /// Login throttling window in seconds.
    pub login_window_secs: u64,

    /// Interval between sweeps of expired buckets, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            write_ceiling: 20,
            write_window_secs: 60,
            login_ceiling: 5,
            login_window_secs: 15 * 60,
            sweep_interval_secs: 5 * 60,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Path prefixes exempt from security response headers.
    ///
    /// Prefixes ending in `/` match as directories; others match exactly.
    pub asset_prefixes: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            asset_prefixes: vec![
                "/static/".to_string(),
                "/assets/".to_string(),
                "/favicon.ico".to_string(),
            ],
        }
    }
}

/// Idea persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the flat JSON data file.
    ///
    /// Empty string disables persistence (in-memory only).
    pub data_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: "data/ideas.json".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_ceilings() {
        let config = VaultConfig::default();
        assert_eq!(config.rate_limit.write_ceiling, 20);
        assert_eq!(config.rate_limit.write_window_secs, 60);
        assert_eq!(config.rate_limit.login_ceiling, 5);
        assert_eq!(config.rate_limit.login_window_secs, 900);
        assert!(!config.is_production());
    }

    #[test]
    fn minimal_toml_parses_with_defaults() {
        let config: VaultConfig = toml::from_str(
            r#"
            environment = "production"

            [auth]
            admin_password = "s3cret"
            "#,
        )
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.auth.admin_password, "s3cret");
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.auth.session_max_age_secs, 86_400);
    }
}
