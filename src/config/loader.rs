//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::VaultConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Apply environment variable overrides.
///
/// `ADMIN_PASSWORD` replaces the configured password, `VAULT_ENV` replaces
/// the environment name. Secrets belong in the environment, not on disk.
pub fn apply_env_overrides(config: &mut VaultConfig) {
    if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
        config.auth.admin_password = password;
    }
    if let Ok(environment) = std::env::var("VAULT_ENV") {
        config.environment = environment;
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<VaultConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: VaultConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
