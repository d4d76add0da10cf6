//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, apply env overrides)
//!     → validation.rs (semantic checks, all errors at once)
//!     → VaultConfig (validated, immutable)
//!     → shared via ArcSwap to the request path
//!
//! On reload signal:
//!     watcher.rs detects change (bursts debounced)
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the running snapshot
//!     → request path observes new config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Bind address, limiter ceilings, and the data file path are boot-time;
//!   a reload only swaps the runtime snapshot (secret, environment, headers)

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::AuthConfig;
pub use schema::RateLimitConfig;
pub use schema::ServerConfig;
pub use schema::VaultConfig;
