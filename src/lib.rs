//! Idea Vault service library.

pub mod api;
pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod store;

pub use config::schema::VaultConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
