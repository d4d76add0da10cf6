//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Bind listener → Start watcher → Serve
//!
//! Shutdown (shutdown.rs):
//!     SIGTERM/SIGINT → raise shutdown flag → stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then store, then listener
//! - Graceful drain via axum's shutdown future; no forced deadline

pub mod shutdown;

pub use shutdown::Shutdown;
