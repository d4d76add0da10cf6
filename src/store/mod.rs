//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! handlers
//!     → ideas.rs (DashMap table, validation, pagination, search)
//!     → flat JSON data file (rewritten after every mutation)
//! ```
//!
//! # Design Decisions
//! - Flat-file persistence: the whole table is small enough to rewrite
//! - DashMap serializes per-entry access; saves take a full snapshot
//! - Validation lives next to the types it protects

pub mod ideas;

pub use ideas::{Idea, IdeaDraft, IdeaPatch, IdeaStore};
