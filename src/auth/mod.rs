//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/login
//!     → login limiter (per-IP attempt ceiling)
//!     → credentials.rs (constant-time-style secret comparison)
//!     → session.rs (issue sentinel cookie)
//!
//! Subsequent requests:
//!     Cookie header → session.rs → authenticated yes/no
//! ```
//!
//! # Design Decisions
//! - Single shared secret, no accounts and no usernames
//! - Sessions are stateless: the cookie itself is the whole session
//! - Logout clears the client cookie only; no revocation list

pub mod credentials;
pub mod session;

pub use session::{SESSION_COOKIE, SESSION_SENTINEL};
