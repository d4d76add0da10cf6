//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → interceptor.rs (gate write verbs behind the session cookie)
//!     → handler (writes additionally consult rate_limit.rs)
//!     → interceptor.rs (attach security headers on the way out)
//! ```
//!
//! # Design Decisions
//! - One chokepoint: every request passes the interceptor before handlers
//! - Fail closed: an invalid session on a write is rejected immediately
//! - Limiters are owned instances held in server state, never globals

pub mod headers;
pub mod interceptor;
pub mod rate_limit;

pub use rate_limit::{Decision, FixedWindowLimiter};
