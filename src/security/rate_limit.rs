//! Fixed-window rate limiting.
//!
//! Two limiter instances run in the server: one throttling writes to the
//! idea collection (keyed `write:<ip>`) and one throttling login attempts
//! (keyed by client IP). Each instance owns an isolated keyspace.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Time source for window arithmetic.
///
/// Production code uses [`SystemClock`]; tests substitute a manual clock so
/// window expiry does not require real sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock-backed [`Clock`].
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Per-key counter state for the current window.
#[derive(Debug)]
struct Bucket {
    count: u32,
    reset_at: Instant,
}

/// Outcome of a single [`FixedWindowLimiter::hit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed; `remaining` hits are left in this window.
    Allowed { remaining: u32 },
    /// The ceiling is reached; retry once `retry_in` has elapsed.
    Limited { retry_in: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Fixed-window per-key counter.
///
/// Buckets live in a `Mutex<HashMap>`; the lock makes check-then-increment
/// atomic within the process. A bucket whose `reset_at` has passed behaves
/// exactly like a missing one, so sweeping never changes `hit` outcomes.
pub struct FixedWindowLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
    ceiling: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl FixedWindowLimiter {
    /// Create a limiter on the system clock.
    pub fn new(ceiling: u32, window: Duration) -> Self {
        Self::with_clock(ceiling, window, Arc::new(SystemClock))
    }

    /// Create a limiter with an injected time source.
    pub fn with_clock(ceiling: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            ceiling,
            window,
            clock,
        }
    }

    /// Record one hit against `key` and decide whether it may proceed.
    ///
    /// A fresh or expired bucket is replaced with `count = 1`. At the
    /// ceiling the count is left untouched and the caller gets the time
    /// until the window resets.
    pub fn hit(&self, key: &str) -> Decision {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");

        if let Some(bucket) = buckets.get_mut(key) {
            if bucket.reset_at > now {
                if bucket.count >= self.ceiling {
                    return Decision::Limited {
                        retry_in: bucket.reset_at - now,
                    };
                }
                bucket.count += 1;
                return Decision::Allowed {
                    remaining: self.ceiling - bucket.count,
                };
            }
        }

        buckets.insert(
            key.to_string(),
            Bucket {
                count: 1,
                reset_at: now + self.window,
            },
        );
        Decision::Allowed {
            remaining: self.ceiling - 1,
        }
    }

    /// Drop buckets whose window has passed.
    ///
    /// Purely a memory-reclamation measure: a swept key is indistinguishable
    /// from one that was never hit.
    pub fn sweep(&self) {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let before = buckets.len();
        buckets.retain(|_, bucket| bucket.reset_at > now);
        let swept = before - buckets.len();
        if swept > 0 {
            tracing::debug!(swept, remaining = buckets.len(), "Swept expired rate limit buckets");
        }
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.buckets.lock().expect("rate limiter mutex poisoned").len()
    }

    /// Spawn a background task that sweeps expired buckets on an interval.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = self;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                limiter.sweep();
            }
        })
    }
}
