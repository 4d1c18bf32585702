//! Fixed-window login throttle.
//!
//! Counts attempts per client identifier over a fixed window. The counter is
//! in-memory only and lost on restart; it exists to slow abuse, not as a hard
//! security boundary. Every login attempt is counted before credential
//! verification, success or not, so the throttle leaks no user-enumeration
//! signal. Stale windows are evicted lazily on access.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default window length.
pub const DEFAULT_WINDOW_SECONDS: u64 = 60;
/// Default attempts allowed per window.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug)]
struct RateWindow {
    count: u32,
    window_start: Instant,
}

pub struct LoginThrottle {
    window: Duration,
    max_attempts: u32,
    windows: Mutex<HashMap<String, RateWindow>>,
}

impl Default for LoginThrottle {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_WINDOW_SECONDS), DEFAULT_MAX_ATTEMPTS)
    }
}

impl LoginThrottle {
    #[must_use]
    pub fn new(window: Duration, max_attempts: u32) -> Self {
        Self {
            window,
            max_attempts: max_attempts.max(1),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count an attempt for `identifier` and decide whether it may proceed.
    ///
    /// # Errors
    /// Returns the remaining window time when the post-increment count
    /// exceeds the configured maximum.
    pub fn check(&self, identifier: &str) -> Result<(), Duration> {
        self.check_at(identifier, Instant::now())
    }

    /// Check with an explicit clock. Used by tests to advance the window.
    ///
    /// # Errors
    /// Returns the remaining window time when over the limit.
    pub fn check_at(&self, identifier: &str, now: Instant) -> Result<(), Duration> {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        // Lazy eviction keeps the map bounded by recently-active identifiers.
        let window = self.window;
        windows.retain(|_, entry| now.duration_since(entry.window_start) < window);

        let entry = windows.entry(identifier.to_string()).or_insert(RateWindow {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        if entry.count > self.max_attempts {
            let elapsed = now.duration_since(entry.window_start);
            return Err(self.window.saturating_sub(elapsed));
        }
        Ok(())
    }
}
