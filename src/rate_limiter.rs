//! In-memory fixed-window rate limiter.
//!
//! Guards the two abuse-prone surfaces: the public tracking lookup and
//! account registration (which gets a cooldown after repeated attempts).

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub requests_per_window: u32,
    pub window: Duration,
}

struct WindowState {
    window_start: Instant,
    count: u32,
}

pub struct RateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, WindowState>,
    last_sweep: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    /// Records one request for `key`. Returns `Err(retry_after)` when the
    /// window budget is exhausted.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        self.check_at(key, Instant::now())
    }

    // At most once per window, drop every entry whose window has lapsed so
    // the map does not grow with one entry per client key forever.
    fn sweep_expired(&self, now: Instant) {
        {
            let mut last = self
                .last_sweep
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if now.duration_since(*last) < self.config.window {
                return;
            }
            *last = now;
        }
        self.windows
            .retain(|_, state| now.duration_since(state.window_start) < self.config.window);
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), Duration> {
        self.sweep_expired(now);

        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| WindowState {
                window_start: now,
                count: 0,
            });

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.window_start = now;
            entry.count = 0;
        }

        if entry.count >= self.config.requests_per_window {
            let elapsed = now.duration_since(entry.window_start);
            return Err(self.config.window.saturating_sub(elapsed));
        }

        entry.count += 1;
        Ok(())
    }
}
