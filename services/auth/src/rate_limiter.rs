//! Per-account throttling of token requests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Attempts allowed per window
    pub max_attempts: u32,
    /// Length of the counting window
    pub window: Duration,
    /// How long a key stays blocked once it exceeds the limit
    pub ban_duration: Duration,
    /// Upper bound on tracked keys
    pub max_entries: usize,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(5 * 60),
            ban_duration: Duration::from_secs(60 * 60),
            max_entries: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Attempts {
    window_start: Instant,
    count: u32,
    banned_until: Option<Instant>,
}

impl Attempts {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
            banned_until: None,
        }
    }

    fn is_banned(&self, now: Instant) -> bool {
        self.banned_until.is_some_and(|until| now < until)
    }

    /// Neither banned nor inside a counting window
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        match self.banned_until {
            Some(until) => now >= until,
            None => now.duration_since(self.window_start) >= window,
        }
    }
}

#[derive(Debug)]
struct Entries {
    by_key: HashMap<String, Attempts>,
    last_sweep: Instant,
}

/// Counts attempts per key and bans keys that exceed the limit
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<Entries>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(Entries {
                by_key: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let full = entries.by_key.len() >= self.config.max_entries;
        if full || now.duration_since(entries.last_sweep) >= self.config.window {
            let window = self.config.window;
            entries.by_key.retain(|_, attempts| !attempts.is_stale(now, window));
            entries.last_sweep = now;
        }

        if !entries.by_key.contains_key(key) && entries.by_key.len() >= self.config.max_entries {
            // Only bans survive; counting windows are cheap to lose
            entries.by_key.retain(|_, attempts| attempts.is_banned(now));
            if entries.by_key.len() >= self.config.max_entries {
                warn!("Rate limiter full of banned keys, refusing {}", key);
                return false;
            }
        }

        let attempts = entries
            .by_key
            .entry(key.to_string())
            .or_insert_with(|| Attempts::new(now));

        if attempts.is_banned(now) {
            return false;
        }
        if attempts.is_stale(now, self.config.window) {
            *attempts = Attempts::new(now);
        }

        if attempts.count >= self.config.max_attempts {
            attempts.banned_until = Some(now + self.config.ban_duration);
            warn!(
                "Banned key {} for {} seconds",
                key,
                self.config.ban_duration.as_secs()
            );
            return false;
        }

        attempts.count += 1;
        true
    }

    /// Forget previous attempts for `key`, e.g. after a successful login
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.by_key.remove(key);
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.by_key.len()
    }
}
