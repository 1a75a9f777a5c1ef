//! Rate limiting for AI usage.
//!
//! Three mechanisms, matching how quota is actually spent:
//! - [`RateLimiter`]: per-user sliding window gating automatic checks
//! - [`GlobalRateLimiter`]: one shared window protecting overall API quota
//! - [`Cooldowns`]: per-(command, user) windows for manual commands

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

/// Sliding-window rate limiter keyed by an identifier (user id).
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    time_window: Duration,
    requests: HashMap<String, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, time_window: Duration) -> Self {
        info!(
            "Rate limiter initialized: {} requests per {:?}",
            max_requests, time_window
        );
        Self {
            max_requests,
            time_window,
            requests: HashMap::new(),
        }
    }

    /// Admit and record a request, or refuse it.
    pub fn check(&mut self, identifier: &str) -> bool {
        let now = Instant::now();
        let window = self.time_window;
        let bucket = self.requests.entry(identifier.to_string()).or_default();

        Self::prune(bucket, now, window);

        if bucket.len() >= self.max_requests {
            debug!("Rate limit exceeded for {}", identifier);
            return false;
        }

        bucket.push_back(now);
        true
    }

    /// Requests left in the current window.
    pub fn remaining(&mut self, identifier: &str) -> usize {
        let now = Instant::now();
        let window = self.time_window;
        match self.requests.get_mut(identifier) {
            Some(bucket) => {
                Self::prune(bucket, now, window);
                self.max_requests.saturating_sub(bucket.len())
            }
            None => self.max_requests,
        }
    }

    /// Time until the identifier can make another request.
    pub fn reset_in(&mut self, identifier: &str) -> Duration {
        let now = Instant::now();
        let window = self.time_window;
        match self.requests.get_mut(identifier) {
            Some(bucket) => {
                Self::prune(bucket, now, window);
                if bucket.len() < self.max_requests {
                    Duration::ZERO
                } else {
                    // Time until the oldest request leaves the window
                    bucket
                        .front()
                        .map(|oldest| window.saturating_sub(now.duration_since(*oldest)))
                        .unwrap_or(Duration::ZERO)
                }
            }
            None => Duration::ZERO,
        }
    }

    /// Forget an identifier entirely.
    pub fn reset(&mut self, identifier: &str) {
        if self.requests.remove(identifier).is_some() {
            info!("Rate limit reset for {}", identifier);
        }
    }

    /// Drop identifiers idle for longer than twice the window.
    pub fn cleanup(&mut self) {
        let now = Instant::now();
        let threshold = self.time_window * 2;
        let before = self.requests.len();

        self.requests.retain(|_, bucket| {
            bucket
                .back()
                .map(|last| now.duration_since(*last) < threshold)
                .unwrap_or(false)
        });

        let removed = before - self.requests.len();
        if removed > 0 {
            debug!("Cleaned up {} inactive rate limit entries", removed);
        }
    }

    /// Usage snapshot.
    pub fn stats(&self) -> RateLimiterStats {
        let now = Instant::now();
        let mut active_users = 0;
        let mut recent_requests = 0;

        for bucket in self.requests.values() {
            let recent = bucket
                .iter()
                .filter(|t| now.duration_since(**t) <= self.time_window)
                .count();
            if recent > 0 {
                active_users += 1;
                recent_requests += recent;
            }
        }

        RateLimiterStats {
            tracked_users: self.requests.len(),
            active_users,
            recent_requests,
            max_requests: self.max_requests,
            time_window: self.time_window,
        }
    }

    fn prune(bucket: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(front) = bucket.front() {
            if now.duration_since(*front) >= window {
                bucket.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Rate limiter usage snapshot.
#[derive(Debug, Clone)]
pub struct RateLimiterStats {
    pub tracked_users: usize,
    pub active_users: usize,
    pub recent_requests: usize,
    pub max_requests: usize,
    pub time_window: Duration,
}

/// Global sliding window over all API requests.
#[derive(Debug)]
pub struct GlobalRateLimiter {
    max_per_minute: usize,
    requests: VecDeque<Instant>,
}

impl GlobalRateLimiter {
    pub fn new(max_per_minute: usize) -> Self {
        info!(
            "Global rate limiter initialized: {} requests per minute",
            max_per_minute
        );
        Self {
            max_per_minute,
            requests: VecDeque::new(),
        }
    }

    /// Admit and record a request, or refuse it.
    pub fn check(&mut self) -> bool {
        let now = Instant::now();
        self.prune(now);

        if self.requests.len() >= self.max_per_minute {
            warn!("Global rate limit exceeded");
            return false;
        }

        self.requests.push_back(now);
        true
    }

    /// Requests left in the current minute.
    pub fn remaining(&mut self) -> usize {
        self.prune(Instant::now());
        self.max_per_minute.saturating_sub(self.requests.len())
    }

    fn prune(&mut self, now: Instant) {
        while let Some(front) = self.requests.front() {
            if now.duration_since(*front) >= Duration::from_secs(60) {
                self.requests.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Per-(command, user) cooldown windows for manual commands.
#[derive(Debug, Default)]
pub struct Cooldowns {
    buckets: HashMap<(String, u64), VecDeque<Instant>>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit the invocation or return the seconds until it is allowed.
    pub fn check(
        &mut self,
        command: &str,
        user_id: u64,
        max_uses: usize,
        window: Duration,
    ) -> std::result::Result<(), f64> {
        let now = Instant::now();
        let bucket = self
            .buckets
            .entry((command.to_string(), user_id))
            .or_default();

        while let Some(front) = bucket.front() {
            if now.duration_since(*front) >= window {
                bucket.pop_front();
            } else {
                break;
            }
        }

        if bucket.len() >= max_uses {
            let retry_after = bucket
                .front()
                .map(|oldest| window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(Duration::ZERO);
            return Err(retry_after.as_secs_f64());
        }

        bucket.push_back(now);
        Ok(())
    }

    /// Drop buckets with no invocation inside the given horizon.
    pub fn cleanup(&mut self, horizon: Duration) {
        let now = Instant::now();
        self.buckets.retain(|_, bucket| {
            bucket
                .back()
                .map(|last| now.duration_since(*last) < horizon)
                .unwrap_or(false)
        });
    }
}
