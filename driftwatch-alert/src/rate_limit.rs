//! Per-kind alert creation rate limits.
//!
//! A misbehaving spec or a pathological scan can generate an event per
//! file per cycle; the limiter caps what reaches the store at all.
//! Monotonic clocks only, so wall-clock jumps cannot open the gates.

use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3_600);

pub struct RateLimiter {
    per_minute: u32,
    per_hour: u32,
    events: FxHashMap<String, Vec<Instant>>,
}

impl RateLimiter {
    pub fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            per_minute,
            per_hour,
            events: FxHashMap::default(),
        }
    }

    /// Whether another event for this key may be created now.
    /// Allowed events are recorded; denied ones are not.
    pub fn allow(&mut self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn allow_at(&mut self, key: &str, now: Instant) -> bool {
        let entries = self.events.entry(key.to_string()).or_default();
        entries.retain(|t| now.duration_since(*t) < HOUR);

        let last_minute = entries
            .iter()
            .filter(|t| now.duration_since(**t) < MINUTE)
            .count();

        if last_minute >= self.per_minute as usize || entries.len() >= self.per_hour as usize {
            return false;
        }
        entries.push(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_minute_cap_denies_the_overflow() {
        let mut limiter = RateLimiter::new(2, 100);
        let now = Instant::now();
        assert!(limiter.allow_at("drift", now));
        assert!(limiter.allow_at("drift", now));
        assert!(!limiter.allow_at("drift", now));
        // A different key has its own budget.
        assert!(limiter.allow_at("scan", now));
    }

    #[test]
    fn minute_budget_recovers_after_the_window() {
        let mut limiter = RateLimiter::new(1, 100);
        let now = Instant::now();
        assert!(limiter.allow_at("drift", now));
        assert!(!limiter.allow_at("drift", now));
        assert!(limiter.allow_at("drift", now + MINUTE + Duration::from_secs(1)));
    }

    #[test]
    fn hourly_cap_holds_even_with_minute_headroom() {
        let mut limiter = RateLimiter::new(10, 3);
        let now = Instant::now();
        // Spread three events across distinct minutes.
        assert!(limiter.allow_at("drift", now));
        assert!(limiter.allow_at("drift", now + MINUTE * 2));
        assert!(limiter.allow_at("drift", now + MINUTE * 4));
        assert!(!limiter.allow_at("drift", now + MINUTE * 6));
    }
}
