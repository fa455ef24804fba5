use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Fixed-window attempt counter keyed by a case-insensitive identifier.
///
/// `check()` never counts; callers decide what counts as an attempt and call
/// `record()` for it (failed logins, issued reset requests).
pub struct AttemptLimiter {
    /// key -> (count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_attempts: u32,
    window: Duration,
}

impl AttemptLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_attempts,
            window,
        }
    }

    /// 5 failed logins per 15 minutes.
    pub fn for_logins() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }

    /// 5 reset emails per 15 minutes.
    pub fn for_reset_requests() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }

    /// Returns Ok(()) or Err with the seconds left until the window resets.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let now = Instant::now();

        let Some(entry) = self.entries.get(&key.to_lowercase()) else {
            return Ok(());
        };

        let (count, start) = entry.value();

        if now.duration_since(*start) > self.window {
            return Ok(());
        }

        if *count >= self.max_attempts {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(self.window.as_secs().saturating_sub(elapsed));
        }

        Ok(())
    }

    pub fn record(&self, key: &str) {
        let now = Instant::now();

        let mut entry = self.entries.entry(key.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    pub fn cleanup(&self) {
        let now = Instant::now();
        let window = self.window;
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) < window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_max_attempts() {
        let limiter = AttemptLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check("alice@example.com").is_ok());
            limiter.record("alice@example.com");
        }

        let retry_after = limiter.check("ALICE@example.com").unwrap_err();
        assert!(retry_after <= 60);
        assert!(limiter.check("bob@example.com").is_ok());
    }

    #[test]
    fn window_expiry_resets_count() {
        let limiter = AttemptLimiter::new(1, Duration::from_millis(10));
        limiter.record("alice");
        assert!(limiter.check("alice").is_err());

        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.check("alice").is_ok());
        limiter.cleanup();
        assert!(limiter.entries.is_empty());
    }
}
