//! Request spacing for the external lookup service.
//!
//! MusicBrainz asks anonymous clients for at most one request per second.
//! A [`Throttle`] is a plain value owned by whoever issues the requests; the
//! "last call" timestamp travels with it rather than living in a global.

use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Enforces a minimum interval between the starts of consecutive calls.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_call: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: None,
        }
    }

    /// Time left before the next call may start, measured at `now`.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_call {
            Some(last) => self.interval.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Sleep until the next call is allowed, then record it as started.
    pub async fn wait(&mut self) {
        let wait = self.remaining(Instant::now());
        if !wait.is_zero() {
            tracing::debug!(target: "music_catalog::enrichment", ?wait, "Rate limiting");
            sleep(wait).await;
        }
        self.last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_is_immediate() {
        let throttle = Throttle::new(Duration::from_secs(1));
        assert_eq!(throttle.remaining(Instant::now()), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_consecutive_calls_are_spaced() {
        let interval = Duration::from_millis(40);
        let mut throttle = Throttle::new(interval);

        let start = Instant::now();
        throttle.wait().await;
        throttle.wait().await;
        throttle.wait().await;

        assert!(start.elapsed() >= interval * 2);
    }

    #[tokio::test]
    async fn test_remaining_shrinks_after_call() {
        let mut throttle = Throttle::new(Duration::from_secs(10));
        throttle.wait().await;

        let remaining = throttle.remaining(Instant::now());
        assert!(remaining > Duration::from_secs(9));
        assert!(remaining <= Duration::from_secs(10));
    }
}
