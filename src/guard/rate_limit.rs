//! Sliding-window attempt limiter.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::GateError;

/// Outcome of [`RateLimiter::check_limit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Denied { wait_seconds: u64, message: String },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }

    pub fn into_result(self) -> Result<(), GateError> {
        match self {
            RateLimitDecision::Allowed => Ok(()),
            RateLimitDecision::Denied {
                wait_seconds,
                message,
            } => Err(GateError::RateLimited {
                wait_seconds,
                message,
            }),
        }
    }
}

/// Tracks recent attempts and denies once `max_attempts` fall inside `window`.
///
/// The limiter never blocks: callers check before acting and record after.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_attempts: usize,
    window: Duration,
    attempts: VecDeque<Instant>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(60))
    }
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: VecDeque::with_capacity(max_attempts),
        }
    }

    pub fn record_attempt(&mut self) {
        self.attempts.push_back(Instant::now());
    }

    pub fn check_limit(&mut self) -> RateLimitDecision {
        let now = Instant::now();
        while let Some(oldest) = self.attempts.front() {
            if now.duration_since(*oldest) >= self.window {
                self.attempts.pop_front();
            } else {
                break;
            }
        }

        match self.attempts.front() {
            Some(oldest) if self.attempts.len() >= self.max_attempts => {
                let remaining = self.window.saturating_sub(now.duration_since(*oldest));
                let wait_seconds = remaining.as_millis().div_ceil(1000) as u64;
                tracing::warn!(wait_seconds, "attempt limit reached");
                RateLimitDecision::Denied {
                    wait_seconds,
                    message: format!("Too many attempts. Please wait {wait_seconds} seconds."),
                }
            }
            _ => RateLimitDecision::Allowed,
        }
    }

    /// Attempts still inside the window as of the last check.
    pub fn attempts_in_window(&self) -> usize {
        self.attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_allows_within_limit() {
        let mut limiter = RateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check_limit().is_allowed());
            limiter.record_attempt();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocks_after_max_attempts() {
        let mut limiter = RateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            limiter.record_attempt();
        }
        match limiter.check_limit() {
            RateLimitDecision::Denied {
                wait_seconds,
                message,
            } => {
                assert!(wait_seconds > 0);
                assert!(message.contains("Too many attempts"));
            }
            RateLimitDecision::Allowed => panic!("fourth attempt should be denied"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resets_after_window() {
        let mut limiter = RateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            limiter.record_attempt();
        }
        assert!(!limiter.check_limit().is_allowed());

        advance(Duration::from_millis(60_001)).await;
        assert!(limiter.check_limit().is_allowed());
        assert_eq!(limiter.attempts_in_window(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_time_counts_from_oldest_attempt() {
        let mut limiter = RateLimiter::new(2, Duration::from_secs(60));
        limiter.record_attempt();
        limiter.record_attempt();

        advance(Duration::from_secs(30)).await;
        assert_eq!(
            limiter.check_limit(),
            RateLimitDecision::Denied {
                wait_seconds: 30,
                message: "Too many attempts. Please wait 30 seconds.".to_string(),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_time_rounds_up() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(60));
        limiter.record_attempt();
        advance(Duration::from_millis(59_500)).await;
        assert!(matches!(
            limiter.check_limit(),
            RateLimitDecision::Denied { wait_seconds: 1, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_denial_converts_to_error() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(10));
        limiter.record_attempt();
        let err = limiter.check_limit().into_result().unwrap_err();
        assert!(matches!(err, GateError::RateLimited { wait_seconds: 10, .. }));
    }
}
