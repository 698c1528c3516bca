use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Bounded exponential backoff. Attempt `n` (1-based) that fails is followed
/// by a pause of `base_wait * 2^(n-1)`, except after the last attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_wait: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_wait: Duration) -> Self {
        Self {
            max_retries,
            base_wait,
        }
    }

    /// Total attempts made. Zero retries still runs the operation once.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_wait.saturating_mul(1u32 << exponent)
    }

    /// Runs `op` until it succeeds or the attempts are used up, sleeping
    /// between failures. Returns the last error on exhaustion.
    pub async fn retry<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.attempts();
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        "Error on '{}' (attempt {}/{}): {}",
                        label,
                        attempt,
                        attempts,
                        e
                    );
                    let wait = self.delay_for(attempt);
                    tracing::info!("Retrying after {} seconds...", wait.as_secs());
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Error on '{}' (attempt {}/{}): {}",
                        label,
                        attempt,
                        attempts,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[test]
    fn delays_double_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(60));
        assert_eq!(policy.delay_for(2), Duration::from_secs(120));
        assert_eq!(policy.delay_for(3), Duration::from_secs(240));
    }

    #[test]
    fn huge_attempt_numbers_saturate() {
        let policy = RetryPolicy::new(100, Duration::from_secs(60));
        assert_eq!(policy.delay_for(90), Duration::from_secs(60).saturating_mul(1 << 31));
        assert_eq!(
            RetryPolicy::new(100, Duration::MAX).delay_for(5),
            Duration::MAX
        );
    }

    #[test]
    fn zero_retries_still_attempts_once() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_unit_waits_between_attempts_only() {
        let policy = RetryPolicy::new(3, Duration::from_secs(60));
        let starts = Arc::new(Mutex::new(Vec::new()));
        let origin = Instant::now();

        let result: Result<()> = policy
            .retry("p1", |attempt| {
                let starts = Arc::clone(&starts);
                async move {
                    starts.lock().unwrap().push((attempt, origin.elapsed()));
                    Err(AppError::GeminiApi(format!("rate limited {}", attempt)))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("rate limited 3"));
        assert_eq!(
            *starts.lock().unwrap(),
            vec![
                (1, Duration::ZERO),
                (2, Duration::from_secs(60)),
                (3, Duration::from_secs(180)),
            ]
        );
        assert_eq!(origin.elapsed(), Duration::from_secs(180));
    }

    #[tokio::test(start_paused = true)]
    async fn success_stops_retrying() {
        let policy = RetryPolicy::new(3, Duration::from_secs(60));
        let origin = Instant::now();

        let value = policy
            .retry("p1", |attempt| async move {
                if attempt < 2 {
                    Err(AppError::GeminiApi("flaky".to_string()))
                } else {
                    Ok(attempt)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 2);
        assert_eq!(origin.elapsed(), Duration::from_secs(60));
    }
}
