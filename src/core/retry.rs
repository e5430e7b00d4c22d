//! Cancellable, single-use retry timer.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A scheduled resumption point. Cancelling its token abandons it.
#[derive(Debug)]
pub struct RetryTimer {
    fire_at: Instant,
    token: CancellationToken,
}

impl RetryTimer {
    /// Schedule a retry `delay` from now, tied to `token`.
    pub fn schedule(delay: Duration, token: CancellationToken) -> Self {
        Self {
            fire_at: Instant::now() + delay,
            token,
        }
    }

    /// Wait for the timer. Returns `false` if it was cancelled first.
    pub async fn elapsed(self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep_until(self.fire_at) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let start = Instant::now();
        let timer = RetryTimer::schedule(Duration::from_millis(8_000), CancellationToken::new());
        assert!(timer.elapsed().await);
        assert_eq!(start.elapsed(), Duration::from_millis(8_000));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_wait_returns_false_immediately() {
        let start = Instant::now();
        let token = CancellationToken::new();
        let timer = RetryTimer::schedule(Duration::from_secs(8), token.clone());
        token.cancel();
        assert!(!timer.elapsed().await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_while_waiting() {
        let token = CancellationToken::new();
        let timer = RetryTimer::schedule(Duration::from_secs(8), token.clone());
        let waiter = tokio::spawn(timer.elapsed());
        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();
        assert!(!waiter.await.unwrap());
    }
}
