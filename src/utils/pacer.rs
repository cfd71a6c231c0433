//! Inter-request pacing.
//!
//! Callers invoke [`Pacer::pause`] between consecutive requests, which keeps
//! one request per interval against the origin server. No pause follows the
//! last request of a run.

use std::time::Duration;

use async_trait::async_trait;

/// Scheduling policy applied between requests.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Sleeps a fixed interval after each request.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_sleeps() {
        let pacer = FixedDelay::new(Duration::from_secs(2));
        let start = tokio::time::Instant::now();
        pacer.pause().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        let pacer = FixedDelay::new(Duration::ZERO);
        let start = std::time::Instant::now();
        pacer.pause().await;
        NoDelay.pause().await;
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
