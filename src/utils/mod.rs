//! Utility functions and helpers.

pub mod http;
pub mod log;
pub mod url;

use rand::Rng;
use std::time::Duration;

/// Randomized pause drawn uniformly from `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    min: Duration,
    max: Duration,
}

impl Pacing {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    /// No pause at all.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Draw one delay; independent on every call.
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let nanos = rand::thread_rng().gen_range(self.min.as_nanos()..self.max.as_nanos());
        Duration::from_nanos(nanos as u64)
    }

    /// Sleep for one sampled delay.
    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_stays_in_range() {
        let pacing = Pacing::from_millis(500, 1500);
        for _ in 0..200 {
            let delay = pacing.sample();
            assert!(delay >= Duration::from_millis(500));
            assert!(delay < Duration::from_millis(1500));
        }
    }

    #[test]
    fn test_degenerate_range() {
        assert_eq!(Pacing::none().sample(), Duration::ZERO);
        assert_eq!(
            Pacing::from_millis(800, 100).sample(),
            Duration::from_millis(800)
        );
    }
}
