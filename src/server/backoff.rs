//! Growing poll intervals for clients that connect before sending data.

use std::time::Duration;

/// Iterator over wait intervals: `initial`, then each one `factor` times the
/// previous, until the running total reaches `cap`.
///
/// The last interval is shortened so the intervals sum to exactly `cap`.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    factor: f64,
    waited: Duration,
    cap: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, factor: f64, cap: Duration) -> Self {
        Self {
            next: initial,
            factor,
            waited: Duration::ZERO,
            cap,
        }
    }

    /// Total time handed out so far.
    pub fn waited(&self) -> Duration {
        self.waited
    }
}

impl Default for Backoff {
    /// 20 ms, growing by half each step, for at most 10 seconds.
    fn default() -> Self {
        Self::new(Duration::from_millis(20), 1.5, Duration::from_secs(10))
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.waited >= self.cap || self.next.is_zero() {
            return None;
        }

        let current = self.next.min(self.cap - self.waited);
        self.waited += current;
        let grown = self.next.as_nanos() as f64 * self.factor.max(1.0);
        self.next = Duration::from_nanos(grown.round() as u64);

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_by_factor() {
        let steps: Vec<_> = Backoff::default().take(3).collect();
        assert_eq!(
            steps,
            vec![
                Duration::from_millis(20),
                Duration::from_millis(30),
                Duration::from_millis(45),
            ]
        );
    }

    #[test]
    fn total_never_exceeds_cap() {
        let mut backoff = Backoff::default();
        let total: Duration = backoff.by_ref().sum();

        assert_eq!(total, Duration::from_secs(10));
        assert_eq!(backoff.waited(), Duration::from_secs(10));
        assert_eq!(backoff.next(), None);
    }

    #[test]
    fn zero_initial_interval_yields_nothing() {
        let mut backoff = Backoff::new(Duration::ZERO, 1.5, Duration::from_secs(1));
        assert_eq!(backoff.next(), None);
    }
}
