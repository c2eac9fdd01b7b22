//! # Fibonacci Backoff
//!
//! Spacing between status checks of a running provider job. The delay grows
//! more slowly than exponential backoff: with the default bounds the sequence
//! is 1s, 1s, 2s, 3s, 5s, 8s, 10s (max).

use std::time::Duration;

/// Smallest delay ever produced
pub const MIN_BACKOFF_FLOOR: Duration = Duration::from_millis(100);

/// Fibonacci backoff calculator
///
/// Each delay is the sum of the previous two, starting at `min` and capped
/// at `max`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    prev_ms: u64,
    current_ms: u64,
    max_ms: u64,
}

impl Default for FibonacciBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(10))
    }
}

fn as_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff.
    ///
    /// `min` is raised to [`MIN_BACKOFF_FLOOR`] and `max` to `min` when smaller.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        let min_ms = as_millis(min.max(MIN_BACKOFF_FLOOR));
        let max_ms = as_millis(max).max(min_ms);
        Self {
            prev_ms: 0,
            current_ms: min_ms,
            max_ms,
        }
    }

    /// Get the next delay and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current_ms;
        let next = self.prev_ms.saturating_add(self.current_ms);
        self.prev_ms = self.current_ms;
        self.current_ms = next.min(self.max_ms);
        Duration::from_millis(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(backoff: &mut FibonacciBackoff) -> u64 {
        backoff.next_backoff().as_secs()
    }

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::default();
        let seq: Vec<u64> = (0..9).map(|_| secs(&mut backoff)).collect();
        assert_eq!(seq, vec![1, 1, 2, 3, 5, 8, 10, 10, 10]);
    }

    #[test]
    fn test_floor_and_inverted_bounds() {
        let mut backoff = FibonacciBackoff::new(Duration::from_millis(10), Duration::from_millis(50));
        assert_eq!(backoff.next_backoff(), MIN_BACKOFF_FLOOR);
        assert_eq!(backoff.next_backoff(), MIN_BACKOFF_FLOOR);
        assert_eq!(backoff.next_backoff(), MIN_BACKOFF_FLOOR);
    }
}
