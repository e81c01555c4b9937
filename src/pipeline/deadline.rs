//! Time budgets handed to the work loop.
//!
//! The work loop never reads a clock itself. Whatever drives it (an idle
//! callback, a frame timer, a test) passes a [`Deadline`] answering one
//! question: how much time is left in this slice?

use std::time::{Duration, Instant};

/// Remaining time in the current slice.
pub trait Deadline {
    fn time_remaining(&self) -> Duration;
}

/// Wall-clock slice ending at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct SliceDeadline {
    end: Instant,
}

impl SliceDeadline {
    /// A slice of `budget` starting now.
    pub fn new(budget: Duration) -> Self {
        Self {
            end: Instant::now() + budget,
        }
    }

    /// A slice ending at `end`.
    pub fn until(end: Instant) -> Self {
        Self { end }
    }
}

impl Deadline for SliceDeadline {
    fn time_remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

/// A slice that never runs out. Runs the cycle to completion in one call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

impl<F: Fn() -> Duration> Deadline for F {
    fn time_remaining(&self) -> Duration {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_slice_has_no_time() {
        let deadline = SliceDeadline::until(Instant::now() - Duration::from_millis(5));
        assert_eq!(deadline.time_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_fresh_slice_has_time() {
        let deadline = SliceDeadline::new(Duration::from_secs(60));
        assert!(deadline.time_remaining() > Duration::from_secs(50));
        assert_eq!(Unbounded.time_remaining(), Duration::MAX);
    }

    #[test]
    fn test_closure_deadline() {
        let deadline = || Duration::from_millis(3);
        assert_eq!(deadline.time_remaining(), Duration::from_millis(3));
    }
}
