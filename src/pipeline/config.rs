//! Scheduler configuration.

use std::time::Duration;

/// Default low-water mark: stop taking new work once less than this remains.
pub const DEFAULT_YIELD_THRESHOLD: Duration = Duration::from_millis(10);

/// Default slice length used by [`Reconciler::run_until_idle`](super::Reconciler::run_until_idle).
pub const DEFAULT_SLICE_BUDGET: Duration = Duration::from_millis(16);

/// Default number of state-update restarts one slice absorbs before yielding.
pub const DEFAULT_RESTART_LIMIT: usize = 64;

/// Tunables for the work loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Remaining slice time below which the work loop yields.
    pub yield_threshold: Duration,
    /// Length of each slice when the reconciler drives itself.
    pub slice_budget: Duration,
    /// Restarts per slice after which the work loop yields.
    pub restart_limit: usize,
}

impl ReconcilerConfig {
    /// Builder: set the yield threshold.
    pub fn with_yield_threshold(mut self, threshold: Duration) -> Self {
        self.yield_threshold = threshold;
        self
    }

    /// Builder: set the self-driven slice length.
    pub fn with_slice_budget(mut self, budget: Duration) -> Self {
        self.slice_budget = budget;
        self
    }

    /// Builder: set the per-slice restart limit.
    pub fn with_restart_limit(mut self, limit: usize) -> Self {
        self.restart_limit = limit;
        self
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            yield_threshold: DEFAULT_YIELD_THRESHOLD,
            slice_budget: DEFAULT_SLICE_BUDGET,
            restart_limit: DEFAULT_RESTART_LIMIT,
        }
    }
}
