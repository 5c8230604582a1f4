use std::time::{Duration, Instant};

use crate::cost::Cost;

/// Cooperative search time budget.
///
/// The search may stop once it has spent more than `nanos_per_cost` nanoseconds per unit of the
/// best cost found so far. Cheap queries are thus planned almost immediately while expensive ones,
/// where a better plan saves more, are searched longer. The budget is only polled every
/// `check_interval` iterations and never before a plan has been scored.
#[derive(Clone, Debug)]
pub struct TimeBudget {
    start: Instant,
    nanos_per_cost: u64,
    check_interval: usize,
}

impl TimeBudget {
    pub fn start(nanos_per_cost: u64, check_interval: usize) -> Self {
        Self {
            start: Instant::now(),
            nanos_per_cost,
            check_interval: check_interval.max(1),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn is_check_point(&self, iteration: usize) -> bool {
        iteration % self.check_interval == 0
    }

    pub fn can_stop(&self, iteration: usize, best_cost: Option<Cost>) -> bool {
        self.is_check_point(iteration)
            && best_cost.map_or(false, |cost| self.is_exceeded(cost, self.elapsed()))
    }

    /// Same as [`TimeBudget::can_stop`] with an explicit elapsed time.
    pub fn can_stop_after(
        &self,
        iteration: usize,
        best_cost: Option<Cost>,
        elapsed: Duration,
    ) -> bool {
        self.is_check_point(iteration)
            && best_cost.map_or(false, |cost| self.is_exceeded(cost, elapsed))
    }

    fn is_exceeded(&self, cost: Cost, elapsed: Duration) -> bool {
        elapsed.as_nanos() as f64 > cost.value() * self.nanos_per_cost as f64
    }
}
