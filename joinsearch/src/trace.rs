//! Observability hooks of the search.
//!
//! The optimizer is generic over its [`SearchTracer`], so with the default [`NoopTracer`] every
//! hook compiles down to nothing.

use log::{debug, trace};

use crate::cost::Cost;
use crate::operand::OperandId;
use crate::search::StrategyId;

pub trait SearchTracer {
    /// A complete ordering was scored.
    fn candidate_scored(&mut self, _strategy: StrategyId, _order: &[OperandId], _cost: Cost) {}

    /// A scored ordering became the best plan found so far.
    fn best_improved(&mut self, _strategy: StrategyId, _order: &[OperandId], _cost: Cost) {}

    /// A strategy finished after `iterations` iterations, `budget_exhausted` when the time
    /// budget cut it short.
    fn search_stopped(
        &mut self,
        _strategy: StrategyId,
        _iterations: usize,
        _budget_exhausted: bool,
    ) {
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl SearchTracer for NoopTracer {}

/// Forwards every hook to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTracer;

impl SearchTracer for LogTracer {
    fn candidate_scored(&mut self, strategy: StrategyId, order: &[OperandId], cost: Cost) {
        trace!("{}: scored {:?} with cost {}", strategy, order, cost);
    }

    fn best_improved(&mut self, strategy: StrategyId, order: &[OperandId], cost: Cost) {
        debug!("{}: new best plan {:?} with cost {}", strategy, order, cost);
    }

    fn search_stopped(&mut self, strategy: StrategyId, iterations: usize, budget_exhausted: bool) {
        debug!(
            "{}: stopped after {} iterations, budget exhausted: {}",
            strategy, iterations, budget_exhausted
        );
    }
}

impl<T: SearchTracer + ?Sized> SearchTracer for &mut T {
    fn candidate_scored(&mut self, strategy: StrategyId, order: &[OperandId], cost: Cost) {
        (**self).candidate_scored(strategy, order, cost)
    }

    fn best_improved(&mut self, strategy: StrategyId, order: &[OperandId], cost: Cost) {
        (**self).best_improved(strategy, order, cost)
    }

    fn search_stopped(&mut self, strategy: StrategyId, iterations: usize, budget_exhausted: bool) {
        (**self).search_stopped(strategy, iterations, budget_exhausted)
    }
}
