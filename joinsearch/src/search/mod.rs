//! Join order search strategies.
//!
//! Every strategy works on a shared [`SearchContext`] holding the best plan found so far. A
//! strategy proposes complete orderings through [`SearchContext::test_plan`], which scores them
//! with the cost model and keeps the cheapest one. Strategies can therefore be chained: the
//! randomized [`GeneticStrategy`] only accepts plans beating what [`BruteForceGreedyStrategy`]
//! already found.
//!
//! * [`TrivialStrategy`] Scores the only possible ordering of a single operand.
//! * [`GraphGreedyStrategy`] Smallest joinable operand first, a single deterministic pass.
//! * [`ExhaustiveStrategy`] Every permutation, until the time budget runs out.
//! * [`BruteForceGreedyStrategy`] Every permutation of a short prefix, completed greedily.
//! * [`GeneticStrategy`] Random pairwise swaps with tabu avoidance and periodic restarts.
mod budget;
pub use budget::*;
mod brute_force;
pub use brute_force::*;
mod genetic;
pub use genetic::*;
mod greedy;
pub use greedy::*;

use std::fmt::{Debug, Formatter};

use anyhow::ensure;
use enum_dispatch::enum_dispatch;
use enumset::EnumSetType;
use strum_macros::{AsRefStr, Display};

use crate::cost::{Cost, PlanEstimate, PlanView};
use crate::error::{JoinSearchError, JoinSearchResult};
use crate::expr::JoinExpr;
use crate::operand::{OperandId, ScanOperand};
use crate::optimizer::{OptimizerConfig, OptimizerContext};
use crate::plan::CandidatePlan;
use crate::trace::SearchTracer;

#[derive(EnumSetType, Debug, Display)]
pub enum StrategyId {
    Trivial,
    GraphGreedy,
    Exhaustive,
    BruteForceGreedy,
    Genetic,
}

/// A regime searching for a cheap ordering.
#[enum_dispatch(SearchStrategyImpl)]
pub trait SearchStrategy {
    /// Propose orderings to `ctx` until done or out of budget.
    fn search<T: SearchTracer>(&mut self, ctx: &mut SearchContext<'_, T>) -> JoinSearchResult<()>;

    fn strategy_id(&self) -> StrategyId;
}

#[enum_dispatch]
#[derive(AsRefStr)]
pub enum SearchStrategyImpl {
    TrivialStrategy,
    GraphGreedyStrategy,
    ExhaustiveStrategy,
    BruteForceGreedyStrategy,
    GeneticStrategy,
}

impl Debug for SearchStrategyImpl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// State of one optimization pass, shared by the strategies it runs.
pub struct SearchContext<'a, T> {
    operands: &'a [ScanOperand],
    condition: Option<&'a dyn JoinExpr>,
    context: OptimizerContext<'a>,
    config: &'a OptimizerConfig,
    is_select: bool,
    budget: TimeBudget,
    best: Option<CandidatePlan>,
    evaluations: usize,
    tracer: &'a mut T,
}

impl<'a, T: SearchTracer> SearchContext<'a, T> {
    pub fn new(
        operands: &'a [ScanOperand],
        condition: Option<&'a dyn JoinExpr>,
        context: OptimizerContext<'a>,
        config: &'a OptimizerConfig,
        is_select: bool,
        tracer: &'a mut T,
    ) -> Self {
        Self {
            operands,
            condition,
            context,
            config,
            is_select,
            budget: TimeBudget::start(config.nanos_per_cost, config.check_interval),
            best: None,
            evaluations: 0,
            tracer,
        }
    }

    pub fn operands(&self) -> &'a [ScanOperand] {
        self.operands
    }

    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    pub fn condition(&self) -> Option<&'a dyn JoinExpr> {
        self.condition
    }

    pub fn context(&self) -> OptimizerContext<'a> {
        self.context
    }

    pub fn config(&self) -> &'a OptimizerConfig {
        self.config
    }

    pub fn best(&self) -> Option<&CandidatePlan> {
        self.best.as_ref()
    }

    pub fn best_cost(&self) -> Option<Cost> {
        self.best.as_ref().and_then(CandidatePlan::cost)
    }

    /// Number of cost model invocations so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Whether the search should stop before `iteration`.
    pub fn can_stop(&self, iteration: usize) -> bool {
        self.budget.can_stop(iteration, self.best_cost())
    }

    pub fn tracer(&mut self) -> &mut T {
        &mut *self.tracer
    }

    /// Score `order`, which may be a prefix of a complete ordering.
    pub fn estimate(&mut self, order: &[OperandId]) -> JoinSearchResult<PlanEstimate> {
        let view = PlanView::new(self.operands, order, self.condition);
        let estimate = self.context.cost_model.estimate(&view, self.is_select)?;
        self.evaluations += 1;

        estimate.cost.validate()?;
        ensure!(
            estimate.access.len() == order.len(),
            JoinSearchError::AccessCountMismatch {
                expected: order.len(),
                actual: estimate.access.len(),
            }
        );
        Ok(estimate)
    }

    /// Score the complete ordering `order` and keep it when cheaper than the best plan so far.
    ///
    /// # Return
    ///
    /// Whether `order` became the best plan.
    pub fn test_plan(
        &mut self,
        strategy: StrategyId,
        order: &[OperandId],
    ) -> JoinSearchResult<bool> {
        let estimate = self.estimate(order)?;
        let cost = estimate.cost;
        self.tracer.candidate_scored(strategy, order, cost);

        let improved = self.best_cost().map_or(true, |best| cost < best);
        if improved {
            self.best = Some(CandidatePlan::scored(order.to_vec(), estimate));
            self.tracer.best_improved(strategy, order, cost);
        }
        Ok(improved)
    }

    pub fn into_best(self) -> Option<CandidatePlan> {
        self.best
    }
}

/// Scores the single ordering of a one operand query.
#[derive(Clone, Default)]
pub struct TrivialStrategy {}

impl TrivialStrategy {
    pub fn new() -> Self {
        Self {}
    }
}

impl SearchStrategy for TrivialStrategy {
    fn search<T: SearchTracer>(&mut self, ctx: &mut SearchContext<'_, T>) -> JoinSearchResult<()> {
        let order: Vec<OperandId> = (0..ctx.operand_count()).collect();
        ctx.test_plan(self.strategy_id(), &order)?;
        ctx.tracer().search_stopped(self.strategy_id(), 1, false);
        Ok(())
    }

    fn strategy_id(&self) -> StrategyId {
        StrategyId::Trivial
    }
}
