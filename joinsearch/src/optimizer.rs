//! Join order optimizer.
//!
//! [`JoinOrderOptimizer`] picks a search regime from the number of operands, runs it against the
//! cost oracle and commits the winning ordering to the operands: each operand is linked to the
//! operand nested inside it and is assigned its access choice.
use std::time::{Duration, Instant};

use anyhow::{anyhow, ensure};
use enumset::EnumSet;
use log::{debug, info};
use serde::Deserialize;
use strum_macros::{AsRefStr, EnumString};

use crate::cost::{Cost, CostModel};
use crate::error::{JoinSearchError, JoinSearchResult};
use crate::expr::JoinExprRef;
use crate::operand::{OperandId, ScanOperand};
use crate::plan::explain::explain_chain_to_string;
use crate::plan::CandidatePlan;
use crate::search::{
    BruteForceGreedyStrategy, ExhaustiveStrategy, GeneticStrategy, GraphGreedyStrategy,
    SearchContext, SearchStrategy, SearchStrategyImpl, StrategyId, TrivialStrategy,
};
use crate::stat::RowCountSource;
use crate::trace::{NoopTracer, SearchTracer};

/// Collaborators of the surrounding compiler used during optimization.
#[derive(Clone, Copy)]
pub struct OptimizerContext<'a> {
    pub cost_model: &'a dyn CostModel,
    pub row_counts: &'a dyn RowCountSource,
}

impl<'a> OptimizerContext<'a> {
    pub fn new(cost_model: &'a dyn CostModel, row_counts: &'a dyn RowCountSource) -> Self {
        Self {
            cost_model,
            row_counts,
        }
    }
}

/// Regime used for queries with a few operands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SmallJoinStrategy {
    #[default]
    GraphGreedy,
    Exhaustive,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub small_join_strategy: SmallJoinStrategy,
    /// Largest operand count handled by `small_join_strategy`.
    pub max_brute_force_filters: usize,
    /// Evaluation budget sizing the brute forced prefix.
    pub max_brute_force: usize,
    /// Iteration cap of the genetic search.
    pub max_genetic: usize,
    /// Search time allowed per unit of the best cost.
    pub nanos_per_cost: u64,
    pub check_interval: usize,
    pub swap_attempts: usize,
    pub seed: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            small_join_strategy: SmallJoinStrategy::GraphGreedy,
            max_brute_force_filters: 7,
            max_brute_force: 2000,
            max_genetic: 500,
            nanos_per_cost: 100_000,
            check_interval: 128,
            swap_attempts: 20,
            seed: 0,
        }
    }
}

/// What the last [`JoinOrderOptimizer::optimize`] call did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptimizerStats {
    pub strategies: EnumSet<StrategyId>,
    /// Cost model invocations.
    pub evaluations: usize,
    pub elapsed: Duration,
}

pub struct JoinOrderOptimizer<'a, T: SearchTracer = NoopTracer> {
    operands: &'a mut [ScanOperand],
    condition: Option<JoinExprRef>,
    context: OptimizerContext<'a>,
    config: OptimizerConfig,
    tracer: T,
    best_plan: Option<CandidatePlan>,
    top_operand: Option<OperandId>,
    stats: OptimizerStats,
}

impl<'a> JoinOrderOptimizer<'a, NoopTracer> {
    pub fn new(
        operands: &'a mut [ScanOperand],
        condition: Option<JoinExprRef>,
        context: OptimizerContext<'a>,
        config: OptimizerConfig,
    ) -> Self {
        Self::with_tracer(operands, condition, context, config, NoopTracer)
    }
}

impl<'a, T: SearchTracer> JoinOrderOptimizer<'a, T> {
    pub fn with_tracer(
        operands: &'a mut [ScanOperand],
        condition: Option<JoinExprRef>,
        context: OptimizerContext<'a>,
        config: OptimizerConfig,
        tracer: T,
    ) -> Self {
        Self {
            operands,
            condition,
            context,
            config,
            tracer,
            best_plan: None,
            top_operand: None,
            stats: OptimizerStats::default(),
        }
    }

    /// Search for a cheap ordering and commit it to the operands.
    ///
    /// With `parse_only` nothing is costed: the input order is committed as is and the cost
    /// stays unset. `is_select` is handed to the cost model unchanged.
    ///
    /// # Return
    ///
    /// The outermost operand of the committed chain.
    pub fn optimize(&mut self, parse_only: bool, is_select: bool) -> JoinSearchResult<OperandId> {
        ensure!(!self.operands.is_empty(), JoinSearchError::NoOperands);

        let start = Instant::now();
        self.stats = OptimizerStats::default();
        self.best_plan = None;
        self.top_operand = None;
        self.operands.iter_mut().for_each(ScanOperand::reset);

        let n = self.operands.len();
        let plan = if parse_only {
            CandidatePlan::unscored((0..n).collect())
        } else {
            let mut plan = self.calculate_best_plan(is_select)?;
            plan.remove_unusable_access(
                self.context.cost_model,
                &*self.operands,
                self.condition.as_deref(),
            );
            plan
        };

        for pair in plan.order().windows(2) {
            self.operands[pair[0]].add_join(pair[1]);
        }
        if !parse_only {
            for (id, access) in plan.order().iter().zip(plan.access()) {
                self.operands[*id].set_access(access.clone());
            }
        }

        let top = plan.order()[0];
        self.stats.elapsed = start.elapsed();
        info!(
            "Ordered {} operands as {:?} with cost {:?}, strategies: {:?}, evaluations: {}, \
             elapsed: {:?}",
            n,
            plan.order(),
            plan.cost().map(Cost::value),
            self.stats.strategies,
            self.stats.evaluations,
            self.stats.elapsed
        );

        self.top_operand = Some(top);
        self.best_plan = Some(plan);
        Ok(top)
    }

    fn calculate_best_plan(&mut self, is_select: bool) -> JoinSearchResult<CandidatePlan> {
        let n = self.operands.len();
        let strategies = self.select_strategies(n);
        let mut ctx = SearchContext::new(
            &*self.operands,
            self.condition.as_deref(),
            self.context,
            &self.config,
            is_select,
            &mut self.tracer,
        );

        for mut strategy in strategies {
            debug!("Searching {} operands with {:?}", n, strategy);
            strategy.search(&mut ctx)?;
            self.stats.strategies.insert(strategy.strategy_id());
        }

        self.stats.evaluations = ctx.evaluations();
        ctx.into_best()
            .ok_or_else(|| anyhow!("No plan found for {} operands", n))
    }

    fn select_strategies(&self, n: usize) -> Vec<SearchStrategyImpl> {
        if n == 1 {
            vec![TrivialStrategy::new().into()]
        } else if n <= self.config.max_brute_force_filters {
            match self.config.small_join_strategy {
                SmallJoinStrategy::GraphGreedy => vec![GraphGreedyStrategy::new().into()],
                SmallJoinStrategy::Exhaustive => vec![ExhaustiveStrategy::new().into()],
            }
        } else {
            vec![
                BruteForceGreedyStrategy::new().into(),
                GeneticStrategy::new(self.config.seed).into(),
            ]
        }
    }

    /// Outermost operand of the committed chain, `None` before optimization.
    pub fn top_operand(&self) -> Option<OperandId> {
        self.top_operand
    }

    /// Cost of the committed plan, `None` before optimization or in parse only mode.
    pub fn cost(&self) -> Option<Cost> {
        self.best_plan.as_ref().and_then(CandidatePlan::cost)
    }

    pub fn best_plan(&self) -> Option<&CandidatePlan> {
        self.best_plan.as_ref()
    }

    pub fn stats(&self) -> &OptimizerStats {
        &self.stats
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    pub fn operands(&self) -> &[ScanOperand] {
        &*self.operands
    }

    /// Tree rendering of the committed chain.
    pub fn explain(&self) -> JoinSearchResult<String> {
        let top = self
            .top_operand
            .ok_or_else(|| anyhow!("Operands have not been optimized"))?;
        Ok(explain_chain_to_string(&*self.operands, top)?)
    }
}
