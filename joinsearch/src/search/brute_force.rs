use anyhow::anyhow;
use log::debug;

use crate::error::JoinSearchResult;
use crate::operand::OperandId;
use crate::permutation::Permutations;
use crate::search::{SearchContext, SearchStrategy, StrategyId};
use crate::trace::SearchTracer;

/// Length of the prefix enumerated exhaustively by [`BruteForceGreedyStrategy`] for `n`
/// operands.
///
/// The prefix grows while the number of prefixes times the pairwise work of completing the rest
/// stays below `max_brute_force`. Ten operands get a prefix of one, eight operands a prefix of
/// two.
pub fn max_brute_force_prefix(n: usize, max_brute_force: usize) -> usize {
    let mut prefix = 0;
    let mut remaining = n;
    let mut total = n;
    while remaining > 0
        && total.saturating_mul(remaining.saturating_mul(remaining - 1) / 2) < max_brute_force
    {
        remaining -= 1;
        total = total.saturating_mul(remaining);
        prefix += 1;
    }
    prefix
}

/// Scores every complete permutation until the time budget runs out.
#[derive(Clone, Default)]
pub struct ExhaustiveStrategy {}

impl ExhaustiveStrategy {
    pub fn new() -> Self {
        Self {}
    }
}

impl SearchStrategy for ExhaustiveStrategy {
    fn search<T: SearchTracer>(&mut self, ctx: &mut SearchContext<'_, T>) -> JoinSearchResult<()> {
        let mut permutations = Permutations::all(ctx.operand_count());
        let mut iteration = 0;
        let budget_exhausted = loop {
            if ctx.can_stop(iteration) {
                break true;
            }
            match permutations.next() {
                Some(order) => ctx.test_plan(self.strategy_id(), &order)?,
                None => break false,
            };
            iteration += 1;
        };

        ctx.tracer()
            .search_stopped(self.strategy_id(), iteration, budget_exhausted);
        Ok(())
    }

    fn strategy_id(&self) -> StrategyId {
        StrategyId::Exhaustive
    }
}

/// Enumerates every permutation of a short prefix and completes each one greedily.
///
/// Position by position, the completion appends the unused operand giving the cheapest partial
/// plan. The last position needs no scoring, its only candidate is the one operand left.
#[derive(Clone, Default)]
pub struct BruteForceGreedyStrategy {
    prefix_len: Option<usize>,
}

impl BruteForceGreedyStrategy {
    /// Prefix length derived from `max_brute_force` of the optimizer config.
    pub fn new() -> Self {
        Self { prefix_len: None }
    }

    pub fn with_prefix_len(prefix_len: usize) -> Self {
        Self {
            prefix_len: Some(prefix_len),
        }
    }

    fn complete<T: SearchTracer>(
        ctx: &mut SearchContext<'_, T>,
        list: &mut Vec<OperandId>,
    ) -> JoinSearchResult<()> {
        let n = ctx.operand_count();
        let mut used = vec![false; n];
        for id in list.iter() {
            used[*id] = true;
        }

        for pos in list.len()..n {
            let mut best_part: Option<(OperandId, _)> = None;
            for candidate in (0..n).filter(|id| !used[*id]) {
                if pos == n - 1 {
                    best_part = Some((candidate, None));
                    break;
                }

                list.push(candidate);
                let cost = ctx.estimate(list)?.cost;
                list.pop();

                let cheaper = match best_part {
                    Some((_, Some(best))) => cost < best,
                    _ => true,
                };
                if cheaper {
                    best_part = Some((candidate, Some(cost)));
                }
            }

            let (chosen, _) =
                best_part.ok_or_else(|| anyhow!("No unused operand left for position {}", pos))?;
            used[chosen] = true;
            list.push(chosen);
        }
        Ok(())
    }
}

impl SearchStrategy for BruteForceGreedyStrategy {
    fn search<T: SearchTracer>(&mut self, ctx: &mut SearchContext<'_, T>) -> JoinSearchResult<()> {
        let n = ctx.operand_count();
        let prefix_len = self
            .prefix_len
            .unwrap_or_else(|| max_brute_force_prefix(n, ctx.config().max_brute_force));
        debug!("Brute forcing a prefix of {} out of {} operands", prefix_len, n);

        let mut permutations = Permutations::prefix(n, prefix_len);
        let mut iteration = 0;
        let budget_exhausted = loop {
            if ctx.can_stop(iteration) {
                break true;
            }
            let mut list = match permutations.next() {
                Some(prefix) => prefix,
                None => break false,
            };
            list.reserve(n - list.len());
            Self::complete(ctx, &mut list)?;
            ctx.test_plan(self.strategy_id(), &list)?;
            iteration += 1;
        };

        ctx.tracer()
            .search_stopped(self.strategy_id(), iteration, budget_exhausted);
        Ok(())
    }

    fn strategy_id(&self) -> StrategyId {
        StrategyId::BruteForceGreedy
    }
}

#[cfg(test)]
mod tests {
    use crate::cost::Cost;
    use crate::operand::ScanOperand;
    use crate::optimizer::{OptimizerConfig, OptimizerContext};
    use crate::permutation::Permutations;
    use crate::search::test_utils::PositionalCostModel;
    use crate::search::{
        max_brute_force_prefix, BruteForceGreedyStrategy, ExhaustiveStrategy, SearchContext,
        SearchStrategy,
    };
    use crate::trace::NoopTracer;
    use std::collections::HashMap;

    fn operands(n: usize) -> Vec<ScanOperand> {
        (0..n).map(|i| ScanOperand::new(format!("t{}", i))).collect()
    }

    #[test]
    fn test_max_brute_force_prefix() {
        assert_eq!(0, max_brute_force_prefix(0, 2000));
        assert_eq!(1, max_brute_force_prefix(1, 2000));
        assert_eq!(4, max_brute_force_prefix(4, 2000));
        assert_eq!(2, max_brute_force_prefix(8, 2000));
        assert_eq!(1, max_brute_force_prefix(10, 2000));
        assert_eq!(0, max_brute_force_prefix(100, 2000));
        assert_eq!(0, max_brute_force_prefix(usize::MAX / 2, 2000));
    }

    #[test]
    fn test_prefix_work_within_limit() {
        for n in 2..20 {
            let prefix = max_brute_force_prefix(n, 2000);
            if prefix > 0 && prefix < n {
                let rest = n - prefix + 1;
                let work = Permutations::arrangements(n, prefix) * (rest * (rest - 1) / 2);
                assert!(work < 2000, "n = {}, prefix = {}", n, prefix);
            }
        }
    }

    #[test]
    fn test_exhaustive_finds_optimum() {
        let operands = operands(4);
        let cost_model = PositionalCostModel::default();
        let row_counts: HashMap<String, u64> = HashMap::new();
        let config = OptimizerConfig::default();
        let mut tracer = NoopTracer;
        let mut ctx = SearchContext::new(
            &operands,
            None,
            OptimizerContext::new(&cost_model, &row_counts),
            &config,
            true,
            &mut tracer,
        );

        ExhaustiveStrategy::new().search(&mut ctx).unwrap();

        assert_eq!(24, ctx.evaluations());
        // 1*4 + 2*3 + 3*2 + 4*1
        assert_eq!(Some(Cost::from(20.0)), ctx.best_cost());
        assert_eq!(&[3, 2, 1, 0], ctx.best().unwrap().order());
    }

    #[test]
    fn test_greedy_completion() {
        let operands = operands(4);
        let cost_model = PositionalCostModel::default();
        let row_counts: HashMap<String, u64> = HashMap::new();
        let config = OptimizerConfig::default();
        let mut tracer = NoopTracer;
        let mut ctx = SearchContext::new(
            &operands,
            None,
            OptimizerContext::new(&cost_model, &row_counts),
            &config,
            true,
            &mut tracer,
        );

        BruteForceGreedyStrategy::with_prefix_len(1)
            .search(&mut ctx)
            .unwrap();

        // per prefix: 3 + 2 partial plans and one complete plan, the last position is free
        assert_eq!(24, ctx.evaluations());
        // the completion always appends the smallest unused id
        assert_eq!(&[3, 0, 1, 2], ctx.best().unwrap().order());
        assert_eq!(Some(Cost::from(24.0)), ctx.best_cost());

        let calls = cost_model.calls.borrow();
        assert_eq!(vec![0, 1], calls[0]);
        assert_eq!(vec![0, 2], calls[1]);
        assert_eq!(vec![0, 3], calls[2]);
        assert_eq!(vec![0, 1, 2], calls[3]);
        assert_eq!(vec![0, 1, 3], calls[4]);
        assert_eq!(vec![0, 1, 2, 3], calls[5]);
    }

    #[test]
    fn test_plans_are_permutations() {
        let operands = operands(9);
        let cost_model = PositionalCostModel::default();
        let row_counts: HashMap<String, u64> = HashMap::new();
        let config = OptimizerConfig::default();
        let mut tracer = NoopTracer;
        let mut ctx = SearchContext::new(
            &operands,
            None,
            OptimizerContext::new(&cost_model, &row_counts),
            &config,
            true,
            &mut tracer,
        );

        BruteForceGreedyStrategy::new().search(&mut ctx).unwrap();

        assert!(ctx.best().unwrap().is_permutation_of(9));
        for call in cost_model.calls.borrow().iter() {
            let mut sorted = call.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(call.len(), sorted.len());
        }
    }

    #[test]
    fn test_full_prefix_is_exhaustive() {
        let operands = operands(3);
        let cost_model = PositionalCostModel::default();
        let row_counts: HashMap<String, u64> = HashMap::new();
        let config = OptimizerConfig::default();
        let mut tracer = NoopTracer;
        let mut ctx = SearchContext::new(
            &operands,
            None,
            OptimizerContext::new(&cost_model, &row_counts),
            &config,
            true,
            &mut tracer,
        );

        BruteForceGreedyStrategy::with_prefix_len(3)
            .search(&mut ctx)
            .unwrap();

        assert_eq!(6, ctx.evaluations());
        assert_eq!(&[2, 1, 0], ctx.best().unwrap().order());
    }
}
