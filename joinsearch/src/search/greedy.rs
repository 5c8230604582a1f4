use log::debug;

use crate::error::JoinSearchResult;
use crate::graph::JoinGraph;
use crate::operand::{OperandId, ScanOperand};
use crate::search::{SearchContext, SearchStrategy, StrategyId};
use crate::stat::RowCountSource;
use crate::trace::SearchTracer;

/// Rule based ordering guided by the join graph.
///
/// The smallest operand is scanned first, then each following operand is the smallest one
/// joinable to an operand already placed. No alternative is costed, the single resulting ordering
/// is scored once to obtain its access choices.
#[derive(Clone, Default)]
pub struct GraphGreedyStrategy {}

impl GraphGreedyStrategy {
    pub fn new() -> Self {
        Self {}
    }

    /// Greedy ordering of `operands`.
    ///
    /// Ties on row count are broken by input order. When no remaining operand is joinable to
    /// the placed ones (the join graph is disconnected), every remaining operand is a candidate
    /// and the smallest one is cross joined.
    pub fn order(
        operands: &[ScanOperand],
        graph: &JoinGraph,
        row_counts: &dyn RowCountSource,
    ) -> Vec<OperandId> {
        let counts: Vec<u64> = operands.iter().map(|o| row_counts.row_count(o)).collect();
        let mut remaining: Vec<OperandId> = (0..operands.len()).collect();
        let mut result: Vec<OperandId> = Vec::with_capacity(operands.len());

        while !remaining.is_empty() {
            let mut candidates: Vec<usize> = (0..remaining.len())
                .filter(|pos| {
                    result.is_empty()
                        || result.iter().any(|placed| {
                            graph.operands_joinable(&operands[*placed], &operands[remaining[*pos]])
                        })
                })
                .collect();

            if candidates.is_empty() {
                debug!(
                    "No operand joinable to {:?}, cross joining the smallest remaining one",
                    result
                );
                candidates = (0..remaining.len()).collect();
            }

            let pos = match candidates.into_iter().min_by_key(|pos| counts[remaining[*pos]]) {
                Some(pos) => pos,
                None => break,
            };
            result.push(remaining.remove(pos));
        }

        result
    }
}

impl SearchStrategy for GraphGreedyStrategy {
    fn search<T: SearchTracer>(&mut self, ctx: &mut SearchContext<'_, T>) -> JoinSearchResult<()> {
        let operands = ctx.operands();
        let graph = JoinGraph::build(
            operands
                .first()
                .and_then(ScanOperand::condition)
                .or_else(|| ctx.condition()),
        );

        let order = Self::order(operands, &graph, ctx.context().row_counts);
        debug!("Graph guided order: {:?}", order);

        ctx.test_plan(self.strategy_id(), &order)?;
        ctx.tracer().search_stopped(self.strategy_id(), 1, false);
        Ok(())
    }

    fn strategy_id(&self) -> StrategyId {
        StrategyId::GraphGreedy
    }
}
