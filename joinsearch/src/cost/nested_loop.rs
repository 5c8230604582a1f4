use crate::cost::{Cost, CostModel, PlanEstimate, PlanView};
use crate::error::JoinSearchResult;
use crate::graph::JoinGraph;
use crate::operand::{AccessChoice, IndexRef};
use crate::stat::RowCountSource;

/// Reference cost model for callers without a statistics based one.
///
/// An operand joinable to an operand already bound is read through an index lookup costing
/// `1 + log2(rows)` per outer row and producing one row per outer row. Every other operand is
/// fully scanned for each outer row, multiplying the outer row count by its own.
pub struct NestedLoopCostModel<S> {
    row_counts: S,
    graph: JoinGraph,
}

impl<S: RowCountSource> NestedLoopCostModel<S> {
    pub fn new(row_counts: S, graph: JoinGraph) -> Self {
        Self { row_counts, graph }
    }
}

impl<S: RowCountSource> CostModel for NestedLoopCostModel<S> {
    fn estimate(&self, plan: &PlanView<'_>, _is_select: bool) -> JoinSearchResult<PlanEstimate> {
        let mut cost = Cost::default();
        let mut outer_rows = 1.0;
        let mut access = Vec::with_capacity(plan.len());

        for (pos, operand) in plan.iter().enumerate() {
            let rows = self.row_counts.row_count(operand).max(1) as f64;
            let bound: Vec<&str> = plan
                .iter()
                .take(pos)
                .filter(|outer| self.graph.operands_joinable(operand, outer))
                .map(|outer| outer.identity())
                .collect();

            if bound.is_empty() {
                cost += Cost::from(outer_rows * rows);
                outer_rows *= rows;
                access.push(AccessChoice::FullScan);
            } else {
                cost += Cost::from(outer_rows * (1.0 + rows.log2()));
                access.push(AccessChoice::Index(IndexRef::with_dependencies(
                    format!("{}_join", operand.table_name()),
                    bound,
                )));
            }
        }

        Ok(PlanEstimate { cost, access })
    }
}
