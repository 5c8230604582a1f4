//! Candidate plans.

pub mod explain;

use prettytable::Table;

use crate::cost::{Cost, CostModel, PlanEstimate, PlanView};
use crate::expr::JoinExpr;
use crate::operand::{AccessChoice, OperandId, ScanOperand};

/// One complete ordering of the operands, with its cost and access choices once scored.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidatePlan {
    order: Vec<OperandId>,
    cost: Option<Cost>,
    /// Parallel to `order`, empty while unscored.
    access: Vec<AccessChoice>,
}

impl CandidatePlan {
    /// Plan which is never costed, used when only validating a query.
    pub fn unscored(order: Vec<OperandId>) -> Self {
        Self {
            order,
            cost: None,
            access: vec![],
        }
    }

    pub fn scored(order: Vec<OperandId>, estimate: PlanEstimate) -> Self {
        Self {
            order,
            cost: Some(estimate.cost),
            access: estimate.access,
        }
    }

    pub fn order(&self) -> &[OperandId] {
        &self.order
    }

    pub fn cost(&self) -> Option<Cost> {
        self.cost
    }

    pub fn access(&self) -> &[AccessChoice] {
        &self.access
    }

    /// Access choice of operand `id`, `None` for an unscored plan.
    pub fn access_of(&self, id: OperandId) -> Option<&AccessChoice> {
        self.order
            .iter()
            .position(|o| *o == id)
            .and_then(|pos| self.access.get(pos))
    }

    /// Whether the plan contains each of `0..n` exactly once.
    pub fn is_permutation_of(&self, n: usize) -> bool {
        let mut seen = vec![false; n];
        self.order.len() == n
            && self
                .order
                .iter()
                .all(|id| *id < n && !std::mem::replace(&mut seen[*id], true))
    }

    pub(crate) fn remove_unusable_access(
        &mut self,
        cost_model: &dyn CostModel,
        operands: &[ScanOperand],
        condition: Option<&dyn JoinExpr>,
    ) {
        let view = PlanView::new(operands, &self.order, condition);
        cost_model.remove_unusable_access(&view, &mut self.access);
    }

    /// Tabular description: position, operand and access choice.
    pub fn to_table(&self, operands: &[ScanOperand]) -> Table {
        let mut table = Table::new();
        table.set_titles(row!["#", "Operand", "Access"]);
        for (pos, id) in self.order.iter().enumerate() {
            let access = self
                .access
                .get(pos)
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string());
            table.add_row(row![pos, operands[*id], access]);
        }
        table
    }
}
