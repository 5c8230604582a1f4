//! Defines the cost oracle consumed by the search.

mod nested_loop;
pub use nested_loop::*;

use std::fmt::{Display, Formatter};

use anyhow::ensure;
use derive_more::{Add, AddAssign, Sub, SubAssign, Sum};
use log::debug;

use crate::error::{JoinSearchError, JoinSearchResult};
use crate::expr::JoinExpr;
use crate::operand::{AccessChoice, OperandId, ScanOperand};

#[derive(Copy, Clone, Debug, Default, PartialOrd, PartialEq, Add, Sub, Sum, AddAssign, SubAssign)]
pub struct Cost(f64);

impl From<f64> for Cost {
    fn from(c: f64) -> Self {
        Cost(c)
    }
}

impl Cost {
    pub fn value(self) -> f64 {
        self.0
    }

    /// Reject costs a search can not compare.
    pub(crate) fn validate(self) -> JoinSearchResult<Self> {
        ensure!(
            self.0 >= 0.0,
            JoinSearchError::InvalidCost { cost: self.0 }
        );
        Ok(self)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordering, or a prefix of one, handed to the cost model.
///
/// Operands are nested loop joined in `order`, the first one being the outermost.
#[derive(Clone, Copy)]
pub struct PlanView<'a> {
    operands: &'a [ScanOperand],
    order: &'a [OperandId],
    condition: Option<&'a dyn JoinExpr>,
}

impl<'a> PlanView<'a> {
    pub fn new(
        operands: &'a [ScanOperand],
        order: &'a [OperandId],
        condition: Option<&'a dyn JoinExpr>,
    ) -> Self {
        Self {
            operands,
            order,
            condition,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn order(&self) -> &'a [OperandId] {
        self.order
    }

    pub fn operand_at(&self, pos: usize) -> &'a ScanOperand {
        &self.operands[self.order[pos]]
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ScanOperand> + 'a {
        let operands = self.operands;
        self.order.iter().map(move |id| &operands[*id])
    }

    pub fn condition(&self) -> Option<&'a dyn JoinExpr> {
        self.condition
    }
}

/// Result of estimating one plan.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanEstimate {
    pub cost: Cost,
    /// Access choice per ordered operand.
    pub access: Vec<AccessChoice>,
}

/// Cost oracle.
pub trait CostModel {
    /// Estimate the cost of executing `plan` as nested loops.
    ///
    /// `plan` may be a prefix of a complete ordering while the search completes it greedily.
    fn estimate(&self, plan: &PlanView<'_>, is_select: bool) -> JoinSearchResult<PlanEstimate>;

    /// Downgrade access choices which can not be used with the ordering of `plan`.
    fn remove_unusable_access(&self, plan: &PlanView<'_>, access: &mut [AccessChoice]) {
        remove_unusable_access(plan, access)
    }
}

/// Replaces with a full scan every index access depending on an operand which is not bound by
/// the time the indexed operand is scanned.
pub fn remove_unusable_access(plan: &PlanView<'_>, access: &mut [AccessChoice]) {
    for (pos, choice) in access.iter_mut().enumerate().take(plan.len()) {
        let operand = plan.operand_at(pos);
        let usable = match &*choice {
            AccessChoice::FullScan => true,
            AccessChoice::Index(index) => index.depends_on().iter().all(|dep| {
                operand.is_referenced_by(dep)
                    || plan.iter().take(pos).any(|bound| bound.is_referenced_by(dep))
            }),
        };

        if !usable {
            debug!(
                "Removing unusable access {} of {} at position {}",
                choice, operand, pos
            );
            *choice = AccessChoice::FullScan;
        }
    }
}
