use thiserror::Error;

pub type JoinSearchResult<T> = anyhow::Result<T>;

/// Conditions detected by the search itself.
///
/// Failures of the cost oracle are not listed here, they are propagated unchanged.
#[derive(Debug, Error, PartialEq)]
pub enum JoinSearchError {
    #[error("No scan operands to optimize.")]
    NoOperands,
    #[error("Cost model returned invalid cost {cost}.")]
    InvalidCost { cost: f64 },
    #[error("Cost model returned {actual} access choices for {expected} operands.")]
    AccessCountMismatch { expected: usize, actual: usize },
}
