use std::sync::Arc;

use datafusion_expr::Expr;
use joinsearch::error::JoinSearchResult;
use joinsearch::expr::JoinExprRef;
use joinsearch::operand::ScanOperand;

use crate::conversion::try_convert;

/// A table referenced by a query, with its alias if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased<S: Into<String>, A: Into<String>>(name: S, alias: A) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

/// Build scan operands for `tables`, the converted `condition` is attached to the first one.
///
/// # Return
///
/// The operands in table order and the converted condition.
pub fn scan_operands(
    tables: &[TableRef],
    condition: Option<&Expr>,
) -> JoinSearchResult<(Vec<ScanOperand>, Option<JoinExprRef>)> {
    let condition: Option<JoinExprRef> = match condition {
        Some(expr) => Some(Arc::new(try_convert(expr)?)),
        None => None,
    };

    let operands = tables
        .iter()
        .enumerate()
        .map(|(idx, table)| {
            let mut operand = ScanOperand::new(table.name.as_str());
            if let Some(alias) = &table.alias {
                operand = operand.with_alias(alias.as_str());
            }
            match &condition {
                Some(condition) if idx == 0 => operand.with_condition(condition.clone()),
                _ => operand,
            }
        })
        .collect();

    Ok((operands, condition))
}
