use datafusion_common::Column;
use datafusion_expr::{Between, BinaryExpr, Expr};
use joinsearch::error::JoinSearchResult;
use joinsearch::expr::ExprNode;
use log::debug;

/// Convert a datafusion expression into a join condition tree.
///
/// Qualified columns become leaves referring to their qualifier, operators keep their operands
/// as children. Expressions the join graph can not look into become opaque leaves.
pub fn try_convert(expr: &Expr) -> JoinSearchResult<ExprNode> {
    match expr {
        Expr::Column(column) => Ok(column_to_node(column)),
        Expr::Literal(value) => Ok(ExprNode::literal(value)),
        Expr::BinaryExpr(BinaryExpr { left, op, right }) => Ok(ExprNode::binary(
            op.to_string(),
            try_convert(left)?,
            try_convert(right)?,
        )),
        Expr::Not(inner) => unary("NOT", inner),
        Expr::IsNull(inner) => unary("IS NULL", inner),
        Expr::IsNotNull(inner) => unary("IS NOT NULL", inner),
        Expr::Negative(inner) => unary("-", inner),
        Expr::Between(Between {
            expr,
            negated,
            low,
            high,
        }) => {
            let label = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
            Ok(ExprNode::new(
                label,
                vec![try_convert(expr)?, try_convert(low)?, try_convert(high)?],
            ))
        }
        other => {
            debug!("Treating {} as an opaque join condition leaf", other);
            Ok(ExprNode::literal(other))
        }
    }
}

fn unary(label: &str, inner: &Expr) -> JoinSearchResult<ExprNode> {
    Ok(ExprNode::new(label, vec![try_convert(inner)?]))
}

fn column_to_node(column: &Column) -> ExprNode {
    match &column.relation {
        Some(relation) => ExprNode::column(relation.table(), column.name.as_str()),
        None => ExprNode::literal(&column.name),
    }
}
