//! Join condition introspection.
//!
//! The search never evaluates a condition, it only walks the expression tree to find which
//! operands are compared against each other. [`JoinExpr`] is the minimal view it needs, and
//! [`ExprNode`] is an owned implementation used by embedders without an expression tree of
//! their own (and by tests).

use serde::Deserialize;
use smallvec::SmallVec;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

pub type JoinExprRef = Arc<dyn JoinExpr>;

/// Read only view of one node of a join condition.
pub trait JoinExpr: Debug {
    fn subexpression_count(&self) -> usize;

    /// Child at `idx`, `idx` must be less than [`JoinExpr::subexpression_count`].
    fn subexpression(&self, idx: usize) -> &dyn JoinExpr;

    /// Name of the table a leaf column belongs to.
    fn table_name(&self) -> Option<&str> {
        None
    }

    /// Alias of the table a leaf column belongs to.
    fn table_alias(&self) -> Option<&str> {
        None
    }

    /// Identity of the operand a leaf refers to, the table name wins over the alias.
    fn referenced_operand(&self) -> Option<&str> {
        self.table_name().or_else(|| self.table_alias())
    }
}

/// Owned expression tree.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ExprNode {
    /// Operator for inner nodes, column name or value for leaves.
    label: String,
    #[serde(default)]
    table_name: Option<String>,
    #[serde(default)]
    table_alias: Option<String>,
    #[serde(default)]
    children: SmallVec<[Box<ExprNode>; 2]>,
}

impl ExprNode {
    pub fn new<S, I>(label: S, children: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = ExprNode>,
    {
        Self {
            label: label.into(),
            table_name: None,
            table_alias: None,
            children: children.into_iter().map(Box::new).collect(),
        }
    }

    /// Column `column` of table `table`.
    pub fn column<T: Into<String>, C: Into<String>>(table: T, column: C) -> Self {
        Self {
            label: column.into(),
            table_name: Some(table.into()),
            table_alias: None,
            children: SmallVec::new(),
        }
    }

    /// Column `column` of a table known only by its alias.
    pub fn aliased_column<A: Into<String>, C: Into<String>>(alias: A, column: C) -> Self {
        Self {
            label: column.into(),
            table_name: None,
            table_alias: Some(alias.into()),
            children: SmallVec::new(),
        }
    }

    pub fn literal<V: Display>(value: V) -> Self {
        Self::new(value.to_string(), [])
    }

    pub fn binary<S: Into<String>>(op: S, left: ExprNode, right: ExprNode) -> Self {
        Self::new(op, [left, right])
    }

    pub fn eq(left: ExprNode, right: ExprNode) -> Self {
        Self::binary("=", left, right)
    }

    pub fn and(left: ExprNode, right: ExprNode) -> Self {
        Self::binary("AND", left, right)
    }

    /// Left deep conjunction of `exprs`, `None` when empty.
    pub fn and_all<I: IntoIterator<Item = ExprNode>>(exprs: I) -> Option<Self> {
        exprs.into_iter().reduce(Self::and)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl JoinExpr for ExprNode {
    fn subexpression_count(&self) -> usize {
        self.children.len()
    }

    fn subexpression(&self, idx: usize) -> &dyn JoinExpr {
        &*self.children[idx]
    }

    fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    fn table_alias(&self) -> Option<&str> {
        self.table_alias.as_deref()
    }
}

impl Display for ExprNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.children.as_slice() {
            [] => match self.referenced_operand() {
                Some(table) => write!(f, "{}.{}", table, self.label),
                None => write!(f, "{}", self.label),
            },
            [left, right] => write!(f, "{} {} {}", left, self.label, right),
            children => {
                write!(f, "{}(", self.label)?;
                for (idx, child) in children.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}
