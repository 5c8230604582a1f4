//! Scan operands, one per table or view referenced by a query.

use crate::expr::{JoinExpr, JoinExprRef};
use enum_as_inner::EnumAsInner;
use std::fmt::{Display, Formatter};

/// Position of an operand in the operand slice handed to the optimizer.
pub type OperandId = usize;

/// An index an operand may be read through.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct IndexRef {
    name: String,
    /// Operands whose columns the index condition reads.
    depends_on: Vec<String>,
}

impl IndexRef {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            depends_on: vec![],
        }
    }

    pub fn with_dependencies<S, I, D>(name: S, depends_on: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            depends_on: depends_on.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

/// Access method of one operand within one plan.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Default, EnumAsInner)]
pub enum AccessChoice {
    #[default]
    FullScan,
    Index(IndexRef),
}

impl Display for AccessChoice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessChoice::FullScan => write!(f, "full scan"),
            AccessChoice::Index(index) => write!(f, "index {}", index.name()),
        }
    }
}

/// One table or view reference of a query.
///
/// Besides its identity, an operand carries the state committed by the optimizer: the operand
/// nested inside it (its join link) and the access method it was assigned.
#[derive(Clone, Debug)]
pub struct ScanOperand {
    table_name: String,
    alias: Option<String>,
    condition: Option<JoinExprRef>,
    join: Option<OperandId>,
    access: Option<AccessChoice>,
}

impl ScanOperand {
    pub fn new<S: Into<String>>(table_name: S) -> Self {
        Self {
            table_name: table_name.into(),
            alias: None,
            condition: None,
            join: None,
            access: None,
        }
    }

    pub fn with_alias<S: Into<String>>(mut self, alias: S) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_condition(mut self, condition: JoinExprRef) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name telling this operand apart from the other operands of the query.
    ///
    /// The alias when present, so the instances of a self join stay distinct.
    pub fn identity(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table_name)
    }

    /// Whether an expression reference to `identity` points at this operand.
    pub fn is_referenced_by(&self, identity: &str) -> bool {
        self.table_name == identity || self.alias.as_deref() == Some(identity)
    }

    /// Table name followed by the alias, if any.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.table_name.as_str()).chain(self.alias.as_deref())
    }

    /// Full condition scoped to this operand.
    pub fn condition(&self) -> Option<&dyn JoinExpr> {
        self.condition.as_deref()
    }

    /// Operand nested inside this one.
    pub fn join(&self) -> Option<OperandId> {
        self.join
    }

    pub fn add_join(&mut self, inner: OperandId) {
        self.join = Some(inner);
    }

    pub fn access(&self) -> Option<&AccessChoice> {
        self.access.as_ref()
    }

    pub fn set_access(&mut self, access: AccessChoice) {
        self.access = Some(access);
    }

    /// Forget links and access committed by a previous optimization.
    pub(crate) fn reset(&mut self) {
        self.join = None;
        self.access = None;
    }
}

impl Display for ScanOperand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} {}", self.table_name, alias),
            None => write!(f, "{}", self.table_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::operand::{AccessChoice, IndexRef, ScanOperand};

    #[test]
    fn test_referenced_by_name_or_alias() {
        let operand = ScanOperand::new("customers").with_alias("c");

        assert!(operand.is_referenced_by("customers"));
        assert!(operand.is_referenced_by("c"));
        assert!(!operand.is_referenced_by("orders"));
        assert_eq!("c", operand.identity());
        assert_eq!("customers c", operand.to_string());
        assert_eq!("orders", ScanOperand::new("orders").identity());
    }

    #[test]
    fn test_self_join_instances_are_distinct() {
        let e1 = ScanOperand::new("employees").with_alias("e1");
        let e2 = ScanOperand::new("employees").with_alias("e2");

        assert_ne!(e1.identity(), e2.identity());
        assert!(!e1.is_referenced_by(e2.identity()));
        assert!(e1.is_referenced_by("employees"));
    }

    #[test]
    fn test_access_choice() {
        let index = AccessChoice::Index(IndexRef::with_dependencies("orders_cust", ["customers"]));

        assert_eq!(
            &["customers".to_string()],
            index.as_index().unwrap().depends_on()
        );
        assert!(AccessChoice::default().is_full_scan());
        assert_eq!("index orders_cust", index.to_string());
    }
}
