use std::cell::RefCell;
use std::collections::HashMap;

use crate::operand::ScanOperand;

/// Source of estimated row counts.
///
/// The count may be exact or an approximation, the search only uses it to rank operands.
pub trait RowCountSource {
    fn row_count(&self, operand: &ScanOperand) -> u64;
}

/// Row counts keyed by table name, or by alias for operands whose table is absent.
///
/// Unknown operands count as empty.
impl RowCountSource for HashMap<String, u64> {
    fn row_count(&self, operand: &ScanOperand) -> u64 {
        self.get(operand.table_name())
            .or_else(|| operand.alias().and_then(|alias| self.get(alias)))
            .copied()
            .unwrap_or(0)
    }
}

impl<S: RowCountSource + ?Sized> RowCountSource for &S {
    fn row_count(&self, operand: &ScanOperand) -> u64 {
        (**self).row_count(operand)
    }
}

/// Memoises an expensive row count source by operand identity.
pub struct CachedRowCounts<S> {
    inner: S,
    cache: RefCell<HashMap<String, u64>>,
}

impl<S: RowCountSource> CachedRowCounts<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }
}

impl<S: RowCountSource> RowCountSource for CachedRowCounts<S> {
    fn row_count(&self, operand: &ScanOperand) -> u64 {
        if let Some(count) = self.cache.borrow().get(operand.identity()) {
            return *count;
        }

        let count = self.inner.row_count(operand);
        self.cache
            .borrow_mut()
            .insert(operand.identity().to_string(), count);
        count
    }
}

#[cfg(test)]
mod tests {
    use crate::operand::ScanOperand;
    use crate::stat::{CachedRowCounts, RowCountSource};
    use maplit::hashmap;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
    }

    impl RowCountSource for CountingSource {
        fn row_count(&self, _operand: &ScanOperand) -> u64 {
            self.calls.set(self.calls.get() + 1);
            42
        }
    }

    #[test]
    fn test_map_lookup() {
        let counts = hashmap! {
            "orders".to_string() => 1000u64,
            "c".to_string() => 10u64,
        };

        assert_eq!(1000, counts.row_count(&ScanOperand::new("orders")));
        assert_eq!(
            10,
            counts.row_count(&ScanOperand::new("customers").with_alias("c"))
        );
        assert_eq!(0, counts.row_count(&ScanOperand::new("items")));
    }

    #[test]
    fn test_cache_hits_inner_once() {
        let cached = CachedRowCounts::new(CountingSource {
            calls: Cell::new(0),
        });
        let operand = ScanOperand::new("t1");

        assert_eq!(42, cached.row_count(&operand));
        assert_eq!(42, cached.row_count(&operand));
        assert_eq!(1, cached.inner.calls.get());
    }
}
