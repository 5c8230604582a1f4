//! Permutation engine.
//!
//! Enumerates orderings of operand ids `0..n`, either complete or restricted to the first `k`
//! positions, without duplicates and in lexicographic order.

use std::ops::Range;

use itertools::Itertools;

use crate::operand::OperandId;

pub struct Permutations {
    inner: Option<itertools::Permutations<Range<usize>>>,
    /// Pending single empty arrangement when `k == 0`.
    empty_pending: bool,
    produced: usize,
}

impl Permutations {
    /// Every ordered selection of `k` ids out of `0..n`, `k` is capped at `n`.
    pub fn prefix(n: usize, k: usize) -> Self {
        let k = k.min(n);
        if k == 0 {
            return Self {
                inner: None,
                empty_pending: true,
                produced: 0,
            };
        }

        Self {
            inner: Some((0..n).permutations(k)),
            empty_pending: false,
            produced: 0,
        }
    }

    /// Every complete ordering of `0..n`.
    pub fn all(n: usize) -> Self {
        Self::prefix(n, n)
    }

    /// Number of arrangements returned so far.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Number of arrangements `prefix(n, k)` yields, saturating.
    pub fn arrangements(n: usize, k: usize) -> usize {
        (n - k.min(n) + 1..=n).fold(1usize, |acc, f| acc.saturating_mul(f))
    }
}

impl Iterator for Permutations {
    type Item = Vec<OperandId>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = match &mut self.inner {
            Some(inner) => inner.next(),
            None if self.empty_pending => {
                self.empty_pending = false;
                Some(vec![])
            }
            None => None,
        };

        if next.is_some() {
            self.produced += 1;
        }
        next
    }
}
