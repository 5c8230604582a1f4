use std::collections::HashSet;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::JoinSearchResult;
use crate::operand::OperandId;
use crate::search::{SearchContext, SearchStrategy, StrategyId};
use crate::trace::SearchTracer;

/// Position pairs already swapped since the last restart.
#[derive(Clone, Debug, Default)]
pub struct TabuSet {
    swapped: HashSet<(usize, usize)>,
}

impl TabuSet {
    /// Record the unordered pair `(a, b)`, returns false when it was already recorded.
    pub fn insert(&mut self, a: usize, b: usize) -> bool {
        self.swapped.insert(Self::key(a, b))
    }

    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.swapped.contains(&Self::key(a, b))
    }

    pub fn clear(&mut self) {
        self.swapped.clear();
    }

    pub fn len(&self) -> usize {
        self.swapped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swapped.is_empty()
    }

    fn key(a: usize, b: usize) -> (usize, usize) {
        if a > b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Randomized local search over complete orderings.
///
/// Each iteration swaps two positions of the current ordering, skipping pairs in the tabu set,
/// and keeps the result when it beats the best plan so far. Every `check_interval` iterations,
/// or when no untried pair is found, the search restarts from a random shuffle of the operands.
pub struct GeneticStrategy {
    rng: StdRng,
    tabu: TabuSet,
    /// Restarts of the last search, the initial shuffle included.
    restarts: usize,
}

impl GeneticStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            tabu: TabuSet::default(),
            restarts: 0,
        }
    }

    fn shuffle_all(&mut self, order: &mut [OperandId]) {
        order.shuffle(&mut self.rng);
    }

    /// Swap two random positions not swapped since the last restart.
    ///
    /// # Return
    ///
    /// False when `attempts` draws produced no untried pair, `order` is then left untouched.
    fn shuffle_two(&mut self, order: &mut [OperandId], attempts: usize) -> bool {
        let n = order.len();
        if n < 2 {
            return false;
        }

        for _ in 0..attempts {
            let a = self.rng.gen_range(0..n);
            let b = self.rng.gen_range(0..n);
            if a == b || !self.tabu.insert(a, b) {
                continue;
            }
            order.swap(a, b);
            return true;
        }
        false
    }
}

impl SearchStrategy for GeneticStrategy {
    fn search<T: SearchTracer>(&mut self, ctx: &mut SearchContext<'_, T>) -> JoinSearchResult<()> {
        let n = ctx.operand_count();
        let config = ctx.config();
        let check_interval = config.check_interval.max(1);

        let mut best: Vec<OperandId> = (0..n).collect();
        let mut list = best.clone();
        self.restarts = 0;
        let mut iteration = 0;
        let mut budget_exhausted = false;

        while iteration < config.max_genetic {
            if ctx.can_stop(iteration) {
                budget_exhausted = true;
                break;
            }

            let mut restart = iteration % check_interval == 0;
            if !restart {
                list.copy_from_slice(&best);
                if !self.shuffle_two(&mut list, config.swap_attempts) {
                    restart = true;
                }
            }
            if restart {
                self.tabu.clear();
                best = (0..n).collect();
                self.shuffle_all(&mut best);
                list.copy_from_slice(&best);
                self.restarts += 1;
            }

            if ctx.test_plan(self.strategy_id(), &list)? {
                self.tabu.clear();
                best.copy_from_slice(&list);
            }
            iteration += 1;
        }

        debug!(
            "Genetic search ran {} iterations with {} restarts",
            iteration, self.restarts
        );
        ctx.tracer()
            .search_stopped(self.strategy_id(), iteration, budget_exhausted);
        Ok(())
    }

    fn strategy_id(&self) -> StrategyId {
        StrategyId::Genetic
    }
}
