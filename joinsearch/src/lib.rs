//! ## Background
//!
//! A query referencing several tables (or views) is executed as a chain of nested loop joins.
//! The order of that chain, and the access method each table uses inside it, decides how much
//! work the executor does. This crate searches for a cheap order. It does not know how to cost
//! a plan itself, instead it consumes a cost oracle ([`cost::CostModel`]) supplied by the
//! surrounding compiler, and spends a search budget proportional to the cost of the best plan
//! found so far: cheap queries are planned almost instantly, expensive queries get more time.
//!
//! The search behaves differently depending on the number of operands `n`:
//!
//! * `n == 1`: nothing to search, the single operand is scored once.
//! * `1 < n <= 7`: a graph guided greedy heuristic picks the smallest joinable table first
//! (or, when configured, all permutations are enumerated).
//! * `n > 7`: a bounded brute force over a short prefix, completed greedily, followed by a
//! randomized local search with tabu avoidance.
//!
//! ## Design
//!
//! * [`optimizer`] Orchestrator choosing a regime and committing the winning plan.
//! * [`search`] Search strategies and the time budget.
//! * [`graph`] Join graph derived from the join condition.
//! * [`permutation`] Permutation engine.
//! * [`cost`] Cost oracle interface and a reference nested loop cost model.
//! * [`plan`] Candidate plans and explain output.
//! * [`expr`] Join condition introspection.
//! * [`operand`] Scan operands and access choices.
//!
//! ## Reference
//!
//! 1. Selinger, P. Griffiths, et al. "Access path selection in a relational database management
//! system." Readings in Artificial Intelligence and Databases. Morgan Kaufmann, 1989. 511-522.
//! 2. Glover, F., 1989. Tabu search, part I. ORSA Journal on Computing, 1(3), pp.190-206.
//! 3. Steinbrunn, M., Moerkotte, G. and Kemper, A., 1997. Heuristic and randomized optimization
//! for the join ordering problem. The VLDB Journal, 6(3), pp.191-208.

#[macro_use]
extern crate prettytable;

pub mod cost;
pub mod error;
pub mod expr;
pub mod graph;
pub mod operand;
pub mod optimizer;
pub mod permutation;
pub mod plan;
pub mod search;
pub mod stat;
pub mod trace;
