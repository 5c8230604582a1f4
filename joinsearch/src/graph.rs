//! Join graph derived from the join condition.
//!
//! Two operands are joinable when the condition contains a comparison whose two sides are plain
//! column references to those operands, e.g. `a.x = b.y`. The graph is undirected: `a` joinable
//! to `b` implies `b` joinable to `a`.

use std::collections::{HashMap, VecDeque};

use log::debug;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::expr::JoinExpr;
use crate::operand::ScanOperand;

#[derive(Default, Debug)]
pub struct JoinGraph {
    graph: UnGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl JoinGraph {
    /// Collect joinable pairs from `condition`.
    ///
    /// Subexpressions are visited breadth first. A node with exactly two leaf children
    /// referencing two different operands contributes an edge and is not descended into, every
    /// other node has its children visited.
    pub fn build(condition: Option<&dyn JoinExpr>) -> Self {
        let mut join_graph = Self::default();
        let mut queue = VecDeque::new();
        queue.extend(condition);

        while let Some(expr) = queue.pop_front() {
            if let Some((left, right)) = Self::leaf_join_pair(expr) {
                debug!("Found join expression for {} and {}", left, right);
                join_graph.add_edge(left, right);
                continue;
            }

            for idx in 0..expr.subexpression_count() {
                queue.push_back(expr.subexpression(idx));
            }
        }

        join_graph
    }

    /// Build from the full condition of the first operand.
    pub fn from_operands(operands: &[ScanOperand]) -> Self {
        Self::build(operands.first().and_then(ScanOperand::condition))
    }

    fn leaf_join_pair(expr: &dyn JoinExpr) -> Option<(&str, &str)> {
        if expr.subexpression_count() != 2 {
            return None;
        }

        let (left, right) = (expr.subexpression(0), expr.subexpression(1));
        if left.subexpression_count() != 0 || right.subexpression_count() != 0 {
            return None;
        }

        match (left.referenced_operand(), right.referenced_operand()) {
            (Some(l), Some(r)) if l != r => Some((l, r)),
            _ => None,
        }
    }

    fn node(&mut self, identity: &str) -> NodeIndex {
        if let Some(idx) = self.nodes.get(identity) {
            return *idx;
        }
        let idx = self.graph.add_node(identity.to_string());
        self.nodes.insert(identity.to_string(), idx);
        idx
    }

    /// Record that `left` and `right` are joinable.
    pub fn add_edge(&mut self, left: &str, right: &str) {
        let (l, r) = (self.node(left), self.node(right));
        self.graph.update_edge(l, r, ());
    }

    /// Operands directly joinable to `identity`, empty when it has no join predicate.
    pub fn neighbors<'a>(&'a self, identity: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.nodes
            .get(identity)
            .copied()
            .into_iter()
            .flat_map(move |idx| self.graph.neighbors(idx))
            .map(move |idx| self.graph[idx].as_str())
    }

    pub fn is_joinable(&self, left: &str, right: &str) -> bool {
        match (self.nodes.get(left), self.nodes.get(right)) {
            (Some(l), Some(r)) => self.graph.contains_edge(*l, *r),
            _ => false,
        }
    }

    /// Whether any name of `left` is joinable to any name of `right`.
    pub fn operands_joinable(&self, left: &ScanOperand, right: &ScanOperand) -> bool {
        left.names()
            .any(|l| right.names().any(|r| self.is_joinable(l, r)))
    }

    /// Whether `identity` takes part in at least one join predicate.
    pub fn contains(&self, identity: &str) -> bool {
        self.nodes.contains_key(identity)
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }
}
