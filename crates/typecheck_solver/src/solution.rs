use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::Distance;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// Search nodes expanded, one per value tried.
    pub nodes: u64,
    pub backtracks: u64,
    /// Complete assignments reached, including ones later beaten.
    pub solutions: u64,
    pub components: usize,
    /// Set when a node limit cut a search short, so the result may not be optimal.
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution<V> {
    assignments: BTreeMap<SmolStr, V>,
    cost: Distance,
    heuristic: Distance,
    stats: SolverStats,
}

impl<V> Solution<V> {
    pub(crate) fn new(
        assignments: BTreeMap<SmolStr, V>,
        cost: Distance,
        heuristic: Distance,
        stats: SolverStats,
    ) -> Self {
        Self {
            assignments,
            cost,
            heuristic,
            stats,
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.assignments.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &V)> {
        self.assignments.iter()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Actual cost of the assignment.
    pub fn cost(&self) -> Distance {
        self.cost
    }

    /// Heuristic cost of the final state.
    pub fn heuristic_cost(&self) -> Distance {
        self.heuristic
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    pub fn into_assignments(self) -> BTreeMap<SmolStr, V> {
        self.assignments
    }
}
