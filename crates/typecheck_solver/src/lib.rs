// ==============================================================================
// Discrete Constraint Satisfaction Solver
// ==============================================================================
//
// A small CSP engine: named variables over finite domains, n-ary predicate
// constraints, and a search for the satisfying assignment with the lowest
// cost.
//
// Stages, in order:
// 1. Node consistency: unary constraints filter their variable's domain.
// 2. Root propagation: forward checking plus singleton assignment.
// 3. Decomposition: variables linked by constraints form independent
//    components (union-find), each searched on its own.
// 4. Search: iterative depth-first search over `Node` frames, smallest live
//    domain first, values ordered by the heuristic cost, pruned by a lower
//    bound on the actual cost (branch and bound).

mod cost;
mod domain;
mod env;
mod search;
mod solution;
mod solver;
mod state;

#[cfg(test)]
mod tests;

pub use cost::{BaseCost, Cost, TermCost};
pub use domain::Domain;
pub use env::{Env, StateQuery};
pub use solution::{Solution, SolverStats};
pub use solver::{Predicate, Solver};

use derive_more::Debug;
use smol_str::SmolStr;
use thiserror::Error;

/// Score of a (partial) assignment. Lower is better.
pub type Distance = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("constraint references unknown variable `{0}`")]
    UnknownVariable(SmolStr),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverConfig {
    /// Maximum number of search nodes expanded per component. When reached the
    /// best assignment found so far is kept; without one the solve fails.
    pub node_limit: Option<u64>,
}

impl SolverConfig {
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }
}

/// Index of an interned domain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[debug("ValueId({_0})")]
pub(crate) struct ValueId(u32);

impl From<usize> for ValueId {
    #[inline]
    fn from(value: usize) -> Self {
        ValueId(value as u32)
    }
}

impl From<ValueId> for usize {
    #[inline]
    fn from(value: ValueId) -> Self {
        value.0 as usize
    }
}
