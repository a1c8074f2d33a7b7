use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::solver::{slot, VarId};
use crate::ValueId;

/// Read-only view of the current assignment, handed to constraint predicates.
pub struct Env<'s, V> {
    pub(crate) values: &'s [V],
    pub(crate) by_name: &'s FxHashMap<SmolStr, VarId>,
    pub(crate) assignment: &'s [Option<ValueId>],
}

impl<'s, V> Env<'s, V> {
    /// The value assigned to `name`, if it is a known variable with a value.
    pub fn get(&self, name: &str) -> Option<&'s V> {
        let var = self.by_name.get(name)?;
        let value = self.assignment[slot(*var)]?;
        Some(&self.values[usize::from(value)])
    }

    pub fn is_assigned(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// What cost functions see of the search state.
pub struct StateQuery<'s, V> {
    pub(crate) env: Env<'s, V>,
    pub(crate) num_variables: usize,
    pub(crate) num_assigned: usize,
    pub(crate) num_constraints: usize,
    pub(crate) num_satisfied: usize,
}

impl<'s, V> StateQuery<'s, V> {
    pub fn value(&self, name: &str) -> Option<&'s V> {
        self.env.get(name)
    }

    pub fn is_assigned(&self, name: &str) -> bool {
        self.env.is_assigned(name)
    }

    pub fn env(&self) -> &Env<'s, V> {
        &self.env
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn num_assigned(&self) -> usize {
        self.num_assigned
    }

    pub fn num_constraints(&self) -> usize {
        self.num_constraints
    }

    /// Constraints whose variables are all assigned. Search only ever reaches
    /// states where those constraints hold.
    pub fn num_satisfied(&self) -> usize {
        self.num_satisfied
    }
}
