use crate::solver::{slot, ConstraintId, VarId};
use crate::ValueId;

#[derive(Debug, Clone, Copy)]
enum TrailEntry {
    Pruned { var: VarId, index: usize },
    Assigned { var: VarId },
}

/// Mutable search state: current assignment, which domain entries are still
/// alive, and per-constraint counts of unassigned variables. Every change
/// goes through the trail so it can be undone back to a mark.
#[derive(Debug, Clone)]
pub(crate) struct State {
    assignment: Vec<Option<ValueId>>,
    alive: Vec<Vec<bool>>,
    live: Vec<usize>,
    unassigned_in: Vec<usize>,
    num_assigned: usize,
    num_satisfied: usize,
    trail: Vec<TrailEntry>,
}

impl State {
    pub(crate) fn new(domain_sizes: &[usize], scope_sizes: &[usize]) -> Self {
        Self {
            assignment: vec![None; domain_sizes.len()],
            alive: domain_sizes.iter().map(|size| vec![true; *size]).collect(),
            live: domain_sizes.to_vec(),
            unassigned_in: scope_sizes.to_vec(),
            num_assigned: 0,
            num_satisfied: scope_sizes.iter().filter(|size| **size == 0).count(),
            trail: Vec::new(),
        }
    }

    pub(crate) fn assignment(&self) -> &[Option<ValueId>] {
        &self.assignment
    }

    pub(crate) fn value(&self, var: VarId) -> Option<ValueId> {
        self.assignment[slot(var)]
    }

    pub(crate) fn is_alive(&self, var: VarId, index: usize) -> bool {
        self.alive[slot(var)][index]
    }

    pub(crate) fn live(&self, var: VarId) -> usize {
        self.live[slot(var)]
    }

    pub(crate) fn unassigned_in(&self, constraint: ConstraintId) -> usize {
        self.unassigned_in[slot(constraint)]
    }

    pub(crate) fn num_assigned(&self) -> usize {
        self.num_assigned
    }

    pub(crate) fn num_satisfied(&self) -> usize {
        self.num_satisfied
    }

    pub(crate) fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Sets a value without recording it, for probing predicates. The caller
    /// must put `None` back before touching anything else.
    pub(crate) fn probe(&mut self, var: VarId, value: Option<ValueId>) {
        self.assignment[slot(var)] = value;
    }

    pub(crate) fn assign(&mut self, var: VarId, value: ValueId, constraints: &[ConstraintId]) {
        debug_assert!(self.assignment[slot(var)].is_none());
        self.assignment[slot(var)] = Some(value);
        self.num_assigned += 1;
        for constraint in constraints {
            let remaining = &mut self.unassigned_in[slot(*constraint)];
            *remaining -= 1;
            if *remaining == 0 {
                self.num_satisfied += 1;
            }
        }
        self.trail.push(TrailEntry::Assigned { var });
    }

    pub(crate) fn prune(&mut self, var: VarId, index: usize) {
        let alive = &mut self.alive[slot(var)][index];
        if *alive {
            *alive = false;
            self.live[slot(var)] -= 1;
            self.trail.push(TrailEntry::Pruned { var, index });
        }
    }

    /// Rolls back every change made after `mark`. Constraint lists are needed
    /// to restore the unassigned counts.
    pub(crate) fn undo<'c>(
        &mut self,
        mark: usize,
        constraints_of: impl Fn(VarId) -> &'c [ConstraintId],
    ) {
        while self.trail.len() > mark {
            let Some(entry) = self.trail.pop() else {
                break;
            };
            match entry {
                TrailEntry::Pruned { var, index } => {
                    self.alive[slot(var)][index] = true;
                    self.live[slot(var)] += 1;
                }
                TrailEntry::Assigned { var } => {
                    self.assignment[slot(var)] = None;
                    self.num_assigned -= 1;
                    for constraint in constraints_of(var) {
                        let remaining = &mut self.unassigned_in[slot(*constraint)];
                        if *remaining == 0 {
                            self.num_satisfied -= 1;
                        }
                        *remaining += 1;
                    }
                }
            }
        }
    }
}
