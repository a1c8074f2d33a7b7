use std::hash::Hash;

use rustc_hash::FxHashMap;
use union_find::{QuickFindUf, UnionByRank, UnionFind};

use crate::solver::{slot, ConstraintId, VarId};
use crate::state::State;
use crate::{
    Cost, Distance, Env, Solution, Solver, SolverStats, StateQuery, TermCost, ValueId,
};

/// One frame of the depth-first search: a variable and the values still to
/// try for it, in heuristic order.
#[derive(Debug)]
pub(crate) struct Node {
    var: VarId,
    candidates: Vec<ValueId>,
    next: usize,
    /// Trail length before `var` was assigned.
    mark: usize,
}

impl Node {
    fn new(var: VarId, candidates: Vec<ValueId>, mark: usize) -> Self {
        Self {
            var,
            candidates,
            next: 0,
            mark,
        }
    }

    fn next_value(&mut self) -> Option<ValueId> {
        let value = self.candidates.get(self.next).copied()?;
        self.next += 1;
        Some(value)
    }
}

type Assignment = Vec<(VarId, ValueId)>;

pub(crate) struct Search<'p, 'a, V> {
    solver: &'p Solver<'a, V>,
    heuristic: &'p Cost<'a, V>,
    actual: &'p Cost<'a, V>,
    bound_terms: Vec<(VarId, &'p TermCost<'a, V>)>,
    state: State,
    stats: SolverStats,
}

impl<'p, 'a, V: Clone + Eq + Hash> Search<'p, 'a, V> {
    pub(crate) fn new(
        solver: &'p Solver<'a, V>,
        heuristic: &'p Cost<'a, V>,
        actual: &'p Cost<'a, V>,
    ) -> Self {
        let bound_terms = actual
            .terms()
            .iter()
            .filter_map(|(name, term)| match solver.by_name.get(name) {
                Some(var) => Some((*var, term)),
                None => {
                    log::warn!("cost term for unknown variable `{name}` ignored");
                    None
                }
            })
            .collect();

        let domain_sizes = solver
            .variables
            .iter()
            .map(|(_, variable)| variable.domain.len())
            .collect::<Vec<_>>();
        let scope_sizes = solver
            .scopes
            .iter()
            .map(|(_, scope)| scope.vars.len())
            .collect::<Vec<_>>();

        Self {
            solver,
            heuristic,
            actual,
            bound_terms,
            state: State::new(&domain_sizes, &scope_sizes),
            stats: SolverStats::default(),
        }
    }

    pub(crate) fn run(mut self) -> Option<Solution<V>> {
        if !self.establish() {
            return None;
        }

        let components = self.components();
        self.stats.components = components.len();

        for component in &components {
            let best = self.solve_component(component)?;
            if !self.commit(&best) {
                log::warn!("best assignment of a component failed to re-apply");
                return None;
            }
        }

        Some(self.finish())
    }

    // ==========================================================================
    // Consistency
    // ==========================================================================

    /// Node consistency and root propagation.
    fn establish(&mut self) -> bool {
        let solver = self.solver;

        for (constraint, scope) in solver.scopes.iter() {
            match scope.vars.as_slice() {
                [] if !self.check(constraint) => {
                    log::warn!("constraint over no variables never holds");
                    return false;
                }
                [var] if !self.revise(*var, constraint) => {
                    log::warn!(
                        "no value of `{}` satisfies its unary constraints",
                        solver.variables[*var].name
                    );
                    return false;
                }
                _ => {}
            }
        }

        for (var, variable) in solver.variables.iter() {
            if self.state.live(var) == 0 {
                log::warn!("variable `{}` has an empty domain", variable.name);
                return false;
            }
        }

        for (var, variable) in solver.variables.iter() {
            if self.state.value(var).is_some() {
                continue;
            }
            if let Some(only) = self.single_live(var) {
                if !self.assign_and_propagate(var, only) {
                    log::warn!("propagating the only value of `{}` failed", variable.name);
                    return false;
                }
            }
        }

        true
    }

    fn env(&self) -> Env<'_, V> {
        Env {
            values: &self.solver.values,
            by_name: &self.solver.by_name,
            assignment: self.state.assignment(),
        }
    }

    fn query(&self) -> StateQuery<'_, V> {
        StateQuery {
            env: self.env(),
            num_variables: self.solver.variables.len(),
            num_assigned: self.state.num_assigned(),
            num_constraints: self.solver.scopes.len(),
            num_satisfied: self.state.num_satisfied(),
        }
    }

    fn check(&self, constraint: ConstraintId) -> bool {
        (self.solver.predicates[constraint])(&self.env())
    }

    /// Drops the live values of `var` that violate `constraint` given the
    /// rest of the assignment. False when nothing is left.
    fn revise(&mut self, var: VarId, constraint: ConstraintId) -> bool {
        let solver = self.solver;
        for (index, value) in solver.variables[var].domain.iter().enumerate() {
            if !self.state.is_alive(var, index) {
                continue;
            }
            self.state.probe(var, Some(*value));
            let holds = self.check(constraint);
            self.state.probe(var, None);
            if !holds {
                self.state.prune(var, index);
            }
        }
        self.state.live(var) > 0
    }

    /// Assigns `value` and forward-checks every constraint it touches; a
    /// variable left with one live value is assigned in turn.
    fn assign_and_propagate(&mut self, var: VarId, value: ValueId) -> bool {
        let solver = self.solver;
        let mut queue = vec![(var, value)];

        while let Some((var, value)) = queue.pop() {
            if let Some(current) = self.state.value(var) {
                if current == value {
                    continue;
                }
                return false;
            }

            let domain = &solver.variables[var].domain;
            let alive = domain
                .iter()
                .position(|candidate| *candidate == value)
                .is_some_and(|index| self.state.is_alive(var, index));
            if !alive {
                return false;
            }

            let constraints = &solver.variables[var].constraints;
            self.state.assign(var, value, constraints);

            for &constraint in constraints {
                match self.state.unassigned_in(constraint) {
                    0 => {
                        if !self.check(constraint) {
                            return false;
                        }
                    }
                    1 => {
                        let Some(&other) = solver.scopes[constraint]
                            .vars
                            .iter()
                            .find(|other| self.state.value(**other).is_none())
                        else {
                            continue;
                        };
                        if !self.revise(other, constraint) {
                            return false;
                        }
                        if let Some(only) = self.single_live(other) {
                            queue.push((other, only));
                        }
                    }
                    _ => {}
                }
            }
        }

        true
    }

    fn undo(&mut self, mark: usize) {
        let solver = self.solver;
        self.state
            .undo(mark, |var| solver.variables[var].constraints.as_slice());
    }

    fn live_values(&self, var: VarId) -> impl Iterator<Item = ValueId> + '_ {
        self.solver.variables[var]
            .domain
            .iter()
            .enumerate()
            .filter(move |(index, _)| self.state.is_alive(var, *index))
            .map(|(_, value)| *value)
    }

    fn single_live(&self, var: VarId) -> Option<ValueId> {
        if self.state.live(var) != 1 {
            return None;
        }
        self.live_values(var).next()
    }

    // ==========================================================================
    // Search
    // ==========================================================================

    /// Variables grouped by the constraints linking them, in registration order.
    fn components(&self) -> Vec<Vec<VarId>> {
        let solver = self.solver;
        let mut uf: QuickFindUf<UnionByRank> = QuickFindUf::new(solver.variables.len());
        for (_, scope) in solver.scopes.iter() {
            for pair in scope.vars.windows(2) {
                uf.union(slot(pair[0]), slot(pair[1]));
            }
        }

        let mut by_root: FxHashMap<usize, usize> = FxHashMap::default();
        let mut components: Vec<Vec<VarId>> = Vec::new();
        for (var, _) in solver.variables.iter() {
            let root = uf.find(slot(var));
            let idx = *by_root.entry(root).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[idx].push(var);
        }
        components
    }

    /// Branch and bound over one component. Leaves the state as it found it
    /// and hands back the cheapest assignment of the component's variables.
    fn solve_component(&mut self, component: &[VarId]) -> Option<Assignment> {
        let terms = self
            .bound_terms
            .iter()
            .filter(|(var, _)| component.contains(var))
            .copied()
            .collect::<Vec<_>>();

        let root = self.state.mark();
        let mut stack: Vec<Node> = Vec::new();
        let mut best: Option<(Distance, Assignment)> = None;
        let mut expanded: u64 = 0;

        match self.select(component) {
            None => return Some(self.snapshot(component)),
            Some(var) => {
                let candidates = self.order_values(var);
                stack.push(Node::new(var, candidates, root));
            }
        }

        while let Some(node) = stack.last_mut() {
            let (var, mark) = (node.var, node.mark);
            let next = node.next_value();
            self.undo(mark);
            let Some(value) = next else {
                stack.pop();
                continue;
            };

            expanded += 1;
            self.stats.nodes += 1;
            if let Some(limit) = self.solver.config.node_limit {
                if expanded > limit {
                    self.stats.truncated = true;
                    if best.is_some() {
                        log::warn!("node limit of {limit} reached, keeping the best assignment so far");
                    } else {
                        log::warn!("node limit of {limit} reached before any assignment was found");
                    }
                    break;
                }
            }

            if !self.assign_and_propagate(var, value) {
                self.stats.backtracks += 1;
                continue;
            }

            let bound = self.lower_bound(&terms);
            if best.as_ref().is_some_and(|(cost, _)| bound >= *cost) {
                self.stats.backtracks += 1;
                continue;
            }

            match self.select(component) {
                None => {
                    self.stats.solutions += 1;
                    log::trace!("assignment with cost {bound} found after {expanded} nodes");
                    best = Some((bound, self.snapshot(component)));
                }
                Some(next) => {
                    let candidates = self.order_values(next);
                    let mark = self.state.mark();
                    stack.push(Node::new(next, candidates, mark));
                }
            }
        }

        self.undo(root);

        if best.is_none() {
            log::debug!(
                "no satisfying assignment for the component of `{}`",
                self.solver.variables[component[0]].name
            );
        }
        best.map(|(_, assignment)| assignment)
    }

    /// Smallest live domain first, earliest registered on ties.
    fn select(&self, component: &[VarId]) -> Option<VarId> {
        component
            .iter()
            .copied()
            .filter(|var| self.state.value(*var).is_none())
            .min_by_key(|var| self.state.live(*var))
    }

    /// Live values of `var` sorted by the heuristic cost of picking them.
    /// The sort is stable, so domain order breaks ties.
    fn order_values(&mut self, var: VarId) -> Vec<ValueId> {
        let candidates = self.live_values(var).collect::<Vec<_>>();
        let mut scored = Vec::with_capacity(candidates.len());
        for value in candidates {
            self.state.probe(var, Some(value));
            let score = self.heuristic.evaluate(&self.query());
            self.state.probe(var, None);
            scored.push((score, value));
        }
        scored.sort_by_key(|(score, _)| *score);
        scored.into_iter().map(|(_, value)| value).collect()
    }

    /// The cheapest any completion of the current state can be, counting only
    /// the per-variable terms.
    fn lower_bound(&self, terms: &[(VarId, &TermCost<'a, V>)]) -> Distance {
        let values = &self.solver.values;
        terms.iter().fold(0, |acc: Distance, (var, term)| {
            let cost = match self.state.value(*var) {
                Some(value) => term(Some(&values[usize::from(value)])),
                None => self
                    .live_values(*var)
                    .map(|value| term(Some(&values[usize::from(value)])))
                    .min()
                    .unwrap_or(Distance::MAX),
            };
            acc.saturating_add(cost)
        })
    }

    fn snapshot(&self, component: &[VarId]) -> Assignment {
        component
            .iter()
            .filter_map(|var| self.state.value(*var).map(|value| (*var, value)))
            .collect()
    }

    fn commit(&mut self, assignment: &[(VarId, ValueId)]) -> bool {
        assignment
            .iter()
            .all(|(var, value)| self.assign_and_propagate(*var, *value))
    }

    fn finish(self) -> Solution<V> {
        let solver = self.solver;
        let query = self.query();
        let cost = self.actual.evaluate(&query);
        let heuristic = self.heuristic.evaluate(&query);

        let assignments = solver
            .variables
            .iter()
            .filter_map(|(var, variable)| {
                self.state
                    .value(var)
                    .map(|value| (variable.name.clone(), solver.values[usize::from(value)].clone()))
            })
            .collect();

        log::debug!(
            "solved {} variables in {} components: {} nodes, {} backtracks, cost {cost}",
            solver.variables.len(),
            self.stats.components,
            self.stats.nodes,
            self.stats.backtracks,
        );

        Solution::new(assignments, cost, heuristic, self.stats)
    }
}
