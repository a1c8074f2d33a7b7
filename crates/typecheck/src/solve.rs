// ==============================================================================
// Solving
// ==============================================================================
//
// Turns the manager's constraints into a `typecheck_solver` problem over
// `Candidate` values, runs it, and rebuilds `Type`s from the assignment.
//
// Every variable draws from the shared domain unless something registered it
// earlier: array variables first (array candidates only), then constraints in
// creation order. Literal variables take their protocol's candidates,
// call sites the overloads of their family, explicit binds the bound type.

use std::iter;

use derive_more::Debug;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;
use typecheck_solver::{Cost, Distance, Domain, Solution, Solver, StateQuery};
use typecheck_ty::{FunctionId, FunctionType, FunctionVar, Type, TypeVar};

use crate::constraints::{Constraint, ConstraintKind, ConstraintPayload};
use crate::protocols::{KnownProtocolKind, LiteralTable};
use crate::{ConstraintPass, SolveError, TypeManager};

/// A value the solver can assign to a type variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Candidate {
    #[debug("{_0}")]
    Ground(Type),
    #[debug("{_0}")]
    Overload(FunctionVar),
}

impl TypeManager {
    /// Solves every constraint created so far. `None` when they cannot all
    /// hold; see [`Self::try_solve`] for the reason.
    pub fn solve(&self) -> Option<ConstraintPass> {
        match self.try_solve() {
            Ok(pass) => Some(pass),
            Err(err) => {
                log::info!("{err}");
                None
            }
        }
    }

    pub fn try_solve(&self) -> Result<ConstraintPass, SolveError> {
        let mut problem = Problem::new(self);

        for constraint in &self.constraints {
            if let (ConstraintKind::ArrayElement, ConstraintPayload::Types { first, .. }) =
                (constraint.kind(), constraint.payload())
            {
                problem.register(first, problem.arrays.clone());
            }
        }
        for constraint in &self.constraints {
            problem.translate(constraint)?;
        }

        let (heuristic, actual) = problem.costs();
        let solution = problem
            .solver
            .optimized_solution(&heuristic, &actual)
            .ok_or(SolveError::Unsatisfiable)?;

        if solution.stats().truncated {
            log::warn!("search was cut short by the node limit, the result may not be optimal");
        }
        log::debug!(
            "solved {} variables, cost {}, {:?}",
            solution.len(),
            solution.cost(),
            solution.stats()
        );

        Ok(reconstruct(&solution))
    }

    /// The deepest chain of array variables, `a -> Array<b>`, `b -> Array<c>`...
    fn array_depth(&self) -> usize {
        self.array_element_map
            .keys()
            .map(|var| {
                let mut depth = 0;
                let mut current = var;
                while let Some(element) = self.array_element_map.get(current) {
                    depth += 1;
                    current = element;
                    if depth > self.array_element_map.len() {
                        log::warn!("array variable `{var}` contains itself");
                        break;
                    }
                }
                depth
            })
            .max()
            .unwrap_or(0)
    }

    fn explicit_types(&self) -> impl Iterator<Item = &Type> {
        self.constraints
            .iter()
            .filter_map(|constraint| match constraint.payload() {
                ConstraintPayload::ExplicitType { ty, .. } if !ty.is_unset() => Some(ty),
                _ => None,
            })
    }

    fn literal_types_in_use(&self) -> impl Iterator<Item = &Type> {
        self.constraints
            .iter()
            .filter_map(|constraint| match constraint.payload() {
                ConstraintPayload::Conforms { protocol, .. } => protocol
                    .literal()
                    .and_then(|literal| self.literal_tables.get(literal)),
                _ => None,
            })
            .flat_map(LiteralTable::candidates)
    }

    /// Ground types, explicit binds and literal candidates, each wrapped in
    /// `Array<..>` once per level of the deepest array chain, then every
    /// overload.
    fn shared_domain(&self) -> Domain<Candidate> {
        let grounds = self
            .registered_types
            .iter()
            .chain(self.explicit_types())
            .chain(self.literal_types_in_use())
            .cloned()
            .unique()
            .collect::<Vec<_>>();

        let mut level = grounds.clone();
        let mut arrays = Vec::new();
        for _ in 0..self.array_depth() {
            level = level.into_iter().map(Type::array).collect();
            arrays.extend(level.iter().cloned());
        }

        grounds
            .into_iter()
            .chain(arrays)
            .unique()
            .map(Candidate::Ground)
            .chain(self.functions.iter().cloned().map(Candidate::Overload))
            .collect()
    }
}

fn is_array(candidate: &Candidate) -> bool {
    matches!(candidate, Candidate::Ground(ty) if ty.array_element().is_some())
}

// ==============================================================================
// Translation
// ==============================================================================

struct Problem<'m> {
    manager: &'m TypeManager,
    solver: Solver<'m, Candidate>,
    shared: Domain<Candidate>,
    arrays: Domain<Candidate>,
    /// Literal variables and the table their penalty is measured against.
    penalties: Vec<(SmolStr, LiteralTable)>,
}

impl<'m> Problem<'m> {
    fn new(manager: &'m TypeManager) -> Self {
        let shared = manager.shared_domain();
        let arrays = shared.iter().filter(|c| is_array(c)).cloned().collect();
        Self {
            manager,
            solver: Solver::with_config(manager.config.clone()),
            shared,
            arrays,
            penalties: Vec::new(),
        }
    }

    fn register(&mut self, var: &TypeVar, domain: Domain<Candidate>) {
        self.solver.add_variable(var.symbol().clone(), domain);
    }

    fn register_shared(&mut self, var: &TypeVar) {
        if !self.solver.has_variable(var.as_str()) {
            self.register(var, self.shared.clone());
        }
    }

    fn translate(&mut self, constraint: &Constraint) -> Result<(), SolveError> {
        let malformed = |reason: String| SolveError::MalformedConstraint {
            id: constraint.id(),
            reason,
        };
        if constraint.payload().vars().iter().any(|var| var.is_empty()) {
            return Err(malformed("empty type variable".to_string()));
        }

        match constraint.payload() {
            ConstraintPayload::Conforms { var, protocol } => self.conforms(var, *protocol),
            ConstraintPayload::Types {
                first,
                second,
                third,
            } => {
                let vars = iter::once(first)
                    .chain(iter::once(second))
                    .chain(third)
                    .collect::<Vec<_>>();
                for var in &vars {
                    self.register_shared(var);
                }
                let names = vars
                    .iter()
                    .map(|var| var.symbol().clone())
                    .collect::<Vec<_>>();

                match (constraint.kind(), names.as_slice()) {
                    (ConstraintKind::Equal, _) => self.equal(names.clone()),
                    (ConstraintKind::Conversion, [from, to]) => self.conversion(from, to),
                    (ConstraintKind::ArrayElement, [array, element]) => {
                        self.array_element(array, element)
                    }
                    (kind, names) => Err(malformed(format!(
                        "{kind:?} over {} type variables",
                        names.len()
                    ))),
                }
            }
            ConstraintPayload::Overload {
                var,
                function_id,
                arg_vars,
                return_var,
            } => self.overload(var, *function_id, arg_vars, return_var),
            ConstraintPayload::ExplicitType { var, ty } => {
                if ty.is_unset() {
                    return Err(malformed(format!("`{var}` bound to an unset type")));
                }
                self.explicit(var, ty)
            }
        }
    }

    /// The variable takes one of the protocol's candidates.
    fn conforms(&mut self, var: &TypeVar, protocol: KnownProtocolKind) -> Result<(), SolveError> {
        let manager = self.manager;
        let table = protocol
            .literal()
            .and_then(|literal| manager.literal_tables.get(literal))
            .ok_or(SolveError::UnsupportedProtocol(protocol))?;

        let domain = table.candidates().cloned().map(Candidate::Ground).collect();
        self.register(var, domain);

        let name = var.symbol().clone();
        let member = table.clone();
        self.solver.add_constraint([name.clone()], move |env| {
            matches!(env.get(&name), Some(Candidate::Ground(ty)) if member.contains(ty))
        })?;

        self.penalties.push((var.symbol().clone(), table.clone()));
        Ok(())
    }

    /// Every variable equals the first.
    fn equal(&mut self, names: Vec<SmolStr>) -> Result<(), SolveError> {
        self.solver.add_constraint(names.clone(), move |env| {
            let first = env.get(&names[0]);
            names[1..].iter().all(|name| env.get(name) == first)
        })?;
        Ok(())
    }

    fn conversion(&mut self, from: &SmolStr, to: &SmolStr) -> Result<(), SolveError> {
        let manager = self.manager;
        let edges = &manager.convertible;
        let (from, to) = (from.clone(), to.clone());
        self.solver
            .add_constraint([from.clone(), to.clone()], move |env| {
                match (env.get(&from), env.get(&to)) {
                    (Some(a), Some(b)) if a == b => true,
                    (Some(Candidate::Ground(a)), Some(Candidate::Ground(b))) => {
                        converts(edges, a, b)
                    }
                    _ => false,
                }
            })?;
        Ok(())
    }

    fn array_element(&mut self, array: &SmolStr, element: &SmolStr) -> Result<(), SolveError> {
        let (array, element) = (array.clone(), element.clone());
        self.solver
            .add_constraint([array.clone(), element.clone()], move |env| {
                match (env.get(&array), env.get(&element)) {
                    (Some(Candidate::Ground(outer)), Some(Candidate::Ground(inner))) => {
                        outer.array_element() == Some(inner)
                    }
                    _ => false,
                }
            })?;
        Ok(())
    }

    /// The call site picks one overload of the family; whichever it picks,
    /// the call's arguments and return must match that overload's.
    fn overload(
        &mut self,
        site: &TypeVar,
        function_id: FunctionId,
        arg_vars: &[TypeVar],
        return_var: &TypeVar,
    ) -> Result<(), SolveError> {
        let family = self
            .manager
            .functions_for(function_id)
            .cloned()
            .collect::<Vec<_>>();
        if family.is_empty() {
            return Err(SolveError::NoOverloads {
                site: site.clone(),
                function_id,
            });
        }

        let members = family
            .iter()
            .cloned()
            .map(Candidate::Overload)
            .collect::<Domain<_>>();
        self.register(site, members.clone());

        let call_vars = iter::once(return_var)
            .chain(arg_vars)
            .collect::<Vec<_>>();
        for var in &call_vars {
            self.register_shared(var);
        }
        for var in family.iter().flat_map(FunctionVar::vars) {
            self.register_shared(var);
        }

        let site = site.symbol().clone();
        let site_key = site.clone();
        self.solver.add_constraint([site.clone()], move |env| {
            env.get(&site_key).is_some_and(|chosen| members.contains(chosen))
        })?;

        let call = call_vars
            .iter()
            .map(|var| var.symbol().clone())
            .collect::<Vec<_>>();
        for overload in family {
            let declared = overload
                .vars()
                .map(|var| var.symbol().clone())
                .collect::<Vec<_>>();
            let arity_matches = overload.args.len() == arg_vars.len();
            let scope = iter::once(site.clone())
                .chain(call.iter().cloned())
                .chain(declared.iter().cloned())
                .collect::<Vec<_>>();

            let site = site.clone();
            let call = call.clone();
            let chosen = Candidate::Overload(overload);
            self.solver.add_constraint(scope, move |env| {
                if env.get(&site) != Some(&chosen) {
                    return true;
                }
                arity_matches
                    && call
                        .iter()
                        .zip(&declared)
                        .all(|(ours, theirs)| env.get(ours) == env.get(theirs))
            })?;
        }
        Ok(())
    }

    fn explicit(&mut self, var: &TypeVar, ty: &Type) -> Result<(), SolveError> {
        let pinned = Candidate::Ground(ty.clone());
        self.register(var, Domain::single(pinned.clone()));

        let name = var.symbol().clone();
        self.solver
            .add_constraint([name.clone()], move |env| env.get(&name) == Some(&pinned))?;
        Ok(())
    }

    // ==========================================================================
    // Costs
    // ==========================================================================

    /// Heuristic and actual cost. Both count variables and constraints and add
    /// a penalty per literal variable: 0 for a preferred type, 1 for another
    /// candidate, 2 while unassigned.
    fn costs(&self) -> (Cost<'m, Candidate>, Cost<'m, Candidate>) {
        let mut heuristic = Cost::new(|query: &StateQuery<'_, Candidate>| {
            (query.num_variables() + query.num_constraints() - query.num_satisfied()) as Distance
        });
        let mut actual = Cost::new(|query: &StateQuery<'_, Candidate>| {
            (query.num_variables() + query.num_constraints()) as Distance
        });

        for (var, table) in &self.penalties {
            heuristic.add_term(var.clone(), literal_penalty(table.clone()));
            actual.add_term(var.clone(), literal_penalty(table.clone()));
        }
        (heuristic, actual)
    }
}

fn literal_penalty(table: LiteralTable) -> impl Fn(Option<&Candidate>) -> Distance {
    move |value: Option<&Candidate>| match value {
        Some(Candidate::Ground(ty)) if table.is_preferred(ty) => 0,
        Some(_) => 1,
        None => 2,
    }
}

fn converts(edges: &FxHashMap<Type, Vec<Type>>, from: &Type, to: &Type) -> bool {
    from.has_generic()
        && edges
            .get(from)
            .is_some_and(|targets| targets.contains(to))
}

// ==============================================================================
// Reconstruction
// ==============================================================================

#[derive(Debug, Error)]
enum Unresolved {
    #[error("`{0}` has no value in the solution")]
    Missing(SmolStr),
    #[error("overload of function {0} refers to itself")]
    Cycle(FunctionId),
}

fn reconstruct(solution: &Solution<Candidate>) -> ConstraintPass {
    let mut pass = ConstraintPass::default();
    for (name, candidate) in solution.iter() {
        match resolve(candidate, solution, &mut Vec::new()) {
            Ok(ty) => {
                pass.set_resolved_type(TypeVar::new(name.clone()), ty);
            }
            Err(err) => log::warn!("dropping `{name}` from the result: {err}"),
        }
    }
    pass
}

fn resolve<'s>(
    candidate: &'s Candidate,
    solution: &'s Solution<Candidate>,
    open: &mut Vec<&'s FunctionVar>,
) -> Result<Type, Unresolved> {
    let overload = match candidate {
        Candidate::Ground(ty) => return Ok(ty.clone()),
        Candidate::Overload(overload) => overload,
    };
    if open.contains(&overload) {
        return Err(Unresolved::Cycle(overload.id));
    }
    open.push(overload);

    let mut func = FunctionType::new(overload.name.clone(), overload.id);
    for arg in &overload.args {
        *func.add_arg() = resolve(lookup(solution, arg)?, solution, open)?;
    }
    *func.return_type_mut() = resolve(lookup(solution, &overload.return_var)?, solution, open)?;

    open.pop();
    Ok(func.into())
}

fn lookup<'s>(solution: &'s Solution<Candidate>, var: &TypeVar) -> Result<&'s Candidate, Unresolved> {
    solution
        .get(var.as_str())
        .ok_or_else(|| Unresolved::Missing(var.symbol().clone()))
}
