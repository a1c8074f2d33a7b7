use std::hash::Hash;

use derive_more::Debug;
use la_arena::{Arena, ArenaMap, Idx};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::search::Search;
use crate::{Cost, Domain, Env, Solution, SolverConfig, SolverError, ValueId};

pub type Predicate<'a, V> = Box<dyn Fn(&Env<'_, V>) -> bool + 'a>;

pub(crate) type VarId = Idx<Variable>;
pub(crate) type ConstraintId = Idx<ConstraintScope>;

#[inline]
pub(crate) fn slot<T>(idx: Idx<T>) -> usize {
    u32::from(idx.into_raw()) as usize
}

#[derive(Debug)]
pub(crate) struct Variable {
    pub(crate) name: SmolStr,
    pub(crate) domain: Vec<ValueId>,
    pub(crate) constraints: Vec<ConstraintId>,
}

/// The distinct variables a constraint reads, in first-mention order.
#[derive(Debug)]
pub(crate) struct ConstraintScope {
    pub(crate) vars: Vec<VarId>,
}

#[derive(Debug)]
pub struct Solver<'a, V> {
    pub(crate) config: SolverConfig,
    pub(crate) values: Vec<V>,
    value_ids: FxHashMap<V, ValueId>,
    pub(crate) variables: Arena<Variable>,
    pub(crate) by_name: FxHashMap<SmolStr, VarId>,
    pub(crate) scopes: Arena<ConstraintScope>,
    #[debug(skip)]
    pub(crate) predicates: ArenaMap<ConstraintId, Predicate<'a, V>>,
}

impl<V: Clone + Eq + Hash> Default for Solver<'_, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V: Clone + Eq + Hash> Solver<'a, V> {
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            values: Vec::new(),
            value_ids: FxHashMap::default(),
            variables: Arena::default(),
            by_name: FxHashMap::default(),
            scopes: Arena::default(),
            predicates: ArenaMap::default(),
        }
    }

    /// Registers `name` over `domain`. The first registration of a name wins:
    /// later calls are ignored and return false.
    pub fn add_variable(&mut self, name: impl Into<SmolStr>, domain: Domain<V>) -> bool {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            log::trace!("variable `{name}` already registered, keeping its first domain");
            return false;
        }

        let domain = domain.into_iter().map(|value| self.intern(value)).collect();
        let id = self.variables.alloc(Variable {
            name: name.clone(),
            domain,
            constraints: Vec::new(),
        });
        self.by_name.insert(name, id);
        true
    }

    /// Adds a constraint over the named variables. The predicate is only ever
    /// called once every one of those variables is assigned.
    pub fn add_constraint<I, S>(
        &mut self,
        vars: I,
        predicate: impl Fn(&Env<'_, V>) -> bool + 'a,
    ) -> Result<(), SolverError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scope: Vec<VarId> = Vec::new();
        for name in vars {
            let name = name.as_ref();
            let var = *self
                .by_name
                .get(name)
                .ok_or_else(|| SolverError::UnknownVariable(name.into()))?;
            if !scope.contains(&var) {
                scope.push(var);
            }
        }

        let id = self.scopes.alloc(ConstraintScope {
            vars: scope.clone(),
        });
        for var in scope {
            self.variables[var].constraints.push(id);
        }
        self.predicates.insert(id, Box::new(predicate));
        Ok(())
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.scopes.len()
    }

    /// The satisfying assignment with the lowest `actual` cost, exploring
    /// candidate values in `heuristic` order. Among equally cheap assignments
    /// the first one reached wins.
    pub fn optimized_solution(
        &self,
        heuristic: &Cost<'a, V>,
        actual: &Cost<'a, V>,
    ) -> Option<Solution<V>> {
        Search::new(self, heuristic, actual).run()
    }

    fn intern(&mut self, value: V) -> ValueId {
        if let Some(id) = self.value_ids.get(&value) {
            return *id;
        }
        let id = ValueId::from(self.values.len());
        self.values.push(value.clone());
        self.value_ids.insert(value, id);
        id
    }
}
