use smol_str::SmolStr;

use crate::{Distance, StateQuery};

pub type BaseCost<'a, V> = Box<dyn Fn(&StateQuery<'_, V>) -> Distance + 'a>;
pub type TermCost<'a, V> = Box<dyn Fn(Option<&V>) -> Distance + 'a>;

/// A cost function over search states: a base part computed from the whole
/// state plus one term per watched variable.
///
/// Terms only see their own variable, which lets the solver bound the cost of
/// every completion of a partial assignment. When a cost drives optimisation
/// its base must not depend on which values were picked.
pub struct Cost<'a, V> {
    base: BaseCost<'a, V>,
    terms: Vec<(SmolStr, TermCost<'a, V>)>,
}

impl<'a, V> Cost<'a, V> {
    pub fn new(base: impl Fn(&StateQuery<'_, V>) -> Distance + 'a) -> Self {
        Self {
            base: Box::new(base),
            terms: Vec::new(),
        }
    }

    pub fn zero() -> Self {
        Self::new(|_| 0)
    }

    pub fn add_term(
        &mut self,
        var: impl Into<SmolStr>,
        term: impl Fn(Option<&V>) -> Distance + 'a,
    ) {
        self.terms.push((var.into(), Box::new(term)));
    }

    pub fn with_term(
        mut self,
        var: impl Into<SmolStr>,
        term: impl Fn(Option<&V>) -> Distance + 'a,
    ) -> Self {
        self.add_term(var, term);
        self
    }

    pub fn evaluate(&self, query: &StateQuery<'_, V>) -> Distance {
        self.terms
            .iter()
            .fold((self.base)(query), |acc, (var, term)| {
                acc.saturating_add(term(query.value(var)))
            })
    }

    pub(crate) fn terms(&self) -> &[(SmolStr, TermCost<'a, V>)] {
        &self.terms
    }
}
