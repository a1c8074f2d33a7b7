use std::collections::BTreeMap;

use typecheck_ty::{Type, TypeVar};

/// The outcome of a successful solve: one resolved type per variable,
/// ordered by symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintPass {
    resolved: BTreeMap<TypeVar, Type>,
}

impl ConstraintPass {
    pub fn has_resolved_type(&self, var: &TypeVar) -> bool {
        self.resolved.contains_key(var)
    }

    /// The resolved type of `var`, or `Type::Unset` (with a warning) when the
    /// pass has none.
    pub fn get_resolved_type(&self, var: &TypeVar) -> Type {
        match self.resolved.get(var) {
            Some(ty) => ty.clone(),
            None => {
                log::warn!("no resolved type for `{var}`");
                Type::Unset
            }
        }
    }

    pub fn resolved_type(&self, var: &TypeVar) -> Option<&Type> {
        self.resolved.get(var)
    }

    /// False for the empty symbol, which is never stored.
    pub fn set_resolved_type(&mut self, var: TypeVar, ty: Type) -> bool {
        if var.is_empty() {
            return false;
        }
        self.resolved.insert(var, ty);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeVar, &Type)> {
        self.resolved.iter()
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConstraintPass {
    type Item = (&'a TypeVar, &'a Type);
    type IntoIter = std::collections::btree_map::Iter<'a, TypeVar, Type>;

    fn into_iter(self) -> Self::IntoIter {
        self.resolved.iter()
    }
}
