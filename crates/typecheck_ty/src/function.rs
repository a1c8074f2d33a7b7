use std::fmt;

use derive_more::Debug;
use itertools::Itertools;
use smol_str::SmolStr;

use crate::Type;

/// Identity shared by every overload of one call-site name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[debug("FunctionId({_0})")]
pub struct FunctionId(i64);

impl FunctionId {
    pub fn new(id: i64) -> Self {
        FunctionId(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for FunctionId {
    #[inline]
    fn from(value: i64) -> Self {
        FunctionId(value)
    }
}

impl From<FunctionId> for i64 {
    #[inline]
    fn from(value: FunctionId) -> Self {
        value.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved function signature.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub name: SmolStr,
    pub id: FunctionId,
    pub args: Vec<Type>,
    pub return_type: Option<Box<Type>>,
}

impl FunctionType {
    pub fn new(name: impl Into<SmolStr>, id: impl Into<FunctionId>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            args: Vec::new(),
            return_type: None,
        }
    }

    pub fn with_signature(mut self, args: Vec<Type>, return_type: Type) -> Self {
        self.args = args;
        self.return_type = Some(Box::new(return_type));
        self
    }

    pub fn has_return_type(&self) -> bool {
        self.return_type.is_some()
    }

    pub fn return_type(&self) -> Option<&Type> {
        self.return_type.as_deref()
    }

    pub fn add_arg(&mut self) -> &mut Type {
        let idx = self.args.len();
        self.args.push(Type::Unset);
        &mut self.args[idx]
    }

    pub fn return_type_mut(&mut self) -> &mut Type {
        self.return_type.get_or_insert_with(Box::default)
    }
}

impl fmt::Debug for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({self} #{})", self.id)
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args.iter().join(", "))?;
        if let Some(ret) = &self.return_type {
            write!(f, " -> {ret}")?;
        }
        Ok(())
    }
}
