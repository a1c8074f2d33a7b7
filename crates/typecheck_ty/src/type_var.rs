use std::fmt;

use derive_more::Debug;
use smol_str::SmolStr;

/// A placeholder for a not yet known type, identified by its symbol (`T0`, `T1`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[debug("TypeVar({_0})")]
pub struct TypeVar(SmolStr);

impl TypeVar {
    pub fn new(symbol: impl Into<SmolStr>) -> Self {
        TypeVar(symbol.into())
    }

    pub fn symbol(&self) -> &SmolStr {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn set_symbol(&mut self, symbol: impl Into<SmolStr>) {
        self.0 = symbol.into();
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeVar {
    fn from(value: &str) -> Self {
        TypeVar::new(value)
    }
}

impl From<SmolStr> for TypeVar {
    fn from(value: SmolStr) -> Self {
        TypeVar(value)
    }
}

impl From<&TypeVar> for TypeVar {
    fn from(value: &TypeVar) -> Self {
        value.clone()
    }
}

impl std::borrow::Borrow<str> for TypeVar {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}
