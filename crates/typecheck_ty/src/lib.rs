mod function;
mod function_var;
mod generic;
mod type_var;

#[cfg(any(test, feature = "proptest_support"))]
pub mod arbitrary;

#[cfg(test)]
mod tests;

use std::fmt;

pub use function::{FunctionId, FunctionType};
pub use function_var::{FunctionVar, ParseFunctionVarError};
pub use generic::{GenericType, ARRAY_TYPE_NAME};
pub use type_var::TypeVar;

use derive_more::Debug;
use smol_str::SmolStr;

/// A resolved type value.
///
/// `Unset` is the empty state: it is what a failed lookup hands back and is
/// never a valid answer from the solver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Type {
    #[default]
    #[debug("Unset")]
    Unset,
    #[debug("{_0:?}")]
    Generic(GenericType),
    #[debug("{_0:?}")]
    Function(FunctionType),
}

impl Type {
    /// A non-generic named type such as `int`.
    pub fn named(name: impl Into<SmolStr>) -> Self {
        Type::Generic(GenericType::new(name))
    }

    /// `Array<element>`
    pub fn array(element: Type) -> Self {
        Type::Generic(GenericType::array(element))
    }

    pub fn has_generic(&self) -> bool {
        matches!(self, Type::Generic(_))
    }

    pub fn has_func(&self) -> bool {
        matches!(self, Type::Function(_))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Type::Unset)
    }

    pub fn generic(&self) -> Option<&GenericType> {
        match self {
            Type::Generic(generic) => Some(generic),
            _ => None,
        }
    }

    pub fn func(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(func) => Some(func),
            _ => None,
        }
    }

    /// The head name of the type: the generic constructor or the function name.
    pub fn name(&self) -> Option<&SmolStr> {
        match self {
            Type::Unset => None,
            Type::Generic(generic) => Some(&generic.name),
            Type::Function(func) => Some(&func.name),
        }
    }

    /// The element type when this is an `Array<_>`.
    pub fn array_element(&self) -> Option<&Type> {
        self.generic().and_then(GenericType::array_element)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unset => write!(f, "<unset>"),
            Type::Generic(generic) => write!(f, "{generic}"),
            Type::Function(func) => write!(f, "{func}"),
        }
    }
}

impl From<GenericType> for Type {
    fn from(value: GenericType) -> Self {
        Type::Generic(value)
    }
}

impl From<FunctionType> for Type {
    fn from(value: FunctionType) -> Self {
        Type::Function(value)
    }
}

impl From<&str> for Type {
    fn from(value: &str) -> Self {
        Type::named(value)
    }
}

impl From<String> for Type {
    fn from(value: String) -> Self {
        Type::named(value)
    }
}

impl From<SmolStr> for Type {
    fn from(value: SmolStr) -> Self {
        Type::named(value)
    }
}

impl From<&Type> for Type {
    fn from(value: &Type) -> Self {
        value.clone()
    }
}

/// Build a [`Type`] from a compact syntax: `ty!(int)` or `ty!([int])` for
/// `Array<int>`, nesting as `ty!([[int]])`.
#[macro_export]
macro_rules! ty {
    ([ $($inner:tt)+ ]) => {
        $crate::Type::array($crate::ty!($($inner)+))
    };
    ($name:ident) => {
        $crate::Type::named(stringify!($name))
    };
}
