use std::fmt;

use itertools::Itertools;
use smol_str::SmolStr;

use crate::Type;

/// Head constructor of the built-in array type.
pub const ARRAY_TYPE_NAME: &str = "Array";

/// A named type with zero or more type parameters. `int` has none, `Array<int>`
/// has one.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct GenericType {
    pub name: SmolStr,
    pub type_params: Vec<Type>,
}

impl GenericType {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
        }
    }

    pub fn with_params(name: impl Into<SmolStr>, type_params: Vec<Type>) -> Self {
        Self {
            name: name.into(),
            type_params,
        }
    }

    pub fn array(element: Type) -> Self {
        Self::with_params(ARRAY_TYPE_NAME, vec![element])
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.name == ARRAY_TYPE_NAME && self.type_params.len() == 1
    }

    pub fn array_element(&self) -> Option<&Type> {
        if self.is_array() {
            self.type_params.first()
        } else {
            None
        }
    }

    pub fn add_type_param(&mut self) -> &mut Type {
        let idx = self.type_params.len();
        self.type_params.push(Type::Unset);
        &mut self.type_params[idx]
    }
}

impl fmt::Debug for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_generic() {
            write!(f, "<{}>", self.type_params.iter().join(", "))?;
        }
        Ok(())
    }
}

impl From<&str> for GenericType {
    fn from(value: &str) -> Self {
        GenericType::new(value)
    }
}
