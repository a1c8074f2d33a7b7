use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use smol_str::SmolStr;
use thiserror::Error;

use crate::{FunctionId, TypeVar};

const EMPTY_FIELD: &str = "<empty>";
const FIELD_SEPARATOR: char = '|';
const ARG_SEPARATOR: char = ',';

/// The declaration-site shape of one overload: argument and return type
/// variables, the name and the id shared with every other overload of the
/// same call-site name.
///
/// Serializes to `args|return|name|id`, e.g. `T1,T2|T3|foo|42`, with
/// `<empty>` standing in for an empty field. Fields must not contain `|` or `,`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FunctionVar {
    pub args: Vec<TypeVar>,
    pub return_var: TypeVar,
    pub name: SmolStr,
    pub id: FunctionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFunctionVarError {
    #[error("expected 4 `|` separated fields, found {0}")]
    FieldCount(usize),
    #[error("invalid function id `{0}`")]
    InvalidId(String),
}

impl FunctionVar {
    pub fn new(name: impl Into<SmolStr>, id: impl Into<FunctionId>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            ..Self::default()
        }
    }

    /// Appends an empty argument slot and hands it back for filling in.
    pub fn add_arg(&mut self) -> &mut TypeVar {
        let idx = self.args.len();
        self.args.push(TypeVar::default());
        &mut self.args[idx]
    }

    pub fn return_var_mut(&mut self) -> &mut TypeVar {
        &mut self.return_var
    }

    pub fn set_id(&mut self, id: impl Into<FunctionId>) {
        self.id = id.into();
    }

    pub fn set_name(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    pub fn has_return_var(&self) -> bool {
        !self.return_var.is_empty()
    }

    /// Every type variable the overload declares, return var first.
    pub fn vars(&self) -> impl Iterator<Item = &TypeVar> {
        std::iter::once(&self.return_var)
            .filter(|var| !var.is_empty())
            .chain(self.args.iter())
    }

    pub fn serialize(&self) -> String {
        let args = if self.args.is_empty() {
            EMPTY_FIELD.to_string()
        } else {
            self.args.iter().join(",")
        };

        format!(
            "{args}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            or_empty(self.return_var.as_str()),
            or_empty(&self.name),
            self.id
        )
    }

    pub fn unserialize(input: &str) -> Result<Self, ParseFunctionVarError> {
        let fields = input.split(FIELD_SEPARATOR).collect::<Vec<_>>();
        let [args, return_var, name, id] = fields.as_slice() else {
            return Err(ParseFunctionVarError::FieldCount(fields.len()));
        };

        let id = id
            .parse::<i64>()
            .map_err(|_| ParseFunctionVarError::InvalidId(id.to_string()))?;

        // Only the marker means "no args"; an empty field is one unnamed slot.
        let args = if *args == EMPTY_FIELD {
            Vec::new()
        } else {
            args.split(ARG_SEPARATOR).map(TypeVar::from).collect()
        };

        Ok(Self {
            args,
            return_var: from_field(return_var).map(TypeVar::from).unwrap_or_default(),
            name: from_field(name).map(SmolStr::from).unwrap_or_default(),
            id: id.into(),
        })
    }
}

fn or_empty(field: &str) -> &str {
    if field.is_empty() {
        EMPTY_FIELD
    } else {
        field
    }
}

fn from_field(field: &str) -> Option<&str> {
    if field == EMPTY_FIELD || field.is_empty() {
        None
    } else {
        Some(field)
    }
}

impl fmt::Display for FunctionVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", or_empty(&self.name), self.args.iter().join(", "))?;
        if self.has_return_var() {
            write!(f, " -> {}", self.return_var)?;
        }
        Ok(())
    }
}

impl FromStr for FunctionVar {
    type Err = ParseFunctionVarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FunctionVar::unserialize(s)
    }
}
