use std::fmt;

use derive_more::Debug;
use itertools::Itertools;
use typecheck_ty::{FunctionId, Type, TypeVar};

use crate::protocols::KnownProtocolKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[debug("ConstraintId({_0})")]
pub struct ConstraintId(i64);

impl ConstraintId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for ConstraintId {
    #[inline]
    fn from(value: i64) -> Self {
        ConstraintId(value)
    }
}

impl From<ConstraintId> for i64 {
    #[inline]
    fn from(value: ConstraintId) -> Self {
        value.0
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Bind,
    Equal,
    BindParam,
    Conversion,
    ConformsTo,
    ApplicableFunction,
    BindOverload,
    ArrayElement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintPayload {
    /// Two or three related variables: equality, conversion (`first` converts
    /// to `second`) or array element linkage (`first` is the array).
    #[debug("Types({first:?}, {second:?}, {third:?})")]
    Types {
        first: TypeVar,
        second: TypeVar,
        third: Option<TypeVar>,
    },
    /// `var` must resolve to a candidate of the protocol.
    #[debug("Conforms({var:?}: {protocol:?})")]
    Conforms {
        var: TypeVar,
        protocol: KnownProtocolKind,
    },
    /// `var` is the call site of one overload of `function_id`.
    #[debug("Overload({var:?} = {function_id:?}({arg_vars:?}) -> {return_var:?})")]
    Overload {
        var: TypeVar,
        function_id: FunctionId,
        arg_vars: Vec<TypeVar>,
        return_var: TypeVar,
    },
    /// `var` is exactly `ty`.
    #[debug("ExplicitType({var:?} = {ty:?})")]
    ExplicitType { var: TypeVar, ty: Type },
}

impl ConstraintPayload {
    /// Every type variable the payload mentions.
    pub fn vars(&self) -> Vec<&TypeVar> {
        match self {
            ConstraintPayload::Types {
                first,
                second,
                third,
            } => [Some(first), Some(second), third.as_ref()]
                .into_iter()
                .flatten()
                .collect(),
            ConstraintPayload::Conforms { var, .. } | ConstraintPayload::ExplicitType { var, .. } => {
                vec![var]
            }
            ConstraintPayload::Overload {
                var,
                arg_vars,
                return_var,
                ..
            } => std::iter::once(var)
                .chain(std::iter::once(return_var))
                .chain(arg_vars.iter())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub(crate) id: ConstraintId,
    pub(crate) kind: ConstraintKind,
    pub(crate) payload: ConstraintPayload,
}

impl Constraint {
    pub fn new(id: ConstraintId, kind: ConstraintKind, payload: ConstraintPayload) -> Self {
        Self { id, kind, payload }
    }

    pub fn id(&self) -> ConstraintId {
        self.id
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn payload(&self) -> &ConstraintPayload {
        &self.payload
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ", self.id)?;
        match (&self.kind, &self.payload) {
            (ConstraintKind::Equal, ConstraintPayload::Types { .. }) => {
                write!(f, "{}", self.payload.vars().iter().join(" == "))
            }
            (ConstraintKind::Conversion, ConstraintPayload::Types { first, second, .. }) => {
                write!(f, "{first} -> {second}")
            }
            (ConstraintKind::ArrayElement, ConstraintPayload::Types { first, second, .. }) => {
                write!(f, "{first} == Array<{second}>")
            }
            (_, ConstraintPayload::Conforms { var, protocol }) => write!(f, "{var}: {protocol}"),
            (
                _,
                ConstraintPayload::Overload {
                    var,
                    function_id,
                    arg_vars,
                    return_var,
                },
            ) => write!(
                f,
                "{var} = overload {function_id}({}) -> {return_var}",
                arg_vars.iter().join(", ")
            ),
            (_, ConstraintPayload::ExplicitType { var, ty }) => write!(f, "{var} := {ty}"),
            (kind, payload) => write!(f, "{kind:?} {payload:?}"),
        }
    }
}
