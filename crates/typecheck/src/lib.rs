// ==============================================================================
// Constraint-Based Type Inference
// ==============================================================================
//
// Callers mint type variables from a `TypeManager`, describe how they relate
// through constraints (equality, conversion, literal protocols, overloaded
// calls, explicit binds, array elements) and ask for a `ConstraintPass`: one
// ground or function type per variable. Solving is delegated to the generic
// CSP engine in `typecheck_solver`.

pub mod constraints;
mod generator;
mod manager;
mod pass;
pub mod protocols;
mod solve;


#[cfg(test)]
mod pbt;

pub use constraints::{Constraint, ConstraintId, ConstraintKind, ConstraintPayload};
pub use generator::IdGenerator;
pub use manager::TypeManager;
pub use pass::ConstraintPass;
pub use protocols::{
    DefaultProtocol, KnownProtocolKind, LiteralProtocol, LiteralTable, LiteralTypes,
};
pub use solve::Candidate;
pub use typecheck_solver::SolverConfig;
pub use typecheck_ty::{FunctionId, FunctionType, FunctionVar, GenericType, Type, TypeVar};

use thiserror::Error;
use typecheck_solver::SolverError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("no assignment satisfies every constraint")]
    Unsatisfiable,

    #[error("no candidate types known for protocol {0}")]
    UnsupportedProtocol(KnownProtocolKind),

    #[error("call site `{site}` refers to function {function_id}, which has no overloads")]
    NoOverloads {
        site: TypeVar,
        function_id: FunctionId,
    },

    #[error("constraint #{id} is malformed: {reason}")]
    MalformedConstraint { id: ConstraintId, reason: String },

    #[error(transparent)]
    Solver(#[from] SolverError),
}
