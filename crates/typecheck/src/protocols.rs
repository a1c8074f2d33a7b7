// ==============================================================================
// Known Protocols and Literal Tables
// ==============================================================================
//
// A literal protocol restricts a variable to a preference-ordered list of
// candidate types. Numeric literal defaulting falls out of the order: an
// otherwise unconstrained integer literal resolves to the first preferred
// integer type.

use std::fmt;

use derive_more::{Debug, From};
use rustc_hash::FxHashMap;
use typecheck_ty::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultProtocol {
    Sequence,
    IteratorProtocol,
    RawRepresentable,
    Equatable,
    Hashable,
    Comparable,
    Error,
    OptionSet,
    CaseIterable,
    CodingKey,
    Encodable,
    Decodable,
    StringInterpolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralProtocol {
    ExpressibleByArray,
    ExpressibleByBoolean,
    ExpressibleByDictionary,
    ExpressibleByFloat,
    ExpressibleByInteger,
    ExpressibleByDouble,
    ExpressibleByString,
    ExpressibleByNil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From)]
pub enum KnownProtocolKind {
    #[debug("{_0:?}")]
    Default(DefaultProtocol),
    #[debug("{_0:?}")]
    Literal(LiteralProtocol),
}

impl KnownProtocolKind {
    pub fn literal(self) -> Option<LiteralProtocol> {
        match self {
            KnownProtocolKind::Literal(literal) => Some(literal),
            KnownProtocolKind::Default(_) => None,
        }
    }

    pub fn has_literal(self) -> bool {
        self.literal().is_some()
    }
}

impl fmt::Display for KnownProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnownProtocolKind::Default(protocol) => write!(f, "{protocol:?}"),
            KnownProtocolKind::Literal(protocol) => write!(f, "{protocol:?}Literal"),
        }
    }
}

/// Candidate types of a literal protocol, most preferred first.
pub trait LiteralTypes {
    fn preferred_types(&self) -> Vec<Type> {
        Vec::new()
    }

    fn other_types(&self) -> Vec<Type> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressibleByIntegerLiteral;

impl LiteralTypes for ExpressibleByIntegerLiteral {
    fn preferred_types(&self) -> Vec<Type> {
        vec![Type::named("int")]
    }

    fn other_types(&self) -> Vec<Type> {
        vec![Type::named("float"), Type::named("double")]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressibleByFloatLiteral;

impl LiteralTypes for ExpressibleByFloatLiteral {
    fn preferred_types(&self) -> Vec<Type> {
        vec![Type::named("float")]
    }

    fn other_types(&self) -> Vec<Type> {
        vec![Type::named("double")]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressibleByDoubleLiteral;

impl LiteralTypes for ExpressibleByDoubleLiteral {
    fn preferred_types(&self) -> Vec<Type> {
        vec![Type::named("double")]
    }

    fn other_types(&self) -> Vec<Type> {
        vec![Type::named("float")]
    }
}

/// A literal table captured as plain lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralTable {
    pub preferred: Vec<Type>,
    pub other: Vec<Type>,
}

impl LiteralTable {
    pub fn from_types(types: &dyn LiteralTypes) -> Self {
        Self {
            preferred: types.preferred_types(),
            other: types.other_types(),
        }
    }

    /// Preferred then other candidates.
    pub fn candidates(&self) -> impl Iterator<Item = &Type> {
        self.preferred.iter().chain(self.other.iter())
    }

    pub fn is_preferred(&self, ty: &Type) -> bool {
        self.preferred.contains(ty)
    }

    pub fn contains(&self, ty: &Type) -> bool {
        self.candidates().any(|candidate| candidate == ty)
    }
}

impl LiteralTypes for LiteralTable {
    fn preferred_types(&self) -> Vec<Type> {
        self.preferred.clone()
    }

    fn other_types(&self) -> Vec<Type> {
        self.other.clone()
    }
}

/// The literal protocols a manager can solve. Only the numeric ones are
/// modelled out of the box; others fail the solve until a table is set.
#[derive(Debug, Clone)]
pub struct LiteralTables {
    tables: FxHashMap<LiteralProtocol, LiteralTable>,
}

impl Default for LiteralTables {
    fn default() -> Self {
        let mut tables = Self {
            tables: FxHashMap::default(),
        };
        tables.set(
            LiteralProtocol::ExpressibleByInteger,
            &ExpressibleByIntegerLiteral,
        );
        tables.set(LiteralProtocol::ExpressibleByFloat, &ExpressibleByFloatLiteral);
        tables.set(
            LiteralProtocol::ExpressibleByDouble,
            &ExpressibleByDoubleLiteral,
        );
        tables
    }
}

impl LiteralTables {
    pub fn empty() -> Self {
        Self {
            tables: FxHashMap::default(),
        }
    }

    pub fn get(&self, protocol: LiteralProtocol) -> Option<&LiteralTable> {
        self.tables.get(&protocol)
    }

    pub fn set(&mut self, protocol: LiteralProtocol, types: &dyn LiteralTypes) {
        self.tables.insert(protocol, LiteralTable::from_types(types));
    }
}
