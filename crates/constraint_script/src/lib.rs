// ==============================================================================
// Constraint Scripts
// ==============================================================================
//
// A small line-oriented language for describing a type inference problem:
// registered types, conversions, named type variables and the constraints
// between them. Scripts are parsed with pest (`script.pest`) and replayed onto
// a `TypeManager` by `Session`.
//
// ```text
// type int
// type float
// convertible int float
//
// overload add(int, int) -> int
// overload add(float, float) -> float
// literal x float
// call f = add(x, y) -> r
// ```

mod lower;
mod parse;


pub use lower::{Bindings, Session};
pub use parse::{parse_script, ParseError, Rule};

use smol_str::SmolStr;
use thiserror::Error;
use typecheck::{LiteralProtocol, Type};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based source line.
    pub line: usize,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// `type int`
    Type(Type),
    /// `convertible int float`
    Convertible { from: Type, to: Type },
    /// `literals string (string) (char)`
    Literals {
        protocol: LiteralProtocol,
        preferred: Vec<Type>,
        other: Vec<Type>,
    },
    /// `var a b c`
    Var(Vec<SmolStr>),
    /// `literal a integer`
    Literal {
        var: SmolStr,
        protocol: LiteralProtocol,
    },
    /// `equal a b` or `equal a b c`
    Equal(Vec<SmolStr>),
    /// `convert a b`
    Convert { from: SmolStr, to: SmolStr },
    /// `bind a [int]`
    Bind { var: SmolStr, ty: Type },
    /// `array xs x`
    Array { array: SmolStr, element: SmolStr },
    /// `overload foo(int, float) -> double`
    Overload {
        name: SmolStr,
        args: Vec<Type>,
        ret: Type,
    },
    /// `infer foo(a, b) -> r`, an overload typed by its variables.
    Infer {
        name: SmolStr,
        args: Vec<SmolStr>,
        ret: SmolStr,
    },
    /// `call site = foo(a, b) -> r`
    Call {
        site: SmolStr,
        name: SmolStr,
        args: Vec<SmolStr>,
        ret: SmolStr,
    },
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("line {line}: unknown literal protocol `{name}`")]
    UnknownProtocol { line: usize, name: SmolStr },

    #[error("line {line}: {message}")]
    Invalid { line: usize, message: String },
}

impl ScriptError {
    pub fn line(&self) -> Option<usize> {
        match self {
            ScriptError::Parse(err) => match err.line_col {
                pest::error::LineColLocation::Pos((line, _))
                | pest::error::LineColLocation::Span((line, _), _) => Some(line),
            },
            ScriptError::UnknownProtocol { line, .. } | ScriptError::Invalid { line, .. } => {
                Some(*line)
            }
        }
    }
}
