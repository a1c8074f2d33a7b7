use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use smol_str::SmolStr;
use typecheck::{GenericType, LiteralProtocol, Type};

use crate::{Script, ScriptError, Statement, StatementKind};

#[derive(Parser)]
#[grammar = "script.pest"]
pub struct ScriptParser;

// pest errors are large, keep them boxed.
pub type ParseError = Box<pest::error::Error<Rule>>;

pub fn parse_script(source: &str) -> Result<Script, ScriptError> {
    let pairs = ScriptParser::parse(Rule::script, source).map_err(Box::new)?;

    let mut statements = Vec::new();
    for pair in pairs.flat_map(Pair::into_inner) {
        if pair.as_rule() == Rule::EOI {
            continue;
        }
        statements.push(collect_statement(pair)?);
    }
    Ok(Script { statements })
}

/// The literal protocol spelled `name` in scripts: `integer`, `float`, ...
pub fn protocol_by_name(name: &str) -> Option<LiteralProtocol> {
    let protocol = match name {
        "array" => LiteralProtocol::ExpressibleByArray,
        "boolean" => LiteralProtocol::ExpressibleByBoolean,
        "dictionary" => LiteralProtocol::ExpressibleByDictionary,
        "float" => LiteralProtocol::ExpressibleByFloat,
        "integer" => LiteralProtocol::ExpressibleByInteger,
        "double" => LiteralProtocol::ExpressibleByDouble,
        "string" => LiteralProtocol::ExpressibleByString,
        "nil" => LiteralProtocol::ExpressibleByNil,
        _ => return None,
    };
    Some(protocol)
}

fn line_of(pair: &Pair<Rule>) -> usize {
    pair.as_span().start_pos().line_col().0
}

fn next<'i>(inner: &mut Pairs<'i, Rule>, line: usize, what: &str) -> Result<Pair<'i, Rule>, ScriptError> {
    inner.next().ok_or_else(|| ScriptError::Invalid {
        line,
        message: format!("missing {what}"),
    })
}

fn ident(inner: &mut Pairs<Rule>, line: usize, what: &str) -> Result<SmolStr, ScriptError> {
    Ok(next(inner, line, what)?.as_str().into())
}

fn protocol(inner: &mut Pairs<Rule>, line: usize) -> Result<LiteralProtocol, ScriptError> {
    let name = ident(inner, line, "protocol")?;
    protocol_by_name(&name).ok_or(ScriptError::UnknownProtocol { line, name })
}

fn collect_statement(pair: Pair<Rule>) -> Result<Statement, ScriptError> {
    let line = line_of(&pair);
    let rule = pair.as_rule();
    let mut inner = pair.into_inner();

    let kind = match rule {
        Rule::type_stmt => StatementKind::Type(collect_type(next(&mut inner, line, "type")?)?),
        Rule::convertible_stmt => StatementKind::Convertible {
            from: collect_type(next(&mut inner, line, "source type")?)?,
            to: collect_type(next(&mut inner, line, "target type")?)?,
        },
        Rule::literals_stmt => {
            let protocol = protocol(&mut inner, line)?;
            let preferred = collect_types(next(&mut inner, line, "preferred types")?)?;
            let other = match inner.next() {
                Some(list) => collect_types(list)?,
                None => Vec::new(),
            };
            StatementKind::Literals {
                protocol,
                preferred,
                other,
            }
        }
        Rule::var_stmt => StatementKind::Var(inner.map(|var| var.as_str().into()).collect()),
        Rule::literal_stmt => StatementKind::Literal {
            var: ident(&mut inner, line, "type variable")?,
            protocol: protocol(&mut inner, line)?,
        },
        Rule::equal_stmt => StatementKind::Equal(inner.map(|var| var.as_str().into()).collect()),
        Rule::convert_stmt => StatementKind::Convert {
            from: ident(&mut inner, line, "source variable")?,
            to: ident(&mut inner, line, "target variable")?,
        },
        Rule::bind_stmt => StatementKind::Bind {
            var: ident(&mut inner, line, "type variable")?,
            ty: collect_type(next(&mut inner, line, "type")?)?,
        },
        Rule::array_stmt => StatementKind::Array {
            array: ident(&mut inner, line, "array variable")?,
            element: ident(&mut inner, line, "element variable")?,
        },
        Rule::overload_stmt => StatementKind::Overload {
            name: ident(&mut inner, line, "function name")?,
            args: collect_types(next(&mut inner, line, "argument types")?)?,
            ret: collect_type(next(&mut inner, line, "return type")?)?,
        },
        Rule::infer_stmt => StatementKind::Infer {
            name: ident(&mut inner, line, "function name")?,
            args: collect_vars(next(&mut inner, line, "argument variables")?),
            ret: ident(&mut inner, line, "return variable")?,
        },
        Rule::call_stmt => StatementKind::Call {
            site: ident(&mut inner, line, "call site variable")?,
            name: ident(&mut inner, line, "function name")?,
            args: collect_vars(next(&mut inner, line, "argument variables")?),
            ret: ident(&mut inner, line, "return variable")?,
        },
        other => {
            return Err(ScriptError::Invalid {
                line,
                message: format!("unexpected {other:?}"),
            })
        }
    };
    Ok(Statement { line, kind })
}

fn collect_type(pair: Pair<Rule>) -> Result<Type, ScriptError> {
    let line = line_of(&pair);
    let mut inner = pair.into_inner();
    let ty = next(&mut inner, line, "type")?;

    match ty.as_rule() {
        Rule::array_sugar => {
            let element = next(&mut ty.into_inner(), line, "element type")?;
            Ok(Type::array(collect_type(element)?))
        }
        Rule::named_type => {
            let mut parts = ty.into_inner();
            let name = ident(&mut parts, line, "type name")?;
            let params = match parts.next() {
                Some(params) => params
                    .into_inner()
                    .map(collect_type)
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            Ok(GenericType::with_params(name, params).into())
        }
        other => Err(ScriptError::Invalid {
            line,
            message: format!("expected a type, found {other:?}"),
        }),
    }
}

fn collect_types(list: Pair<Rule>) -> Result<Vec<Type>, ScriptError> {
    list.into_inner().map(collect_type).collect()
}

fn collect_vars(list: Pair<Rule>) -> Vec<SmolStr> {
    list.into_inner().map(|var| var.as_str().into()).collect()
}
