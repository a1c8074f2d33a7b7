use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use typecheck::{
    ConstraintKind, ConstraintPayload, FunctionId, FunctionVar, LiteralTable, SolveError,
    SolverConfig, Type, TypeManager, TypeVar,
};

use crate::{Script, ScriptError, Statement, StatementKind};

/// Replays scripts onto a [`TypeManager`], minting one type variable per
/// script name on first use.
#[derive(Debug)]
pub struct Session {
    manager: TypeManager,
    vars: FxHashMap<SmolStr, TypeVar>,
    /// Script names in first-use order.
    order: Vec<SmolStr>,
}

/// Resolved types keyed by script name, in first-use order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    entries: Vec<(SmolStr, Option<Type>)>,
}

impl Bindings {
    pub fn get(&self, name: &str) -> Option<&Type> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .and_then(|(_, ty)| ty.as_ref())
    }

    /// Every script name, with `None` for those the solver left unresolved.
    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, Option<&Type>)> {
        self.entries.iter().map(|(name, ty)| (name, ty.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl Session {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            manager: TypeManager::with_config(config),
            vars: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    pub fn manager(&self) -> &TypeManager {
        &self.manager
    }

    pub fn type_var(&self, name: &str) -> Option<&TypeVar> {
        self.vars.get(name)
    }

    pub fn apply(&mut self, script: &Script) -> Result<(), ScriptError> {
        for statement in &script.statements {
            self.apply_statement(statement)?;
        }
        Ok(())
    }

    pub fn solve(&self) -> Result<Bindings, SolveError> {
        let pass = self.manager.try_solve()?;
        let entries = self
            .order
            .iter()
            .map(|name| {
                let ty = self.vars.get(name).and_then(|var| pass.resolved_type(var));
                (name.clone(), ty.cloned())
            })
            .collect();
        Ok(Bindings { entries })
    }

    fn var(&mut self, name: &SmolStr) -> TypeVar {
        if let Some(var) = self.vars.get(name) {
            return var.clone();
        }
        let var = self.manager.create_type_var();
        log::trace!("`{name}` is {var}");
        self.vars.insert(name.clone(), var.clone());
        self.order.push(name.clone());
        var
    }

    fn vars_of(&mut self, names: &[SmolStr]) -> Vec<TypeVar> {
        names.iter().map(|name| self.var(name)).collect()
    }

    /// Every overload declared under one name shares an identity.
    fn function_id(&self, name: &str) -> FunctionId {
        self.manager.create_function_hash(name, &[])
    }

    fn apply_statement(&mut self, statement: &Statement) -> Result<(), ScriptError> {
        let line = statement.line;
        match &statement.kind {
            StatementKind::Type(ty) => {
                if !self.manager.register_type(ty) {
                    log::debug!("line {line}: `{ty}` is already registered");
                }
            }
            StatementKind::Convertible { from, to } => {
                for ty in [from, to] {
                    if !self.manager.has_registered_type(ty) {
                        return Err(ScriptError::Invalid {
                            line,
                            message: format!("`{ty}` must be declared with `type` first"),
                        });
                    }
                }
                if !self.manager.set_convertible(from, to) {
                    log::debug!("line {line}: conversion {from} -> {to} not recorded");
                }
            }
            StatementKind::Literals {
                protocol,
                preferred,
                other,
            } => {
                let table = LiteralTable {
                    preferred: preferred.clone(),
                    other: other.clone(),
                };
                self.manager.set_literal_types(*protocol, &table);
            }
            StatementKind::Var(names) => {
                self.vars_of(names);
            }
            StatementKind::Literal { var, protocol } => {
                let var = self.var(var);
                self.manager
                    .create_literal_conforms_to_constraint(&var, *protocol);
            }
            StatementKind::Equal(names) => match self.vars_of(names).as_slice() {
                [a, b] => {
                    self.manager.create_equals_constraint(a, b);
                }
                [a, b, c] => {
                    self.manager.push_constraint(
                        ConstraintKind::Equal,
                        ConstraintPayload::Types {
                            first: a.clone(),
                            second: b.clone(),
                            third: Some(c.clone()),
                        },
                    );
                }
                vars => {
                    return Err(ScriptError::Invalid {
                        line,
                        message: format!("`equal` takes two or three variables, got {}", vars.len()),
                    })
                }
            },
            StatementKind::Convert { from, to } => {
                let (from, to) = (self.var(from), self.var(to));
                self.manager.create_convertible_constraint(&from, &to);
            }
            StatementKind::Bind { var, ty } => {
                let var = self.var(var);
                self.manager.create_bind_to_constraint(&var, ty);
            }
            StatementKind::Array { array, element } => {
                let (array, element) = (self.var(array), self.var(element));
                self.manager.create_array_element_constraint(&array, &element);
            }
            StatementKind::Overload { name, args, ret } => {
                let id = self.function_id(name);
                self.manager
                    .create_named_applicable_function_constraint(name, id, args, ret);
            }
            StatementKind::Infer { name, args, ret } => {
                let mut overload = FunctionVar::new(name.clone(), self.function_id(name));
                overload.args = self.vars_of(args);
                overload.return_var = self.var(ret);
                self.manager.register_function_overload(overload);
            }
            StatementKind::Call {
                site,
                name,
                args,
                ret,
            } => {
                let id = self.function_id(name);
                let site = self.var(site);
                let args = self.vars_of(args);
                let ret = self.var(ret);
                self.manager
                    .create_bind_function_constraint(id, &site, &args, &ret);
            }
        }
        Ok(())
    }
}
