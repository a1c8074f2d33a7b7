use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use derive_more::Debug;
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use typecheck_solver::SolverConfig;
use typecheck_ty::{FunctionId, FunctionVar, Type, TypeVar};

use crate::constraints::{Constraint, ConstraintId, ConstraintKind, ConstraintPayload};
use crate::generator::IdGenerator;
use crate::protocols::{KnownProtocolKind, LiteralProtocol, LiteralTables, LiteralTypes};

/// Owns everything one inference session knows: ground types, conversions,
/// overloads, type variables and the constraints over them.
///
/// Constraint builders panic when handed a type variable this manager did not
/// mint; that is a bug in the caller, not a type error.
#[derive(Debug)]
pub struct TypeManager {
    pub(crate) registered_types: Vec<Type>,
    registered_type_vars: FxHashSet<TypeVar>,
    /// Direct conversion edges only, no transitive closure.
    pub(crate) convertible: FxHashMap<Type, Vec<Type>>,
    pub(crate) functions: Vec<FunctionVar>,
    pub(crate) array_element_map: FxHashMap<TypeVar, TypeVar>,
    pub(crate) constraints: Vec<Constraint>,
    type_var_gen: IdGenerator,
    constraint_gen: IdGenerator,
    #[debug(skip)]
    lambda_counter: AtomicU64,
    pub(crate) literal_tables: LiteralTables,
    pub(crate) config: SolverConfig,
}

impl Default for TypeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeManager {
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            registered_types: Vec::new(),
            registered_type_vars: FxHashSet::default(),
            convertible: FxHashMap::default(),
            functions: Vec::new(),
            array_element_map: FxHashMap::default(),
            constraints: Vec::new(),
            type_var_gen: IdGenerator::default(),
            constraint_gen: IdGenerator::default(),
            lambda_counter: AtomicU64::new(0),
            literal_tables: LiteralTables::default(),
            config,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
    }

    // ==========================================================================
    // Ground types and conversions
    // ==========================================================================

    /// Registers a ground type. False when a structurally equal type is
    /// already registered.
    pub fn register_type(&mut self, ty: impl Into<Type>) -> bool {
        let ty = ty.into();
        if ty.is_unset() || self.has_registered_type(&ty) {
            return false;
        }
        self.registered_types.push(ty);
        true
    }

    pub fn has_registered_type(&self, ty: impl Into<Type>) -> bool {
        let ty = ty.into();
        self.registered_types.contains(&ty)
    }

    /// The registered type equal to `ty`, or `Type::Unset`.
    pub fn get_registered_type(&self, ty: impl Into<Type>) -> Type {
        let ty = ty.into();
        self.registered_types
            .iter()
            .find(|registered| **registered == ty)
            .cloned()
            .unwrap_or_default()
    }

    pub fn registered_types(&self) -> impl Iterator<Item = &Type> {
        self.registered_types.iter()
    }

    /// Records that `from` implicitly converts to `to`. Both must be
    /// registered, non-function and distinct; an existing edge is not
    /// recorded twice.
    pub fn set_convertible(&mut self, from: impl Into<Type>, to: impl Into<Type>) -> bool {
        let (from, to) = (from.into(), to.into());
        if from == to || !from.has_generic() || !to.has_generic() {
            return false;
        }
        if !self.has_registered_type(&from) || !self.has_registered_type(&to) {
            log::debug!("conversion {from} -> {to} refers to an unregistered type");
            return false;
        }

        let edges = self.convertible.entry(from).or_default();
        if edges.contains(&to) {
            return false;
        }
        edges.push(to);
        true
    }

    /// True when `from` is `to` or has a direct edge to it. Function and
    /// unset types never convert.
    pub fn is_convertible(&self, from: impl Into<Type>, to: impl Into<Type>) -> bool {
        let (from, to) = (from.into(), to.into());
        let named = |ty: &Type| ty.generic().is_some_and(|generic| !generic.name.is_empty());
        if !named(&from) || !named(&to) {
            return false;
        }
        from == to
            || self
                .convertible
                .get(&from)
                .is_some_and(|edges| edges.contains(&to))
    }

    /// Direct conversion targets of `from`, in the order they were added.
    pub fn get_convertible(&self, from: impl Into<Type>) -> Vec<Type> {
        self.convertible
            .get(&from.into())
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_literal_types(&mut self, protocol: LiteralProtocol, types: &dyn LiteralTypes) {
        self.literal_tables.set(protocol, types);
    }

    // ==========================================================================
    // Type variables and function identities
    // ==========================================================================

    pub fn create_type_var(&mut self) -> TypeVar {
        let var = TypeVar::new(self.type_var_gen.next());
        self.registered_type_vars.insert(var.clone());
        var
    }

    pub fn has_type_var(&self, var: &TypeVar) -> bool {
        self.registered_type_vars.contains(var)
    }

    /// Identity shared by every overload declared under `name` with these
    /// argument labels.
    pub fn create_function_hash(&self, name: &str, arg_names: &[&str]) -> FunctionId {
        let mut hasher = FxHasher::default();
        format!("{name}{}", arg_names.iter().join(":")).hash(&mut hasher);
        FunctionId::new(hasher.finish() as i64)
    }

    /// A fresh identity for an anonymous function. Never repeats within one
    /// manager.
    pub fn create_lambda_function_hash(&self, arg_names: &[&str]) -> FunctionId {
        let n = self.lambda_counter.fetch_add(1, Ordering::Relaxed);
        self.create_function_hash(&format!("<lambda{n}>"), arg_names)
    }

    // ==========================================================================
    // Constraint construction
    // ==========================================================================

    #[track_caller]
    fn assert_var(&self, var: &TypeVar) {
        assert!(
            !var.is_empty(),
            "cannot use an empty type variable in a constraint"
        );
        assert!(
            self.registered_type_vars.contains(var),
            "type variable `{var}` must be created by this manager before use"
        );
    }

    fn push(&mut self, kind: ConstraintKind, payload: ConstraintPayload) -> ConstraintId {
        let id = ConstraintId::from(self.constraint_gen.next_id());
        let constraint = Constraint::new(id, kind, payload);
        log::trace!("{constraint}");
        self.constraints.push(constraint);
        id
    }

    /// Appends a hand-built constraint. Its variables must come from this
    /// manager; whether kind and payload fit together is only checked when
    /// solving.
    #[track_caller]
    pub fn push_constraint(&mut self, kind: ConstraintKind, payload: ConstraintPayload) -> ConstraintId {
        for var in payload.vars() {
            self.assert_var(var);
        }
        self.push(kind, payload)
    }

    /// `t0 == t1`. When both are array variables their elements are made
    /// equal first.
    #[track_caller]
    pub fn create_equals_constraint(&mut self, t0: &TypeVar, t1: &TypeVar) -> ConstraintId {
        self.assert_var(t0);
        self.assert_var(t1);

        if let (Some(e0), Some(e1)) = (
            self.array_element_map.get(t0).cloned(),
            self.array_element_map.get(t1).cloned(),
        ) {
            log::trace!("{t0} and {t1} are arrays, equating {e0} and {e1}");
            self.push(ConstraintKind::Equal, types_payload(e0, e1));
        }

        self.push(ConstraintKind::Equal, types_payload(t0.clone(), t1.clone()))
    }

    #[track_caller]
    pub fn create_literal_conforms_to_constraint(
        &mut self,
        var: &TypeVar,
        protocol: LiteralProtocol,
    ) -> ConstraintId {
        self.create_conforms_to_constraint(var, protocol)
    }

    #[track_caller]
    pub fn create_conforms_to_constraint(
        &mut self,
        var: &TypeVar,
        protocol: impl Into<KnownProtocolKind>,
    ) -> ConstraintId {
        self.assert_var(var);
        self.push(
            ConstraintKind::ConformsTo,
            ConstraintPayload::Conforms {
                var: var.clone(),
                protocol: protocol.into(),
            },
        )
    }

    /// `from` converts to `to`: equal, or joined by a direct edge.
    #[track_caller]
    pub fn create_convertible_constraint(&mut self, from: &TypeVar, to: &TypeVar) -> ConstraintId {
        self.assert_var(from);
        self.assert_var(to);
        self.push(
            ConstraintKind::Conversion,
            types_payload(from.clone(), to.clone()),
        )
    }

    /// Declares an overload with known argument and return types. Fresh
    /// variables stand in for each of them and are bound once the overload is
    /// recorded.
    #[track_caller]
    pub fn create_applicable_function_constraint(
        &mut self,
        function_id: impl Into<FunctionId>,
        args: &[Type],
        return_type: impl Into<Type>,
    ) -> FunctionId {
        self.declare_function("", function_id.into(), args, return_type.into())
    }

    /// Like [`Self::create_applicable_function_constraint`], keeping `name` so
    /// resolved function types are readable.
    #[track_caller]
    pub fn create_named_applicable_function_constraint(
        &mut self,
        name: &str,
        function_id: impl Into<FunctionId>,
        args: &[Type],
        return_type: impl Into<Type>,
    ) -> FunctionId {
        self.declare_function(name, function_id.into(), args, return_type.into())
    }

    #[track_caller]
    fn declare_function(
        &mut self,
        name: &str,
        function_id: FunctionId,
        args: &[Type],
        return_type: Type,
    ) -> FunctionId {
        let mut overload = FunctionVar::new(name, function_id);
        *overload.return_var_mut() = self.create_type_var();
        for _ in args {
            let var = self.create_type_var();
            *overload.add_arg() = var;
        }

        // Record the overload before binding its variables.
        let return_var = overload.return_var.clone();
        let arg_vars = overload.args.clone();
        let id = self.register_function_overload(overload);

        self.create_bind_to_constraint(&return_var, return_type);
        for (var, ty) in arg_vars.iter().zip(args) {
            self.create_bind_to_constraint(var, ty);
        }
        id
    }

    /// Declares an overload whose argument and return types are inferred from
    /// other constraints on the given variables.
    #[track_caller]
    pub fn create_applicable_function_var_constraint(
        &mut self,
        function_id: impl Into<FunctionId>,
        arg_vars: &[TypeVar],
        return_var: &TypeVar,
    ) -> FunctionId {
        let mut overload = FunctionVar::new("", function_id);
        overload.args = arg_vars.to_vec();
        overload.return_var = return_var.clone();
        self.register_function_overload(overload)
    }

    #[track_caller]
    pub fn register_function_overload(&mut self, overload: FunctionVar) -> FunctionId {
        assert!(
            overload.has_return_var(),
            "overload `{overload}` needs a return type variable"
        );
        for var in overload.vars() {
            self.assert_var(var);
        }
        let id = overload.id;
        log::trace!("overload {overload}");
        self.functions.push(overload);
        id
    }

    /// `call_site` resolves to one overload of `function_id` applied to
    /// `args`, producing `return_var`.
    #[track_caller]
    pub fn create_bind_function_constraint(
        &mut self,
        function_id: impl Into<FunctionId>,
        call_site: &TypeVar,
        args: &[TypeVar],
        return_var: &TypeVar,
    ) -> ConstraintId {
        self.assert_var(call_site);
        for arg in args {
            self.assert_var(arg);
        }
        self.assert_var(return_var);

        self.push(
            ConstraintKind::BindOverload,
            ConstraintPayload::Overload {
                var: call_site.clone(),
                function_id: function_id.into(),
                arg_vars: args.to_vec(),
                return_var: return_var.clone(),
            },
        )
    }

    /// Pins `var` to exactly `ty`.
    #[track_caller]
    pub fn create_bind_to_constraint(&mut self, var: &TypeVar, ty: impl Into<Type>) -> ConstraintId {
        let ty = ty.into();
        self.assert_var(var);
        assert!(!ty.is_unset(), "cannot bind `{var}` to an unset type");
        self.push(
            ConstraintKind::Bind,
            ConstraintPayload::ExplicitType {
                var: var.clone(),
                ty,
            },
        )
    }

    /// `array_var == Array<element_var>`.
    #[track_caller]
    pub fn create_array_element_constraint(
        &mut self,
        array_var: &TypeVar,
        element_var: &TypeVar,
    ) -> ConstraintId {
        self.assert_var(array_var);
        self.assert_var(element_var);
        self.array_element_map
            .insert(array_var.clone(), element_var.clone());
        self.push(
            ConstraintKind::ArrayElement,
            types_payload(array_var.clone(), element_var.clone()),
        )
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    pub fn get_constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints
            .binary_search_by_key(&id, |constraint| constraint.id)
            .ok()
            .map(|idx| &self.constraints[idx])
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Every overload recorded under `function_id`, in declaration order.
    pub fn functions_for(&self, function_id: FunctionId) -> impl Iterator<Item = &FunctionVar> {
        self.functions
            .iter()
            .filter(move |overload| overload.id == function_id)
    }

    pub fn array_element_var(&self, array_var: &TypeVar) -> Option<&TypeVar> {
        self.array_element_map.get(array_var)
    }
}

fn types_payload(first: TypeVar, second: TypeVar) -> ConstraintPayload {
    ConstraintPayload::Types {
        first,
        second,
        third: None,
    }
}
