use crate::{FunctionId, FunctionType, FunctionVar, GenericType, Type, TypeVar};
use proptest::{
    prelude::{any, prop, prop_oneof, Arbitrary, BoxedStrategy, Strategy},
    prop_compose,
};
use smol_str::SmolStr;

#[derive(Debug, Clone, Copy)]
pub struct RecursiveParams {
    pub depth: u32,
    pub desired_size: u32,
    pub expected_branch_size: u32,
}

impl Default for RecursiveParams {
    fn default() -> Self {
        Self {
            depth: 3,
            desired_size: 32,
            expected_branch_size: 3,
        }
    }
}

prop_compose! {
    pub fn arb_type_name()(name in "[a-z][a-z0-9_]{0,8}") -> SmolStr {
        name.into()
    }
}

prop_compose! {
    pub fn arb_type_var()(n in 0u32..10_000) -> TypeVar {
        TypeVar::new(format!("T{n}"))
    }
}

fn arb_type(args: RecursiveParams) -> impl Strategy<Value = Type> {
    let leaf = arb_type_name().prop_map(Type::named);

    leaf.prop_recursive(
        args.depth,
        args.desired_size,
        args.expected_branch_size,
        |inner| {
            prop_oneof![
                inner.clone().prop_map(Type::array),
                (arb_type_name(), prop::collection::vec(inner.clone(), 1..3))
                    .prop_map(|(name, params)| Type::Generic(GenericType::with_params(name, params))),
                (
                    arb_type_name(),
                    any::<i64>(),
                    prop::collection::vec(inner.clone(), 0..3),
                    inner
                )
                    .prop_map(|(name, id, args, ret)| {
                        Type::Function(FunctionType::new(name, id).with_signature(args, ret))
                    }),
            ]
        },
    )
}

impl Arbitrary for Type {
    type Parameters = RecursiveParams;
    type Strategy = BoxedStrategy<Type>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        arb_type(args).boxed()
    }
}

impl Arbitrary for FunctionId {
    type Parameters = ();
    type Strategy = BoxedStrategy<FunctionId>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        any::<i64>().prop_map(FunctionId::from).boxed()
    }
}

impl Arbitrary for FunctionVar {
    type Parameters = ();
    type Strategy = BoxedStrategy<FunctionVar>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (
            prop::collection::vec(prop::option::weighted(0.8, arb_type_var()), 0..5),
            prop::option::of(arb_type_var()),
            prop::option::of(arb_type_name()),
            any::<FunctionId>(),
        )
            .prop_map(|(args, return_var, name, id)| FunctionVar {
                args: args.into_iter().map(Option::unwrap_or_default).collect(),
                return_var: return_var.unwrap_or_default(),
                name: name.unwrap_or_default(),
                id,
            })
            .boxed()
    }
}
