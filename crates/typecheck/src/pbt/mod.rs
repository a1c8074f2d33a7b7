// ==============================================================================
// Property-Based Tests for the Type Manager
// ==============================================================================
//
// Random equality rings with a single bind, arbitrary bound types, and
// conversions between registered numeric types.

use proptest::prelude::{
    any, prop, prop_assert, prop_assert_eq, prop_compose, proptest, Just, ProptestConfig,
    Strategy,
};
use typecheck_ty::arbitrary::RecursiveParams;

use crate::tests::{default_manager, solve, type_vars};
use crate::{LiteralProtocol, Type};

const GROUND: [&str; 4] = ["int", "void", "float", "double"];
const NUMERIC: [&str; 3] = ["int", "float", "double"];

#[derive(Debug, Clone)]
struct Ring {
    size: usize,
    pin_index: usize,
    pin: &'static str,
    literal_index: Option<usize>,
}

prop_compose! {
    fn arb_ring()(size in 2usize..40)(
        size in Just(size),
        pin_index in 0..size,
        pin in prop::sample::select(GROUND.to_vec()),
        literal_index in prop::option::of(0..size),
    ) -> Ring {
        Ring { size, pin_index, pin, literal_index }
    }
}

fn arb_small_type() -> impl Strategy<Value = Type> {
    proptest::arbitrary::any_with::<Type>(RecursiveParams {
        depth: 2,
        desired_size: 8,
        expected_branch_size: 2,
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128, .. ProptestConfig::default()
    })]

    #[test]
    fn ring_takes_the_bound_type(ring in arb_ring()) {
        let mut tm = default_manager();
        let t = type_vars(&mut tm, ring.size);

        tm.create_bind_to_constraint(&t[ring.pin_index], ring.pin);
        // Integer literals accept every numeric type, never void.
        let literal = ring.literal_index.filter(|_| ring.pin != "void");
        if let Some(idx) = literal {
            tm.create_literal_conforms_to_constraint(&t[idx], LiteralProtocol::ExpressibleByInteger);
        }
        for i in 0..ring.size {
            tm.create_equals_constraint(&t[i], &t[(i + 1) % ring.size]);
        }

        let pass = solve(&tm);
        prop_assert_eq!(pass.len(), ring.size);
        for var in &t {
            prop_assert_eq!(pass.get_resolved_type(var), Type::named(ring.pin));
        }
    }

    #[test]
    fn equal_vars_share_any_bound_type(ty in any::<Type>(), len in 1usize..6) {
        let mut tm = default_manager();
        let t = type_vars(&mut tm, len + 1);
        tm.create_bind_to_constraint(&t[0], &ty);
        for pair in t.windows(2) {
            tm.create_equals_constraint(&pair[1], &pair[0]);
        }

        let pass = solve(&tm);
        for var in &t {
            prop_assert_eq!(pass.get_resolved_type(var), ty.clone());
        }
    }

    #[test]
    fn registering_types_is_idempotent(types in prop::collection::vec(arb_small_type(), 0..10)) {
        let mut tm = default_manager();
        for ty in &types {
            let fresh = !tm.has_registered_type(ty);
            prop_assert_eq!(tm.register_type(ty), fresh);
            prop_assert!(!tm.register_type(ty));
        }
    }

    #[test]
    fn conversion_solves_iff_convertible(
        from in prop::sample::select(NUMERIC.to_vec()),
        to in prop::sample::select(NUMERIC.to_vec()),
    ) {
        let mut tm = default_manager();
        let t = type_vars(&mut tm, 2);
        tm.create_bind_to_constraint(&t[0], from);
        tm.create_bind_to_constraint(&t[1], to);
        tm.create_convertible_constraint(&t[0], &t[1]);

        prop_assert_eq!(tm.solve().is_some(), tm.is_convertible(from, to));
    }
}
