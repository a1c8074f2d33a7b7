use proptest::prelude::{any, prop_assert_eq, proptest, ProptestConfig};

use crate::{ty, FunctionType, FunctionVar, GenericType, ParseFunctionVarError, Type, TypeVar};

#[test]
fn unset_is_neither_variant() {
    let unset = Type::default();
    assert!(unset.is_unset());
    assert!(!unset.has_generic());
    assert!(!unset.has_func());
    assert_eq!(unset.to_string(), "<unset>");
}

#[test]
fn generic_equality_is_structural() {
    assert_eq!(ty!(int), Type::named("int"));
    assert_ne!(ty!(int), ty!(float));
    assert_eq!(ty!([int]), Type::array(Type::named("int")));
    assert_ne!(ty!([int]), ty!([[int]]));

    let with_params = GenericType::with_params("Map", vec![ty!(int), ty!(float)]);
    let swapped = GenericType::with_params("Map", vec![ty!(float), ty!(int)]);
    assert_ne!(with_params, swapped);
    assert!(with_params.is_generic());
    assert!(!with_params.is_array());
}

#[test]
fn array_helpers() {
    let nested = ty!([[int]]);
    assert_eq!(nested.to_string(), "Array<Array<int>>");
    assert_eq!(nested.array_element(), Some(&ty!([int])));
    assert_eq!(
        nested.array_element().and_then(Type::array_element),
        Some(&ty!(int))
    );
    assert_eq!(ty!(int).array_element(), None);
}

#[test]
fn function_equality_checks_return_type() {
    let base = FunctionType::new("foo", 7).with_signature(vec![ty!(int)], ty!(double));
    let same = FunctionType::new("foo", 7).with_signature(vec![ty!(int)], ty!(double));
    let other_ret = FunctionType::new("foo", 7).with_signature(vec![ty!(int)], ty!(float));
    let other_id = FunctionType::new("foo", 8).with_signature(vec![ty!(int)], ty!(double));
    let mut no_ret = FunctionType::new("foo", 7);
    no_ret.add_arg().clone_from(&ty!(int));

    assert_eq!(base, same);
    assert_ne!(base, other_ret);
    assert_ne!(base, other_id);
    assert_ne!(base, no_ret);
    assert_eq!(Type::from(base).to_string(), "foo(int) -> double");
}

#[test]
fn function_builders() {
    let mut func = FunctionType::new("bar", 1);
    *func.add_arg() = ty!(int);
    *func.add_arg() = ty!([float]);
    assert!(!func.has_return_type());
    *func.return_type_mut() = ty!(void);

    assert_eq!(func.return_type(), Some(&ty!(void)));
    assert_eq!(func.to_string(), "bar(int, Array<float>) -> void");
}

#[test]
fn type_var_ordering() {
    let mut vars = vec![TypeVar::from("T2"), TypeVar::from("T10"), TypeVar::from("T1")];
    vars.sort();
    assert_eq!(
        vars,
        vec![TypeVar::from("T1"), TypeVar::from("T10"), TypeVar::from("T2")]
    );
    assert!(TypeVar::default().is_empty());
}

#[test]
fn function_var_serialize() {
    let mut func = FunctionVar::new("foo", 42);
    *func.add_arg() = TypeVar::from("T1");
    *func.add_arg() = TypeVar::from("T2");
    *func.return_var_mut() = TypeVar::from("T3");

    assert_eq!(func.serialize(), "T1,T2|T3|foo|42");
    assert_eq!(FunctionVar::unserialize("T1,T2|T3|foo|42"), Ok(func));
}

#[test]
fn function_var_serialize_empty_fields() {
    let func = FunctionVar::default();
    assert_eq!(func.serialize(), "<empty>|<empty>|<empty>|0");
    assert_eq!(FunctionVar::unserialize("<empty>|<empty>|<empty>|0"), Ok(func));

    let mut negative = FunctionVar::default();
    negative.set_id(-1993622415222145992);
    assert_eq!(negative.serialize(), "<empty>|<empty>|<empty>|-1993622415222145992");
}

#[test]
fn function_var_serialize_unfilled_args() {
    let mut func = FunctionVar::new("foo", 3);
    func.add_arg();
    *func.return_var_mut() = TypeVar::from("T1");
    assert_eq!(func.serialize(), "|T1|foo|3");
    assert_eq!(FunctionVar::unserialize("|T1|foo|3"), Ok(func));

    let mut pair = FunctionVar::new("bar", 4);
    pair.add_arg();
    *pair.add_arg() = TypeVar::from("T2");
    assert_eq!(pair.serialize(), ",T2|<empty>|bar|4");
    assert_eq!(FunctionVar::unserialize(",T2|<empty>|bar|4"), Ok(pair));
}

#[test]
fn function_var_unserialize_errors() {
    assert_eq!(
        FunctionVar::unserialize("T1|T2|foo"),
        Err(ParseFunctionVarError::FieldCount(3))
    );
    assert_eq!(
        FunctionVar::unserialize("T1|T2|foo|bar"),
        Err(ParseFunctionVarError::InvalidId("bar".to_string()))
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn function_var_serialize_is_invertible(func in any::<FunctionVar>()) {
        let serialized = func.serialize();
        prop_assert_eq!(FunctionVar::unserialize(&serialized), Ok(func));
    }

    #[test]
    fn type_clone_is_equal(ty in any::<Type>()) {
        let copy = ty.clone();
        prop_assert_eq!(copy.to_string(), ty.to_string());
        prop_assert_eq!(copy, ty);
    }
}
