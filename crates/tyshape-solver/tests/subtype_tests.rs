use super::*;
use crate::def::{DefinitionInfo, DefinitionStore};
use crate::intern::TypeInterner;
use crate::types::*;

fn prop(interner: &TypeInterner, name: &str, type_id: TypeId) -> PropertyInfo {
    PropertyInfo::new(interner.intern_string(name), type_id)
}

fn func(params: Vec<TypeId>, return_type: TypeId) -> FunctionShape {
    FunctionShape::new(
        params
            .into_iter()
            .map(|ty| ParamInfo::required(None, ty))
            .collect(),
        return_type,
    )
}

// =============================================================================
// Top, bottom and intrinsics
// =============================================================================

#[test]
fn test_top_and_bottom() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    assert!(checker.is_subtype_of(TypeId::STRING, TypeId::UNKNOWN));
    assert!(checker.is_subtype_of(TypeId::STRING, TypeId::ANY));
    assert!(checker.is_subtype_of(TypeId::NEVER, TypeId::STRING));
    assert!(checker.is_subtype_of(TypeId::ANY, TypeId::STRING));
    assert!(!checker.is_subtype_of(TypeId::STRING, TypeId::NEVER));
    assert!(!checker.is_subtype_of(TypeId::UNKNOWN, TypeId::STRING));
}

#[test]
fn test_intrinsics() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    assert!(checker.is_subtype_of(TypeId::STRING, TypeId::STRING));
    assert!(!checker.is_subtype_of(TypeId::STRING, TypeId::NUMBER));
    assert!(checker.is_subtype_of(TypeId::UNDEFINED, TypeId::VOID));
    assert!(!checker.is_subtype_of(TypeId::VOID, TypeId::UNDEFINED));
    assert!(!checker.is_subtype_of(TypeId::NULL, TypeId::STRING));
}

#[test]
fn test_literals_relate_to_their_base() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let hello = interner.literal_string("hello");
    let world = interner.literal_string("world");
    let one = interner.literal_number(1.0);

    assert!(checker.is_subtype_of(hello, TypeId::STRING));
    assert!(!checker.is_subtype_of(TypeId::STRING, hello));
    assert!(!checker.is_subtype_of(hello, world));
    assert!(!checker.is_subtype_of(one, TypeId::STRING));
    assert!(checker.is_subtype_of(TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN));
    assert!(checker.is_subtype_of(
        interner.literal_bigint("10"),
        TypeId::BIGINT
    ));
}

// =============================================================================
// Unions and intersections
// =============================================================================

#[test]
fn test_union_source_and_target() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let string_or_number = interner.union2(TypeId::STRING, TypeId::NUMBER);
    let all = interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::BOOLEAN]);

    assert!(checker.is_subtype_of(TypeId::STRING, string_or_number));
    assert!(checker.is_subtype_of(string_or_number, all));
    assert!(!checker.is_subtype_of(all, string_or_number));
    assert!(!checker.is_subtype_of(string_or_number, TypeId::STRING));
}

#[test]
fn test_boolean_is_true_or_false() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    assert!(!checker.is_subtype_of(TypeId::BOOLEAN, TypeId::BOOLEAN_TRUE));
    let nullable_bool = interner.union2(TypeId::BOOLEAN, TypeId::NULL);
    assert!(checker.is_subtype_of(TypeId::BOOLEAN_FALSE, nullable_bool));
}

#[test]
fn test_intersection_source_and_target() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let named = interner.object(vec![prop(&interner, "name", TypeId::STRING)]);
    let aged = interner.object(vec![prop(&interner, "age", TypeId::NUMBER)]);
    let person = interner.object(vec![
        prop(&interner, "name", TypeId::STRING),
        prop(&interner, "age", TypeId::NUMBER),
    ]);

    // Object intersections merge; build one that stays an intersection.
    let t = interner.type_param(TypeParamInfo::new(interner.intern_string("T")));
    let t_and_named = interner.intersection2(t, named);

    assert!(checker.is_subtype_of(person, interner.intersection2(named, aged)));
    assert!(checker.is_subtype_of(t_and_named, named));
    assert!(!checker.is_subtype_of(named, t_and_named));
}

// =============================================================================
// Objects
// =============================================================================

#[test]
fn test_object_width_subtyping() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let named = interner.object(vec![prop(&interner, "name", TypeId::STRING)]);
    let person = interner.object(vec![
        prop(&interner, "name", TypeId::STRING),
        prop(&interner, "age", TypeId::NUMBER),
    ]);
    let empty = interner.object(vec![]);

    assert!(checker.is_subtype_of(person, named));
    assert!(!checker.is_subtype_of(named, person));
    assert!(checker.is_subtype_of(named, empty));
}

#[test]
fn test_object_optional_properties() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let x = interner.intern_string("x");
    let optional = interner.object(vec![PropertyInfo::opt(x, TypeId::NUMBER)]);
    let required = interner.object(vec![PropertyInfo::new(x, TypeId::NUMBER)]);
    let empty = interner.object(vec![]);

    assert!(checker.is_subtype_of(required, optional));
    assert!(checker.is_subtype_of(empty, optional));
    assert!(!checker.is_subtype_of(optional, required));
}

#[test]
fn test_readonly_is_ignored() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let x = interner.intern_string("x");
    let readonly = interner.object(vec![PropertyInfo::readonly(x, TypeId::NUMBER)]);
    let mutable = interner.object(vec![PropertyInfo::new(x, TypeId::NUMBER)]);
    assert!(checker.is_subtype_of(readonly, mutable));
    assert!(checker.is_subtype_of(mutable, readonly));
}

#[test]
fn test_private_members_are_nominal() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let secret = interner.intern_string("secret");
    let member = |class: &str, visibility: Visibility| {
        interner.object(vec![PropertyInfo {
            visibility,
            parent_id: Some(interner.intern_string(class)),
            ..PropertyInfo::new(secret, TypeId::STRING)
        }])
    };
    let a = member("A", Visibility::Private);
    let a_again = member("A", Visibility::Private);
    let b = member("B", Visibility::Private);
    let public = interner.object(vec![PropertyInfo::new(secret, TypeId::STRING)]);

    assert!(checker.is_subtype_of(a, a_again));
    assert!(!checker.is_subtype_of(b, a));
    assert!(!checker.is_subtype_of(public, a));
    assert!(!checker.is_subtype_of(a, public));
}

#[test]
fn test_string_index_signature() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let dict = interner.object_with_index(ObjectShape {
        string_index: Some(IndexSignature {
            key_type: TypeId::STRING,
            value_type: TypeId::NUMBER,
            readonly: false,
        }),
        ..ObjectShape::default()
    });
    let numbers = interner.object(vec![
        prop(&interner, "a", TypeId::NUMBER),
        prop(&interner, "b", TypeId::NUMBER),
    ]);
    let mixed = interner.object(vec![
        prop(&interner, "a", TypeId::NUMBER),
        prop(&interner, "b", TypeId::STRING),
    ]);

    assert!(checker.is_subtype_of(numbers, dict));
    assert!(!checker.is_subtype_of(mixed, dict));
    // A source index covers a required target property.
    let needs_a = interner.object(vec![prop(&interner, "a", TypeId::NUMBER)]);
    assert!(checker.is_subtype_of(dict, needs_a));
}

#[test]
fn test_number_index_signature() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let indexed = interner.object_with_index(ObjectShape {
        number_index: Some(IndexSignature {
            key_type: TypeId::NUMBER,
            value_type: TypeId::STRING,
            readonly: false,
        }),
        ..ObjectShape::default()
    });
    let array = interner.array(TypeId::STRING);
    let named_numeric = interner.object(vec![
        prop(&interner, "0", TypeId::STRING),
        prop(&interner, "label", TypeId::NUMBER),
    ]);

    assert!(checker.is_subtype_of(array, indexed));
    assert!(checker.is_subtype_of(named_numeric, indexed));
}

#[test]
fn test_apparent_members() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let has_length = interner.object(vec![prop(&interner, "length", TypeId::NUMBER)]);
    let empty = interner.object(vec![]);

    assert!(checker.is_subtype_of(TypeId::STRING, has_length));
    assert!(checker.is_subtype_of(interner.array(TypeId::NUMBER), has_length));
    assert!(!checker.is_subtype_of(TypeId::NUMBER, has_length));
    assert!(checker.is_subtype_of(TypeId::NUMBER, empty));
    assert!(!checker.is_subtype_of(TypeId::NULL, empty));
}

// =============================================================================
// Arrays and tuples
// =============================================================================

#[test]
fn test_arrays_are_covariant() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let hello = interner.literal_string("hello");
    assert!(checker.is_subtype_of(interner.array(hello), interner.array(TypeId::STRING)));
    assert!(!checker.is_subtype_of(
        interner.array(TypeId::STRING),
        interner.array(TypeId::NUMBER)
    ));
}

#[test]
fn test_tuples() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let pair = interner.tuple(vec![
        TupleElement::required(TypeId::STRING),
        TupleElement::required(TypeId::NUMBER),
    ]);
    let with_optional = interner.tuple(vec![
        TupleElement::required(TypeId::STRING),
        TupleElement::required(TypeId::NUMBER),
        TupleElement::optional(TypeId::BOOLEAN),
    ]);
    let single = interner.tuple(vec![TupleElement::required(TypeId::STRING)]);
    let mixed_array = interner.array(interner.union2(TypeId::STRING, TypeId::NUMBER));

    assert!(checker.is_subtype_of(pair, with_optional));
    assert!(!checker.is_subtype_of(pair, single));
    assert!(checker.is_subtype_of(pair, mixed_array));
    assert!(!checker.is_subtype_of(mixed_array, pair));
}

#[test]
fn test_tuple_rest_elements() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let rest = interner.tuple(vec![
        TupleElement::required(TypeId::STRING),
        TupleElement::rest(interner.array(TypeId::NUMBER)),
    ]);
    let three = interner.tuple(vec![
        TupleElement::required(TypeId::STRING),
        TupleElement::required(TypeId::NUMBER),
        TupleElement::required(TypeId::NUMBER),
    ]);
    let bad = interner.tuple(vec![
        TupleElement::required(TypeId::STRING),
        TupleElement::required(TypeId::STRING),
    ]);

    assert!(checker.is_subtype_of(three, rest));
    assert!(!checker.is_subtype_of(bad, rest));
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn test_function_parameters_are_contravariant() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let hello = interner.literal_string("hello");
    let takes_string = interner.function(func(vec![TypeId::STRING], TypeId::VOID));
    let takes_hello = interner.function(func(vec![hello], TypeId::VOID));

    assert!(checker.is_subtype_of(takes_string, takes_hello));
    assert!(!checker.is_subtype_of(takes_hello, takes_string));
}

#[test]
fn test_function_arity() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let none = interner.function(func(vec![], TypeId::VOID));
    let two = interner.function(func(vec![TypeId::STRING, TypeId::NUMBER], TypeId::VOID));

    assert!(checker.is_subtype_of(none, two));
    assert!(!checker.is_subtype_of(two, none));

    let rest_target = interner.function(FunctionShape::new(
        vec![ParamInfo::rest(None, interner.array(TypeId::ANY))],
        TypeId::VOID,
    ));
    assert!(checker.is_subtype_of(two, rest_target));
}

#[test]
fn test_function_return_types() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let returns_string = interner.function(func(vec![], TypeId::STRING));
    let returns_number = interner.function(func(vec![], TypeId::NUMBER));
    let returns_void = interner.function(func(vec![], TypeId::VOID));

    assert!(!checker.is_subtype_of(returns_string, returns_number));
    assert!(checker.is_subtype_of(returns_string, returns_void));
}

#[test]
fn test_generic_functions_align_type_params() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let generic = |name: &str| {
        let info = TypeParamInfo::new(interner.intern_string(name));
        let t = interner.type_param(info.clone());
        interner.function(FunctionShape {
            type_params: vec![info],
            ..func(vec![t], t)
        })
    };
    let identity_t = generic("T");
    let identity_u = generic("U");
    assert!(checker.is_subtype_of(identity_t, identity_u));

    // A generic source against a non-generic target erases to `any`.
    let string_fn = interner.function(func(vec![TypeId::STRING], TypeId::STRING));
    assert!(checker.is_subtype_of(identity_t, string_fn));
}

// =============================================================================
// Type parameters and templates
// =============================================================================

#[test]
fn test_type_parameters() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let t_name = interner.intern_string("T");
    let t = interner.type_param(TypeParamInfo::new(t_name));
    let bounded = interner.type_param(TypeParamInfo::new(interner.intern_string("S")).with_constraint(TypeId::STRING));

    assert!(checker.is_subtype_of(t, t));
    assert!(checker.is_subtype_of(t, TypeId::UNKNOWN));
    assert!(!checker.is_subtype_of(t, TypeId::STRING));
    assert!(checker.is_subtype_of(bounded, TypeId::STRING));
    assert!(!checker.is_subtype_of(TypeId::STRING, t));
}

#[test]
fn test_literal_against_template_pattern() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner);

    let id_template = interner.template_literal(vec![
        TemplateSpan::Text(interner.intern_string("id-")),
        TemplateSpan::Type(TypeId::NUMBER),
    ]);

    assert!(checker.is_subtype_of(interner.literal_string("id-42"), id_template));
    assert!(!checker.is_subtype_of(interner.literal_string("id-x"), id_template));
    assert!(!checker.is_subtype_of(interner.literal_string("key-1"), id_template));
    assert!(checker.is_subtype_of(id_template, TypeId::STRING));
}

// =============================================================================
// Recursion
// =============================================================================

#[test]
fn test_recursive_types_are_coinductive() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    // interface A { next: A }  interface B { next: B }
    let next = interner.intern_string("next");
    for name in ["A", "B"] {
        let atom = interner.intern_string(name);
        let body = interner.object(vec![PropertyInfo::new(next, interner.reference(atom, vec![]))]);
        store.register(DefinitionInfo::interface(atom, vec![], body));
    }
    let a = interner.reference(interner.intern_string("A"), vec![]);
    let b = interner.reference(interner.intern_string("B"), vec![]);

    let mut checker = SubtypeChecker::with_resolver(&interner, &store);
    assert_eq!(checker.check(a, b), Ok(true));
    assert_eq!(checker.check(b, a), Ok(true));
}

#[test]
fn test_expanding_recursion_hits_depth_limit() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    // interface Deep<T> { next: Deep<T[]> }
    let deep = interner.intern_string("Deep");
    let t_info = TypeParamInfo::new(interner.intern_string("T"));
    let t = interner.type_param(t_info.clone());
    let body = interner.object(vec![prop(
        &interner,
        "next",
        interner.reference(deep, vec![interner.array(t)]),
    )]);
    store.register(DefinitionInfo::interface(deep, vec![t_info], body));

    let deep_string = interner.reference(deep, vec![TypeId::STRING]);
    let deep_number = interner.reference(deep, vec![TypeId::NUMBER]);

    let mut checker = SubtypeChecker::with_resolver(&interner, &store)
        .with_options(SolverOptions::default().with_max_subtype_depth(20));
    let err = checker.check(deep_string, deep_number).unwrap_err();
    assert!(err.is_recursion_limit());
}

#[test]
fn test_depth_limit_is_reported_not_assumed() {
    let interner = TypeInterner::new();
    let mut checker =
        SubtypeChecker::new(&interner).with_options(SolverOptions::default().with_max_subtype_depth(3));

    let mut source = TypeId::STRING;
    let mut target = TypeId::NUMBER;
    for _ in 0..5 {
        source = interner.array(source);
        target = interner.array(target);
    }
    assert_eq!(checker.check_subtype(source, target), SubtypeResult::DepthExceeded);
    assert_eq!(
        checker.take_error(),
        Some(SolverError::RecursionLimitExceeded {
            profile: RecursionProfile::SubtypeCheck,
            limit: 3,
        })
    );
}

#[test]
fn test_free_function() {
    let interner = TypeInterner::new();
    assert!(is_subtype_of(&interner, TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN));
    assert!(!is_subtype_of(&interner, TypeId::BOOLEAN, TypeId::STRING));
}
