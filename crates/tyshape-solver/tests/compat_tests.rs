use super::*;
use crate::def::{DefinitionInfo, DefinitionStore};
use crate::intern::TypeInterner;
use crate::types::*;

fn prop(interner: &TypeInterner, name: &str, type_id: TypeId) -> PropertyInfo {
    PropertyInfo::new(interner.intern_string(name), type_id)
}

// =============================================================================
// Excess property checking
// =============================================================================

#[test]
fn test_fresh_literal_with_excess_property() {
    let interner = TypeInterner::new();
    let mut checker = CompatChecker::new(&interner);

    // { name: "x", age: 1 } against { name: string }
    let literal = interner.object(vec![
        prop(&interner, "name", interner.literal_string("x")),
        prop(&interner, "age", interner.literal_number(1.0)),
    ]);
    let target = interner.object(vec![prop(&interner, "name", TypeId::STRING)]);

    assert_eq!(
        checker.check(literal, target, Freshness::Fresh),
        Err(SolverError::ExcessProperty {
            property: "age".to_string()
        })
    );
    assert_eq!(checker.check(literal, target, Freshness::Regular), Ok(()));
    assert!(checker.is_assignable(literal, target));
    assert!(!checker.is_assignable_with_freshness(literal, target, Freshness::Fresh));
}

#[test]
fn test_excess_reported_before_mismatch() {
    let interner = TypeInterner::new();
    let mut checker = CompatChecker::new(&interner);

    let literal = interner.object(vec![
        prop(&interner, "name", TypeId::NUMBER),
        prop(&interner, "extra", TypeId::BOOLEAN),
    ]);
    let target = interner.object(vec![prop(&interner, "name", TypeId::STRING)]);

    assert_eq!(
        checker.check(literal, target, Freshness::Fresh),
        Err(SolverError::ExcessProperty {
            property: "extra".to_string()
        })
    );
}

#[test]
fn test_nested_fresh_literal() {
    let interner = TypeInterner::new();
    let mut checker = CompatChecker::new(&interner);

    let inner_target = interner.object(vec![prop(&interner, "zip", TypeId::STRING)]);
    let target = interner.object(vec![prop(&interner, "address", inner_target)]);
    let inner_literal = interner.object(vec![
        prop(&interner, "zip", TypeId::STRING),
        prop(&interner, "planet", TypeId::STRING),
    ]);
    let literal = interner.object(vec![prop(&interner, "address", inner_literal)]);

    assert_eq!(
        checker.check(literal, target, Freshness::Fresh),
        Err(SolverError::ExcessProperty {
            property: "planet".to_string()
        })
    );
}

#[test]
fn test_excess_check_against_union_target() {
    let interner = TypeInterner::new();
    let mut checker = CompatChecker::new(&interner);

    let a = interner.object(vec![prop(&interner, "a", TypeId::STRING)]);
    let b = interner.object(vec![prop(&interner, "b", TypeId::NUMBER)]);
    let target = interner.union2(a, b);

    let ok = interner.object(vec![prop(&interner, "a", TypeId::STRING)]);
    let bad = interner.object(vec![
        prop(&interner, "a", TypeId::STRING),
        prop(&interner, "c", TypeId::STRING),
    ]);
    assert_eq!(checker.check(ok, target, Freshness::Fresh), Ok(()));
    assert_eq!(
        checker.check(bad, target, Freshness::Fresh),
        Err(SolverError::ExcessProperty {
            property: "c".to_string()
        })
    );
}

#[test]
fn test_permissive_targets_skip_excess_check() {
    let interner = TypeInterner::new();
    let mut checker = CompatChecker::new(&interner);

    let literal = interner.object(vec![prop(&interner, "anything", TypeId::STRING)]);
    let empty = interner.object(vec![]);
    let dict = interner.object_with_index(ObjectShape {
        string_index: Some(IndexSignature {
            key_type: TypeId::STRING,
            value_type: TypeId::STRING,
            readonly: false,
        }),
        ..ObjectShape::default()
    });

    assert_eq!(checker.check(literal, empty, Freshness::Fresh), Ok(()));
    assert_eq!(checker.check(literal, dict, Freshness::Fresh), Ok(()));
    assert_eq!(checker.check(literal, TypeId::OBJECT, Freshness::Fresh), Ok(()));
}

#[test]
fn test_excess_check_through_resolved_reference() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    let point = interner.intern_string("Point");
    let body = interner.object(vec![
        prop(&interner, "x", TypeId::NUMBER),
        prop(&interner, "y", TypeId::NUMBER),
    ]);
    store.register(DefinitionInfo::interface(point, vec![], body));
    let target = interner.reference(point, vec![]);

    let literal = interner.object(vec![
        prop(&interner, "x", TypeId::NUMBER),
        prop(&interner, "y", TypeId::NUMBER),
        prop(&interner, "z", TypeId::NUMBER),
    ]);
    let mut checker = CompatChecker::with_resolver(&interner, &store);
    assert_eq!(
        checker.check(literal, target, Freshness::Fresh),
        Err(SolverError::ExcessProperty {
            property: "z".to_string()
        })
    );
    assert_eq!(checker.check(literal, target, Freshness::Regular), Ok(()));
}

// =============================================================================
// Structural mismatches
// =============================================================================

#[test]
fn test_structural_mismatch_path() {
    let interner = TypeInterner::new();
    let mut checker = CompatChecker::new(&interner);

    let source = interner.object(vec![prop(
        &interner,
        "address",
        interner.object(vec![prop(&interner, "zip", TypeId::NUMBER)]),
    )]);
    let target = interner.object(vec![prop(
        &interner,
        "address",
        interner.object(vec![prop(&interner, "zip", TypeId::STRING)]),
    )]);

    assert_eq!(
        checker.check(source, target, Freshness::Regular),
        Err(SolverError::StructuralMismatch {
            path: vec!["address".to_string(), "zip".to_string()],
            source_type: source,
            target_type: target,
        })
    );
}

#[test]
fn test_missing_property_path() {
    let interner = TypeInterner::new();

    let source = interner.object(vec![prop(&interner, "name", TypeId::STRING)]);
    let target = interner.object(vec![
        prop(&interner, "name", TypeId::STRING),
        prop(&interner, "id", TypeId::NUMBER),
    ]);

    let err = check_assignable(&interner, source, target, Freshness::Regular).unwrap_err();
    let SolverError::StructuralMismatch { path, .. } = err else {
        panic!("expected a structural mismatch, got {err:?}");
    };
    assert_eq!(path, vec!["id".to_string()]);
}

#[test]
fn test_primitive_mismatch_has_empty_path() {
    let interner = TypeInterner::new();

    assert_eq!(
        check_assignable(&interner, TypeId::STRING, TypeId::NUMBER, Freshness::Regular),
        Err(SolverError::StructuralMismatch {
            path: Vec::new(),
            source_type: TypeId::STRING,
            target_type: TypeId::NUMBER,
        })
    );
    assert!(!is_assignable(&interner, TypeId::STRING, TypeId::NUMBER));
}

#[test]
fn test_tuple_element_path() {
    let interner = TypeInterner::new();

    let source = interner.tuple(vec![
        TupleElement::required(TypeId::STRING),
        TupleElement::required(TypeId::STRING),
    ]);
    let target = interner.tuple(vec![
        TupleElement::required(TypeId::STRING),
        TupleElement::required(TypeId::NUMBER),
    ]);

    let err = check_assignable(&interner, source, target, Freshness::Regular).unwrap_err();
    assert!(matches!(
        err,
        SolverError::StructuralMismatch { ref path, .. } if path == &vec!["1".to_string()]
    ));
}

#[test]
fn test_recursion_limit_surfaces_from_check() {
    let interner = TypeInterner::new();
    let mut checker = CompatChecker::new(&interner)
        .with_options(SolverOptions::default().with_max_subtype_depth(2));

    let mut source = TypeId::STRING;
    let mut target = TypeId::NUMBER;
    for _ in 0..4 {
        source = interner.array(source);
        target = interner.array(target);
    }
    let err = checker
        .check(source, target, Freshness::Regular)
        .unwrap_err();
    assert!(err.is_recursion_limit());
}

// =============================================================================
// Failure explanation
// =============================================================================

#[test]
fn test_explain_failure_reasons() {
    let interner = TypeInterner::new();
    let mut checker = CompatChecker::new(&interner);

    let x = interner.intern_string("x");
    let optional = interner.object(vec![PropertyInfo::opt(x, TypeId::NUMBER)]);
    let required = interner.object(vec![PropertyInfo::new(x, TypeId::NUMBER)]);

    assert_eq!(checker.explain_failure(required, optional), None);
    assert_eq!(
        checker.explain_failure(optional, required),
        Some(SubtypeFailureReason::OptionalPropertyRequired { property_name: x })
    );

    let union = interner.union2(TypeId::STRING, TypeId::NUMBER);
    assert_eq!(
        checker.explain_failure(TypeId::BOOLEAN, union),
        Some(SubtypeFailureReason::NoUnionMemberMatches {
            source_type: TypeId::BOOLEAN,
            target_union_members: vec![TypeId::NUMBER, TypeId::STRING],
        })
    );
}

#[test]
fn test_explain_function_failures() {
    let interner = TypeInterner::new();
    let mut checker = CompatChecker::new(&interner);

    let two = interner.function(FunctionShape::new(
        vec![
            ParamInfo::required(None, TypeId::STRING),
            ParamInfo::required(None, TypeId::STRING),
        ],
        TypeId::VOID,
    ));
    let one = interner.function(FunctionShape::new(
        vec![ParamInfo::required(None, TypeId::STRING)],
        TypeId::VOID,
    ));
    assert_eq!(
        checker.explain_failure(two, one),
        Some(SubtypeFailureReason::TooManyParameters {
            source_count: 2,
            target_count: 1,
        })
    );

    let returns_number = interner.function(FunctionShape::new(vec![], TypeId::NUMBER));
    let returns_string = interner.function(FunctionShape::new(vec![], TypeId::STRING));
    let reason = checker
        .explain_failure(returns_number, returns_string)
        .expect("return mismatch");
    assert_eq!(
        reason.innermost_types(),
        Some((TypeId::NUMBER, TypeId::STRING))
    );
}
