//! Concurrent interning and querying.
//!
//! One `TypeInterner` and one `DefinitionStore` are shared across rayon
//! workers; every worker builds its own checkers and evaluators.

use crate::{
    CompatChecker, DefinitionInfo, DefinitionStore, Freshness, PropertyInfo, SubtypeChecker,
    TypeEvaluator, TypeId, TypeInterner, TypeParamInfo,
};
use rayon::prelude::*;
use std::sync::Arc;
use tyshape_common::interner::Atom;

#[test]
fn test_concurrent_string_interning_deduplication() {
    let interner = Arc::new(TypeInterner::new());
    let strings: Vec<String> = (0..1000).map(|i| format!("key_{}", i % 100)).collect();

    let atoms: Vec<Atom> = strings
        .par_iter()
        .map(|s| interner.intern_string(s))
        .collect();

    for (s, atom) in strings.iter().zip(&atoms) {
        assert_eq!(*atom, interner.intern_string(s), "atom for {s} should be shared");
        assert_eq!(interner.resolve_atom(*atom), *s);
    }
}

#[test]
fn test_concurrent_structural_interning_is_canonical() {
    let interner = Arc::new(TypeInterner::new());

    let ids: Vec<TypeId> = (0..512)
        .into_par_iter()
        .map(|i| match i % 4 {
            0 => interner.union(vec![TypeId::STRING, TypeId::NUMBER]),
            1 => interner.union(vec![TypeId::NUMBER, TypeId::STRING]),
            2 => interner.union2(TypeId::STRING, TypeId::NUMBER),
            _ => interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::STRING]),
        })
        .collect();

    let expected = interner.union2(TypeId::NUMBER, TypeId::STRING);
    assert!(ids.iter().all(|&id| id == expected));
}

#[test]
fn test_concurrent_object_creation() {
    let interner = Arc::new(TypeInterner::new());

    let objects: Vec<TypeId> = (0..200)
        .into_par_iter()
        .map(|i| {
            interner.object(vec![
                PropertyInfo::new(interner.intern_string("x"), TypeId::NUMBER),
                PropertyInfo::new(interner.intern_string(&format!("prop_{}", i % 50)), TypeId::STRING),
            ])
        })
        .collect();

    for (i, &object) in objects.iter().enumerate() {
        let again = interner.object(vec![
            PropertyInfo::new(interner.intern_string(&format!("prop_{}", i % 50)), TypeId::STRING),
            PropertyInfo::new(interner.intern_string("x"), TypeId::NUMBER),
        ]);
        assert_eq!(object, again);
    }
}

#[test]
fn test_concurrent_queries_share_store() {
    let interner = Arc::new(TypeInterner::new());
    let store = Arc::new(DefinitionStore::new());

    // Register Box0..Box31 from many threads.
    (0..32).into_par_iter().for_each(|i| {
        let t = TypeParamInfo::new(interner.intern_string("T"));
        let body = interner.object(vec![PropertyInfo::new(
            interner.intern_string("value"),
            interner.type_param(t.clone()),
        )]);
        let name = interner.intern_string(&format!("Box{i}"));
        store.register(DefinitionInfo::type_alias(name, vec![t], body));
    });
    assert_eq!(store.len(), 32);

    let expected = interner.object(vec![PropertyInfo::new(
        interner.intern_string("value"),
        TypeId::NUMBER,
    )]);

    let results: Vec<(TypeId, bool, bool)> = (0..256)
        .into_par_iter()
        .map(|i| {
            let name = interner.intern_string(&format!("Box{}", i % 32));
            let reference = interner.reference(name, vec![TypeId::NUMBER]);

            let evaluated = TypeEvaluator::with_resolver(&*interner, &*store)
                .evaluate(reference)
                .expect("evaluate");
            let subtype = SubtypeChecker::with_resolver(&*interner, &*store)
                .is_subtype_of(reference, expected);
            let assignable = CompatChecker::with_resolver(&*interner, &*store)
                .is_assignable_with_freshness(expected, reference, Freshness::Fresh);
            (evaluated, subtype, assignable)
        })
        .collect();

    for (evaluated, subtype, assignable) in results {
        assert_eq!(evaluated, expected);
        assert!(subtype);
        assert!(assignable);
    }
}
