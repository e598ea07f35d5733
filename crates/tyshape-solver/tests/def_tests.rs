use super::*;
use crate::intern::TypeInterner;

#[test]
fn test_store_register_and_resolve() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    assert!(store.is_empty());

    let name = interner.intern_string("Nullable");
    let t = TypeParamInfo::new(interner.intern_string("T"));
    let body = interner.union2(interner.type_param(t.clone()), TypeId::NULL);
    store.register(DefinitionInfo::type_alias(name, vec![t], body));

    assert!(store.contains(name));
    assert_eq!(store.len(), 1);
    let resolved = store.resolve_definition(name).expect("registered");
    assert_eq!(resolved.kind, DefKind::TypeAlias);
    assert_eq!(resolved.body, body);
    assert_eq!(resolved.type_params.len(), 1);
}

#[test]
fn test_store_register_replaces() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    let name = interner.intern_string("Id");
    store.register(DefinitionInfo::type_alias(name, vec![], TypeId::STRING));
    store.register(DefinitionInfo::interface(name, vec![], TypeId::NUMBER));

    let resolved = store.get(name).expect("registered");
    assert_eq!(resolved.kind, DefKind::Interface);
    assert_eq!(resolved.body, TypeId::NUMBER);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_noop_resolver_resolves_nothing() {
    let interner = TypeInterner::new();
    let name = interner.intern_string("Anything");

    assert!(NoopResolver.resolve_definition(name).is_none());
    assert!(NoopResolver.is_derived_from(name, name));
    assert!(!NoopResolver.is_derived_from(name, interner.intern_string("Other")));
}

#[test]
fn test_class_ancestry() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    let animal = interner.intern_string("Animal");
    let dog = interner.intern_string("Dog");
    let puppy = interner.intern_string("Puppy");
    let cat = interner.intern_string("Cat");
    let instance = interner.object(vec![]);

    store.register(DefinitionInfo::class(animal, instance, None).with_abstract(true));
    store.register(DefinitionInfo::class(dog, instance, Some(animal)));
    store.register(DefinitionInfo::class(puppy, instance, Some(dog)));
    store.register(DefinitionInfo::class(cat, instance, Some(animal)));

    assert_eq!(store.get_extends(puppy), Some(dog));
    assert!(store.get(animal).expect("animal").is_abstract);
    assert!(store.is_derived_from(puppy, animal));
    assert!(store.is_derived_from(dog, dog));
    assert!(!store.is_derived_from(animal, dog));
    assert!(!store.is_derived_from(cat, dog));
}

#[test]
fn test_cyclic_heritage_terminates() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    let a = interner.intern_string("A");
    let b = interner.intern_string("B");
    let unrelated = interner.intern_string("Unrelated");
    let instance = interner.object(vec![]);
    store.register(DefinitionInfo::class(a, instance, Some(b)));
    store.register(DefinitionInfo::class(b, instance, Some(a)));

    assert!(store.is_derived_from(a, b));
    assert!(!store.is_derived_from(a, unrelated));
}
