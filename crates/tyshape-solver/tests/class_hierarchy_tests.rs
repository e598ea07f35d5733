use super::*;
use crate::def::DefKind;
use crate::errors::SolverError;
use crate::intern::TypeInterner;
use crate::types::{FunctionShape, Visibility};

fn instance_shape(interner: &TypeInterner, instance: TypeId) -> std::sync::Arc<ObjectShape> {
    let Some(TypeData::Object(shape_id)) = interner.lookup(instance) else {
        panic!("expected an object instance type");
    };
    interner.object_shape(shape_id)
}

#[test]
fn test_instance_merges_base_members() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let builder = ClassTypeBuilder::new(&interner, &store);

    let base_name = interner.intern_string("Base");
    let derived_name = interner.intern_string("Derived");
    let id = interner.intern_string("id");
    let label = interner.intern_string("label");
    let extra = interner.intern_string("extra");

    builder.create_instance_type(
        base_name,
        None,
        vec![
            PropertyInfo::new(id, TypeId::NUMBER),
            PropertyInfo::new(label, TypeId::STRING),
        ],
    );
    let derived = builder.create_instance_type(
        derived_name,
        Some(base_name),
        vec![
            PropertyInfo::new(label, interner.literal_string("derived")),
            PropertyInfo::new(extra, TypeId::BOOLEAN),
        ],
    );

    let shape = instance_shape(&interner, derived);
    assert_eq!(shape.origin, Some(derived_name));
    assert_eq!(shape.properties.len(), 3);

    let inherited = shape.find_property(id).expect("id");
    assert_eq!(inherited.type_id, TypeId::NUMBER);
    assert_eq!(inherited.parent_id, Some(base_name));

    let overridden = shape.find_property(label).expect("label");
    assert_eq!(overridden.type_id, interner.literal_string("derived"));
    assert_eq!(overridden.parent_id, Some(derived_name));
}

#[test]
fn test_store_records_heritage() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let builder = ClassTypeBuilder::new(&interner, &store);

    let shape_name = interner.intern_string("Shape");
    let circle_name = interner.intern_string("Circle");
    let shape = builder.create_abstract_instance_type(shape_name, None, vec![]);
    let circle = builder.create_instance_type(circle_name, Some(shape_name), vec![]);

    let shape_def = store.get(shape_name).expect("Shape");
    assert_eq!(shape_def.kind, DefKind::Class);
    assert!(shape_def.is_abstract);
    assert_eq!(shape_def.body, shape);

    let circle_def = store.get(circle_name).expect("Circle");
    assert!(!circle_def.is_abstract);
    assert_eq!(circle_def.body, circle);
    assert_eq!(store.get_extends(circle_name), Some(shape_name));
    assert!(store.is_derived_from(circle_name, shape_name));
    assert!(!store.is_derived_from(shape_name, circle_name));
}

#[test]
fn test_private_members_compare_by_declaring_class() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let builder = ClassTypeBuilder::new(&interner, &store);
    let secret = interner.intern_string("secret");
    let private = |name: &str| {
        builder.create_instance_type(
            interner.intern_string(name),
            None,
            vec![PropertyInfo {
                visibility: Visibility::Private,
                ..PropertyInfo::new(secret, TypeId::STRING)
            }],
        )
    };

    let a = private("A");
    let b = private("B");
    let err = builder.check_implements(a, b).unwrap_err();
    assert!(matches!(err, SolverError::StructuralMismatch { .. }));
    assert_eq!(builder.check_implements(a, a), Ok(()));
}

#[test]
fn test_constructor_type_has_prototype() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let builder = ClassTypeBuilder::new(&interner, &store);

    let instance = builder.create_instance_type(interner.intern_string("Point"), None, vec![]);
    let create = interner.intern_string("create");
    let factory = interner.function(FunctionShape::new(vec![], instance));
    let constructor = builder.create_constructor_type(instance, vec![PropertyInfo::new(create, factory)]);

    let shape = instance_shape(&interner, constructor);
    let prototype = shape
        .find_property(interner.intern_string("prototype"))
        .expect("prototype");
    assert_eq!(prototype.type_id, instance);
    assert!(prototype.readonly);
    assert!(shape.find_property(create).is_some());
    assert_eq!(shape.origin, None);
}

#[test]
fn test_check_implements() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let builder = ClassTypeBuilder::new(&interner, &store);

    let name = interner.intern_string("name");
    let age = interner.intern_string("age");
    let named = interner.object(vec![PropertyInfo::new(name, TypeId::STRING)]);
    let aged = interner.object(vec![PropertyInfo::new(age, TypeId::NUMBER)]);

    let person = builder.create_instance_type(
        interner.intern_string("Person"),
        None,
        vec![
            PropertyInfo::new(name, TypeId::STRING),
            PropertyInfo::new(interner.intern_string("email"), TypeId::STRING),
        ],
    );

    assert_eq!(builder.check_implements(person, named), Ok(()));
    assert_eq!(
        builder.check_implements(person, aged),
        Err(SolverError::StructuralMismatch {
            path: vec!["age".to_string()],
            source_type: person,
            target_type: aged,
        })
    );
}
