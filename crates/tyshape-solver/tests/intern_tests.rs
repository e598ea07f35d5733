use super::*;

// =============================================================================
// Intrinsics and literals
// =============================================================================

#[test]
fn test_interner_intrinsics() {
    let interner = TypeInterner::new();

    assert!(interner.is_empty());
    assert_eq!(interner.len(), TypeId::FIRST_USER as usize);
    assert_eq!(interner.intrinsic(IntrinsicKind::String), TypeId::STRING);
    assert_eq!(
        interner.lookup(TypeId::NUMBER),
        Some(TypeData::Intrinsic(IntrinsicKind::Number))
    );
}

#[test]
fn test_interner_deduplication() {
    let interner = TypeInterner::new();

    let hello1 = interner.literal_string("hello");
    let hello2 = interner.literal_string("hello");
    let world = interner.literal_string("world");

    assert_eq!(hello1, hello2);
    assert_ne!(hello1, world);
    assert!(!interner.is_empty());
}

#[test]
fn test_boolean_literals_are_builtin() {
    let interner = TypeInterner::new();

    assert_eq!(interner.literal_boolean(true), TypeId::BOOLEAN_TRUE);
    assert_eq!(interner.literal_boolean(false), TypeId::BOOLEAN_FALSE);
    assert_eq!(
        interner.lookup(TypeId::BOOLEAN_TRUE),
        Some(TypeData::Literal(LiteralValue::Boolean(true)))
    );
}

#[test]
fn test_number_literal_identity() {
    let interner = TypeInterner::new();

    assert_eq!(interner.literal_number(1.0), interner.literal_number(1.0));
    assert_ne!(interner.literal_number(1.0), interner.literal_number(2.0));
    // NaN literals still intern to a single id.
    assert_eq!(
        interner.literal_number(f64::NAN),
        interner.literal_number(f64::NAN)
    );
}

// =============================================================================
// Unions
// =============================================================================

#[test]
fn test_union_is_order_independent() {
    let interner = TypeInterner::new();

    let a = interner.union(vec![TypeId::STRING, TypeId::NUMBER]);
    let b = interner.union(vec![TypeId::NUMBER, TypeId::STRING]);
    assert_eq!(a, b);
}

#[test]
fn test_union_single_member_and_empty() {
    let interner = TypeInterner::new();

    assert_eq!(interner.union(vec![TypeId::STRING]), TypeId::STRING);
    assert_eq!(interner.union(Vec::new()), TypeId::NEVER);
    assert_eq!(
        interner.union(vec![TypeId::STRING, TypeId::STRING]),
        TypeId::STRING
    );
}

#[test]
fn test_union_flattens_nested_unions() {
    let interner = TypeInterner::new();

    let inner = interner.union2(TypeId::STRING, TypeId::NUMBER);
    let outer = interner.union2(inner, TypeId::BOOLEAN);
    let flat = interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::BOOLEAN]);
    assert_eq!(outer, flat);

    let Some(TypeData::Union(list_id)) = interner.lookup(outer) else {
        panic!("expected a union");
    };
    assert_eq!(interner.type_list(list_id).len(), 3);
}

#[test]
fn test_union_any_and_unknown_absorb() {
    let interner = TypeInterner::new();

    assert_eq!(interner.union2(TypeId::STRING, TypeId::ANY), TypeId::ANY);
    assert_eq!(
        interner.union2(TypeId::STRING, TypeId::UNKNOWN),
        TypeId::UNKNOWN
    );
    assert_eq!(
        interner.union(vec![TypeId::UNKNOWN, TypeId::ANY]),
        TypeId::ANY
    );
}

#[test]
fn test_union_drops_never() {
    let interner = TypeInterner::new();

    assert_eq!(interner.union2(TypeId::STRING, TypeId::NEVER), TypeId::STRING);
    assert_eq!(interner.union2(TypeId::NEVER, TypeId::NEVER), TypeId::NEVER);
}

#[test]
fn test_union_true_false_is_boolean() {
    let interner = TypeInterner::new();

    let both = interner.union2(TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN_FALSE);
    assert_eq!(both, TypeId::BOOLEAN);
}

#[test]
fn test_union_absorbs_literals_into_primitive() {
    let interner = TypeInterner::new();

    let hello = interner.literal_string("hello");
    let one = interner.literal_number(1.0);

    assert_eq!(interner.union2(hello, TypeId::STRING), TypeId::STRING);
    let mixed = interner.union(vec![hello, one, TypeId::NUMBER]);
    assert_eq!(mixed, interner.union2(hello, TypeId::NUMBER));
}

#[test]
fn test_union_members_sorted_by_creation() {
    let interner = TypeInterner::new();

    let red = interner.literal_string("red");
    let green = interner.literal_string("green");
    let union = interner.union(vec![green, red]);

    let Some(TypeData::Union(list_id)) = interner.lookup(union) else {
        panic!("expected a union");
    };
    assert_eq!(&*interner.type_list(list_id), &[red, green]);
}

// =============================================================================
// Intersections
// =============================================================================

#[test]
fn test_intersection_identities() {
    let interner = TypeInterner::new();

    assert_eq!(interner.intersection(Vec::new()), TypeId::UNKNOWN);
    assert_eq!(
        interner.intersection2(TypeId::STRING, TypeId::UNKNOWN),
        TypeId::STRING
    );
    assert_eq!(
        interner.intersection2(TypeId::STRING, TypeId::NEVER),
        TypeId::NEVER
    );
    assert_eq!(interner.intersection2(TypeId::STRING, TypeId::ANY), TypeId::ANY);
}

#[test]
fn test_intersection_disjoint_primitives() {
    let interner = TypeInterner::new();

    assert_eq!(
        interner.intersection2(TypeId::STRING, TypeId::NUMBER),
        TypeId::NEVER
    );

    let a = interner.literal_string("a");
    let b = interner.literal_string("b");
    assert_eq!(interner.intersection2(a, b), TypeId::NEVER);

    let obj = interner.object(vec![]);
    assert_eq!(interner.intersection2(obj, TypeId::NULL), TypeId::NEVER);
}

#[test]
fn test_intersection_literal_with_primitive() {
    let interner = TypeInterner::new();

    let a = interner.literal_string("a");
    assert_eq!(interner.intersection2(a, TypeId::STRING), a);
}

#[test]
fn test_intersection_distributes_over_union() {
    let interner = TypeInterner::new();

    let a = interner.literal_string("a");
    let one = interner.literal_number(1.0);
    let either = interner.union2(a, one);

    // ("a" | 1) & string = "a"
    assert_eq!(interner.intersection2(either, TypeId::STRING), a);
}

#[test]
fn test_intersection_merges_objects() {
    let interner = TypeInterner::new();

    let name = interner.intern_string("name");
    let age = interner.intern_string("age");
    let left = interner.object(vec![PropertyInfo::new(name, TypeId::STRING)]);
    let right = interner.object(vec![PropertyInfo::new(age, TypeId::NUMBER)]);

    let merged = interner.intersection2(left, right);
    let expected = interner.object(vec![
        PropertyInfo::new(name, TypeId::STRING),
        PropertyInfo::new(age, TypeId::NUMBER),
    ]);
    assert_eq!(merged, expected);
}

#[test]
fn test_intersection_merge_required_and_readonly() {
    let interner = TypeInterner::new();

    let x = interner.intern_string("x");
    let left = interner.object(vec![PropertyInfo::opt(x, TypeId::STRING)]);
    let right = interner.object(vec![PropertyInfo::readonly(x, TypeId::STRING)]);

    let merged = interner.intersection2(left, right);
    let Some(TypeData::Object(shape_id)) = interner.lookup(merged) else {
        panic!("expected an object");
    };
    let shape = interner.object_shape(shape_id);
    let prop = shape.find_property(x).expect("x");
    assert!(!prop.optional);
    assert!(prop.readonly);
}

#[test]
fn test_intersection_conflicting_discriminants_is_never() {
    let interner = TypeInterner::new();

    let kind = interner.intern_string("kind");
    let circle = interner.literal_string("circle");
    let square = interner.literal_string("square");
    let left = interner.object(vec![PropertyInfo::new(kind, circle)]);
    let right = interner.object(vec![PropertyInfo::new(kind, square)]);

    assert_eq!(interner.intersection2(left, right), TypeId::NEVER);
}

#[test]
fn test_intersection_conflicting_primitive_property() {
    let interner = TypeInterner::new();

    let id = interner.intern_string("id");
    let left = interner.object(vec![PropertyInfo::new(id, TypeId::STRING)]);
    let right = interner.object(vec![PropertyInfo::new(id, TypeId::NUMBER)]);

    let merged = interner.intersection2(left, right);
    let expected = interner.object(vec![PropertyInfo::new(id, TypeId::NEVER)]);
    assert_eq!(merged, expected);
}

// =============================================================================
// Objects and templates
// =============================================================================

#[test]
fn test_object_property_order_is_canonical() {
    let interner = TypeInterner::new();

    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let ab = interner.object(vec![
        PropertyInfo::new(a, TypeId::STRING),
        PropertyInfo::new(b, TypeId::NUMBER),
    ]);
    let ba = interner.object(vec![
        PropertyInfo::new(b, TypeId::NUMBER),
        PropertyInfo::new(a, TypeId::STRING),
    ]);
    assert_eq!(ab, ba);
}

#[test]
fn test_object_last_duplicate_wins() {
    let interner = TypeInterner::new();

    let a = interner.intern_string("a");
    let obj = interner.object(vec![
        PropertyInfo::new(a, TypeId::STRING),
        PropertyInfo::new(a, TypeId::NUMBER),
    ]);
    assert_eq!(obj, interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]));
}

#[test]
fn test_object_origin_affects_identity() {
    let interner = TypeInterner::new();

    let x = interner.intern_string("x");
    let plain = interner.object(vec![PropertyInfo::new(x, TypeId::NUMBER)]);
    let tagged = interner.object_with_index(ObjectShape {
        properties: vec![PropertyInfo::new(x, TypeId::NUMBER)],
        origin: Some(interner.intern_string("Point")),
        ..ObjectShape::default()
    });
    assert_ne!(plain, tagged);
}

#[test]
fn test_template_literal_all_text_is_string_literal() {
    let interner = TypeInterner::new();

    let hello = interner.intern_string("hello ");
    let world = interner.intern_string("world");
    let template = interner.template_literal(vec![
        TemplateSpan::Text(hello),
        TemplateSpan::Text(world),
    ]);
    assert_eq!(template, interner.literal_string("hello world"));
}

#[test]
fn test_template_literal_merges_adjacent_text() {
    let interner = TypeInterner::new();

    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let split = interner.template_literal(vec![
        TemplateSpan::Text(a),
        TemplateSpan::Text(b),
        TemplateSpan::Type(TypeId::STRING),
    ]);
    let joined = interner.template_literal(vec![
        TemplateSpan::Text(interner.intern_string("ab")),
        TemplateSpan::Type(TypeId::STRING),
    ]);
    assert_eq!(split, joined);
}
