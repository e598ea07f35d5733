//! Type data extraction and traversal helpers.
//!
//! Extraction functions take a `TypeDatabase` and a `TypeId` and return the
//! relevant payload if the type is the expected variant. The traversal
//! helpers walk a type's structural children with a shallow-traversal guard.

use crate::db::TypeDatabase;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{
    FunctionShapeId, IntrinsicKind, LiteralValue, ObjectShapeId, TemplateSpan, TupleListId,
    TypeData, TypeId, TypeListId, TypeParamInfo,
};
use tyshape_common::interner::Atom;

/// Extract the union list id if this is a union type.
pub fn union_list_id(db: &dyn TypeDatabase, type_id: TypeId) -> Option<TypeListId> {
    match db.lookup(type_id) {
        Some(TypeData::Union(list_id)) => Some(list_id),
        _ => None,
    }
}

/// Extract the intersection list id if this is an intersection type.
pub fn intersection_list_id(db: &dyn TypeDatabase, type_id: TypeId) -> Option<TypeListId> {
    match db.lookup(type_id) {
        Some(TypeData::Intersection(list_id)) => Some(list_id),
        _ => None,
    }
}

pub fn object_shape_id(db: &dyn TypeDatabase, type_id: TypeId) -> Option<ObjectShapeId> {
    match db.lookup(type_id) {
        Some(TypeData::Object(shape_id)) => Some(shape_id),
        _ => None,
    }
}

pub fn array_element_type(db: &dyn TypeDatabase, type_id: TypeId) -> Option<TypeId> {
    match db.lookup(type_id) {
        Some(TypeData::Array(element)) => Some(element),
        _ => None,
    }
}

pub fn tuple_list_id(db: &dyn TypeDatabase, type_id: TypeId) -> Option<TupleListId> {
    match db.lookup(type_id) {
        Some(TypeData::Tuple(list_id)) => Some(list_id),
        _ => None,
    }
}

pub fn function_shape_id(db: &dyn TypeDatabase, type_id: TypeId) -> Option<FunctionShapeId> {
    match db.lookup(type_id) {
        Some(TypeData::Function(shape_id)) => Some(shape_id),
        _ => None,
    }
}

pub fn intrinsic_kind(db: &dyn TypeDatabase, type_id: TypeId) -> Option<IntrinsicKind> {
    match db.lookup(type_id) {
        Some(TypeData::Intrinsic(kind)) => Some(kind),
        _ => None,
    }
}

pub fn literal_value(db: &dyn TypeDatabase, type_id: TypeId) -> Option<LiteralValue> {
    match db.lookup(type_id) {
        Some(TypeData::Literal(value)) => Some(value),
        _ => None,
    }
}

pub fn literal_string(db: &dyn TypeDatabase, type_id: TypeId) -> Option<Atom> {
    match db.lookup(type_id) {
        Some(TypeData::Literal(LiteralValue::String(atom))) => Some(atom),
        _ => None,
    }
}

pub fn type_param_info(db: &dyn TypeDatabase, type_id: TypeId) -> Option<TypeParamInfo> {
    match db.lookup(type_id) {
        Some(TypeData::TypeParameter(info)) => Some(info),
        _ => None,
    }
}

pub fn is_literal_type(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    matches!(db.lookup(type_id), Some(TypeData::Literal(_)))
}

/// Object-like: values of these types are non-primitive at runtime.
pub fn is_object_like(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    type_id == TypeId::OBJECT
        || matches!(
            db.lookup(type_id),
            Some(TypeData::Object(_) | TypeData::Array(_) | TypeData::Tuple(_) | TypeData::Function(_))
        )
}

/// Members of a union, or the type itself.
pub fn union_members(db: &dyn TypeDatabase, type_id: TypeId) -> Vec<TypeId> {
    match union_list_id(db, type_id) {
        Some(list_id) => db.type_list(list_id).to_vec(),
        None => vec![type_id],
    }
}

/// Direct structural children of a type, in declaration order.
pub fn type_children(db: &dyn TypeDatabase, type_id: TypeId) -> Vec<TypeId> {
    let Some(data) = db.lookup(type_id) else {
        return Vec::new();
    };
    match data {
        TypeData::Intrinsic(_) | TypeData::Literal(_) => Vec::new(),
        TypeData::Object(shape_id) => {
            let shape = db.object_shape(shape_id);
            let mut children: Vec<TypeId> = shape.properties.iter().map(|p| p.type_id).collect();
            for index in [&shape.string_index, &shape.number_index].into_iter().flatten() {
                children.push(index.key_type);
                children.push(index.value_type);
            }
            children
        }
        TypeData::Array(element) => vec![element],
        TypeData::Tuple(list_id) => db.tuple_list(list_id).iter().map(|e| e.type_id).collect(),
        TypeData::Union(list_id) | TypeData::Intersection(list_id) => {
            db.type_list(list_id).to_vec()
        }
        TypeData::Function(shape_id) => {
            let shape = db.function_shape(shape_id);
            let mut children: Vec<TypeId> = shape.params.iter().map(|p| p.type_id).collect();
            children.push(shape.return_type);
            children
        }
        TypeData::TypeParameter(info) | TypeData::Infer(info) => {
            info.constraint.into_iter().chain(info.default).collect()
        }
        TypeData::Reference(ref_id) => db.type_reference(ref_id).args.clone(),
        TypeData::Conditional(cond_id) => {
            let cond = db.conditional_type(cond_id);
            vec![
                cond.check_type,
                cond.extends_type,
                cond.true_type,
                cond.false_type,
            ]
        }
        TypeData::Mapped(mapped_id) => {
            let mapped = db.mapped_type(mapped_id);
            vec![mapped.constraint, mapped.template]
        }
        TypeData::KeyOf(operand) => vec![operand],
        TypeData::IndexAccess(object, index) => vec![object, index],
        TypeData::TemplateLiteral(list_id) => db
            .template_list(list_id)
            .iter()
            .filter_map(|span| match span {
                TemplateSpan::Type(type_id) => Some(*type_id),
                TemplateSpan::Text(_) => None,
            })
            .collect(),
    }
}

/// Whether any type reachable from `root` satisfies `predicate`.
///
/// Traversal depth is bounded; past the bound the walk reports `false`
/// for the unexplored part.
pub fn contains_type_matching<F>(db: &dyn TypeDatabase, root: TypeId, predicate: F) -> bool
where
    F: Fn(&TypeData) -> bool,
{
    let mut guard = RecursionGuard::with_profile(RecursionProfile::ShallowTraversal);
    contains_inner(db, root, &predicate, &mut guard)
}

fn contains_inner<F>(
    db: &dyn TypeDatabase,
    type_id: TypeId,
    predicate: &F,
    guard: &mut RecursionGuard<TypeId>,
) -> bool
where
    F: Fn(&TypeData) -> bool,
{
    if type_id.is_builtin() {
        return false;
    }
    let Some(data) = db.lookup(type_id) else {
        return false;
    };
    if predicate(&data) {
        return true;
    }
    match guard.enter(type_id) {
        RecursionResult::Entered => {}
        _ => return false,
    }
    let found = type_children(db, type_id)
        .into_iter()
        .any(|child| contains_inner(db, child, predicate, guard));
    guard.leave(type_id);
    found
}

pub fn contains_type_parameters(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    contains_type_matching(db, type_id, |data| matches!(data, TypeData::TypeParameter(_)))
}

pub fn contains_infer_types(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    contains_type_matching(db, type_id, |data| matches!(data, TypeData::Infer(_)))
}

/// Names of all `infer` placeholders in `type_id`, first occurrence first.
pub fn collect_infer_names(db: &dyn TypeDatabase, type_id: TypeId) -> Vec<Atom> {
    let mut names = Vec::new();
    let mut guard = RecursionGuard::with_profile(RecursionProfile::ShallowTraversal);
    collect_infer_inner(db, type_id, &mut names, &mut guard);
    names
}

fn collect_infer_inner(
    db: &dyn TypeDatabase,
    type_id: TypeId,
    names: &mut Vec<Atom>,
    guard: &mut RecursionGuard<TypeId>,
) {
    if type_id.is_builtin() {
        return;
    }
    if let Some(TypeData::Infer(info)) = db.lookup(type_id)
        && !names.contains(&info.name)
    {
        names.push(info.name);
    }
    if !guard.enter(type_id).is_entered() {
        return;
    }
    for child in type_children(db, type_id) {
        collect_infer_inner(db, child, names, guard);
    }
    guard.leave(type_id);
}
