//! The storage seam every solver component is written against.
//!
//! Checkers, evaluators and the narrowing engine take `&dyn TypeDatabase`, so
//! a host can put its own arena behind them; `TypeInterner` is the one
//! shipped implementation.

use crate::intern::TypeInterner;
use crate::types::{
    ConditionalType, ConditionalTypeId, FunctionShape, FunctionShapeId, MappedType, MappedTypeId,
    ObjectShape, ObjectShapeId, PropertyInfo, TemplateLiteralId, TemplateSpan, TupleElement,
    TupleListId, TypeData, TypeId, TypeListId, TypeParamInfo, TypeReference, TypeReferenceId,
};
use std::sync::Arc;
use tyshape_common::interner::Atom;

pub trait TypeDatabase {
    fn intern(&self, key: TypeData) -> TypeId;
    fn lookup(&self, id: TypeId) -> Option<TypeData>;
    fn intern_string(&self, s: &str) -> Atom;
    fn resolve_atom(&self, atom: Atom) -> String;
    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]>;
    fn tuple_list(&self, id: TupleListId) -> Arc<[TupleElement]>;
    fn template_list(&self, id: TemplateLiteralId) -> Arc<[TemplateSpan]>;
    fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape>;
    fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape>;
    fn type_reference(&self, id: TypeReferenceId) -> Arc<TypeReference>;
    fn conditional_type(&self, id: ConditionalTypeId) -> Arc<ConditionalType>;
    fn mapped_type(&self, id: MappedTypeId) -> Arc<MappedType>;

    fn literal_string(&self, value: &str) -> TypeId;
    fn literal_number(&self, value: f64) -> TypeId;
    fn literal_boolean(&self, value: bool) -> TypeId;
    fn literal_bigint(&self, value: &str) -> TypeId;

    fn union(&self, members: Vec<TypeId>) -> TypeId;
    fn union2(&self, left: TypeId, right: TypeId) -> TypeId;
    fn intersection(&self, members: Vec<TypeId>) -> TypeId;
    fn intersection2(&self, left: TypeId, right: TypeId) -> TypeId;
    fn array(&self, element: TypeId) -> TypeId;
    fn tuple(&self, elements: Vec<TupleElement>) -> TypeId;
    fn object(&self, properties: Vec<PropertyInfo>) -> TypeId;
    fn object_with_index(&self, shape: ObjectShape) -> TypeId;
    fn function(&self, shape: FunctionShape) -> TypeId;
    fn type_param(&self, info: TypeParamInfo) -> TypeId;
    fn infer(&self, info: TypeParamInfo) -> TypeId;
    fn reference(&self, name: Atom, args: Vec<TypeId>) -> TypeId;
    fn conditional(&self, conditional: ConditionalType) -> TypeId;
    fn mapped(&self, mapped: MappedType) -> TypeId;
    fn keyof(&self, operand: TypeId) -> TypeId;
    fn index_access(&self, object: TypeId, index: TypeId) -> TypeId;
    fn template_literal(&self, spans: Vec<TemplateSpan>) -> TypeId;
}

/// Forwards each listed method to the inherent `TypeInterner` method of the
/// same name.
macro_rules! forward_to_interner {
    ($($name:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)*) => {
        impl TypeDatabase for TypeInterner {
            $(
                #[inline]
                fn $name(&self, $($arg: $ty),*) -> $ret {
                    TypeInterner::$name(self, $($arg),*)
                }
            )*
        }
    };
}

forward_to_interner! {
    intern(key: TypeData) -> TypeId;
    lookup(id: TypeId) -> Option<TypeData>;
    intern_string(s: &str) -> Atom;
    resolve_atom(atom: Atom) -> String;
    type_list(id: TypeListId) -> Arc<[TypeId]>;
    tuple_list(id: TupleListId) -> Arc<[TupleElement]>;
    template_list(id: TemplateLiteralId) -> Arc<[TemplateSpan]>;
    object_shape(id: ObjectShapeId) -> Arc<ObjectShape>;
    function_shape(id: FunctionShapeId) -> Arc<FunctionShape>;
    type_reference(id: TypeReferenceId) -> Arc<TypeReference>;
    conditional_type(id: ConditionalTypeId) -> Arc<ConditionalType>;
    mapped_type(id: MappedTypeId) -> Arc<MappedType>;
    literal_string(value: &str) -> TypeId;
    literal_number(value: f64) -> TypeId;
    literal_boolean(value: bool) -> TypeId;
    literal_bigint(value: &str) -> TypeId;
    union(members: Vec<TypeId>) -> TypeId;
    union2(left: TypeId, right: TypeId) -> TypeId;
    intersection(members: Vec<TypeId>) -> TypeId;
    intersection2(left: TypeId, right: TypeId) -> TypeId;
    array(element: TypeId) -> TypeId;
    tuple(elements: Vec<TupleElement>) -> TypeId;
    object(properties: Vec<PropertyInfo>) -> TypeId;
    object_with_index(shape: ObjectShape) -> TypeId;
    function(shape: FunctionShape) -> TypeId;
    type_param(info: TypeParamInfo) -> TypeId;
    infer(info: TypeParamInfo) -> TypeId;
    reference(name: Atom, args: Vec<TypeId>) -> TypeId;
    conditional(conditional: ConditionalType) -> TypeId;
    mapped(mapped: MappedType) -> TypeId;
    keyof(operand: TypeId) -> TypeId;
    index_access(object: TypeId, index: TypeId) -> TypeId;
    template_literal(spans: Vec<TemplateSpan>) -> TypeId;
}
