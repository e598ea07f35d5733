//! Indexed access type evaluation: `T[K]`.
//!
//! Distributes over a union index and a union object. Property lookup
//! falls back to index signatures; an optional property contributes
//! `undefined`. A key that no member can satisfy is `PropertyNotFound`.

use crate::db::TypeDatabase;
use crate::def::TypeResolver;
use crate::errors::{SolverError, SolverResult};
use crate::evaluate::TypeEvaluator;
use crate::evaluate_rules::literal_text;
use crate::format::format_type;
use crate::subtype_rules::objects::is_numeric_name;
use crate::types::*;
use crate::visitor::contains_type_parameters;
use tracing::trace;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    pub(crate) fn evaluate_index_access(
        &mut self,
        object: TypeId,
        index: TypeId,
    ) -> SolverResult<TypeId> {
        let db = self.interner;
        let object = self.evaluate(object)?;
        let index = self.evaluate(index)?;

        if contains_type_parameters(db, object) || contains_type_parameters(db, index) {
            return Ok(db.index_access(object, index));
        }
        if object == TypeId::ANY || index == TypeId::ANY {
            return Ok(TypeId::ANY);
        }
        if index == TypeId::NEVER {
            return Ok(TypeId::NEVER);
        }

        if let Some(TypeData::Union(list_id)) = db.lookup(index) {
            let keys = db.type_list(list_id);
            let mut results = Vec::with_capacity(keys.len());
            for &key in keys.iter() {
                results.push(self.evaluate_index_access(object, key)?);
            }
            return Ok(db.union(results));
        }
        if let Some(TypeData::Union(list_id)) = db.lookup(object) {
            let members = db.type_list(list_id);
            let mut results = Vec::with_capacity(members.len());
            for &member in members.iter() {
                results.push(self.evaluate_index_access(member, index)?);
            }
            return Ok(db.union(results));
        }

        match self.lookup_index(object, index)? {
            Some(result) => Ok(result),
            None => {
                let property = match db.lookup(index) {
                    Some(TypeData::Literal(literal)) => literal_text(db, &literal),
                    _ => format_type(db, index),
                };
                trace!(?object, %property, "indexed access failed");
                Err(SolverError::PropertyNotFound { property, object })
            }
        }
    }

    fn lookup_index(&mut self, object: TypeId, index: TypeId) -> SolverResult<Option<TypeId>> {
        let db = self.interner;
        let Some(object_data) = db.lookup(object) else {
            return Ok(None);
        };
        let index_data = db.lookup(index);
        let key_name = match &index_data {
            Some(TypeData::Literal(
                literal @ (LiteralValue::String(_) | LiteralValue::Number(_)),
            )) => Some(literal_text(db, literal)),
            _ => None,
        };
        let index_is_number = index == TypeId::NUMBER
            || matches!(index_data, Some(TypeData::Literal(LiteralValue::Number(_))))
            || key_name.as_deref().is_some_and(is_numeric_name);

        let result = match object_data {
            TypeData::Object(shape_id) => {
                let shape = db.object_shape(shape_id);
                lookup_object(db, &shape, key_name.as_deref(), index, index_is_number)
            }
            TypeData::Array(element) => {
                if index_is_number {
                    Some(element)
                } else if key_name.as_deref() == Some("length") {
                    Some(TypeId::NUMBER)
                } else {
                    None
                }
            }
            TypeData::Tuple(list_id) => {
                let elements = db.tuple_list(list_id);
                lookup_tuple(db, &elements, key_name.as_deref(), index)
            }
            TypeData::Intrinsic(IntrinsicKind::String)
            | TypeData::Literal(LiteralValue::String(_))
            | TypeData::TemplateLiteral(_) => {
                if index_is_number {
                    Some(TypeId::STRING)
                } else if key_name.as_deref() == Some("length") {
                    Some(TypeId::NUMBER)
                } else {
                    None
                }
            }
            TypeData::Intersection(list_id) => {
                let members = db.type_list(list_id);
                let mut found = Vec::new();
                for &member in members.iter() {
                    if let Some(result) = self.lookup_index(member, index)? {
                        found.push(result);
                    }
                }
                if found.is_empty() {
                    None
                } else {
                    Some(db.intersection(found))
                }
            }
            _ => None,
        };
        Ok(result)
    }
}

fn lookup_object(
    db: &dyn TypeDatabase,
    shape: &ObjectShape,
    key_name: Option<&str>,
    index: TypeId,
    index_is_number: bool,
) -> Option<TypeId> {
    if let Some(name) = key_name {
        let atom = db.intern_string(name);
        if let Some(prop) = shape.find_property(atom) {
            return Some(if prop.optional {
                db.union2(prop.type_id, TypeId::UNDEFINED)
            } else {
                prop.type_id
            });
        }
    }
    if index_is_number && let Some(number_index) = &shape.number_index {
        return Some(number_index.value_type);
    }
    let string_keyed = key_name.is_some() || index == TypeId::STRING || index_is_number;
    match &shape.string_index {
        Some(string_index) if string_keyed => Some(string_index.value_type),
        _ => None,
    }
}

fn lookup_tuple(
    db: &dyn TypeDatabase,
    elements: &[TupleElement],
    key_name: Option<&str>,
    index: TypeId,
) -> Option<TypeId> {
    let element_type = |element: &TupleElement| -> TypeId {
        if !element.rest {
            return element.type_id;
        }
        match db.lookup(element.type_id) {
            Some(TypeData::Array(inner)) => inner,
            _ => element.type_id,
        }
    };

    if index == TypeId::NUMBER {
        let members = elements.iter().map(element_type).collect();
        return Some(db.union(members));
    }
    let name = key_name?;
    if name == "length" {
        return Some(TypeId::NUMBER);
    }
    let position: usize = name.parse().ok()?;
    match elements.get(position) {
        Some(element) if element.rest => Some(element_type(element)),
        Some(element) if element.optional => Some(db.union2(element.type_id, TypeId::UNDEFINED)),
        Some(element) => Some(element.type_id),
        None => elements
            .last()
            .filter(|last| last.rest)
            .map(element_type),
    }
}

/// Evaluate `object[index]` with default options and no resolver.
pub fn evaluate_index_access(
    interner: &dyn TypeDatabase,
    object: TypeId,
    index: TypeId,
) -> SolverResult<TypeId> {
    TypeEvaluator::new(interner).evaluate_index_access(object, index)
}
