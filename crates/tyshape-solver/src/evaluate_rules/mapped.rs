//! Mapped type expansion.
//!
//! `{ [K in C]: Template }` evaluates `C` to a union of keys and produces
//! one property per key. Keys are visited in the key union's member order,
//! which is `TypeId` order; the resulting object shape sorts its properties
//! anyway, so the output does not depend on it. A mapped type over
//! `keyof S` (or whose template is `S[K]`) is homomorphic: `Preserve`
//! modifiers copy the optional/readonly flags of the matching property of
//! `S`, and arrays and tuples map element-wise.

use crate::db::TypeDatabase;
use crate::def::TypeResolver;
use crate::errors::SolverResult;
use crate::evaluate::TypeEvaluator;
use crate::evaluate_rules::literal_text;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::types::*;
use crate::visitor::{contains_type_parameters, union_members};
use tracing::trace;

/// Strip `undefined` from a property type whose optionality is being
/// removed, so `Required<Partial<T>>` restores `T`.
fn remove_undefined(db: &dyn TypeDatabase, type_id: TypeId) -> TypeId {
    match db.lookup(type_id) {
        Some(TypeData::Union(list_id)) => {
            let members = db
                .type_list(list_id)
                .iter()
                .copied()
                .filter(|&m| m != TypeId::UNDEFINED)
                .collect();
            db.union(members)
        }
        _ => type_id,
    }
}

fn apply_modifier(modifier: MappedModifier, source_flag: bool) -> bool {
    match modifier {
        MappedModifier::Preserve => source_flag,
        MappedModifier::Add => true,
        MappedModifier::Remove => false,
    }
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// The homomorphic source `S` of a mapped type, if any.
    fn homomorphic_source(&self, mapped: &MappedType) -> Option<TypeId> {
        let db = self.interner;
        if let Some(TypeData::KeyOf(source)) = db.lookup(mapped.constraint) {
            return Some(source);
        }
        if let Some(TypeData::IndexAccess(object, index)) = db.lookup(mapped.template)
            && let Some(TypeData::TypeParameter(info)) = db.lookup(index)
            && info.name == mapped.type_param.name
        {
            return Some(object);
        }
        None
    }

    pub(crate) fn evaluate_mapped(
        &mut self,
        type_id: TypeId,
        mapped: &MappedType,
    ) -> SolverResult<TypeId> {
        let db = self.interner;
        let keys = self.evaluate(mapped.constraint)?;
        if contains_type_parameters(db, keys) || matches!(db.lookup(keys), Some(TypeData::KeyOf(_))) {
            trace!(?type_id, "mapped type deferred");
            return Ok(type_id);
        }

        let source = match self.homomorphic_source(mapped) {
            Some(source) => Some(self.evaluate(source)?),
            None => None,
        };
        let source_data = source.and_then(|s| db.lookup(s));

        match source_data {
            Some(TypeData::Array(_)) if matches!(db.lookup(mapped.constraint), Some(TypeData::KeyOf(_))) => {
                let element = self.mapped_value(mapped, TypeId::NUMBER)?;
                return Ok(db.array(element));
            }
            Some(TypeData::Tuple(list_id)) if matches!(db.lookup(mapped.constraint), Some(TypeData::KeyOf(_))) => {
                let elements = db.tuple_list(list_id);
                let mut mapped_elements = Vec::with_capacity(elements.len());
                for (i, element) in elements.iter().enumerate() {
                    let key = db.literal_string(&i.to_string());
                    let mut value = self.mapped_value(mapped, key)?;
                    let optional = apply_modifier(mapped.optional_modifier, element.optional);
                    if element.optional && !optional {
                        value = remove_undefined(db, value);
                    }
                    mapped_elements.push(TupleElement {
                        type_id: value,
                        optional: optional && !element.rest,
                        ..element.clone()
                    });
                }
                return Ok(db.tuple(mapped_elements));
            }
            _ => {}
        }

        let source_shape = match source_data {
            Some(TypeData::Object(shape_id)) => Some(db.object_shape(shape_id)),
            _ => None,
        };

        let mut shape = ObjectShape::default();
        for key in union_members(db, keys) {
            match db.lookup(key) {
                Some(TypeData::Literal(literal @ (LiteralValue::String(_) | LiteralValue::Number(_)))) => {
                    let name = db.intern_string(&literal_text(db, &literal));
                    let source_prop = source_shape.as_ref().and_then(|s| s.find_property(name));
                    let (source_optional, source_readonly) = source_prop
                        .map(|p| (p.optional, p.readonly))
                        .unwrap_or((false, false));

                    let mut value = self.mapped_value(mapped, key)?;
                    let optional = apply_modifier(mapped.optional_modifier, source_optional);
                    if source_optional {
                        value = remove_undefined(db, value);
                    }
                    shape.properties.push(PropertyInfo {
                        name,
                        type_id: value,
                        optional,
                        readonly: apply_modifier(mapped.readonly_modifier, source_readonly),
                        visibility: Visibility::Public,
                        parent_id: None,
                    });
                }
                Some(TypeData::Intrinsic(IntrinsicKind::String)) => {
                    let value = self.mapped_value(mapped, key)?;
                    shape.string_index = Some(IndexSignature {
                        key_type: TypeId::STRING,
                        value_type: value,
                        readonly: apply_modifier(mapped.readonly_modifier, false),
                    });
                }
                Some(TypeData::Intrinsic(IntrinsicKind::Number)) => {
                    let value = self.mapped_value(mapped, key)?;
                    shape.number_index = Some(IndexSignature {
                        key_type: TypeId::NUMBER,
                        value_type: value,
                        readonly: apply_modifier(mapped.readonly_modifier, false),
                    });
                }
                // `never`, symbols and non-literal keys add nothing.
                _ => {}
            }
        }

        trace!(?type_id, properties = shape.properties.len(), "mapped type expanded");
        Ok(db.object_with_index(shape))
    }

    /// The template evaluated with the key parameter bound to `key`.
    fn mapped_value(&mut self, mapped: &MappedType, key: TypeId) -> SolverResult<TypeId> {
        let mut substitution = TypeSubstitution::new();
        substitution.insert(mapped.type_param.name, key);
        let value = self.instantiate(mapped.template, &substitution)?;
        self.evaluate(value)
    }
}

/// Expand a mapped type with the type parameters in `env` bound.
pub fn expand_mapped(
    interner: &dyn TypeDatabase,
    mapped: &MappedType,
    env: &TypeSubstitution,
) -> SolverResult<TypeId> {
    let mapped_id = interner.mapped(mapped.clone());
    let instantiated = instantiate_type(interner, mapped_id, env)?;
    TypeEvaluator::new(interner).evaluate(instantiated)
}

#[cfg(test)]
#[path = "../../tests/mapped_tests.rs"]
mod tests;
