//! Object type subtype checking.
//!
//! This module handles subtyping for object shapes:
//! - Named properties (presence, optionality, type)
//! - String and number index signatures
//! - Visibility of class members
//! - Apparent members of primitives and arrays (`"abc".length`)
//!
//! Readonly is not consulted for assignability. The nominal `origin` tag is
//! never consulted here.

use crate::def::TypeResolver;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;
use tyshape_common::interner::Atom;

impl<'a, R: TypeResolver> SubtypeChecker<'a, R> {
    /// Check object subtyping.
    ///
    /// For each target property the source must have a compatible property,
    /// unless the target property is optional. A missing property may be
    /// covered by a source index signature. Target index signatures must
    /// accept every source property and source index signature.
    pub(crate) fn check_object_subtype(
        &mut self,
        source: &ObjectShape,
        target: &ObjectShape,
    ) -> SubtypeResult {
        for t_prop in &target.properties {
            let result = match source.find_property(t_prop.name) {
                Some(s_prop) => self.check_property_compatibility(s_prop, t_prop),
                None if t_prop.optional => SubtypeResult::True,
                None => match self.source_index_for(source, t_prop.name) {
                    Some(value_type) => self.check_subtype(value_type, t_prop.type_id),
                    None => SubtypeResult::False,
                },
            };
            if !result.is_true() {
                return result;
            }
        }

        if let Some(t_index) = &target.string_index {
            let result = self.check_string_index_target(source, t_index);
            if !result.is_true() {
                return result;
            }
        }
        if let Some(t_index) = &target.number_index {
            let result = self.check_number_index_target(source, t_index);
            if !result.is_true() {
                return result;
            }
        }

        SubtypeResult::True
    }

    /// Check a source property against the target property of the same name.
    pub(crate) fn check_property_compatibility(
        &mut self,
        source: &PropertyInfo,
        target: &PropertyInfo,
    ) -> SubtypeResult {
        if source.optional && !target.optional {
            return SubtypeResult::False;
        }
        if !self.visibility_compatible(source, target) {
            return SubtypeResult::False;
        }
        self.check_subtype(source.type_id, target.type_id)
    }

    /// Non-public members only relate to members with the same visibility
    /// declared by the same class.
    pub(crate) fn visibility_compatible(&self, source: &PropertyInfo, target: &PropertyInfo) -> bool {
        if source.visibility == Visibility::Public && target.visibility == Visibility::Public {
            return true;
        }
        source.visibility == target.visibility && source.parent_id == target.parent_id
    }

    /// Value type of the source index signature that covers `name`.
    fn source_index_for(&self, source: &ObjectShape, name: Atom) -> Option<TypeId> {
        if let Some(number_index) = &source.number_index
            && is_numeric_name(&self.interner.resolve_atom(name))
        {
            return Some(number_index.value_type);
        }
        source.string_index.as_ref().map(|idx| idx.value_type)
    }

    fn check_string_index_target(
        &mut self,
        source: &ObjectShape,
        t_index: &IndexSignature,
    ) -> SubtypeResult {
        for s_prop in &source.properties {
            let result = self.check_subtype(s_prop.type_id, t_index.value_type);
            if !result.is_true() {
                return result;
            }
        }
        for s_index in [&source.string_index, &source.number_index].into_iter().flatten() {
            let result = self.check_subtype(s_index.value_type, t_index.value_type);
            if !result.is_true() {
                return result;
            }
        }
        SubtypeResult::True
    }

    fn check_number_index_target(
        &mut self,
        source: &ObjectShape,
        t_index: &IndexSignature,
    ) -> SubtypeResult {
        for s_prop in &source.properties {
            if !is_numeric_name(&self.interner.resolve_atom(s_prop.name)) {
                continue;
            }
            let result = self.check_subtype(s_prop.type_id, t_index.value_type);
            if !result.is_true() {
                return result;
            }
        }
        let source_index = source.number_index.as_ref().or(source.string_index.as_ref());
        if let Some(s_index) = source_index {
            return self.check_subtype(s_index.value_type, t_index.value_type);
        }
        SubtypeResult::True
    }

    /// Non-object source against an object target, through the source's
    /// apparent members.
    ///
    /// Strings, arrays and tuples expose `length: number`; other primitives
    /// and functions expose no members relevant here, so they satisfy only
    /// targets without required properties. `null`, `undefined`, `void`
    /// and `unknown` have no apparent type.
    pub(crate) fn check_apparent_object_subtype(
        &mut self,
        source: TypeId,
        source_data: &TypeData,
        target: &ObjectShape,
    ) -> SubtypeResult {
        let length = self.interner.intern_string("length");
        let has_length = match source_data {
            TypeData::Intrinsic(kind) => match kind {
                IntrinsicKind::String => true,
                IntrinsicKind::Number
                | IntrinsicKind::Boolean
                | IntrinsicKind::Bigint
                | IntrinsicKind::Symbol
                | IntrinsicKind::Object => false,
                _ => return SubtypeResult::False,
            },
            TypeData::Literal(LiteralValue::String(_)) | TypeData::TemplateLiteral(_) => true,
            TypeData::Literal(_) | TypeData::Function(_) => false,
            TypeData::Array(_) | TypeData::Tuple(_) => true,
            _ => return SubtypeResult::False,
        };

        let mut apparent = Vec::new();
        if has_length {
            apparent.push(PropertyInfo::readonly(length, TypeId::NUMBER));
        }
        let number_index = match source_data {
            TypeData::Array(element) => Some(IndexSignature {
                key_type: TypeId::NUMBER,
                value_type: *element,
                readonly: false,
            }),
            TypeData::Tuple(list_id) => {
                let elements = self.interner.tuple_list(*list_id);
                let members: Vec<TypeId> = elements
                    .iter()
                    .map(|e| self.rest_element_type(e))
                    .collect();
                Some(IndexSignature {
                    key_type: TypeId::NUMBER,
                    value_type: self.interner.union(members),
                    readonly: false,
                })
            }
            _ => None,
        };

        // A string index on the target cannot be satisfied by a primitive.
        if target.string_index.is_some() && number_index.is_none() {
            tracing::trace!(?source, "no apparent string index");
            return SubtypeResult::False;
        }

        let apparent_shape = ObjectShape {
            properties: apparent,
            string_index: None,
            number_index,
            origin: None,
        };
        let target_without_string_index = ObjectShape {
            string_index: None,
            ..target.clone()
        };
        self.check_object_subtype(&apparent_shape, &target_without_string_index)
    }
}

/// Canonical numeric property names (`"0"`, `"1.5"`) address number indexes.
pub(crate) fn is_numeric_name(name: &str) -> bool {
    name.parse::<f64>()
        .is_ok_and(|value| value.is_finite() && format_number(value) == name)
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
