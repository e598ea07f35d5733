//! Failure explanation for subtype checking.
//!
//! This is the slow path taken only after a check has failed: it walks the
//! same rules as `check_subtype` and returns the first conflict as a
//! structured `SubtypeFailureReason`.

use crate::def::TypeResolver;
use crate::diagnostics::SubtypeFailureReason;
use crate::subtype::SubtypeChecker;
use crate::types::{FunctionShape, ObjectShape, TupleElement, TypeData, TypeId};

impl<'a, R: TypeResolver> SubtypeChecker<'a, R> {
    /// Explain why `source` is not assignable to `target`.
    ///
    /// Returns `None` when the types are in fact compatible.
    pub fn explain_failure(
        &mut self,
        source: TypeId,
        target: TypeId,
    ) -> Option<SubtypeFailureReason> {
        if self.check_subtype(source, target).is_true() {
            return None;
        }
        let source = self.evaluate_for_explain(source);
        let target = self.evaluate_for_explain(target);
        Some(self.explain_failure_inner(source, target))
    }

    fn evaluate_for_explain(&mut self, type_id: TypeId) -> TypeId {
        match self.interner.lookup(type_id) {
            Some(
                TypeData::Reference(_)
                | TypeData::Conditional(_)
                | TypeData::Mapped(_)
                | TypeData::KeyOf(_)
                | TypeData::IndexAccess(_, _),
            ) => self.evaluate_type(type_id).unwrap_or(type_id),
            _ => type_id,
        }
    }

    fn explain_failure_inner(&mut self, source: TypeId, target: TypeId) -> SubtypeFailureReason {
        let db = self.interner;
        let mismatch = SubtypeFailureReason::TypeMismatch {
            source_type: source,
            target_type: target,
        };
        let (Some(source_data), Some(target_data)) = (db.lookup(source), db.lookup(target)) else {
            return mismatch;
        };

        if let TypeData::Union(members) = source_data {
            // Blame the first member that does not fit.
            for &member in db.type_list(members).iter() {
                if let Some(reason) = self.explain_failure(member, target) {
                    return reason;
                }
            }
            return mismatch;
        }
        if let TypeData::Union(members) = target_data {
            return SubtypeFailureReason::NoUnionMemberMatches {
                source_type: source,
                target_union_members: db.type_list(members).to_vec(),
            };
        }

        match (&source_data, &target_data) {
            (TypeData::Object(s), TypeData::Object(t)) => {
                let s_shape = db.object_shape(*s);
                let t_shape = db.object_shape(*t);
                self.explain_object_failure(source, target, &s_shape, &t_shape)
                    .unwrap_or(mismatch)
            }
            (TypeData::Array(s_elem), TypeData::Array(t_elem)) => {
                SubtypeFailureReason::ArrayElementMismatch {
                    source_element: *s_elem,
                    target_element: *t_elem,
                    nested_reason: self.explain_failure(*s_elem, *t_elem).map(Box::new),
                }
            }
            (TypeData::Tuple(s_list), TypeData::Tuple(t_list)) => {
                let s_elems = db.tuple_list(*s_list);
                let t_elems = db.tuple_list(*t_list);
                self.explain_tuple_failure(&s_elems, &t_elems).unwrap_or(mismatch)
            }
            (TypeData::Tuple(s_list), TypeData::Array(t_elem)) => {
                let s_elems = db.tuple_list(*s_list);
                for (index, element) in s_elems.iter().enumerate() {
                    let element_type = self.rest_element_type(element);
                    if let Some(reason) = self.explain_failure(element_type, *t_elem) {
                        return SubtypeFailureReason::TupleElementTypeMismatch {
                            index,
                            source_element: element_type,
                            target_element: *t_elem,
                            nested_reason: Some(Box::new(reason)),
                        };
                    }
                }
                mismatch
            }
            (TypeData::Function(s), TypeData::Function(t)) => {
                let s_shape = db.function_shape(*s);
                let t_shape = db.function_shape(*t);
                self.explain_function_failure(&s_shape, &t_shape).unwrap_or(mismatch)
            }
            _ => mismatch,
        }
    }

    fn explain_object_failure(
        &mut self,
        source: TypeId,
        target: TypeId,
        s_shape: &ObjectShape,
        t_shape: &ObjectShape,
    ) -> Option<SubtypeFailureReason> {
        for t_prop in &t_shape.properties {
            let Some(s_prop) = s_shape.find_property(t_prop.name) else {
                if t_prop.optional || s_shape.has_index_signature() {
                    continue;
                }
                return Some(SubtypeFailureReason::MissingProperty {
                    property_name: t_prop.name,
                    source_type: source,
                    target_type: target,
                });
            };
            if s_prop.optional && !t_prop.optional {
                return Some(SubtypeFailureReason::OptionalPropertyRequired {
                    property_name: t_prop.name,
                });
            }
            if !self.visibility_compatible(s_prop, t_prop) {
                return Some(SubtypeFailureReason::PropertyVisibilityMismatch {
                    property_name: t_prop.name,
                    source_visibility: s_prop.visibility,
                    target_visibility: t_prop.visibility,
                });
            }
            if let Some(nested) = self.explain_failure(s_prop.type_id, t_prop.type_id) {
                return Some(SubtypeFailureReason::PropertyTypeMismatch {
                    property_name: t_prop.name,
                    source_property_type: s_prop.type_id,
                    target_property_type: t_prop.type_id,
                    nested_reason: Some(Box::new(nested)),
                });
            }
        }

        // Source members that a target index signature rejects.
        if let Some(t_index) = &t_shape.string_index {
            for s_prop in &s_shape.properties {
                if let Some(nested) = self.explain_failure(s_prop.type_id, t_index.value_type) {
                    return Some(SubtypeFailureReason::PropertyTypeMismatch {
                        property_name: s_prop.name,
                        source_property_type: s_prop.type_id,
                        target_property_type: t_index.value_type,
                        nested_reason: Some(Box::new(nested)),
                    });
                }
            }
            if let Some(s_index) = &s_shape.string_index
                && !self.check_subtype(s_index.value_type, t_index.value_type).is_true()
            {
                return Some(SubtypeFailureReason::IndexSignatureMismatch {
                    source_value_type: s_index.value_type,
                    target_value_type: t_index.value_type,
                });
            }
        }
        if let Some(t_index) = &t_shape.number_index
            && let Some(s_index) = s_shape.number_index.as_ref().or(s_shape.string_index.as_ref())
            && !self.check_subtype(s_index.value_type, t_index.value_type).is_true()
        {
            return Some(SubtypeFailureReason::IndexSignatureMismatch {
                source_value_type: s_index.value_type,
                target_value_type: t_index.value_type,
            });
        }
        None
    }

    fn explain_tuple_failure(
        &mut self,
        source: &[TupleElement],
        target: &[TupleElement],
    ) -> Option<SubtypeFailureReason> {
        let s_required = source.iter().filter(|e| !e.optional && !e.rest).count();
        let t_required = target.iter().filter(|e| !e.optional && !e.rest).count();
        let t_has_rest = target.last().is_some_and(|e| e.rest);
        if s_required < t_required || (!t_has_rest && source.len() > target.len()) {
            return Some(SubtypeFailureReason::TupleElementMismatch {
                source_count: source.len(),
                target_count: target.len(),
            });
        }
        for (index, (s_elem, t_elem)) in source.iter().zip(target).enumerate() {
            let s_type = self.rest_element_type(s_elem);
            let t_type = self.rest_element_type(t_elem);
            if let Some(nested) = self.explain_failure(s_type, t_type) {
                return Some(SubtypeFailureReason::TupleElementTypeMismatch {
                    index,
                    source_element: s_type,
                    target_element: t_type,
                    nested_reason: Some(Box::new(nested)),
                });
            }
        }
        None
    }

    fn explain_function_failure(
        &mut self,
        source: &FunctionShape,
        target: &FunctionShape,
    ) -> Option<SubtypeFailureReason> {
        let target_fixed = target.params.iter().filter(|p| !p.rest).count();
        if target.rest_param().is_none() && source.required_param_count() > target_fixed {
            return Some(SubtypeFailureReason::TooManyParameters {
                source_count: source.required_param_count(),
                target_count: target_fixed,
            });
        }
        let positions = source.params.len().max(target.params.len());
        for param_index in 0..positions {
            let (Some(source_param), Some(target_param)) = (
                self.param_type_at(source, param_index),
                self.param_type_at(target, param_index),
            ) else {
                continue;
            };
            if !self.check_subtype(target_param, source_param).is_true() {
                return Some(SubtypeFailureReason::ParameterTypeMismatch {
                    param_index,
                    source_param,
                    target_param,
                });
            }
        }
        if target.return_type != TypeId::VOID
            && let Some(nested) = self.explain_failure(source.return_type, target.return_type)
        {
            return Some(SubtypeFailureReason::ReturnTypeMismatch {
                source_return: source.return_type,
                target_return: target.return_type,
                nested_reason: Some(Box::new(nested)),
            });
        }
        None
    }
}
