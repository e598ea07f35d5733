//! Array and tuple subtype checking.
//!
//! Arrays and tuples are covariant in their elements. A tuple is assignable
//! to an array when every element is. A plain array is never assignable to
//! a tuple. Tuple arity honors optional and trailing rest elements.

use crate::def::TypeResolver;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{TupleElement, TupleListId, TypeData, TypeId};

impl<'a, R: TypeResolver> SubtypeChecker<'a, R> {
    /// Element type contributed by a tuple element. A rest element
    /// `...T[]` contributes `T`; a rest of tuple type contributes the union
    /// of its elements.
    pub(crate) fn rest_element_type(&self, element: &TupleElement) -> TypeId {
        if !element.rest {
            return element.type_id;
        }
        match self.interner.lookup(element.type_id) {
            Some(TypeData::Array(inner)) => inner,
            Some(TypeData::Tuple(list_id)) => {
                let inner = self.interner.tuple_list(list_id);
                let members: Vec<TypeId> = inner.iter().map(|e| self.rest_element_type(e)).collect();
                self.interner.union(members)
            }
            _ => element.type_id,
        }
    }

    pub(crate) fn check_tuple_to_array_subtype(
        &mut self,
        source: TupleListId,
        target_element: TypeId,
    ) -> SubtypeResult {
        let elements = self.interner.tuple_list(source);
        for element in elements.iter() {
            let element_type = self.rest_element_type(element);
            let result = self.check_subtype(element_type, target_element);
            if !result.is_true() {
                return result;
            }
        }
        SubtypeResult::True
    }

    pub(crate) fn check_tuple_subtype(
        &mut self,
        source: TupleListId,
        target: TupleListId,
    ) -> SubtypeResult {
        let source = self.interner.tuple_list(source);
        let target = self.interner.tuple_list(target);
        let (s_fixed, s_rest) = split_rest(&source);
        let (t_fixed, t_rest) = split_rest(&target);

        for (i, t_elem) in t_fixed.iter().enumerate() {
            let result = match s_fixed.get(i) {
                Some(s_elem) => {
                    if s_elem.optional && !t_elem.optional {
                        return SubtypeResult::False;
                    }
                    self.check_subtype(s_elem.type_id, t_elem.type_id)
                }
                // The source rest may be empty, so it only fills optional slots.
                None => match s_rest {
                    Some(rest) if t_elem.optional => {
                        let rest_type = self.rest_element_type(rest);
                        self.check_subtype(rest_type, t_elem.type_id)
                    }
                    _ if t_elem.optional => SubtypeResult::True,
                    _ => SubtypeResult::False,
                },
            };
            if !result.is_true() {
                return result;
            }
        }

        // Extra fixed source elements need a target rest to land in.
        for s_elem in s_fixed.iter().skip(t_fixed.len()) {
            let Some(t_rest) = t_rest else {
                return SubtypeResult::False;
            };
            let rest_type = self.rest_element_type(t_rest);
            let result = self.check_subtype(s_elem.type_id, rest_type);
            if !result.is_true() {
                return result;
            }
        }

        match (s_rest, t_rest) {
            (None, _) => SubtypeResult::True,
            (Some(_), None) => SubtypeResult::False,
            (Some(s_rest), Some(t_rest)) => {
                let s_type = self.rest_element_type(s_rest);
                let t_type = self.rest_element_type(t_rest);
                self.check_subtype(s_type, t_type)
            }
        }
    }
}

fn split_rest(elements: &[TupleElement]) -> (&[TupleElement], Option<&TupleElement>) {
    match elements.split_last() {
        Some((last, fixed)) if last.rest => (fixed, Some(last)),
        _ => (elements, None),
    }
}
