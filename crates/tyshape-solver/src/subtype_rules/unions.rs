//! Union and intersection type subtype checking.
//!
//! - Union source `(A | B) <: T` iff `A <: T` and `B <: T`
//! - Union target `S <: (A | B)` iff `S <: A` or `S <: B`
//! - Intersection target `S <: (A & B)` iff `S <: A` and `S <: B`
//! - Intersection source `(A & B) <: T` iff `A <: T` or `B <: T`
//!
//! Object intersections are merged into one shape at construction, so the
//! intersection source rule only sees members that could not be merged.

use crate::def::TypeResolver;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{TypeId, TypeListId};

impl<'a, R: TypeResolver> SubtypeChecker<'a, R> {
    pub(crate) fn check_union_source_subtype(
        &mut self,
        members: TypeListId,
        target: TypeId,
    ) -> SubtypeResult {
        let members = self.interner.type_list(members);
        for &member in members.iter() {
            let result = self.check_subtype(member, target);
            if !result.is_true() {
                return result;
            }
        }
        SubtypeResult::True
    }

    pub(crate) fn check_union_target_subtype(
        &mut self,
        source: TypeId,
        members: TypeListId,
    ) -> SubtypeResult {
        let members = self.interner.type_list(members);
        if members.contains(&source) {
            return SubtypeResult::True;
        }
        for &member in members.iter() {
            let result = self.check_subtype(source, member);
            if result.is_true() {
                return result;
            }
            if result == SubtypeResult::DepthExceeded {
                return result;
            }
        }
        SubtypeResult::False
    }

    pub(crate) fn check_intersection_target_subtype(
        &mut self,
        source: TypeId,
        members: TypeListId,
    ) -> SubtypeResult {
        let members = self.interner.type_list(members);
        for &member in members.iter() {
            let result = self.check_subtype(source, member);
            if !result.is_true() {
                return result;
            }
        }
        SubtypeResult::True
    }

    pub(crate) fn check_intersection_source_subtype(
        &mut self,
        members: TypeListId,
        target: TypeId,
    ) -> SubtypeResult {
        let members = self.interner.type_list(members);
        for &member in members.iter() {
            let result = self.check_subtype(member, target);
            if result.is_true() || result == SubtypeResult::DepthExceeded {
                return result;
            }
        }
        SubtypeResult::False
    }
}
