//! Intrinsic type subtype checking.
//!
//! - `undefined` is assignable to `void`
//! - `null` and `undefined` are otherwise only assignable to themselves
//! - object-like types are assignable to the non-primitive `object`
//! - template literal types are assignable to `string`

use crate::def::TypeResolver;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{IntrinsicKind, LiteralValue, TypeData};

impl<'a, R: TypeResolver> SubtypeChecker<'a, R> {
    pub(crate) fn check_intrinsic_subtype(
        &mut self,
        source: IntrinsicKind,
        target: IntrinsicKind,
    ) -> SubtypeResult {
        let result = match (source, target) {
            _ if source == target => true,
            (IntrinsicKind::Undefined, IntrinsicKind::Void) => true,
            _ => false,
        };
        SubtypeResult::from_bool(result)
    }

    /// A literal is a subtype of its base primitive only.
    pub(crate) fn check_literal_to_intrinsic(
        &mut self,
        literal: &LiteralValue,
        target: IntrinsicKind,
    ) -> SubtypeResult {
        SubtypeResult::from_bool(literal.base_type() == target.to_type_id())
    }

    /// Structured (non-intrinsic) source against an intrinsic target.
    pub(crate) fn check_to_intrinsic(
        &mut self,
        source_data: &TypeData,
        target: IntrinsicKind,
    ) -> SubtypeResult {
        let result = match target {
            IntrinsicKind::Object => matches!(
                source_data,
                TypeData::Object(_) | TypeData::Array(_) | TypeData::Tuple(_) | TypeData::Function(_)
            ),
            IntrinsicKind::String => matches!(source_data, TypeData::TemplateLiteral(_)),
            _ => false,
        };
        SubtypeResult::from_bool(result)
    }
}
