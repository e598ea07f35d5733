//! Literal widening.
//!
//! `"a"` widens to `string`, `1` to `number`, `true` to `boolean`. Unions are
//! widened member-wise and re-normalized, so `"a" | "b" | 1` becomes
//! `string | number`.

use crate::db::TypeDatabase;
use crate::options::LiteralWidening;
use crate::types::{TypeData, TypeId};

pub fn widen_literal(db: &dyn TypeDatabase, type_id: TypeId) -> TypeId {
    match db.lookup(type_id) {
        Some(TypeData::Literal(value)) => value.base_type(),
        Some(TypeData::TemplateLiteral(_)) => TypeId::STRING,
        Some(TypeData::Union(list_id)) => {
            let members = db.type_list(list_id);
            let widened: Vec<TypeId> = members.iter().map(|&m| widen_literal(db, m)).collect();
            db.union(widened)
        }
        _ => type_id,
    }
}

/// Apply a widening policy to an inferred binding.
pub fn apply_widening(db: &dyn TypeDatabase, type_id: TypeId, policy: LiteralWidening) -> TypeId {
    match policy {
        LiteralWidening::Preserve => type_id,
        LiteralWidening::Widen => widen_literal(db, type_id),
    }
}
