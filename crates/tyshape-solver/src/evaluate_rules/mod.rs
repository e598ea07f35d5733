//! Evaluation rules, one file per meta-type.
//!
//! Each file adds methods to `TypeEvaluator`; dispatch lives in
//! `evaluate.rs`. Free-function entry points are re-exported from the crate
//! root.

pub mod conditional;
pub mod index_access;
pub(crate) mod infer_pattern;
pub mod keyof;
pub mod mapped;
pub mod template_literal;
pub mod utility;

use crate::db::TypeDatabase;
use crate::types::LiteralValue;

/// Text a literal contributes to a property name or template string.
pub(crate) fn literal_text(db: &dyn TypeDatabase, literal: &LiteralValue) -> String {
    match literal {
        LiteralValue::String(atom) => db.resolve_atom(*atom),
        LiteralValue::Number(n) => format!("{}", n.0),
        LiteralValue::Boolean(b) => b.to_string(),
        LiteralValue::BigInt(atom) => db.resolve_atom(*atom),
    }
}
