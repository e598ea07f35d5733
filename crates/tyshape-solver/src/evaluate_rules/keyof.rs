//! keyof operator evaluation.
//!
//! - object: property-name literals in canonical order; a string index
//!   adds `string | number`, a number index adds `number`
//! - union: keys common to every member
//! - intersection: keys of any member
//! - array: `number`; tuple: `number` plus its index literals

use crate::db::TypeDatabase;
use crate::def::TypeResolver;
use crate::errors::SolverResult;
use crate::evaluate::TypeEvaluator;
use crate::types::*;
use crate::visitor::union_members;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Evaluate `keyof operand`.
    pub(crate) fn evaluate_keyof(&mut self, operand: TypeId) -> SolverResult<TypeId> {
        let db = self.interner;
        let operand = self.evaluate(operand)?;
        let all_keys = || db.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::SYMBOL]);

        match operand {
            TypeId::ANY | TypeId::NEVER => return Ok(all_keys()),
            TypeId::UNKNOWN => return Ok(TypeId::NEVER),
            _ => {}
        }

        let Some(data) = db.lookup(operand) else {
            return Ok(TypeId::NEVER);
        };
        match data {
            TypeData::Object(shape_id) => {
                let shape = db.object_shape(shape_id);
                let mut keys: Vec<TypeId> = shape
                    .properties
                    .iter()
                    .map(|p| db.literal_string(&db.resolve_atom(p.name)))
                    .collect();
                if shape.string_index.is_some() {
                    keys.push(TypeId::STRING);
                    keys.push(TypeId::NUMBER);
                } else if shape.number_index.is_some() {
                    keys.push(TypeId::NUMBER);
                }
                Ok(db.union(keys))
            }
            TypeData::Array(_) => Ok(TypeId::NUMBER),
            TypeData::Tuple(list_id) => {
                let elements = db.tuple_list(list_id);
                let mut keys = vec![TypeId::NUMBER];
                keys.extend(
                    elements
                        .iter()
                        .enumerate()
                        .filter(|(_, e)| !e.rest)
                        .map(|(i, _)| db.literal_string(&i.to_string())),
                );
                Ok(db.union(keys))
            }
            TypeData::Union(list_id) => {
                let members = db.type_list(list_id);
                let mut member_keys = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    let keyof = db.keyof(member);
                    member_keys.push(self.evaluate(keyof)?);
                }
                self.common_keys(&member_keys)
            }
            TypeData::Intersection(list_id) => {
                let members = db.type_list(list_id);
                let mut keys = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    let keyof = db.keyof(member);
                    keys.push(self.evaluate(keyof)?);
                }
                Ok(db.union(keys))
            }
            TypeData::Intrinsic(IntrinsicKind::String)
            | TypeData::Literal(LiteralValue::String(_))
            | TypeData::TemplateLiteral(_) => {
                let length = db.literal_string("length");
                Ok(db.union2(TypeId::NUMBER, length))
            }
            TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::Function(_) => {
                Ok(TypeId::NEVER)
            }
            // Type parameters and opaque references defer.
            _ => Ok(db.keyof(operand)),
        }
    }

    /// Keys present in every one of `key_sets`.
    fn common_keys(&mut self, key_sets: &[TypeId]) -> SolverResult<TypeId> {
        let db: &dyn TypeDatabase = self.interner;
        let Some((&first, rest)) = key_sets.split_first() else {
            return Ok(TypeId::NEVER);
        };
        let mut common = Vec::new();
        for key in union_members(db, first) {
            let mut in_all = true;
            for &other in rest {
                if !self.is_assignable(key, other)? {
                    in_all = false;
                    break;
                }
            }
            if in_all {
                common.push(key);
            }
        }
        Ok(db.union(common))
    }
}

/// Evaluate `keyof operand` with default options and no resolver.
pub fn evaluate_keyof(interner: &dyn TypeDatabase, operand: TypeId) -> SolverResult<TypeId> {
    TypeEvaluator::new(interner).evaluate_keyof(operand)
}
