//! Assignability with freshness-aware excess property checking.
//!
//! `CompatChecker` layers the object-literal freshness rule on top of the
//! structural subtype engine: a fresh object literal may not carry
//! properties its target does not declare.

use crate::db::TypeDatabase;
use crate::def::{NoopResolver, TypeResolver};
use crate::diagnostics::SubtypeFailureReason;
use crate::errors::{SolverError, SolverResult};
use crate::options::SolverOptions;
use crate::subtype::SubtypeChecker;
use crate::subtype_rules::objects::is_numeric_name;
use crate::types::{ObjectShape, TypeData, TypeId};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;
use tyshape_common::interner::Atom;

/// Whether a source value is a freshly written object literal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Freshness {
    /// Object literal at the point of assignment; excess properties fail.
    Fresh,
    /// Any other value; excess properties are allowed.
    #[default]
    Regular,
}

pub struct CompatChecker<'a, R: TypeResolver = NoopResolver> {
    interner: &'a dyn TypeDatabase,
    subtype: SubtypeChecker<'a, R>,
    cache: FxHashMap<(TypeId, TypeId, Freshness), bool>,
}

impl<'a> CompatChecker<'a, NoopResolver> {
    /// Create a new compatibility checker without a resolver.
    pub fn new(interner: &'a dyn TypeDatabase) -> CompatChecker<'a, NoopResolver> {
        CompatChecker {
            interner,
            subtype: SubtypeChecker::new(interner),
            cache: FxHashMap::default(),
        }
    }
}

impl<'a, R: TypeResolver> CompatChecker<'a, R> {
    pub fn with_resolver(interner: &'a dyn TypeDatabase, resolver: &'a R) -> Self {
        CompatChecker {
            interner,
            subtype: SubtypeChecker::with_resolver(interner, resolver),
            cache: FxHashMap::default(),
        }
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.subtype = self.subtype.with_options(options);
        self.cache.clear();
        self
    }

    /// Check if `source` is assignable to `target` as a regular value.
    pub fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        self.is_assignable_with_freshness(source, target, Freshness::Regular)
    }

    pub fn is_assignable_with_freshness(
        &mut self,
        source: TypeId,
        target: TypeId,
        freshness: Freshness,
    ) -> bool {
        let key = (source, target, freshness);
        if let Some(&cached) = self.cache.get(&key) {
            return cached;
        }
        let result = self.check(source, target, freshness).is_ok();
        self.cache.insert(key, result);
        result
    }

    /// Explain a failed check as a structured reason.
    pub fn explain_failure(
        &mut self,
        source: TypeId,
        target: TypeId,
    ) -> Option<SubtypeFailureReason> {
        self.subtype.explain_failure(source, target)
    }

    /// Diagnostic assignability check.
    ///
    /// Excess properties of a fresh literal are reported before structural
    /// mismatches. A structural mismatch carries the property path to the
    /// first conflict.
    pub fn check(&mut self, source: TypeId, target: TypeId, freshness: Freshness) -> SolverResult<()> {
        if freshness == Freshness::Fresh
            && let Some(property) = self.find_excess_property(source, target)
        {
            let property = self.interner.resolve_atom(property);
            debug!(%property, ?source, ?target, "excess property");
            return Err(SolverError::ExcessProperty { property });
        }

        if self.subtype.check(source, target)? {
            return Ok(());
        }

        let path = self
            .subtype
            .explain_failure(source, target)
            .map(|reason| reason.property_path(self.interner))
            .unwrap_or_default();
        if let Some(err) = self.subtype.take_error() {
            return Err(err);
        }
        Err(SolverError::StructuralMismatch {
            path,
            source_type: source,
            target_type: target,
        })
    }

    /// First property of a fresh object literal that no target member
    /// declares. Nested object literals are fresh as well.
    fn find_excess_property(&mut self, source: TypeId, target: TypeId) -> Option<Atom> {
        let Some(TypeData::Object(s_shape_id)) = self.interner.lookup(source) else {
            return None;
        };
        let source_shape = self.interner.object_shape(s_shape_id);
        let target_shapes = self.target_object_shapes(target)?;

        for s_prop in &source_shape.properties {
            let declared: Vec<TypeId> = target_shapes
                .iter()
                .filter_map(|shape| declared_property_type(self.interner, shape, s_prop.name))
                .collect();
            if declared.is_empty() {
                return Some(s_prop.name);
            }
            let nested_target = self.interner.union(declared);
            if let Some(nested) = self.find_excess_property(s_prop.type_id, nested_target) {
                return Some(nested);
            }
        }
        None
    }

    /// Object shapes whose declared members bound a fresh literal. `None`
    /// means the target does not restrict excess properties at all.
    fn target_object_shapes(&mut self, target: TypeId) -> Option<Vec<Arc<ObjectShape>>> {
        let target = match self.interner.lookup(target)? {
            TypeData::Reference(_) | TypeData::Mapped(_) | TypeData::IndexAccess(_, _) => {
                self.subtype.evaluate_type(target)?
            }
            _ => target,
        };
        let members = match self.interner.lookup(target)? {
            TypeData::Union(list) | TypeData::Intersection(list) => {
                self.interner.type_list(list).to_vec()
            }
            _ => vec![target],
        };

        let mut shapes = Vec::new();
        for member in members {
            match self.interner.lookup(member) {
                Some(TypeData::Object(shape_id)) => {
                    let shape = self.interner.object_shape(shape_id);
                    // `{}` and indexed shapes accept any property.
                    if shape.properties.is_empty() || shape.string_index.is_some() {
                        return None;
                    }
                    shapes.push(shape);
                }
                Some(TypeData::Intrinsic(_)) if member == TypeId::OBJECT => return None,
                _ => {}
            }
        }
        if shapes.is_empty() { None } else { Some(shapes) }
    }
}

fn declared_property_type(db: &dyn TypeDatabase, shape: &ObjectShape, name: Atom) -> Option<TypeId> {
    if let Some(prop) = shape.find_property(name) {
        return Some(prop.type_id);
    }
    match &shape.number_index {
        Some(index) if is_numeric_name(&db.resolve_atom(name)) => Some(index.value_type),
        _ => None,
    }
}

/// Whether `source` is assignable to `target`, treating the source as a
/// regular (non-fresh) value.
pub fn is_assignable(interner: &dyn TypeDatabase, source: TypeId, target: TypeId) -> bool {
    CompatChecker::new(interner).is_assignable(source, target)
}

/// Diagnostic assignability check.
pub fn check_assignable(
    interner: &dyn TypeDatabase,
    source: TypeId,
    target: TypeId,
    freshness: Freshness,
) -> SolverResult<()> {
    CompatChecker::new(interner).check(source, target, freshness)
}

#[cfg(test)]
#[path = "../tests/compat_tests.rs"]
mod tests;
