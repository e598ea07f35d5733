//! Inference variables for one generic call.
//!
//! Each type parameter gets an `ena` key. Argument types land on it as lower
//! bounds, callback parameter types as upper bounds, and resolution picks the
//! union of the lower bounds (widened per `LiteralWidening`) or, failing that,
//! the intersection of the upper bounds.

use crate::db::TypeDatabase;
use crate::errors::SolverError;
use crate::options::LiteralWidening;
use crate::types::TypeId;
use crate::widening::apply_widening;
use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use thiserror::Error;
use tracing::trace;
use tyshape_common::interner::Atom;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InferenceVar(pub u32);

/// The value slot of a variable; `None` until it is fixed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InferenceValue(pub Option<TypeId>);

impl UnifyKey for InferenceVar {
    type Value = InferenceValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        InferenceVar(u)
    }

    fn tag() -> &'static str {
        "InferenceVar"
    }
}

impl UnifyValue for InferenceValue {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        match (a.0, b.0) {
            (None, None) => Ok(InferenceValue(None)),
            (Some(t), None) | (None, Some(t)) => Ok(InferenceValue(Some(t))),
            // Conflicts are reported by `unify_var_type` before unifying.
            (Some(a), Some(_)) => Ok(InferenceValue(Some(a))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("conflicting inference candidates {0} and {1}")]
    Conflict(TypeId, TypeId),

    #[error("type parameter `{name}` was not inferred")]
    Unresolved { name: String },

    #[error("inferred {lower} for `{name}` does not satisfy {upper}")]
    BoundsViolation {
        name: String,
        lower: TypeId,
        upper: TypeId,
    },
}

impl From<InferenceError> for SolverError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Conflict(existing, candidate) => SolverError::StructuralMismatch {
                path: Vec::new(),
                source_type: candidate,
                target_type: existing,
            },
            InferenceError::Unresolved { name } => SolverError::UnresolvedInference { name },
            InferenceError::BoundsViolation { name, lower, upper } => {
                SolverError::ConstraintViolation {
                    param: name,
                    constraint: upper,
                    offending: lower,
                }
            }
        }
    }
}

/// Bounds collected for one variable, deduplicated in arrival order.
#[derive(Clone, Debug, Default)]
pub struct ConstraintSet {
    pub lower_bounds: Vec<TypeId>,
    pub upper_bounds: Vec<TypeId>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        ConstraintSet::default()
    }

    pub fn add_lower_bound(&mut self, ty: TypeId) {
        if !self.lower_bounds.contains(&ty) {
            self.lower_bounds.push(ty);
        }
    }

    pub fn add_upper_bound(&mut self, ty: TypeId) {
        if !self.upper_bounds.contains(&ty) {
            self.upper_bounds.push(ty);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lower_bounds.is_empty() && self.upper_bounds.is_empty()
    }

    pub fn merge_from(&mut self, other: ConstraintSet) {
        for ty in other.lower_bounds {
            self.add_lower_bound(ty);
        }
        for ty in other.upper_bounds {
            self.add_upper_bound(ty);
        }
    }
}

pub struct InferenceContext<'a> {
    interner: &'a dyn TypeDatabase,
    table: InPlaceUnificationTable<InferenceVar>,
    type_params: Vec<(Atom, InferenceVar)>,
    constraints: Vec<ConstraintSet>,
    widening: LiteralWidening,
}

impl<'a> InferenceContext<'a> {
    pub fn new(interner: &'a dyn TypeDatabase) -> Self {
        InferenceContext {
            interner,
            table: InPlaceUnificationTable::new(),
            type_params: Vec::new(),
            constraints: Vec::new(),
            widening: LiteralWidening::Preserve,
        }
    }

    pub fn with_widening(mut self, widening: LiteralWidening) -> Self {
        self.widening = widening;
        self
    }

    pub fn fresh_var(&mut self) -> InferenceVar {
        let var = self.table.new_key(InferenceValue(None));
        debug_assert_eq!(var.0 as usize, self.constraints.len());
        self.constraints.push(ConstraintSet::new());
        var
    }

    pub fn fresh_type_param(&mut self, name: Atom) -> InferenceVar {
        let var = self.fresh_var();
        self.type_params.push((name, var));
        var
    }

    pub fn find_type_param(&self, name: Atom) -> Option<InferenceVar> {
        self.type_params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    pub fn probe(&mut self, var: InferenceVar) -> Option<TypeId> {
        self.table.probe_value(var).0
    }

    /// Pin `var` to `ty`; pinning it to something else later is a conflict.
    pub fn unify_var_type(&mut self, var: InferenceVar, ty: TypeId) -> Result<(), InferenceError> {
        let root = self.table.find(var);
        match self.table.probe_value(root).0 {
            None => {
                self.table.union_value(root, InferenceValue(Some(ty)));
                Ok(())
            }
            Some(existing) if existing == ty => Ok(()),
            Some(existing) => Err(InferenceError::Conflict(existing, ty)),
        }
    }

    /// Union the two variables and pool their bounds under the new root.
    pub fn unify_vars(&mut self, a: InferenceVar, b: InferenceVar) -> Result<(), InferenceError> {
        let root_a = self.table.find(a);
        let root_b = self.table.find(b);
        if root_a == root_b {
            return Ok(());
        }
        if let (Some(a_ty), Some(b_ty)) = (
            self.table.probe_value(root_a).0,
            self.table.probe_value(root_b).0,
        ) && a_ty != b_ty
        {
            return Err(InferenceError::Conflict(a_ty, b_ty));
        }

        self.table.union(root_a, root_b);
        let new_root = self.table.find(root_a);
        let mut merged = ConstraintSet::new();
        merged.merge_from(std::mem::take(&mut self.constraints[root_a.0 as usize]));
        merged.merge_from(std::mem::take(&mut self.constraints[root_b.0 as usize]));
        self.constraints[new_root.0 as usize] = merged;
        Ok(())
    }

    /// `ty <: var`
    pub fn add_lower_bound(&mut self, var: InferenceVar, ty: TypeId) {
        let root = self.table.find(var);
        trace!(var = root.0, ?ty, "lower bound");
        self.constraints[root.0 as usize].add_lower_bound(ty);
    }

    /// `var <: ty`
    pub fn add_upper_bound(&mut self, var: InferenceVar, ty: TypeId) {
        let root = self.table.find(var);
        trace!(var = root.0, ?ty, "upper bound");
        self.constraints[root.0 as usize].add_upper_bound(ty);
    }

    pub fn get_constraints(&mut self, var: InferenceVar) -> Option<&ConstraintSet> {
        let root = self.table.find(var);
        let constraints = &self.constraints[root.0 as usize];
        if constraints.is_empty() {
            None
        } else {
            Some(constraints)
        }
    }

    /// Whether any candidate (fixed value or bound) was collected.
    pub fn has_candidates(&mut self, var: InferenceVar) -> bool {
        self.probe(var).is_some() || self.get_constraints(var).is_some()
    }

    /// A pinned value wins outright. Otherwise the candidate is built from the
    /// bounds and must satisfy every upper bound under `is_subtype`; the
    /// variable is pinned to it on success.
    pub fn resolve_with_constraints_by<F>(
        &mut self,
        var: InferenceVar,
        mut is_subtype: F,
    ) -> Result<TypeId, InferenceError>
    where
        F: FnMut(TypeId, TypeId) -> bool,
    {
        if let Some(ty) = self.probe(var) {
            return Ok(ty);
        }
        let root = self.table.find(var);
        let constraints = self.constraints[root.0 as usize].clone();

        let result = if !constraints.lower_bounds.is_empty() {
            let common = self.best_common_type(&constraints.lower_bounds);
            apply_widening(self.interner, common, self.widening)
        } else if !constraints.upper_bounds.is_empty() {
            self.interner.intersection(constraints.upper_bounds.clone())
        } else {
            return Err(InferenceError::Unresolved {
                name: self.name_of(var),
            });
        };

        for &upper in &constraints.upper_bounds {
            if !is_subtype(result, upper) {
                return Err(InferenceError::BoundsViolation {
                    name: self.name_of(var),
                    lower: result,
                    upper,
                });
            }
        }

        self.table.union_value(root, InferenceValue(Some(result)));
        Ok(result)
    }

    fn name_of(&mut self, var: InferenceVar) -> String {
        let root = self.table.find(var);
        let params = self.type_params.clone();
        params
            .iter()
            .find(|(_, v)| self.table.find(*v) == root)
            .map(|(name, _)| self.interner.resolve_atom(*name))
            .unwrap_or_else(|| format!("?{}", var.0))
    }

    /// Union of the candidates with `never` dropped.
    pub fn best_common_type(&self, types: &[TypeId]) -> TypeId {
        match types {
            [] => TypeId::UNKNOWN,
            [single] => *single,
            _ => {
                let members: Vec<TypeId> = types
                    .iter()
                    .copied()
                    .filter(|&ty| ty != TypeId::NEVER)
                    .collect();
                if members.is_empty() {
                    TypeId::NEVER
                } else {
                    self.interner.union(members)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod tests;
