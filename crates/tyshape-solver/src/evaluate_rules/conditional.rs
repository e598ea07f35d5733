//! Conditional type evaluation.
//!
//! `T extends U ? X : Y` picks `X` when the check type is assignable to the
//! extends type and `Y` otherwise. When the check type is a naked type
//! parameter bound to a union, the conditional distributes:
//!
//! ```text
//! Exclude<string | number | boolean, number>
//!   = (string extends number ? never : string)
//!   | (number extends number ? never : number)
//!   | (boolean extends number ? never : boolean)
//!   = string | boolean
//! ```
//!
//! `infer` placeholders in the extends type are bound by
//! `infer_pattern.rs` and substituted into the true branch.

use crate::db::TypeDatabase;
use crate::def::TypeResolver;
use crate::errors::{SolverError, SolverResult};
use crate::evaluate::TypeEvaluator;
use crate::instantiate::TypeSubstitution;
use crate::types::{ConditionalType, TypeData, TypeId};
use crate::visitor::{collect_infer_names, contains_type_matching, contains_type_parameters};
use tracing::{Level, span, trace};
use tyshape_common::interner::Atom;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Evaluate a conditional type whose type parameters are bound by `env`.
    ///
    /// A naked check parameter bound to a union distributes over its
    /// members; bound to `never` it yields `never`. An unbound check
    /// parameter defers: the conditional is returned with `env` applied.
    pub fn evaluate_conditional_with_env(
        &mut self,
        cond: &ConditionalType,
        env: &TypeSubstitution,
    ) -> SolverResult<TypeId> {
        let db = self.interner;
        if let Some(TypeData::TypeParameter(info)) = db.lookup(cond.check_type) {
            let Some(binding) = env.get(info.name) else {
                return self.defer_conditional(cond, env);
            };
            let binding = self.evaluate(binding)?;
            if binding == TypeId::NEVER {
                return Ok(TypeId::NEVER);
            }
            if let Some(TypeData::Union(list_id)) = db.lookup(binding) {
                let members = db.type_list(list_id);
                let _span = span!(Level::TRACE, "distribute_conditional", members = members.len())
                    .entered();
                let mut results = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    let mut member_env = env.clone();
                    member_env.insert(info.name, member);
                    results.push(self.evaluate_conditional_once(cond, &member_env)?);
                }
                return Ok(db.union(results));
            }
        }
        self.evaluate_conditional_once(cond, env)
    }

    fn evaluate_conditional_once(
        &mut self,
        cond: &ConditionalType,
        env: &TypeSubstitution,
    ) -> SolverResult<TypeId> {
        let db = self.interner;
        let check = self.instantiate(cond.check_type, env)?;
        let check = self.evaluate(check)?;
        let extends = self.instantiate(cond.extends_type, env)?;

        if contains_type_parameters(db, check) || contains_type_parameters(db, extends) {
            trace!(?check, ?extends, "conditional deferred");
            return self.defer_conditional(cond, env);
        }

        let infer_names = collect_infer_names(db, extends);

        // `any` takes both branches.
        if check == TypeId::ANY {
            let mut bindings = TypeSubstitution::new();
            for &name in &infer_names {
                bindings.insert(name, TypeId::ANY);
            }
            let true_branch = self.conditional_branch(cond.true_type, env, &bindings, &infer_names)?;
            let false_branch = self.conditional_branch(cond.false_type, env, &TypeSubstitution::new(), &[])?;
            return Ok(db.union2(true_branch, false_branch));
        }

        if infer_names.is_empty() {
            let extends = self.evaluate(extends)?;
            let matched = self.is_assignable(check, extends)?;
            trace!(?check, ?extends, matched, "conditional");
            let branch = if matched { cond.true_type } else { cond.false_type };
            return self.conditional_branch(branch, env, &TypeSubstitution::new(), &[]);
        }

        match self.match_infer_pattern(check, extends)? {
            Some(bindings) => {
                trace!(?check, ?extends, bound = bindings.len(), "conditional matched with infer");
                self.conditional_branch(cond.true_type, env, &bindings, &infer_names)
            }
            None => self.conditional_branch(cond.false_type, env, &TypeSubstitution::new(), &[]),
        }
    }

    /// Instantiate a chosen branch with the environment plus `infer`
    /// bindings and evaluate it. An `infer` name that was not bound is
    /// reported rather than leaked.
    fn conditional_branch(
        &mut self,
        branch: TypeId,
        env: &TypeSubstitution,
        bindings: &TypeSubstitution,
        infer_names: &[Atom],
    ) -> SolverResult<TypeId> {
        let mut substitution = bindings.clone();
        substitution.extend_missing(env);
        let instantiated = self.instantiate(branch, &substitution)?;

        for &name in infer_names {
            if bindings.contains(name) {
                continue;
            }
            if mentions_name(self.interner, instantiated, name) {
                return Err(SolverError::UnresolvedInference {
                    name: self.interner.resolve_atom(name),
                });
            }
        }
        self.evaluate(instantiated)
    }

    fn defer_conditional(
        &mut self,
        cond: &ConditionalType,
        env: &TypeSubstitution,
    ) -> SolverResult<TypeId> {
        if env.is_empty() {
            return Ok(self.interner.conditional(cond.clone()));
        }
        let check_type = self.instantiate(cond.check_type, env)?;
        let extends_type = self.instantiate(cond.extends_type, env)?;
        let true_type = self.instantiate(cond.true_type, env)?;
        let false_type = self.instantiate(cond.false_type, env)?;
        Ok(self.interner.conditional(ConditionalType {
            check_type,
            extends_type,
            true_type,
            false_type,
        }))
    }
}

fn mentions_name(db: &dyn TypeDatabase, type_id: TypeId, name: Atom) -> bool {
    contains_type_matching(db, type_id, |data| match data {
        TypeData::TypeParameter(info) | TypeData::Infer(info) => info.name == name,
        _ => false,
    })
}

/// Evaluate `check extends extends ? true_branch : false_branch` with the
/// type parameters in `env` bound.
pub fn evaluate_conditional(
    interner: &dyn TypeDatabase,
    check: TypeId,
    extends: TypeId,
    true_branch: TypeId,
    false_branch: TypeId,
    env: &TypeSubstitution,
) -> SolverResult<TypeId> {
    let cond = ConditionalType {
        check_type: check,
        extends_type: extends,
        true_type: true_branch,
        false_type: false_branch,
    };
    TypeEvaluator::new(interner).evaluate_conditional_with_env(&cond, env)
}

#[cfg(test)]
#[path = "../../tests/conditional_tests.rs"]
mod tests;
