//! Type evaluation for meta-types.
//!
//! Meta-types are type-level functions that compute output types from
//! input types:
//! - References to generic aliases: `Partial<User>`
//! - Conditional types: `T extends U ? X : Y`, distributive over naked
//!   type parameters
//! - Mapped types: `{ [K in keyof T]?: T[K] }`
//! - `keyof T` and indexed access `T[K]`
//! - Template literal types: `` `${A}-${B}` ``
//!
//! Evaluation is shallow: only the outermost meta-type is reduced, so the
//! properties of a resulting object shape stay lazy. Types whose inputs are
//! still unbound type parameters are returned unchanged (deferred).
//!
//! The per-kind rules live in `evaluate_rules/*`.

use crate::db::TypeDatabase;
use crate::def::{DefinitionInfo, NoopResolver, TypeResolver};
use crate::errors::{SolverError, SolverResult};
use crate::instantiate::{TypeSubstitution, instantiate_type_with_depth};
use crate::options::SolverOptions;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::subtype::SubtypeChecker;
use crate::types::{TypeData, TypeId};
use rustc_hash::FxHashMap;
use tracing::trace;
use tyshape_common::interner::Atom;
use tyshape_common::limits::MAX_GUARD_ITERATIONS;

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Type evaluator for meta-types.
///
/// Each evaluator owns its memo cache; create one per top-level query.
pub struct TypeEvaluator<'a, R: TypeResolver = NoopResolver> {
    pub(crate) interner: &'a dyn TypeDatabase,
    pub(crate) resolver: &'a R,
    pub(crate) options: SolverOptions,
    guard: RecursionGuard<TypeId>,
    base_depth: u32,
    cache: FxHashMap<TypeId, TypeId>,
}

impl<'a> TypeEvaluator<'a, NoopResolver> {
    /// Create a new evaluator without a resolver.
    pub fn new(interner: &'a dyn TypeDatabase) -> TypeEvaluator<'a, NoopResolver> {
        static NOOP: NoopResolver = NoopResolver;
        TypeEvaluator::with_resolver(interner, &NOOP)
    }
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    pub fn with_resolver(interner: &'a dyn TypeDatabase, resolver: &'a R) -> Self {
        let options = SolverOptions::default();
        TypeEvaluator {
            interner,
            resolver,
            options,
            guard: RecursionGuard::new(options.max_evaluation_depth, MAX_GUARD_ITERATIONS),
            base_depth: 0,
            cache: FxHashMap::default(),
        }
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self.rebuild_guard();
        self
    }

    /// Builder: evaluation depth already consumed by an enclosing
    /// evaluator, so nested checker/evaluator pairs share one budget.
    pub(crate) fn with_base_depth(mut self, base_depth: u32) -> Self {
        self.base_depth = base_depth;
        self.rebuild_guard();
        self
    }

    fn rebuild_guard(&mut self) {
        self.guard = RecursionGuard::new(self.options.max_evaluation_depth, MAX_GUARD_ITERATIONS)
            .with_base_depth(self.base_depth);
    }

    /// A subtype checker that shares this evaluator's resolver, options and
    /// depth budget.
    pub(crate) fn subtype_checker(&self) -> SubtypeChecker<'a, R> {
        SubtypeChecker::with_resolver(self.interner, self.resolver)
            .with_options(self.options)
            .with_base_depth(self.guard.depth())
    }

    /// Assignability under this evaluator's resolver; hard failures
    /// propagate.
    pub(crate) fn is_assignable(&self, source: TypeId, target: TypeId) -> SolverResult<bool> {
        self.subtype_checker().check(source, target)
    }

    pub(crate) fn instantiate(
        &self,
        type_id: TypeId,
        substitution: &TypeSubstitution,
    ) -> SolverResult<TypeId> {
        instantiate_type_with_depth(
            self.interner,
            type_id,
            substitution,
            self.options.max_instantiation_depth,
        )
    }

    fn limit_error(&self) -> SolverError {
        SolverError::recursion_limit(RecursionProfile::TypeEvaluation, self.guard.max_depth())
    }

    /// Whether `type_id` is reduced by [`evaluate`](Self::evaluate).
    fn is_reducible(&self, data: &TypeData) -> bool {
        match data {
            TypeData::Reference(_)
            | TypeData::Conditional(_)
            | TypeData::Mapped(_)
            | TypeData::KeyOf(_)
            | TypeData::IndexAccess(_, _)
            | TypeData::TemplateLiteral(_) => true,
            TypeData::Union(list_id) | TypeData::Intersection(list_id) => {
                self.interner.type_list(*list_id).iter().any(|&member| {
                    self.interner
                        .lookup(member)
                        .is_some_and(|d| self.is_reducible(&d))
                })
            }
            _ => false,
        }
    }

    /// Evaluate a type to its most reduced form.
    ///
    /// Structural types are returned unchanged. A reference that cycles
    /// back to itself, or evaluation deeper than the configured limit, is
    /// `RecursionLimitExceeded`.
    pub fn evaluate(&mut self, type_id: TypeId) -> SolverResult<TypeId> {
        if type_id.is_builtin() {
            return Ok(type_id);
        }
        if let Some(&cached) = self.cache.get(&type_id) {
            return Ok(cached);
        }
        let Some(data) = self.interner.lookup(type_id) else {
            return Ok(type_id);
        };
        if !self.is_reducible(&data) {
            return Ok(type_id);
        }

        match self.guard.enter(type_id) {
            RecursionResult::Entered => {}
            other => {
                trace!(?type_id, ?other, "evaluation refused");
                return Err(self.limit_error());
            }
        }
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            self.evaluate_inner(type_id, &data)
        });
        self.guard.leave(type_id);

        let result = result?;
        trace!(?type_id, ?result, "evaluate");
        self.cache.insert(type_id, result);
        Ok(result)
    }

    fn evaluate_inner(&mut self, type_id: TypeId, data: &TypeData) -> SolverResult<TypeId> {
        let db = self.interner;
        match data {
            TypeData::Reference(ref_id) => {
                let reference = db.type_reference(*ref_id);
                self.evaluate_reference(type_id, reference.name, &reference.args)
            }
            TypeData::Conditional(cond_id) => {
                let cond = db.conditional_type(*cond_id);
                self.evaluate_conditional_with_env(&cond, &TypeSubstitution::new())
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = db.mapped_type(*mapped_id);
                self.evaluate_mapped(type_id, &mapped)
            }
            TypeData::KeyOf(operand) => self.evaluate_keyof(*operand),
            TypeData::IndexAccess(object, index) => self.evaluate_index_access(*object, *index),
            TypeData::TemplateLiteral(list_id) => {
                let spans = db.template_list(*list_id);
                self.evaluate_template_literal(&spans)
            }
            TypeData::Union(list_id) => {
                let members = self.evaluate_list(&db.type_list(*list_id))?;
                Ok(db.union(members))
            }
            TypeData::Intersection(list_id) => {
                let members = self.evaluate_list(&db.type_list(*list_id))?;
                Ok(db.intersection(members))
            }
            _ => Ok(type_id),
        }
    }

    fn evaluate_list(&mut self, members: &[TypeId]) -> SolverResult<Vec<TypeId>> {
        members.iter().map(|&member| self.evaluate(member)).collect()
    }

    /// Expand `Name<Args>` through the resolver. Unknown names stay opaque.
    fn evaluate_reference(
        &mut self,
        type_id: TypeId,
        name: Atom,
        args: &[TypeId],
    ) -> SolverResult<TypeId> {
        let Some(definition) = self.resolver.resolve_definition(name) else {
            return Ok(type_id);
        };
        let DefinitionInfo {
            type_params, body, ..
        } = definition;
        if type_params.is_empty() {
            return self.evaluate(body);
        }

        let substitution = TypeSubstitution::from_args(&type_params, args);

        // A conditional alias over a naked parameter distributes over the
        // argument bound to it, so it is evaluated with the bindings as an
        // environment rather than substituted first.
        if let Some(TypeData::Conditional(cond_id)) = self.interner.lookup(body) {
            let cond = self.interner.conditional_type(cond_id);
            if let Some(TypeData::TypeParameter(info)) = self.interner.lookup(cond.check_type)
                && substitution.contains(info.name)
            {
                return self.evaluate_conditional_with_env(&cond, &substitution);
            }
        }

        let instantiated = self.instantiate(body, &substitution)?;
        self.evaluate(instantiated)
    }
}

/// Evaluate a type with default options and no resolver.
pub fn evaluate_type(interner: &dyn TypeDatabase, type_id: TypeId) -> SolverResult<TypeId> {
    TypeEvaluator::new(interner).evaluate(type_id)
}

#[cfg(test)]
#[path = "../tests/evaluate_tests.rs"]
mod tests;
