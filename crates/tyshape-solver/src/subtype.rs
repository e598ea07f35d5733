//! Structural subtype checking.
//!
//! `SubtypeChecker` decides whether a source type is assignable to a target
//! type. It is the engine behind `is_assignable`, conditional type matching,
//! constraint checks and narrowing.
//!
//! Recursive types are handled coinductively: a `(source, target)` pair that
//! is re-entered while it is already being checked is assumed to hold. Depth
//! and iteration are bounded by a `RecursionGuard`; exceeding them is always
//! reported as `RecursionLimitExceeded`, never silently treated as success.
//!
//! The per-kind rules live in `subtype_rules/*`.

use crate::db::TypeDatabase;
use crate::def::{NoopResolver, TypeResolver};
use crate::errors::{SolverError, SolverResult};
use crate::evaluate::TypeEvaluator;
use crate::options::SolverOptions;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{TypeData, TypeId};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use tyshape_common::limits::MAX_GUARD_ITERATIONS;

/// Stack red zone and growth increment for deep structural recursion.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Outcome of a single subtype query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubtypeResult {
    True,
    False,
    /// Re-entered a pair already under check; assumed to hold.
    CycleDetected,
    /// The depth or iteration budget ran out.
    DepthExceeded,
}

impl SubtypeResult {
    #[inline]
    pub fn is_true(self) -> bool {
        matches!(self, SubtypeResult::True | SubtypeResult::CycleDetected)
    }

    #[inline]
    pub fn is_false(self) -> bool {
        !self.is_true()
    }

    #[inline]
    pub(crate) fn from_bool(value: bool) -> Self {
        if value {
            SubtypeResult::True
        } else {
            SubtypeResult::False
        }
    }
}

pub struct SubtypeChecker<'a, R: TypeResolver = NoopResolver> {
    pub(crate) interner: &'a dyn TypeDatabase,
    pub(crate) resolver: &'a R,
    pub(crate) options: SolverOptions,
    guard: RecursionGuard<(TypeId, TypeId)>,
    cache: FxHashMap<(TypeId, TypeId), bool>,
    /// Number of coinductive assumptions taken so far. A `true` result that
    /// relied on an assumption is not memoized.
    cycle_hits: u32,
    /// Evaluation depth inherited from an enclosing evaluator.
    base_depth: u32,
    error: Option<SolverError>,
}

impl<'a> SubtypeChecker<'a, NoopResolver> {
    /// Create a checker without a resolver. References stay opaque.
    pub fn new(interner: &'a dyn TypeDatabase) -> SubtypeChecker<'a, NoopResolver> {
        static NOOP: NoopResolver = NoopResolver;
        SubtypeChecker::with_resolver(interner, &NOOP)
    }
}

impl<'a, R: TypeResolver> SubtypeChecker<'a, R> {
    pub fn with_resolver(interner: &'a dyn TypeDatabase, resolver: &'a R) -> Self {
        let options = SolverOptions::default();
        SubtypeChecker {
            interner,
            resolver,
            options,
            guard: RecursionGuard::new(options.max_subtype_depth, MAX_GUARD_ITERATIONS),
            cache: FxHashMap::default(),
            cycle_hits: 0,
            base_depth: 0,
            error: None,
        }
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self.guard = RecursionGuard::new(options.max_subtype_depth, MAX_GUARD_ITERATIONS);
        self
    }

    /// Builder: evaluation depth inherited from an enclosing evaluator.
    pub(crate) fn with_base_depth(mut self, base_depth: u32) -> Self {
        self.base_depth = base_depth;
        self
    }

    /// The first hard failure (recursion limit or evaluation error) hit by
    /// any query on this checker.
    pub fn error(&self) -> Option<&SolverError> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<SolverError> {
        self.error.take()
    }

    pub(crate) fn record_error(&mut self, err: SolverError) {
        if self.error.is_none() {
            debug!(%err, "subtype check aborted");
            self.error = Some(err);
        }
    }

    /// Boolean assignability. Hard failures read as `false`; use
    /// [`check`](Self::check) to observe them.
    pub fn is_subtype_of(&mut self, source: TypeId, target: TypeId) -> bool {
        self.check_subtype(source, target).is_true()
    }

    /// Assignability that reports hard failures as errors.
    pub fn check(&mut self, source: TypeId, target: TypeId) -> SolverResult<bool> {
        let result = self.check_subtype(source, target);
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(result.is_true()),
        }
    }

    /// Check whether `source` is a subtype of `target`.
    pub fn check_subtype(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        if source == target {
            return SubtypeResult::True;
        }
        if target == TypeId::ANY || target == TypeId::UNKNOWN {
            return SubtypeResult::True;
        }
        if source == TypeId::NEVER {
            return SubtypeResult::True;
        }
        if target == TypeId::NEVER {
            return SubtypeResult::False;
        }
        if source == TypeId::ANY {
            return SubtypeResult::True;
        }
        if self.error.is_some() {
            return SubtypeResult::DepthExceeded;
        }

        let key = (source, target);
        if let Some(&cached) = self.cache.get(&key) {
            return SubtypeResult::from_bool(cached);
        }

        match self.guard.enter(key) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                trace!(?source, ?target, "coinductive assumption");
                self.cycle_hits += 1;
                return SubtypeResult::CycleDetected;
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                let limit = self.guard.max_depth();
                self.record_error(SolverError::recursion_limit(
                    RecursionProfile::SubtypeCheck,
                    limit,
                ));
                return SubtypeResult::DepthExceeded;
            }
        }

        let hits_before = self.cycle_hits;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            self.check_subtype_inner(source, target)
        });
        self.guard.leave(key);

        match result {
            SubtypeResult::False => {
                self.cache.insert(key, false);
            }
            SubtypeResult::True if self.cycle_hits == hits_before => {
                self.cache.insert(key, true);
            }
            _ => {}
        }
        trace!(?source, ?target, ?result, "check_subtype");
        result
    }

    /// Evaluate a meta-type (reference, conditional, mapped, keyof, indexed
    /// access, template literal) to its structural form.
    pub(crate) fn evaluate_type(&mut self, type_id: TypeId) -> Option<TypeId> {
        let mut evaluator = TypeEvaluator::with_resolver(self.interner, self.resolver)
            .with_options(self.options)
            .with_base_depth(self.base_depth);
        match evaluator.evaluate(type_id) {
            Ok(evaluated) => Some(evaluated),
            Err(err) => {
                self.record_error(err);
                None
            }
        }
    }

    fn needs_evaluation(data: &TypeData) -> bool {
        matches!(
            data,
            TypeData::Reference(_)
                | TypeData::Conditional(_)
                | TypeData::Mapped(_)
                | TypeData::KeyOf(_)
                | TypeData::IndexAccess(_, _)
                | TypeData::TemplateLiteral(_)
        )
    }

    fn check_subtype_inner(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        let db = self.interner;
        let (Some(source_data), Some(target_data)) = (db.lookup(source), db.lookup(target)) else {
            return SubtypeResult::False;
        };

        // Meta-types are compared through their evaluated form.
        if Self::needs_evaluation(&source_data) || Self::needs_evaluation(&target_data) {
            let evaluated_source = if Self::needs_evaluation(&source_data) {
                match self.evaluate_type(source) {
                    Some(ty) => ty,
                    None => return SubtypeResult::DepthExceeded,
                }
            } else {
                source
            };
            let evaluated_target = if Self::needs_evaluation(&target_data) {
                match self.evaluate_type(target) {
                    Some(ty) => ty,
                    None => return SubtypeResult::DepthExceeded,
                }
            } else {
                target
            };
            if evaluated_source != source || evaluated_target != target {
                return self.check_subtype(evaluated_source, evaluated_target);
            }
            // Irreducible: opaque references and non-literal templates.
            return self.check_irreducible(source, &source_data, target, &target_data);
        }

        // Union source: every member must be assignable.
        if let TypeData::Union(members) = source_data {
            return self.check_union_source_subtype(members, target);
        }
        // Union target: at least one member must accept the source.
        if let TypeData::Union(members) = target_data {
            return self.check_union_target_subtype(source, members);
        }
        // Intersection target: every member must accept the source.
        if let TypeData::Intersection(members) = target_data {
            return self.check_intersection_target_subtype(source, members);
        }
        // Intersection source: some member must be assignable.
        if let TypeData::Intersection(members) = source_data {
            return self.check_intersection_source_subtype(members, target);
        }

        match (&source_data, &target_data) {
            (TypeData::TypeParameter(s), TypeData::TypeParameter(t)) if s.name == t.name => {
                SubtypeResult::True
            }
            (TypeData::TypeParameter(info), _) | (TypeData::Infer(info), _) => {
                let constraint = info.constraint.unwrap_or(TypeId::UNKNOWN);
                self.check_subtype(constraint, target)
            }
            // A bare `infer` outside of pattern matching accepts what its
            // constraint accepts.
            (_, TypeData::Infer(info)) => match info.constraint {
                Some(constraint) => self.check_subtype(source, constraint),
                None => SubtypeResult::True,
            },
            (_, TypeData::TypeParameter(_)) => SubtypeResult::False,

            (TypeData::Intrinsic(s), TypeData::Intrinsic(t)) => {
                self.check_intrinsic_subtype(*s, *t)
            }
            (TypeData::Literal(lit), TypeData::Intrinsic(t)) => {
                self.check_literal_to_intrinsic(lit, *t)
            }
            (TypeData::Literal(_), TypeData::Literal(_)) => SubtypeResult::False,
            (_, TypeData::Intrinsic(t)) => self.check_to_intrinsic(&source_data, *t),

            (TypeData::Object(s), TypeData::Object(t)) => {
                let s_shape = db.object_shape(*s);
                let t_shape = db.object_shape(*t);
                self.check_object_subtype(&s_shape, &t_shape)
            }
            (_, TypeData::Object(t)) => {
                let t_shape = db.object_shape(*t);
                self.check_apparent_object_subtype(source, &source_data, &t_shape)
            }

            (TypeData::Array(s_elem), TypeData::Array(t_elem)) => {
                self.check_subtype(*s_elem, *t_elem)
            }
            (TypeData::Tuple(s_list), TypeData::Array(t_elem)) => {
                self.check_tuple_to_array_subtype(*s_list, *t_elem)
            }
            (TypeData::Tuple(s_list), TypeData::Tuple(t_list)) => {
                self.check_tuple_subtype(*s_list, *t_list)
            }
            // A plain array has no fixed length.
            (TypeData::Array(_), TypeData::Tuple(_)) => SubtypeResult::False,

            (TypeData::Function(s), TypeData::Function(t)) => {
                let s_shape = db.function_shape(*s);
                let t_shape = db.function_shape(*t);
                self.check_function_subtype(&s_shape, &t_shape)
            }

            _ => SubtypeResult::False,
        }
    }

    /// Both sides are in their most evaluated form but at least one is still
    /// a meta-type.
    fn check_irreducible(
        &mut self,
        source: TypeId,
        source_data: &TypeData,
        target: TypeId,
        target_data: &TypeData,
    ) -> SubtypeResult {
        match (source_data, target_data) {
            (TypeData::TemplateLiteral(s), TypeData::TemplateLiteral(t)) => {
                self.check_template_to_template(*s, *t)
            }
            (TypeData::TemplateLiteral(_), TypeData::Intrinsic(kind)) => {
                self.check_to_intrinsic(source_data, *kind)
            }
            (TypeData::TemplateLiteral(_), TypeData::Object(t)) => {
                let t_shape = self.interner.object_shape(*t);
                self.check_apparent_object_subtype(source, source_data, &t_shape)
            }
            (TypeData::Literal(lit), TypeData::TemplateLiteral(t)) => {
                self.check_literal_to_template(lit, *t)
            }
            (TypeData::Reference(s), TypeData::Reference(t)) => {
                // Unresolvable references relate only by name and argument-wise
                // identity.
                let s_ref = self.interner.type_reference(*s);
                let t_ref = self.interner.type_reference(*t);
                SubtypeResult::from_bool(s_ref.name == t_ref.name && s_ref.args == t_ref.args)
            }
            (_, TypeData::Union(members)) => self.check_union_target_subtype(source, *members),
            (TypeData::Union(members), _) => self.check_union_source_subtype(*members, target),
            _ => SubtypeResult::False,
        }
    }
}

/// Whether `source` is assignable to `target` with default options and no
/// resolver.
pub fn is_subtype_of(interner: &dyn TypeDatabase, source: TypeId, target: TypeId) -> bool {
    SubtypeChecker::new(interner).is_subtype_of(source, target)
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
