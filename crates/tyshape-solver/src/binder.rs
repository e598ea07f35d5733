//! Generic signature instantiation.
//!
//! Binds each type parameter of a generic signature, in declaration order:
//!
//! 1. an explicit type argument, if one was supplied;
//! 2. otherwise a type inferred from the call-site argument types;
//! 3. otherwise the parameter's default;
//! 4. otherwise `UnresolvedInference`.
//!
//! Inference walks each parameter type against its argument type and
//! records candidates in an `InferenceContext`: argument types flowing into
//! a parameter are lower bounds, types seen through a function parameter
//! are upper bounds. Lower bounds combine by best common type (their union)
//! and are widened per `SolverOptions::literal_widening`.
//!
//! Every binding is then checked against its constraint, instantiated with
//! the bindings made so far and evaluated, so `K extends keyof T` sees the
//! `T` bound before it.

use crate::db::TypeDatabase;
use crate::def::{DefinitionInfo, NoopResolver, TypeResolver};
use crate::errors::{SolverError, SolverResult};
use crate::evaluate::TypeEvaluator;
use crate::evaluate_rules::infer_pattern::Variance;
use crate::infer::{InferenceContext, InferenceVar};
use crate::instantiate::{TypeSubstitution, instantiate_type_with_depth};
use crate::options::SolverOptions;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::subtype::SubtypeChecker;
use crate::types::*;
use crate::visitor::union_members;
use tracing::{debug, trace};
use tyshape_common::interner::Atom;

/// A generic declaration: its type parameters, the value parameters used
/// for inference, and the template the bindings are substituted into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericSignature {
    pub type_params: Vec<TypeParamInfo>,
    pub params: Vec<ParamInfo>,
    pub template: TypeId,
}

impl GenericSignature {
    pub fn new(type_params: Vec<TypeParamInfo>, params: Vec<ParamInfo>, template: TypeId) -> Self {
        GenericSignature {
            type_params,
            params,
            template,
        }
    }

    /// The signature of a generic function type. The template is the same
    /// function without its type parameter list.
    pub fn from_function(db: &dyn TypeDatabase, function: TypeId) -> Option<Self> {
        let Some(TypeData::Function(shape_id)) = db.lookup(function) else {
            return None;
        };
        let shape = db.function_shape(shape_id);
        let template = db.function(FunctionShape::new(shape.params.clone(), shape.return_type));
        Some(GenericSignature {
            type_params: shape.type_params.clone(),
            params: shape.params.clone(),
            template,
        })
    }

    /// The signature of a generic alias or interface. It has no value
    /// parameters, so every binding is explicit or defaulted.
    pub fn from_definition(definition: &DefinitionInfo) -> Self {
        GenericSignature {
            type_params: definition.type_params.clone(),
            params: Vec::new(),
            template: definition.body,
        }
    }
}

/// The outcome of binding a generic signature.
#[derive(Clone, Debug)]
pub struct Instantiation {
    /// Parameter name to bound type, in declaration order.
    pub substitution: TypeSubstitution,
    /// The template with every binding substituted.
    pub result: TypeId,
}

pub struct GenericBinder<'a, R: TypeResolver = NoopResolver> {
    interner: &'a dyn TypeDatabase,
    resolver: &'a R,
    options: SolverOptions,
}

impl<'a> GenericBinder<'a, NoopResolver> {
    pub fn new(interner: &'a dyn TypeDatabase) -> GenericBinder<'a, NoopResolver> {
        static NOOP: NoopResolver = NoopResolver;
        GenericBinder::with_resolver(interner, &NOOP)
    }
}

impl<'a, R: TypeResolver> GenericBinder<'a, R> {
    pub fn with_resolver(interner: &'a dyn TypeDatabase, resolver: &'a R) -> Self {
        GenericBinder {
            interner,
            resolver,
            options: SolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    fn evaluator(&self) -> TypeEvaluator<'a, R> {
        TypeEvaluator::with_resolver(self.interner, self.resolver).with_options(self.options)
    }

    /// Bind `signature` from `explicit` type arguments and the types of the
    /// call-site arguments, then instantiate its template.
    pub fn instantiate(
        &self,
        signature: &GenericSignature,
        explicit: &[TypeId],
        call_args: &[TypeId],
    ) -> SolverResult<Instantiation> {
        let db = self.interner;
        if explicit.len() > signature.type_params.len() {
            debug!(
                expected = signature.type_params.len(),
                supplied = explicit.len(),
                "extra explicit type arguments ignored"
            );
        }

        let mut evaluator = self.evaluator();
        let mut context = InferenceContext::new(db).with_widening(self.options.literal_widening);
        let vars: Vec<InferenceVar> = signature
            .type_params
            .iter()
            .map(|param| context.fresh_type_param(param.name))
            .collect();

        // Only parameters without an explicit argument are inferred.
        let inferred: Vec<Atom> = signature
            .type_params
            .iter()
            .skip(explicit.len())
            .map(|param| param.name)
            .collect();
        if !inferred.is_empty() && !call_args.is_empty() {
            let mut collector = CandidateCollector {
                evaluator: &mut evaluator,
                context: &mut context,
                names: &inferred,
                guard: RecursionGuard::with_profile(RecursionProfile::ShallowTraversal),
            };
            collector.collect_from_params(&signature.params, call_args)?;
        }

        let mut checker = SubtypeChecker::with_resolver(db, self.resolver).with_options(self.options);
        let mut substitution = TypeSubstitution::new();
        for (index, param) in signature.type_params.iter().enumerate() {
            let var = vars[index];
            let binding = if let Some(&argument) = explicit.get(index) {
                argument
            } else if context.has_candidates(var) {
                context.resolve_with_constraints_by(var, |s, t| checker.is_subtype_of(s, t))?
            } else if let Some(default) = param.default {
                self.instantiate_with(default, &substitution)?
            } else {
                let name = db.resolve_atom(param.name);
                debug!(%name, "type parameter has no candidates and no default");
                return Err(SolverError::UnresolvedInference { name });
            };

            if let Some(err) = checker.take_error() {
                return Err(err);
            }
            self.check_constraint(&mut evaluator, param, binding, &substitution)?;
            trace!(name = param.name.0, ?binding, "bound type parameter");
            substitution.insert(param.name, binding);
        }

        let result = self.instantiate_with(signature.template, &substitution)?;
        Ok(Instantiation {
            substitution,
            result,
        })
    }

    fn instantiate_with(&self, type_id: TypeId, substitution: &TypeSubstitution) -> SolverResult<TypeId> {
        instantiate_type_with_depth(
            self.interner,
            type_id,
            substitution,
            self.options.max_instantiation_depth,
        )
    }

    fn check_constraint(
        &self,
        evaluator: &mut TypeEvaluator<'a, R>,
        param: &TypeParamInfo,
        binding: TypeId,
        bound_so_far: &TypeSubstitution,
    ) -> SolverResult<()> {
        let Some(constraint) = param.constraint else {
            return Ok(());
        };
        // The parameter itself is visible in its own constraint
        // (`T extends Comparable<T>`).
        let mut substitution = bound_so_far.clone();
        substitution.insert(param.name, binding);
        let constraint = self.instantiate_with(constraint, &substitution)?;
        let constraint = evaluator.evaluate(constraint)?;
        if evaluator.is_assignable(binding, constraint)? {
            return Ok(());
        }
        let param = self.interner.resolve_atom(param.name);
        debug!(%param, ?binding, ?constraint, "constraint violation");
        Err(SolverError::ConstraintViolation {
            param,
            constraint,
            offending: binding,
        })
    }
}

/// Walks parameter types against argument types and records bounds for the
/// type parameters being inferred.
struct CandidateCollector<'c, 'a, R: TypeResolver> {
    evaluator: &'c mut TypeEvaluator<'a, R>,
    context: &'c mut InferenceContext<'a>,
    names: &'c [Atom],
    guard: RecursionGuard<(TypeId, TypeId)>,
}

impl<'c, 'a, R: TypeResolver> CandidateCollector<'c, 'a, R> {
    fn target_var(&self, target: TypeId) -> Option<InferenceVar> {
        match self.evaluator.interner.lookup(target) {
            Some(TypeData::TypeParameter(info)) if self.names.contains(&info.name) => {
                self.context.find_type_param(info.name)
            }
            _ => None,
        }
    }

    fn collect_from_params(&mut self, params: &[ParamInfo], args: &[TypeId]) -> SolverResult<()> {
        for (index, param) in params.iter().enumerate() {
            if param.rest {
                let rest_args = args.get(index..).unwrap_or_default();
                self.collect_rest(param.type_id, rest_args)?;
                break;
            }
            let Some(&arg) = args.get(index) else {
                break;
            };
            // `undefined` passed to an optional parameter says nothing
            // about its type.
            if param.optional && arg == TypeId::UNDEFINED {
                continue;
            }
            self.collect(arg, param.type_id, Variance::Covariant)?;
        }
        trace!(args = args.len(), "collected call-site candidates");
        Ok(())
    }

    /// `...rest: T[]`, `...rest: [A, B]` or `...rest: T`.
    fn collect_rest(&mut self, rest_type: TypeId, args: &[TypeId]) -> SolverResult<()> {
        let db = self.evaluator.interner;
        match db.lookup(rest_type) {
            Some(TypeData::Array(element)) => {
                for &arg in args {
                    self.collect(arg, element, Variance::Covariant)?;
                }
            }
            Some(TypeData::Tuple(list_id)) => {
                let elements = db.tuple_list(list_id);
                for (element, &arg) in elements.iter().zip(args) {
                    let target = if element.rest {
                        match db.lookup(element.type_id) {
                            Some(TypeData::Array(inner)) => inner,
                            _ => element.type_id,
                        }
                    } else {
                        element.type_id
                    };
                    self.collect(arg, target, Variance::Covariant)?;
                }
            }
            _ => {
                let captured = db.tuple(args.iter().map(|&arg| TupleElement::required(arg)).collect());
                self.collect(captured, rest_type, Variance::Covariant)?;
            }
        }
        Ok(())
    }

    fn record(&mut self, var: InferenceVar, candidate: TypeId, variance: Variance) {
        match variance {
            Variance::Covariant => self.context.add_lower_bound(var, candidate),
            Variance::Contravariant => self.context.add_upper_bound(var, candidate),
        }
    }

    fn collect(&mut self, source: TypeId, target: TypeId, variance: Variance) -> SolverResult<()> {
        if let Some(var) = self.target_var(target) {
            self.record(var, source, variance);
            return Ok(());
        }
        if source == TypeId::ANY && variance == Variance::Covariant {
            return Ok(());
        }

        match self.guard.enter((source, target)) {
            RecursionResult::Entered => {}
            // A cycle or an exhausted budget only stops collecting here.
            _ => return Ok(()),
        }
        let result = self.collect_structural(source, target, variance);
        self.guard.leave((source, target));
        result
    }

    fn collect_structural(&mut self, source: TypeId, target: TypeId, variance: Variance) -> SolverResult<()> {
        let db = self.evaluator.interner;
        let target = match db.lookup(target) {
            Some(TypeData::Reference(target_ref)) => {
                if let Some(TypeData::Reference(source_ref)) = db.lookup(source) {
                    let source_ref = db.type_reference(source_ref);
                    let target_ref = db.type_reference(target_ref);
                    if source_ref.name == target_ref.name {
                        for (&s, &t) in source_ref.args.iter().zip(target_ref.args.iter()) {
                            self.collect(s, t, variance)?;
                        }
                        return Ok(());
                    }
                }
                self.evaluator.evaluate(target)?
            }
            _ => target,
        };
        let source = self.evaluator.evaluate(source)?;

        let (Some(source_data), Some(target_data)) = (db.lookup(source), db.lookup(target)) else {
            return Ok(());
        };

        match (source_data, target_data) {
            (_, TypeData::Union(target_list)) => {
                self.collect_into_union(source, &db.type_list(target_list), variance)
            }
            (TypeData::Union(source_list), _) => {
                for &member in db.type_list(source_list).iter() {
                    self.collect(member, target, variance)?;
                }
                Ok(())
            }
            (_, TypeData::Intersection(target_list)) => {
                for &member in db.type_list(target_list).iter() {
                    self.collect(source, member, variance)?;
                }
                Ok(())
            }
            (TypeData::Object(source_shape), TypeData::Object(target_shape)) => {
                let source_shape = db.object_shape(source_shape);
                let target_shape = db.object_shape(target_shape);
                for target_prop in &target_shape.properties {
                    if let Some(source_prop) = source_shape.find_property(target_prop.name) {
                        self.collect(source_prop.type_id, target_prop.type_id, variance)?;
                    } else if let Some(index) = &source_shape.string_index {
                        self.collect(index.value_type, target_prop.type_id, variance)?;
                    }
                }
                if let Some(target_index) = &target_shape.string_index {
                    for source_prop in &source_shape.properties {
                        self.collect(source_prop.type_id, target_index.value_type, variance)?;
                    }
                    if let Some(source_index) = &source_shape.string_index {
                        self.collect(source_index.value_type, target_index.value_type, variance)?;
                    }
                }
                Ok(())
            }
            (TypeData::Array(source_element), TypeData::Array(target_element)) => {
                self.collect(source_element, target_element, variance)
            }
            (TypeData::Tuple(source_list), TypeData::Array(target_element)) => {
                for element in db.tuple_list(source_list).iter() {
                    let element_type = match (element.rest, db.lookup(element.type_id)) {
                        (true, Some(TypeData::Array(inner))) => inner,
                        _ => element.type_id,
                    };
                    self.collect(element_type, target_element, variance)?;
                }
                Ok(())
            }
            (TypeData::Tuple(source_list), TypeData::Tuple(target_list)) => {
                let source_elements = db.tuple_list(source_list);
                let target_elements = db.tuple_list(target_list);
                for (s, t) in source_elements.iter().zip(target_elements.iter()) {
                    self.collect(s.type_id, t.type_id, variance)?;
                }
                Ok(())
            }
            (TypeData::Function(source_fn), TypeData::Function(target_fn)) => {
                let source_fn = db.function_shape(source_fn);
                let target_fn = db.function_shape(target_fn);
                for (s, t) in source_fn.params.iter().zip(target_fn.params.iter()) {
                    self.collect(s.type_id, t.type_id, variance.flip())?;
                }
                self.collect(source_fn.return_type, target_fn.return_type, variance)
            }
            _ => Ok(()),
        }
    }

    /// A union target such as `T | undefined`: source members matched by a
    /// fixed member are removed, the rest flows to the naked parameters.
    fn collect_into_union(&mut self, source: TypeId, targets: &[TypeId], variance: Variance) -> SolverResult<()> {
        let db = self.evaluator.interner;
        let (naked, fixed): (Vec<TypeId>, Vec<TypeId>) = targets
            .iter()
            .copied()
            .partition(|&member| self.target_var(member).is_some());

        if naked.is_empty() {
            for &member in &fixed {
                self.collect(source, member, variance)?;
            }
            return Ok(());
        }

        let mut remaining = Vec::new();
        for member in union_members(db, source) {
            let mut matched = false;
            for &fixed_member in &fixed {
                if self.evaluator.is_assignable(member, fixed_member)? {
                    matched = true;
                    break;
                }
            }
            if !matched {
                remaining.push(member);
            }
        }
        if remaining.is_empty() {
            return Ok(());
        }
        let remaining = db.union(remaining);
        for target in naked {
            self.collect(remaining, target, variance)?;
        }
        Ok(())
    }
}

/// Bind and instantiate `signature` with default options and no resolver.
pub fn instantiate_generic(
    interner: &dyn TypeDatabase,
    signature: &GenericSignature,
    explicit: &[TypeId],
    call_args: &[TypeId],
    options: SolverOptions,
) -> SolverResult<Instantiation> {
    GenericBinder::new(interner)
        .with_options(options)
        .instantiate(signature, explicit, call_args)
}

/// Instantiate a generic alias or interface with explicit arguments.
pub fn instantiate_alias<R: TypeResolver>(
    interner: &dyn TypeDatabase,
    resolver: &R,
    definition: &DefinitionInfo,
    args: &[TypeId],
) -> SolverResult<Instantiation> {
    GenericBinder::with_resolver(interner, resolver).instantiate(
        &GenericSignature::from_definition(definition),
        args,
        &[],
    )
}

#[cfg(test)]
#[path = "../tests/binder_tests.rs"]
mod tests;
