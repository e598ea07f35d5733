//! Generic type instantiation and substitution.
//!
//! Applies a `TypeSubstitution` to a type by deep structural replacement of
//! every `TypeParameter` occurrence (and every argument-less `Reference`)
//! whose name is bound. Nested scopes that re-declare a name shadow the
//! outer binding:
//! - a function's own type parameter list
//! - a mapped type's key parameter
//! - `infer` names declared in a conditional's `extends` clause
//!
//! `Infer` placeholders themselves are never replaced.

use crate::db::TypeDatabase;
use crate::errors::{SolverError, SolverResult};
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::*;
use crate::visitor::collect_infer_names;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::trace;
use tyshape_common::interner::Atom;

/// A substitution environment: type parameter name to its binding.
///
/// Iteration order is insertion order, which is declaration order when the
/// generic binder fills it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    map: IndexMap<Atom, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        TypeSubstitution {
            map: IndexMap::new(),
        }
    }

    /// Create a substitution from type parameters and arguments, pairwise.
    /// Missing arguments fall back to the parameter's default, then `unknown`.
    pub fn from_args(type_params: &[TypeParamInfo], type_args: &[TypeId]) -> Self {
        let mut map = IndexMap::with_capacity(type_params.len());
        for (i, param) in type_params.iter().enumerate() {
            let type_id = type_args
                .get(i)
                .copied()
                .or(param.default)
                .unwrap_or(TypeId::UNKNOWN);
            map.insert(param.name, type_id);
        }
        TypeSubstitution { map }
    }

    pub fn insert(&mut self, name: Atom, type_id: TypeId) {
        self.map.insert(name, type_id);
    }

    pub fn get(&self, name: Atom) -> Option<TypeId> {
        self.map.get(&name).copied()
    }

    pub fn contains(&self, name: Atom) -> bool {
        self.map.contains_key(&name)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Atom, TypeId)> + '_ {
        self.map.iter().map(|(name, ty)| (*name, *ty))
    }

    /// Bindings of `other` are added; existing names keep their binding.
    pub fn extend_missing(&mut self, other: &TypeSubstitution) {
        for (name, type_id) in other.iter() {
            self.map.entry(name).or_insert(type_id);
        }
    }
}

/// Instantiator that applies a substitution with depth protection.
pub struct TypeInstantiator<'a> {
    interner: &'a dyn TypeDatabase,
    substitution: &'a TypeSubstitution,
    /// Only consulted while no name is shadowed.
    cache: FxHashMap<TypeId, TypeId>,
    shadowed: Vec<Atom>,
    depth: DepthCounter,
}

impl<'a> TypeInstantiator<'a> {
    pub fn new(interner: &'a dyn TypeDatabase, substitution: &'a TypeSubstitution) -> Self {
        TypeInstantiator {
            interner,
            substitution,
            cache: FxHashMap::default(),
            shadowed: Vec::new(),
            depth: DepthCounter::with_profile(RecursionProfile::TypeInstantiation),
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.depth = DepthCounter::new(max_depth);
        self
    }

    pub fn is_depth_exceeded(&self) -> bool {
        self.depth.is_exceeded()
    }

    pub fn max_depth(&self) -> u32 {
        self.depth.max_depth()
    }

    fn binding_for(&self, name: Atom) -> Option<TypeId> {
        if self.shadowed.contains(&name) {
            return None;
        }
        self.substitution.get(name)
    }

    /// Instantiate a type. Past the depth limit the type is returned as-is
    /// and [`is_depth_exceeded`](Self::is_depth_exceeded) is set.
    pub fn instantiate(&mut self, type_id: TypeId) -> TypeId {
        if type_id.is_builtin() || self.substitution.is_empty() {
            return type_id;
        }
        let cacheable = self.shadowed.is_empty();
        if cacheable && let Some(&cached) = self.cache.get(&type_id) {
            return cached;
        }
        if !self.depth.enter() {
            return type_id;
        }
        let result = self.instantiate_inner(type_id);
        self.depth.leave();
        if cacheable && !self.depth.is_exceeded() {
            self.cache.insert(type_id, result);
        }
        result
    }

    fn with_shadowed<T>(&mut self, names: &[Atom], f: impl FnOnce(&mut Self) -> T) -> T {
        let mark = self.shadowed.len();
        self.shadowed.extend_from_slice(names);
        let result = f(self);
        self.shadowed.truncate(mark);
        result
    }

    fn instantiate_param_info(&mut self, info: &TypeParamInfo) -> TypeParamInfo {
        TypeParamInfo {
            name: info.name,
            constraint: info.constraint.map(|c| self.instantiate(c)),
            default: info.default.map(|d| self.instantiate(d)),
        }
    }

    fn instantiate_inner(&mut self, type_id: TypeId) -> TypeId {
        let db = self.interner;
        let Some(data) = db.lookup(type_id) else {
            return type_id;
        };

        match data {
            TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::Infer(_) => type_id,

            TypeData::TypeParameter(info) => match self.binding_for(info.name) {
                Some(replacement) => {
                    trace!(param = info.name.0, ?replacement, "substitute type parameter");
                    replacement
                }
                None => type_id,
            },

            TypeData::Reference(ref_id) => {
                let reference = db.type_reference(ref_id);
                if reference.args.is_empty()
                    && let Some(replacement) = self.binding_for(reference.name)
                {
                    return replacement;
                }
                let args: Vec<TypeId> = reference.args.iter().map(|&a| self.instantiate(a)).collect();
                db.reference(reference.name, args)
            }

            TypeData::Object(shape_id) => {
                let shape = db.object_shape(shape_id);
                let properties = shape
                    .properties
                    .iter()
                    .map(|prop| PropertyInfo {
                        type_id: self.instantiate(prop.type_id),
                        ..prop.clone()
                    })
                    .collect();
                let string_index = shape.string_index.as_ref().map(|idx| self.instantiate_index(idx));
                let number_index = shape.number_index.as_ref().map(|idx| self.instantiate_index(idx));
                db.object_with_index(ObjectShape {
                    properties,
                    string_index,
                    number_index,
                    origin: shape.origin,
                })
            }

            TypeData::Array(element) => {
                let element = self.instantiate(element);
                db.array(element)
            }

            TypeData::Tuple(list_id) => {
                let elements = db
                    .tuple_list(list_id)
                    .iter()
                    .map(|elem| TupleElement {
                        type_id: self.instantiate(elem.type_id),
                        ..elem.clone()
                    })
                    .collect();
                db.tuple(elements)
            }

            TypeData::Union(list_id) => {
                let members: Vec<TypeId> =
                    db.type_list(list_id).iter().map(|&m| self.instantiate(m)).collect();
                db.union(members)
            }

            TypeData::Intersection(list_id) => {
                let members: Vec<TypeId> =
                    db.type_list(list_id).iter().map(|&m| self.instantiate(m)).collect();
                db.intersection(members)
            }

            TypeData::Function(shape_id) => {
                let shape = db.function_shape(shape_id);
                let own: Vec<Atom> = shape.type_params.iter().map(|p| p.name).collect();
                self.with_shadowed(&own, |this| {
                    let type_params = shape
                        .type_params
                        .iter()
                        .map(|p| this.instantiate_param_info(p))
                        .collect();
                    let params = shape
                        .params
                        .iter()
                        .map(|p| ParamInfo {
                            type_id: this.instantiate(p.type_id),
                            ..p.clone()
                        })
                        .collect();
                    let return_type = this.instantiate(shape.return_type);
                    db.function(FunctionShape {
                        type_params,
                        params,
                        return_type,
                    })
                })
            }

            TypeData::Conditional(cond_id) => {
                let cond = db.conditional_type(cond_id);
                let check_type = self.instantiate(cond.check_type);
                let infer_names = collect_infer_names(db, cond.extends_type);
                let (extends_type, true_type) = self.with_shadowed(&infer_names, |this| {
                    (
                        this.instantiate(cond.extends_type),
                        this.instantiate(cond.true_type),
                    )
                });
                let false_type = self.instantiate(cond.false_type);
                db.conditional(ConditionalType {
                    check_type,
                    extends_type,
                    true_type,
                    false_type,
                })
            }

            TypeData::Mapped(mapped_id) => {
                let mapped = db.mapped_type(mapped_id);
                let constraint = self.instantiate(mapped.constraint);
                let key_name = mapped.type_param.name;
                let template = self.with_shadowed(&[key_name], |this| this.instantiate(mapped.template));
                db.mapped(MappedType {
                    type_param: mapped.type_param.clone(),
                    constraint,
                    template,
                    optional_modifier: mapped.optional_modifier,
                    readonly_modifier: mapped.readonly_modifier,
                })
            }

            TypeData::KeyOf(operand) => {
                let operand = self.instantiate(operand);
                db.keyof(operand)
            }

            TypeData::IndexAccess(object, index) => {
                let object = self.instantiate(object);
                let index = self.instantiate(index);
                db.index_access(object, index)
            }

            TypeData::TemplateLiteral(list_id) => {
                let spans = db
                    .template_list(list_id)
                    .iter()
                    .map(|span| match span {
                        TemplateSpan::Text(atom) => TemplateSpan::Text(*atom),
                        TemplateSpan::Type(inner) => TemplateSpan::Type(self.instantiate(*inner)),
                    })
                    .collect();
                db.template_literal(spans)
            }
        }
    }

    fn instantiate_index(&mut self, index: &IndexSignature) -> IndexSignature {
        IndexSignature {
            key_type: self.instantiate(index.key_type),
            value_type: self.instantiate(index.value_type),
            readonly: index.readonly,
        }
    }
}

/// Instantiate `type_id` under `substitution` with the default depth limit.
pub fn instantiate_type(
    interner: &dyn TypeDatabase,
    type_id: TypeId,
    substitution: &TypeSubstitution,
) -> SolverResult<TypeId> {
    instantiate_type_with_depth(
        interner,
        type_id,
        substitution,
        RecursionProfile::TypeInstantiation.max_depth(),
    )
}

pub fn instantiate_type_with_depth(
    interner: &dyn TypeDatabase,
    type_id: TypeId,
    substitution: &TypeSubstitution,
    max_depth: u32,
) -> SolverResult<TypeId> {
    let mut instantiator = TypeInstantiator::new(interner, substitution).with_max_depth(max_depth);
    let result = instantiator.instantiate(type_id);
    if instantiator.is_depth_exceeded() {
        return Err(SolverError::recursion_limit(
            RecursionProfile::TypeInstantiation,
            max_depth,
        ));
    }
    Ok(result)
}

/// Instantiate a generic body with positional arguments.
pub fn instantiate_with_args(
    interner: &dyn TypeDatabase,
    body: TypeId,
    type_params: &[TypeParamInfo],
    type_args: &[TypeId],
) -> SolverResult<TypeId> {
    if type_params.is_empty() {
        return Ok(body);
    }
    let substitution = TypeSubstitution::from_args(type_params, type_args);
    instantiate_type(interner, body, &substitution)
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
