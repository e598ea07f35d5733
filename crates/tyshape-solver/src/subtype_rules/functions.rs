//! Function type subtype checking.
//!
//! Parameters are contravariant (each target parameter must be assignable
//! to the corresponding source parameter) and the return type is
//! covariant. A source may declare fewer parameters than the target, but
//! not more required ones. A `void` target return accepts any source return.

use crate::def::TypeResolver;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{FunctionShape, ParamInfo, TypeData, TypeId};

impl<'a, R: TypeResolver> SubtypeChecker<'a, R> {
    pub(crate) fn check_function_subtype(
        &mut self,
        source: &FunctionShape,
        target: &FunctionShape,
    ) -> SubtypeResult {
        let source = match self.align_type_params(source, target) {
            Some(aligned) => aligned,
            None => return SubtypeResult::DepthExceeded,
        };

        let target_has_rest = target.rest_param().is_some();
        let target_fixed = target.params.iter().filter(|p| !p.rest).count();
        if !target_has_rest && source.required_param_count() > target_fixed {
            return SubtypeResult::False;
        }

        let positions = source.params.len().max(target.params.len());
        for i in 0..positions {
            let (Some(s_type), Some(t_type)) =
                (self.param_type_at(&source, i), self.param_type_at(target, i))
            else {
                continue;
            };
            // Contravariant: target parameter flows into source parameter.
            let result = self.check_subtype(t_type, s_type);
            if !result.is_true() {
                return result;
            }
        }

        if target.return_type == TypeId::VOID {
            return SubtypeResult::True;
        }
        self.check_subtype(source.return_type, target.return_type)
    }

    /// Type accepted at parameter position `index`, looking through a
    /// trailing rest parameter.
    pub(crate) fn param_type_at(&self, shape: &FunctionShape, index: usize) -> Option<TypeId> {
        match shape.params.get(index) {
            Some(param) if !param.rest => Some(param.type_id),
            Some(param) => Some(self.rest_param_element(param, 0)),
            None => {
                let rest = shape.rest_param()?;
                let fixed = shape.params.len() - 1;
                Some(self.rest_param_element(rest, index - fixed))
            }
        }
    }

    fn rest_param_element(&self, rest: &ParamInfo, offset: usize) -> TypeId {
        match self.interner.lookup(rest.type_id) {
            Some(TypeData::Array(element)) => element,
            Some(TypeData::Tuple(list_id)) => {
                let elements = self.interner.tuple_list(list_id);
                match elements.get(offset) {
                    Some(element) if !element.rest => element.type_id,
                    Some(element) => self.rest_element_type(element),
                    None => match elements.last() {
                        Some(last) if last.rest => self.rest_element_type(last),
                        _ => TypeId::UNDEFINED,
                    },
                }
            }
            _ => rest.type_id,
        }
    }

    /// Bring a generic source signature into the target's scope.
    ///
    /// With matching arity the source's type parameters are renamed to the
    /// target's positionally. Otherwise they are erased to their constraint,
    /// or `any` when unconstrained.
    fn align_type_params(
        &mut self,
        source: &FunctionShape,
        target: &FunctionShape,
    ) -> Option<FunctionShape> {
        if source.type_params.is_empty() {
            return Some(source.clone());
        }
        let mut substitution = TypeSubstitution::new();
        if source.type_params.len() == target.type_params.len() {
            for (s_param, t_param) in source.type_params.iter().zip(&target.type_params) {
                let renamed = self.interner.type_param(t_param.clone());
                substitution.insert(s_param.name, renamed);
            }
        } else {
            for param in &source.type_params {
                substitution.insert(param.name, param.constraint.unwrap_or(TypeId::ANY));
            }
        }

        let erased = FunctionShape {
            type_params: Vec::new(),
            ..source.clone()
        };
        let erased_id = self.interner.function(erased);
        let instantiated = match instantiate_type(self.interner, erased_id, &substitution) {
            Ok(ty) => ty,
            Err(err) => {
                self.record_error(err);
                return None;
            }
        };
        match self.interner.lookup(instantiated) {
            Some(TypeData::Function(shape_id)) => {
                let shape = self.interner.function_shape(shape_id);
                Some(FunctionShape {
                    type_params: Vec::new(),
                    params: shape.params.clone(),
                    return_type: shape.return_type,
                })
            }
            _ => Some(source.clone()),
        }
    }
}
