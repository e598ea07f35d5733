//! `infer` pattern matching for conditional types.
//!
//! Walks the extends type against the check type and binds each `infer`
//! placeholder to the type found in the same structural slot. Parts of the
//! pattern without placeholders are checked for assignability in place.
//!
//! Duplicate bindings in covariant positions are unioned. In contravariant
//! positions (function parameters) the last candidate wins.

use crate::def::TypeResolver;
use crate::errors::SolverResult;
use crate::evaluate::TypeEvaluator;
use crate::instantiate::TypeSubstitution;
use crate::types::*;
use crate::visitor::{collect_infer_names, contains_infer_types, union_members};
use crate::widening::apply_widening;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::trace;
use tyshape_common::interner::Atom;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Variance {
    Covariant,
    Contravariant,
}

impl Variance {
    pub(crate) fn flip(self) -> Self {
        match self {
            Variance::Covariant => Variance::Contravariant,
            Variance::Contravariant => Variance::Covariant,
        }
    }
}

/// Candidates collected for each placeholder during one match.
#[derive(Clone, Debug, Default)]
pub(crate) struct InferBindings {
    covariant: IndexMap<Atom, Vec<TypeId>>,
    contravariant: IndexMap<Atom, TypeId>,
    constraints: FxHashMap<Atom, TypeId>,
}

impl InferBindings {
    fn record(&mut self, info: &TypeParamInfo, candidate: TypeId, variance: Variance) {
        if let Some(constraint) = info.constraint {
            self.constraints.insert(info.name, constraint);
        }
        match variance {
            Variance::Covariant => {
                let candidates = self.covariant.entry(info.name).or_default();
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
            Variance::Contravariant => {
                self.contravariant.insert(info.name, candidate);
            }
        }
    }
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Match `source` against `pattern`, returning the `infer` bindings on
    /// success. `None` means the pattern does not match, including when a
    /// binding violates its placeholder's constraint.
    pub(crate) fn match_infer_pattern(
        &mut self,
        source: TypeId,
        pattern: TypeId,
    ) -> SolverResult<Option<TypeSubstitution>> {
        let mut bindings = InferBindings::default();
        if !self.infer_from(source, pattern, Variance::Covariant, &mut bindings)? {
            trace!(?source, ?pattern, "infer pattern mismatch");
            return Ok(None);
        }

        let db = self.interner;
        let mut substitution = TypeSubstitution::new();
        for name in collect_infer_names(db, pattern) {
            let candidate = if let Some(candidates) = bindings.covariant.get(&name) {
                db.union(candidates.clone())
            } else if let Some(&candidate) = bindings.contravariant.get(&name) {
                candidate
            } else {
                continue;
            };
            let candidate = apply_widening(db, candidate, self.options.literal_widening);
            if let Some(&constraint) = bindings.constraints.get(&name)
                && !self.is_assignable(candidate, constraint)?
            {
                trace!(?candidate, ?constraint, "infer candidate violates constraint");
                return Ok(None);
            }
            substitution.insert(name, candidate);
        }
        Ok(Some(substitution))
    }

    fn infer_from(
        &mut self,
        source: TypeId,
        pattern: TypeId,
        variance: Variance,
        bindings: &mut InferBindings,
    ) -> SolverResult<bool> {
        let db = self.interner;
        if !contains_infer_types(db, pattern) {
            return match variance {
                Variance::Covariant => self.is_assignable(source, pattern),
                Variance::Contravariant => self.is_assignable(pattern, source),
            };
        }
        let Some(pattern_data) = db.lookup(pattern) else {
            return Ok(false);
        };
        if let TypeData::Infer(info) = &pattern_data {
            bindings.record(info, source, variance);
            return Ok(true);
        }
        if source == TypeId::ANY {
            for name in collect_infer_names(db, pattern) {
                bindings.record(&TypeParamInfo::new(name), TypeId::ANY, variance);
            }
            return Ok(true);
        }

        let source = self.evaluate(source)?;
        let Some(source_data) = db.lookup(source) else {
            return Ok(false);
        };

        if let TypeData::Union(members) = pattern_data {
            let members = db.type_list(members);
            return self.infer_from_union_pattern(source, &members, variance, bindings);
        }
        if let TypeData::Union(members) = source_data {
            for &member in db.type_list(members).iter() {
                if !self.infer_from(member, pattern, variance, bindings)? {
                    return Ok(false);
                }
            }
            return Ok(true);
        }

        match (&source_data, &pattern_data) {
            (TypeData::Object(s), TypeData::Object(p)) => {
                let s_shape = db.object_shape(*s);
                let p_shape = db.object_shape(*p);
                self.infer_from_objects(&s_shape, &p_shape, variance, bindings)
            }
            (TypeData::Array(s_elem), TypeData::Array(p_elem)) => {
                self.infer_from(*s_elem, *p_elem, variance, bindings)
            }
            (TypeData::Tuple(s_list), TypeData::Array(p_elem)) => {
                let elements = db.tuple_list(*s_list);
                let members: Vec<TypeId> = elements
                    .iter()
                    .map(|e| self.tuple_element_type(e))
                    .collect();
                let element = db.union(members);
                self.infer_from(element, *p_elem, variance, bindings)
            }
            (TypeData::Tuple(s_list), TypeData::Tuple(p_list)) => {
                let s_elems = db.tuple_list(*s_list);
                let p_elems = db.tuple_list(*p_list);
                self.infer_from_tuples(&s_elems, &p_elems, variance, bindings)
            }
            (TypeData::Function(s), TypeData::Function(p)) => {
                let s_shape = db.function_shape(*s);
                let p_shape = db.function_shape(*p);
                self.infer_from_functions(&s_shape, &p_shape, variance, bindings)
            }
            (TypeData::Reference(s), TypeData::Reference(p)) => {
                let s_ref = db.type_reference(*s);
                let p_ref = db.type_reference(*p);
                if s_ref.name != p_ref.name || s_ref.args.len() != p_ref.args.len() {
                    return Ok(false);
                }
                for (&s_arg, &p_arg) in s_ref.args.iter().zip(&p_ref.args) {
                    if !self.infer_from(s_arg, p_arg, variance, bindings)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (_, TypeData::Reference(_)) => {
                let expanded = self.evaluate(pattern)?;
                if expanded == pattern {
                    return Ok(false);
                }
                self.infer_from(source, expanded, variance, bindings)
            }
            (TypeData::Literal(LiteralValue::String(atom)), TypeData::TemplateLiteral(p)) => {
                let text = db.resolve_atom(*atom);
                let spans = db.template_list(*p);
                self.infer_from_template(&text, &spans, variance, bindings)
            }
            _ => Ok(false),
        }
    }

    /// Pattern `A | infer U`: source members matched by the fixed members
    /// are set aside, the remainder is inferred against the placeholder
    /// members.
    fn infer_from_union_pattern(
        &mut self,
        source: TypeId,
        members: &[TypeId],
        variance: Variance,
        bindings: &mut InferBindings,
    ) -> SolverResult<bool> {
        let db = self.interner;
        let (inferring, fixed): (Vec<TypeId>, Vec<TypeId>) = members
            .iter()
            .partition(|&&member| contains_infer_types(db, member));

        let mut remaining = Vec::new();
        for member in union_members(db, source) {
            let mut covered = false;
            for &fixed_member in &fixed {
                if self.is_assignable(member, fixed_member)? {
                    covered = true;
                    break;
                }
            }
            if !covered {
                remaining.push(member);
            }
        }
        if remaining.is_empty() {
            return Ok(true);
        }

        let remainder = db.union(remaining);
        for candidate in inferring {
            let mut trial = bindings.clone();
            if self.infer_from(remainder, candidate, variance, &mut trial)? {
                *bindings = trial;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn infer_from_objects(
        &mut self,
        source: &ObjectShape,
        pattern: &ObjectShape,
        variance: Variance,
        bindings: &mut InferBindings,
    ) -> SolverResult<bool> {
        for p_prop in &pattern.properties {
            match source.find_property(p_prop.name) {
                Some(s_prop) => {
                    if s_prop.optional && !p_prop.optional {
                        return Ok(false);
                    }
                    if !self.infer_from(s_prop.type_id, p_prop.type_id, variance, bindings)? {
                        return Ok(false);
                    }
                }
                None if p_prop.optional => {}
                None => return Ok(false),
            }
        }

        for (p_index, s_index) in [
            (&pattern.string_index, &source.string_index),
            (&pattern.number_index, &source.number_index),
        ] {
            let Some(p_index) = p_index else {
                continue;
            };
            let value = match s_index {
                Some(s_index) => s_index.value_type,
                None => {
                    let members = source.properties.iter().map(|p| p.type_id).collect();
                    self.interner.union(members)
                }
            };
            if !self.infer_from(value, p_index.value_type, variance, bindings)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn infer_from_tuples(
        &mut self,
        source: &[TupleElement],
        pattern: &[TupleElement],
        variance: Variance,
        bindings: &mut InferBindings,
    ) -> SolverResult<bool> {
        let (p_fixed, p_rest) = match pattern.split_last() {
            Some((last, fixed)) if last.rest => (fixed, Some(last)),
            _ => (pattern, None),
        };
        let source_has_rest = source.last().is_some_and(|e| e.rest);
        if p_rest.is_none() && (source_has_rest || source.len() > p_fixed.len()) {
            return Ok(false);
        }

        for (i, p_elem) in p_fixed.iter().enumerate() {
            match source.get(i) {
                Some(s_elem) if !s_elem.rest => {
                    if s_elem.optional && !p_elem.optional {
                        return Ok(false);
                    }
                    if !self.infer_from(s_elem.type_id, p_elem.type_id, variance, bindings)? {
                        return Ok(false);
                    }
                }
                // A source rest may be empty.
                _ if p_elem.optional => {}
                _ => return Ok(false),
            }
        }

        if let Some(p_rest) = p_rest {
            let remaining: Vec<TupleElement> = source.iter().skip(p_fixed.len()).cloned().collect();
            let rest_source = self.interner.tuple(remaining);
            return self.infer_from(rest_source, p_rest.type_id, variance, bindings);
        }
        Ok(true)
    }

    fn infer_from_functions(
        &mut self,
        source: &FunctionShape,
        pattern: &FunctionShape,
        variance: Variance,
        bindings: &mut InferBindings,
    ) -> SolverResult<bool> {
        // Same arity rule as the plain function check, with the roles of
        // the two signatures swapped in contravariant position.
        let (narrow, wide) = match variance {
            Variance::Covariant => (source, pattern),
            Variance::Contravariant => (pattern, source),
        };
        let wide_fixed = wide.params.iter().filter(|p| !p.rest).count();
        if wide.rest_param().is_none() && narrow.required_param_count() > wide_fixed {
            return Ok(false);
        }

        let param_variance = variance.flip();
        for (i, p_param) in pattern.params.iter().enumerate() {
            if p_param.rest {
                if !self.infer_from_rest_param(source, i, p_param.type_id, param_variance, bindings)? {
                    return Ok(false);
                }
                break;
            }
            let Some(s_param) = source.params.get(i) else {
                continue;
            };
            let s_type = if s_param.rest {
                self.rest_param_element_type(s_param.type_id)
            } else {
                s_param.type_id
            };
            if !self.infer_from(s_type, p_param.type_id, param_variance, bindings)? {
                return Ok(false);
            }
        }
        self.infer_from(source.return_type, pattern.return_type, variance, bindings)
    }

    /// Source parameters from `start` on against a pattern rest parameter.
    ///
    /// `(...args: infer P)` captures them as a tuple. A rest type without
    /// placeholders, such as `any[]`, is checked one parameter at a time
    /// against its element type.
    fn infer_from_rest_param(
        &mut self,
        source: &FunctionShape,
        start: usize,
        rest_pattern: TypeId,
        variance: Variance,
        bindings: &mut InferBindings,
    ) -> SolverResult<bool> {
        if contains_infer_types(self.interner, rest_pattern) {
            let remaining: Vec<TupleElement> = source
                .params
                .iter()
                .skip(start)
                .map(|param| TupleElement {
                    type_id: param.type_id,
                    name: param.name,
                    optional: param.optional,
                    rest: param.rest,
                })
                .collect();
            let rest_source = self.interner.tuple(remaining);
            return self.infer_from(rest_source, rest_pattern, variance, bindings);
        }

        let element = self.rest_param_element_type(rest_pattern);
        for param in source.params.iter().skip(start) {
            let s_type = if param.rest {
                self.rest_param_element_type(param.type_id)
            } else {
                param.type_id
            };
            if !self.infer_from(s_type, element, variance, bindings)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Literal text against `` `${infer H}-${infer T}` ``.
    ///
    /// A placeholder followed by text captures up to the first occurrence
    /// of that text; a placeholder followed by another placeholder captures
    /// one character; a trailing placeholder captures the rest.
    fn infer_from_template(
        &mut self,
        text: &str,
        spans: &[TemplateSpan],
        variance: Variance,
        bindings: &mut InferBindings,
    ) -> SolverResult<bool> {
        let db = self.interner;
        let mut pos = 0;
        for (i, span) in spans.iter().enumerate() {
            match span {
                TemplateSpan::Text(atom) => {
                    let literal = db.resolve_atom(*atom);
                    if !text[pos..].starts_with(literal.as_str()) {
                        return Ok(false);
                    }
                    pos += literal.len();
                }
                TemplateSpan::Type(placeholder) => {
                    let rest = &text[pos..];
                    let captured_len = match spans.get(i + 1) {
                        None => rest.len(),
                        Some(TemplateSpan::Text(next)) => {
                            let next = db.resolve_atom(*next);
                            match rest.find(next.as_str()) {
                                Some(offset) => offset,
                                None => return Ok(false),
                            }
                        }
                        Some(TemplateSpan::Type(_)) => match rest.chars().next() {
                            Some(ch) => ch.len_utf8(),
                            None => return Ok(false),
                        },
                    };
                    let captured = db.literal_string(&rest[..captured_len]);
                    pos += captured_len;
                    if let Some(TypeData::Infer(info)) = db.lookup(*placeholder) {
                        bindings.record(&info, captured, variance);
                        continue;
                    }
                    let single = db.template_literal(vec![TemplateSpan::Type(*placeholder)]);
                    if !self.is_assignable(captured, single)? {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(pos == text.len())
    }

    fn tuple_element_type(&self, element: &TupleElement) -> TypeId {
        if element.rest {
            self.rest_param_element_type(element.type_id)
        } else {
            element.type_id
        }
    }

    fn rest_param_element_type(&self, rest_type: TypeId) -> TypeId {
        match self.interner.lookup(rest_type) {
            Some(TypeData::Array(element)) => element,
            Some(TypeData::Tuple(list_id)) => {
                let members = self
                    .interner
                    .tuple_list(list_id)
                    .iter()
                    .map(|e| self.tuple_element_type(e))
                    .collect();
                self.interner.union(members)
            }
            _ => rest_type,
        }
    }
}
