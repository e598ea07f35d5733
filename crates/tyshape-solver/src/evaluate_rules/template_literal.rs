//! Template literal type expansion.
//!
//! `` `${A}-${B}` `` with `A` and `B` unions of literals expands to the
//! union of every concatenation. Expansion iterates placeholders in
//! segment order with the first placeholder as the outermost loop, so
//! `` `${"light" | "dark"}-${"red" | "blue"}` `` yields
//! `"light-red" | "light-blue" | "dark-red" | "dark-blue"`.
//!
//! The result is an ordinary interned union, so its member list is sorted
//! by `TypeId`. On a fresh interner that is the product order above; a
//! literal interned earlier by an unrelated query sorts ahead of the rest.
//! The set of members never depends on history.
//!
//! A placeholder that is not a finite union of literals (`string`,
//! `number`, an unbound parameter) keeps the template as a pattern type.

use crate::db::TypeDatabase;
use crate::def::TypeResolver;
use crate::errors::{SolverError, SolverResult};
use crate::evaluate::TypeEvaluator;
use crate::evaluate_rules::literal_text;
use crate::instantiate::TypeSubstitution;
use crate::recursion::RecursionProfile;
use crate::types::{TemplateSpan, TypeData, TypeId};
use crate::visitor::union_members;
use tracing::debug;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    pub(crate) fn evaluate_template_literal(
        &mut self,
        spans: &[TemplateSpan],
    ) -> SolverResult<TypeId> {
        let db = self.interner;
        let mut evaluated_spans = Vec::with_capacity(spans.len());
        // Text choices per segment; `None` once any placeholder is not a
        // finite set of literals.
        let mut segments: Option<Vec<Vec<String>>> = Some(Vec::with_capacity(spans.len()));

        for span in spans {
            match span {
                TemplateSpan::Text(atom) => {
                    evaluated_spans.push(TemplateSpan::Text(*atom));
                    if let Some(segments) = segments.as_mut() {
                        segments.push(vec![db.resolve_atom(*atom)]);
                    }
                }
                TemplateSpan::Type(placeholder) => {
                    let placeholder = self.evaluate(*placeholder)?;
                    if placeholder == TypeId::NEVER {
                        return Ok(TypeId::NEVER);
                    }
                    evaluated_spans.push(TemplateSpan::Type(placeholder));
                    let choices = literal_choices(db, placeholder);
                    match (segments.as_mut(), choices) {
                        (Some(segments), Some(choices)) => segments.push(choices),
                        _ => segments = None,
                    }
                }
            }
        }

        let Some(segments) = segments else {
            return Ok(db.template_literal(evaluated_spans));
        };

        let limit = self.options.template_expansion_limit;
        let product = segments
            .iter()
            .try_fold(1u64, |acc, choices| acc.checked_mul(choices.len() as u64))
            .unwrap_or(u64::MAX);
        if product > u64::from(limit) {
            debug!(product, limit, "template literal expansion over limit");
            return Err(SolverError::recursion_limit(
                RecursionProfile::TemplateExpansion,
                limit,
            ));
        }

        let mut results = vec![String::new()];
        for choices in &segments {
            let mut next = Vec::with_capacity(results.len() * choices.len());
            for prefix in &results {
                for choice in choices {
                    let mut text = String::with_capacity(prefix.len() + choice.len());
                    text.push_str(prefix);
                    text.push_str(choice);
                    next.push(text);
                }
            }
            results = next;
        }

        let literals = results.iter().map(|text| db.literal_string(text)).collect();
        Ok(db.union(literals))
    }
}

/// Texts of a placeholder that is a union of literals, in member order.
/// `boolean` counts as `false | true`.
fn literal_choices(db: &dyn TypeDatabase, placeholder: TypeId) -> Option<Vec<String>> {
    let mut choices = Vec::new();
    for member in union_members(db, placeholder) {
        if member == TypeId::BOOLEAN {
            choices.push("false".to_string());
            choices.push("true".to_string());
            continue;
        }
        match db.lookup(member) {
            Some(TypeData::Literal(literal)) => choices.push(literal_text(db, &literal)),
            _ => return None,
        }
    }
    Some(choices)
}

/// Expand a template literal with the type parameters in `env` bound.
pub fn expand_template_literal(
    interner: &dyn TypeDatabase,
    spans: &[TemplateSpan],
    env: &TypeSubstitution,
) -> SolverResult<TypeId> {
    let mut evaluator = TypeEvaluator::new(interner);
    let mut bound = Vec::with_capacity(spans.len());
    for span in spans {
        bound.push(match span {
            TemplateSpan::Text(atom) => TemplateSpan::Text(*atom),
            TemplateSpan::Type(placeholder) => {
                TemplateSpan::Type(evaluator.instantiate(*placeholder, env)?)
            }
        });
    }
    evaluator.evaluate_template_literal(&bound)
}

#[cfg(test)]
#[path = "../../tests/template_tests.rs"]
mod tests;
