//! Literal and template literal subtype checking.
//!
//! A string literal is assignable to a template literal type when its text
//! matches the template's pattern: text spans must match verbatim, and each
//! placeholder must accept the substring it covers.

use crate::def::TypeResolver;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{LiteralValue, TemplateLiteralId, TemplateSpan, TypeId};
use crate::visitor::{literal_value, union_list_id};

impl<'a, R: TypeResolver> SubtypeChecker<'a, R> {
    pub(crate) fn check_literal_to_template(
        &mut self,
        literal: &LiteralValue,
        target: TemplateLiteralId,
    ) -> SubtypeResult {
        let LiteralValue::String(atom) = literal else {
            return SubtypeResult::False;
        };
        let text = self.interner.resolve_atom(*atom);
        let spans = self.interner.template_list(target);
        SubtypeResult::from_bool(self.match_template_pattern(&text, &spans))
    }

    fn match_template_pattern(&mut self, text: &str, spans: &[TemplateSpan]) -> bool {
        let Some((first, rest)) = spans.split_first() else {
            return text.is_empty();
        };
        match first {
            TemplateSpan::Text(atom) => {
                let prefix = self.interner.resolve_atom(*atom);
                match text.strip_prefix(prefix.as_str()) {
                    Some(remaining) => self.match_template_pattern(remaining, rest),
                    None => false,
                }
            }
            TemplateSpan::Type(placeholder) => {
                // The last placeholder must consume the rest of the text.
                if rest.is_empty() {
                    return self.placeholder_accepts(*placeholder, text);
                }
                let boundaries: Vec<usize> = text
                    .char_indices()
                    .map(|(i, _)| i)
                    .chain(std::iter::once(text.len()))
                    .collect();
                boundaries.into_iter().any(|split| {
                    self.placeholder_accepts(*placeholder, &text[..split])
                        && self.match_template_pattern(&text[split..], rest)
                })
            }
        }
    }

    /// Whether the placeholder type accepts the given substring.
    fn placeholder_accepts(&mut self, placeholder: TypeId, text: &str) -> bool {
        match placeholder {
            TypeId::STRING | TypeId::ANY | TypeId::UNKNOWN => true,
            TypeId::NUMBER => is_numeric_text(text),
            TypeId::BIGINT => {
                let digits = text.strip_prefix('-').unwrap_or(text);
                !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
            }
            TypeId::BOOLEAN => text == "true" || text == "false",
            TypeId::NULL => text == "null",
            TypeId::UNDEFINED => text == "undefined",
            _ => match literal_value(self.interner, placeholder) {
                Some(LiteralValue::String(atom)) => self.interner.resolve_atom(atom) == text,
                Some(LiteralValue::Number(n)) => text.parse::<f64>().is_ok_and(|v| v == n.0),
                Some(LiteralValue::Boolean(b)) => text == if b { "true" } else { "false" },
                Some(LiteralValue::BigInt(atom)) => self.interner.resolve_atom(atom) == text,
                None => self.placeholder_accepts_via_members(placeholder, text),
            },
        }
    }

    /// Unions such as `number | "auto"` accept what any member accepts.
    fn placeholder_accepts_via_members(&mut self, placeholder: TypeId, text: &str) -> bool {
        let Some(list_id) = union_list_id(self.interner, placeholder) else {
            let candidate = self.interner.literal_string(text);
            return self.check_subtype(candidate, placeholder).is_true();
        };
        let members = self.interner.type_list(list_id);
        members
            .iter()
            .any(|&member| self.placeholder_accepts(member, text))
    }

    /// Two irreducible templates relate span-wise when their layouts match.
    pub(crate) fn check_template_to_template(
        &mut self,
        source: TemplateLiteralId,
        target: TemplateLiteralId,
    ) -> SubtypeResult {
        let s_spans = self.interner.template_list(source);
        let t_spans = self.interner.template_list(target);
        if s_spans.len() != t_spans.len() {
            return SubtypeResult::False;
        }
        for (s_span, t_span) in s_spans.iter().zip(t_spans.iter()) {
            match (s_span, t_span) {
                (TemplateSpan::Text(a), TemplateSpan::Text(b)) if a == b => {}
                (TemplateSpan::Type(a), TemplateSpan::Type(b)) => {
                    let result = self.check_subtype(*a, *b);
                    if !result.is_true() {
                        return result;
                    }
                }
                _ => return SubtypeResult::False,
            }
        }
        SubtypeResult::True
    }
}

/// Text a `${number}` placeholder accepts: a finite numeric literal.
fn is_numeric_text(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.len() != text.len() {
        return false;
    }
    text.parse::<f64>().is_ok_and(f64::is_finite)
}
