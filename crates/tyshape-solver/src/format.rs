//! Debug rendering of types for log fields and test failure messages.
//!
//! The output is TypeScript-like but not meant to be user-facing diagnostic
//! text.

use crate::db::TypeDatabase;
use crate::types::*;

const MAX_FORMAT_DEPTH: u32 = 12;

pub struct TypeFormatter<'a> {
    interner: &'a dyn TypeDatabase,
    depth: u32,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(interner: &'a dyn TypeDatabase) -> Self {
        TypeFormatter { interner, depth: 0 }
    }

    pub fn format(&mut self, type_id: TypeId) -> String {
        if self.depth >= MAX_FORMAT_DEPTH {
            return "...".to_string();
        }
        self.depth += 1;
        let out = self.format_inner(type_id);
        self.depth -= 1;
        out
    }

    fn atom(&self, atom: tyshape_common::interner::Atom) -> String {
        self.interner.resolve_atom(atom)
    }

    fn join(&mut self, members: &[TypeId], sep: &str) -> String {
        members
            .iter()
            .map(|&m| self.format(m))
            .collect::<Vec<_>>()
            .join(sep)
    }

    fn format_inner(&mut self, type_id: TypeId) -> String {
        let db = self.interner;
        let Some(data) = db.lookup(type_id) else {
            return format!("<unknown type {}>", type_id.0);
        };
        match data {
            TypeData::Intrinsic(kind) => kind.name().to_string(),
            TypeData::Literal(LiteralValue::String(atom)) => format!("{:?}", self.atom(atom)),
            TypeData::Literal(LiteralValue::Number(n)) => format!("{}", n.0),
            TypeData::Literal(LiteralValue::Boolean(b)) => b.to_string(),
            TypeData::Literal(LiteralValue::BigInt(atom)) => format!("{}n", self.atom(atom)),
            TypeData::Object(shape_id) => {
                let shape = db.object_shape(shape_id);
                let mut parts = Vec::with_capacity(shape.properties.len() + 2);
                for prop in &shape.properties {
                    let readonly = if prop.readonly { "readonly " } else { "" };
                    let optional = if prop.optional { "?" } else { "" };
                    parts.push(format!(
                        "{readonly}{}{optional}: {}",
                        self.atom(prop.name),
                        self.format(prop.type_id)
                    ));
                }
                if let Some(idx) = &shape.string_index {
                    parts.push(format!("[key: string]: {}", self.format(idx.value_type)));
                }
                if let Some(idx) = &shape.number_index {
                    parts.push(format!("[key: number]: {}", self.format(idx.value_type)));
                }
                if parts.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", parts.join("; "))
                }
            }
            TypeData::Array(element) => {
                let inner = self.format(element);
                if matches!(db.lookup(element), Some(TypeData::Union(_) | TypeData::Function(_))) {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            TypeData::Tuple(list_id) => {
                let elements = db.tuple_list(list_id);
                let parts: Vec<String> = elements
                    .iter()
                    .map(|elem| {
                        let ty = self.format(elem.type_id);
                        if elem.rest {
                            format!("...{ty}")
                        } else if elem.optional {
                            format!("{ty}?")
                        } else {
                            ty
                        }
                    })
                    .collect();
                format!("[{}]", parts.join(", "))
            }
            TypeData::Union(list_id) => {
                let members = db.type_list(list_id);
                self.join(&members, " | ")
            }
            TypeData::Intersection(list_id) => {
                let members = db.type_list(list_id);
                self.join(&members, " & ")
            }
            TypeData::Function(shape_id) => {
                let shape = db.function_shape(shape_id);
                let params: Vec<String> = shape
                    .params
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        let name = p.name.map_or_else(|| format!("arg{i}"), |n| self.atom(n));
                        let ty = self.format(p.type_id);
                        if p.rest {
                            format!("...{name}: {ty}")
                        } else if p.optional {
                            format!("{name}?: {ty}")
                        } else {
                            format!("{name}: {ty}")
                        }
                    })
                    .collect();
                let type_params = if shape.type_params.is_empty() {
                    String::new()
                } else {
                    let names: Vec<String> =
                        shape.type_params.iter().map(|p| self.atom(p.name)).collect();
                    format!("<{}>", names.join(", "))
                };
                format!(
                    "{type_params}({}) => {}",
                    params.join(", "),
                    self.format(shape.return_type)
                )
            }
            TypeData::TypeParameter(info) => self.atom(info.name),
            TypeData::Infer(info) => format!("infer {}", self.atom(info.name)),
            TypeData::Reference(ref_id) => {
                let reference = db.type_reference(ref_id);
                let name = self.atom(reference.name);
                if reference.args.is_empty() {
                    name
                } else {
                    format!("{name}<{}>", self.join(&reference.args, ", "))
                }
            }
            TypeData::Conditional(cond_id) => {
                let cond = db.conditional_type(cond_id);
                format!(
                    "{} extends {} ? {} : {}",
                    self.format(cond.check_type),
                    self.format(cond.extends_type),
                    self.format(cond.true_type),
                    self.format(cond.false_type)
                )
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = db.mapped_type(mapped_id);
                let readonly = match mapped.readonly_modifier {
                    MappedModifier::Add => "readonly ",
                    MappedModifier::Remove => "-readonly ",
                    MappedModifier::Preserve => "",
                };
                let optional = match mapped.optional_modifier {
                    MappedModifier::Add => "?",
                    MappedModifier::Remove => "-?",
                    MappedModifier::Preserve => "",
                };
                format!(
                    "{{ {readonly}[{} in {}]{optional}: {} }}",
                    self.atom(mapped.type_param.name),
                    self.format(mapped.constraint),
                    self.format(mapped.template)
                )
            }
            TypeData::KeyOf(operand) => format!("keyof {}", self.format(operand)),
            TypeData::IndexAccess(object, index) => {
                format!("{}[{}]", self.format(object), self.format(index))
            }
            TypeData::TemplateLiteral(list_id) => {
                let spans = db.template_list(list_id);
                let mut out = String::from("`");
                for span in spans.iter() {
                    match span {
                        TemplateSpan::Text(atom) => out.push_str(&self.atom(*atom)),
                        TemplateSpan::Type(inner) => {
                            out.push_str("${");
                            out.push_str(&self.format(*inner));
                            out.push('}');
                        }
                    }
                }
                out.push('`');
                out
            }
        }
    }
}

/// Render a type on one line.
pub fn format_type(interner: &dyn TypeDatabase, type_id: TypeId) -> String {
    TypeFormatter::new(interner).format(type_id)
}
