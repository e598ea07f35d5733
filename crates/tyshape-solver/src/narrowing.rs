//! Type narrowing for control-flow guards.
//!
//! Given a source type and a runtime-checkable guard, computes the type in
//! the branch where the guard holds (`consequent`) and where it does not
//! (`alternate`). Narrowing works member-wise over unions; a member that
//! may or may not satisfy the guard (an unconstrained type parameter, the
//! non-primitive `object`) stays in both branches.
//!
//! ```text
//! typeof x === "string"        TypeGuard::Typeof(TypeofTag::String)
//! "key" in x                   TypeGuard::In(key)
//! x instanceof Foo             TypeGuard::Instanceof(Foo)
//! x.kind === "circle"          TypeGuard::Discriminant { kind, "circle" }
//! isFoo(x)                     TypeGuard::Predicate(Foo)
//! if (x)                       TypeGuard::Truthy
//! x == null                    TypeGuard::Nullish
//! ```

use crate::db::TypeDatabase;
use crate::def::{NoopResolver, TypeResolver};
use crate::errors::SolverResult;
use crate::evaluate::TypeEvaluator;
use crate::options::SolverOptions;
use crate::subtype::SubtypeChecker;
use crate::types::*;
use crate::visitor::union_members;
use bitflags::bitflags;
use tracing::{Level, span, trace};
use tyshape_common::interner::Atom;

bitflags! {
    /// Set of `typeof` results a value of some type may produce.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TypeofMask: u8 {
        const STRING    = 1 << 0;
        const NUMBER    = 1 << 1;
        const BOOLEAN   = 1 << 2;
        const BIGINT    = 1 << 3;
        const SYMBOL    = 1 << 4;
        const UNDEFINED = 1 << 5;
        const OBJECT    = 1 << 6;
        const FUNCTION  = 1 << 7;
    }
}

/// A `typeof` result tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeofTag {
    String,
    Number,
    Boolean,
    Bigint,
    Symbol,
    Undefined,
    /// Object values and `null`.
    Object,
    Function,
}

impl TypeofTag {
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag {
            "string" => TypeofTag::String,
            "number" => TypeofTag::Number,
            "boolean" => TypeofTag::Boolean,
            "bigint" => TypeofTag::Bigint,
            "symbol" => TypeofTag::Symbol,
            "undefined" => TypeofTag::Undefined,
            "object" => TypeofTag::Object,
            "function" => TypeofTag::Function,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TypeofTag::String => "string",
            TypeofTag::Number => "number",
            TypeofTag::Boolean => "boolean",
            TypeofTag::Bigint => "bigint",
            TypeofTag::Symbol => "symbol",
            TypeofTag::Undefined => "undefined",
            TypeofTag::Object => "object",
            TypeofTag::Function => "function",
        }
    }

    pub const fn mask(self) -> TypeofMask {
        match self {
            TypeofTag::String => TypeofMask::STRING,
            TypeofTag::Number => TypeofMask::NUMBER,
            TypeofTag::Boolean => TypeofMask::BOOLEAN,
            TypeofTag::Bigint => TypeofMask::BIGINT,
            TypeofTag::Symbol => TypeofMask::SYMBOL,
            TypeofTag::Undefined => TypeofMask::UNDEFINED,
            TypeofTag::Object => TypeofMask::OBJECT,
            TypeofTag::Function => TypeofMask::FUNCTION,
        }
    }
}

/// A runtime check that narrows a value's type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeGuard {
    Typeof(TypeofTag),
    /// `"key" in x`
    In(Atom),
    /// `x instanceof C`, by nominal origin tag.
    Instanceof(Atom),
    /// `x.property === value` with a unit literal `value`.
    Discriminant { property: Atom, value: TypeId },
    /// A user-defined type predicate `x is T`.
    Predicate(TypeId),
    Truthy,
    /// `x == null`
    Nullish,
}

/// The type of a value in each branch of a guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NarrowingResult {
    pub consequent: TypeId,
    pub alternate: TypeId,
}

/// A discriminant property of a union.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscriminantInfo {
    pub property_name: Atom,
    /// `(literal value, member)` for every union member.
    pub variants: Vec<(TypeId, TypeId)>,
}

/// Where a member goes under a guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    Consequent,
    Alternate,
    Both,
    /// The member splits; each branch receives its own refinement.
    Split { consequent: TypeId, alternate: TypeId },
}

pub struct NarrowingContext<'a, R: TypeResolver = NoopResolver> {
    db: &'a dyn TypeDatabase,
    resolver: &'a R,
    evaluator: TypeEvaluator<'a, R>,
    checker: SubtypeChecker<'a, R>,
}

impl<'a> NarrowingContext<'a, NoopResolver> {
    pub fn new(db: &'a dyn TypeDatabase) -> NarrowingContext<'a, NoopResolver> {
        static NOOP: NoopResolver = NoopResolver;
        NarrowingContext::with_resolver(db, &NOOP)
    }
}

impl<'a, R: TypeResolver> NarrowingContext<'a, R> {
    pub fn with_resolver(db: &'a dyn TypeDatabase, resolver: &'a R) -> Self {
        NarrowingContext {
            db,
            resolver,
            evaluator: TypeEvaluator::with_resolver(db, resolver),
            checker: SubtypeChecker::with_resolver(db, resolver),
        }
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.evaluator = self.evaluator.with_options(options);
        self.checker = self.checker.with_options(options);
        self
    }

    fn is_assignable(&mut self, source: TypeId, target: TypeId) -> SolverResult<bool> {
        self.checker.check(source, target)
    }

    /// Split `source` under `guard`.
    pub fn narrow(&mut self, source: TypeId, guard: &TypeGuard) -> SolverResult<NarrowingResult> {
        let _span = span!(Level::TRACE, "narrow", source = source.0, ?guard).entered();
        let source = self.evaluator.evaluate(source)?;

        if let TypeGuard::Predicate(asserted) = guard {
            let mut alternate = Vec::new();
            for member in union_members(self.db, source) {
                if !self.is_assignable(member, *asserted)? {
                    alternate.push(member);
                }
            }
            return Ok(NarrowingResult {
                consequent: *asserted,
                alternate: self.db.union(alternate),
            });
        }

        let mut consequent = Vec::new();
        let mut alternate = Vec::new();
        for member in self.split_members(source) {
            let placement = self.place(member, guard)?;
            trace!(?member, ?placement, "narrowing member");
            match placement {
                Placement::Consequent => consequent.push(member),
                Placement::Alternate => alternate.push(member),
                Placement::Both => {
                    consequent.push(member);
                    alternate.push(member);
                }
                Placement::Split {
                    consequent: c,
                    alternate: a,
                } => {
                    consequent.push(c);
                    alternate.push(a);
                }
            }
        }

        Ok(NarrowingResult {
            consequent: self.db.union(consequent),
            alternate: self.db.union(alternate),
        })
    }

    /// Union members, with `boolean` split into `true | false`.
    fn split_members(&self, source: TypeId) -> Vec<TypeId> {
        let mut members = Vec::new();
        for member in union_members(self.db, source) {
            if member == TypeId::BOOLEAN {
                members.push(TypeId::BOOLEAN_TRUE);
                members.push(TypeId::BOOLEAN_FALSE);
            } else {
                members.push(member);
            }
        }
        members
    }

    fn place(&mut self, member: TypeId, guard: &TypeGuard) -> SolverResult<Placement> {
        match guard {
            TypeGuard::Typeof(tag) => Ok(self.place_typeof(member, *tag)),
            TypeGuard::In(key) => Ok(self.place_in(member, *key)),
            TypeGuard::Instanceof(origin) => self.place_instanceof(member, *origin),
            TypeGuard::Discriminant { property, value } => {
                self.place_discriminant(member, *property, *value)
            }
            TypeGuard::Truthy => Ok(self.place_truthy(member)),
            TypeGuard::Nullish => Ok(self.place_nullish(member)),
            // Handled before member iteration.
            TypeGuard::Predicate(_) => Ok(Placement::Both),
        }
    }

    /// The `typeof` results a value of `type_id` may produce.
    pub fn typeof_mask(&self, type_id: TypeId) -> TypeofMask {
        match self.db.lookup(type_id) {
            Some(TypeData::Intrinsic(kind)) => match kind {
                IntrinsicKind::Never => TypeofMask::empty(),
                IntrinsicKind::Any | IntrinsicKind::Unknown => TypeofMask::all(),
                IntrinsicKind::Void | IntrinsicKind::Undefined => TypeofMask::UNDEFINED,
                IntrinsicKind::Null => TypeofMask::OBJECT,
                IntrinsicKind::Boolean => TypeofMask::BOOLEAN,
                IntrinsicKind::Number => TypeofMask::NUMBER,
                IntrinsicKind::String => TypeofMask::STRING,
                IntrinsicKind::Bigint => TypeofMask::BIGINT,
                IntrinsicKind::Symbol => TypeofMask::SYMBOL,
                IntrinsicKind::Object => TypeofMask::OBJECT | TypeofMask::FUNCTION,
            },
            Some(TypeData::Literal(literal)) => match literal {
                LiteralValue::String(_) => TypeofMask::STRING,
                LiteralValue::Number(_) => TypeofMask::NUMBER,
                LiteralValue::Boolean(_) => TypeofMask::BOOLEAN,
                LiteralValue::BigInt(_) => TypeofMask::BIGINT,
            },
            Some(TypeData::TemplateLiteral(_)) => TypeofMask::STRING,
            Some(TypeData::Object(_) | TypeData::Array(_) | TypeData::Tuple(_)) => TypeofMask::OBJECT,
            Some(TypeData::Function(_)) => TypeofMask::FUNCTION,
            Some(TypeData::Union(list_id)) => self
                .db
                .type_list(list_id)
                .iter()
                .fold(TypeofMask::empty(), |mask, &m| mask | self.typeof_mask(m)),
            Some(TypeData::Intersection(list_id)) => self
                .db
                .type_list(list_id)
                .iter()
                .fold(TypeofMask::all(), |mask, &m| mask & self.typeof_mask(m)),
            Some(TypeData::TypeParameter(info)) => match info.constraint {
                Some(constraint) => self.typeof_mask(constraint),
                None => TypeofMask::all(),
            },
            _ => TypeofMask::all(),
        }
    }

    /// The type a top type narrows to under `typeof x === tag`.
    fn typeof_tag_type(&self, tag: TypeofTag) -> TypeId {
        match tag {
            TypeofTag::String => TypeId::STRING,
            TypeofTag::Number => TypeId::NUMBER,
            TypeofTag::Boolean => TypeId::BOOLEAN,
            TypeofTag::Bigint => TypeId::BIGINT,
            TypeofTag::Symbol => TypeId::SYMBOL,
            TypeofTag::Undefined => TypeId::UNDEFINED,
            TypeofTag::Object => self.db.union2(TypeId::OBJECT, TypeId::NULL),
            TypeofTag::Function => {
                let args = self.db.array(TypeId::ANY);
                self.db.function(FunctionShape::new(
                    vec![ParamInfo::rest(Some(self.db.intern_string("args")), args)],
                    TypeId::ANY,
                ))
            }
        }
    }

    fn place_typeof(&self, member: TypeId, tag: TypeofTag) -> Placement {
        if member == TypeId::ANY || member == TypeId::UNKNOWN {
            return Placement::Split {
                consequent: self.typeof_tag_type(tag),
                alternate: member,
            };
        }
        let mask = self.typeof_mask(member);
        match (mask.contains(tag.mask()), mask.difference(tag.mask()).is_empty()) {
            (true, true) => Placement::Consequent,
            (true, false) => Placement::Both,
            (false, _) => Placement::Alternate,
        }
    }

    /// Whether `member` certainly (`Some(true)`), possibly (`Some(false)`)
    /// or never (`None`) has `key`.
    fn declares_key(&self, member: TypeId, key: Atom) -> Option<bool> {
        let db = self.db;
        match db.lookup(member)? {
            TypeData::Object(shape_id) => {
                let shape = db.object_shape(shape_id);
                if let Some(prop) = shape.find_property(key) {
                    return Some(!prop.optional);
                }
                let numeric = db
                    .resolve_atom(key)
                    .parse::<f64>()
                    .is_ok_and(|n| n.is_finite());
                if shape.string_index.is_some() || (numeric && shape.number_index.is_some()) {
                    return Some(false);
                }
                None
            }
            TypeData::Array(_) | TypeData::Tuple(_) => {
                let name = db.resolve_atom(key);
                if name == "length" {
                    Some(true)
                } else if name.parse::<usize>().is_ok() {
                    Some(false)
                } else {
                    None
                }
            }
            TypeData::Intersection(list_id) => db
                .type_list(list_id)
                .iter()
                .filter_map(|&m| self.declares_key(m, key))
                .reduce(|a, b| a || b),
            _ => None,
        }
    }

    fn place_in(&self, member: TypeId, key: Atom) -> Placement {
        match self.db.lookup(member) {
            Some(TypeData::Intrinsic(IntrinsicKind::Any | IntrinsicKind::Unknown | IntrinsicKind::Object))
            | Some(TypeData::TypeParameter(_)) => Placement::Both,
            _ => match self.declares_key(member, key) {
                Some(true) => Placement::Consequent,
                Some(false) => Placement::Both,
                None => Placement::Alternate,
            },
        }
    }

    fn origin_of(&self, member: TypeId) -> Option<Atom> {
        match self.db.lookup(member)? {
            TypeData::Object(shape_id) => self.db.object_shape(shape_id).origin,
            _ => None,
        }
    }

    /// The instance type registered for class `origin`.
    fn instance_type(&mut self, origin: Atom) -> SolverResult<Option<TypeId>> {
        match self.resolver.resolve_definition(origin) {
            Some(definition) => Ok(Some(self.evaluator.evaluate(definition.body)?)),
            None => Ok(None),
        }
    }

    fn place_instanceof(&mut self, member: TypeId, origin: Atom) -> SolverResult<Placement> {
        if member == TypeId::ANY || member == TypeId::UNKNOWN {
            return Ok(match self.instance_type(origin)? {
                Some(instance) => Placement::Split {
                    consequent: instance,
                    alternate: member,
                },
                None => Placement::Both,
            });
        }
        if !self.typeof_mask(member).intersects(TypeofMask::OBJECT | TypeofMask::FUNCTION)
            || member == TypeId::NULL
        {
            return Ok(Placement::Alternate);
        }

        match self.origin_of(member) {
            Some(member_origin) if self.resolver.is_derived_from(member_origin, origin) => {
                Ok(Placement::Consequent)
            }
            // A base-class value may hold a derived instance.
            Some(member_origin) if self.resolver.is_derived_from(origin, member_origin) => {
                Ok(match self.instance_type(origin)? {
                    Some(instance) => Placement::Split {
                        consequent: instance,
                        alternate: member,
                    },
                    None => Placement::Alternate,
                })
            }
            Some(_) => Ok(Placement::Alternate),
            None => match self.instance_type(origin)? {
                Some(instance) if self.is_assignable(instance, member)? => Ok(Placement::Split {
                    consequent: instance,
                    alternate: member,
                }),
                _ => Ok(Placement::Alternate),
            },
        }
    }

    /// Type of `property` on an object-like member, `undefined` included
    /// when optional.
    fn property_type(&self, member: TypeId, property: Atom) -> Option<TypeId> {
        let db = self.db;
        match db.lookup(member)? {
            TypeData::Object(shape_id) => {
                let shape = db.object_shape(shape_id);
                let prop = shape.find_property(property)?;
                Some(if prop.optional {
                    db.union2(prop.type_id, TypeId::UNDEFINED)
                } else {
                    prop.type_id
                })
            }
            TypeData::Intersection(list_id) => {
                let found: Vec<TypeId> = db
                    .type_list(list_id)
                    .iter()
                    .filter_map(|&m| self.property_type(m, property))
                    .collect();
                if found.is_empty() {
                    None
                } else {
                    Some(db.intersection(found))
                }
            }
            _ => None,
        }
    }

    fn place_discriminant(&mut self, member: TypeId, property: Atom, value: TypeId) -> SolverResult<Placement> {
        if member == TypeId::ANY || member == TypeId::UNKNOWN {
            return Ok(Placement::Both);
        }
        let Some(prop_type) = self.property_type(member, property) else {
            return Ok(Placement::Alternate);
        };
        if prop_type == value {
            return Ok(Placement::Consequent);
        }
        if self.is_assignable(value, prop_type)? {
            Ok(Placement::Both)
        } else {
            Ok(Placement::Alternate)
        }
    }

    fn place_truthy(&self, member: TypeId) -> Placement {
        match self.db.lookup(member) {
            Some(TypeData::Literal(literal)) => {
                if literal.is_falsy() {
                    Placement::Alternate
                } else {
                    Placement::Consequent
                }
            }
            Some(TypeData::Intrinsic(
                IntrinsicKind::Null | IntrinsicKind::Undefined | IntrinsicKind::Void | IntrinsicKind::Never,
            )) => Placement::Alternate,
            Some(TypeData::Intrinsic(IntrinsicKind::Object | IntrinsicKind::Symbol))
            | Some(TypeData::Object(_) | TypeData::Array(_) | TypeData::Tuple(_) | TypeData::Function(_)) => {
                Placement::Consequent
            }
            _ => Placement::Both,
        }
    }

    fn place_nullish(&self, member: TypeId) -> Placement {
        match member {
            TypeId::NULL | TypeId::UNDEFINED | TypeId::VOID => Placement::Consequent,
            TypeId::ANY | TypeId::UNKNOWN => Placement::Split {
                consequent: self.db.union2(TypeId::NULL, TypeId::UNDEFINED),
                alternate: member,
            },
            _ => match self.db.lookup(member) {
                Some(TypeData::TypeParameter(info)) if info.constraint.is_none() => Placement::Both,
                _ => Placement::Alternate,
            },
        }
    }

    /// Properties of a union whose type in every member is a unit type
    /// (a literal, `null` or `undefined`) and which tell at least two
    /// members apart.
    pub fn find_discriminants(&self, union_type: TypeId) -> Vec<DiscriminantInfo> {
        let _span = span!(Level::TRACE, "find_discriminants", union_type = union_type.0).entered();
        let db = self.db;
        let members = union_members(db, union_type);
        if members.len() < 2 {
            return Vec::new();
        }

        let mut shapes = Vec::with_capacity(members.len());
        for &member in &members {
            match db.lookup(member) {
                Some(TypeData::Object(shape_id)) => shapes.push(db.object_shape(shape_id)),
                _ => return Vec::new(),
            }
        }

        let mut discriminants = Vec::new();
        for candidate in &shapes[0].properties {
            let mut variants = Vec::with_capacity(members.len());
            for (shape, &member) in shapes.iter().zip(&members) {
                match shape.find_property(candidate.name) {
                    Some(prop) if !prop.optional && self.is_unit(prop.type_id) => {
                        variants.push((prop.type_id, member));
                    }
                    _ => break,
                }
            }
            if variants.len() != members.len() {
                continue;
            }
            let first = variants[0].0;
            if variants.iter().any(|&(value, _)| value != first) {
                trace!(property = candidate.name.0, "found discriminant");
                discriminants.push(DiscriminantInfo {
                    property_name: candidate.name,
                    variants,
                });
            }
        }
        discriminants
    }

    fn is_unit(&self, type_id: TypeId) -> bool {
        matches!(type_id, TypeId::NULL | TypeId::UNDEFINED)
            || matches!(self.db.lookup(type_id), Some(TypeData::Literal(_)))
    }

    /// `x!`: remove `null` and `undefined`.
    pub fn non_nullable(&self, type_id: TypeId) -> TypeId {
        let members: Vec<TypeId> = union_members(self.db, type_id)
            .into_iter()
            .filter(|&m| m != TypeId::NULL && m != TypeId::UNDEFINED)
            .collect();
        self.db.union(members)
    }
}

/// Narrow `source` under `guard` with default options and no resolver.
pub fn narrow(db: &dyn TypeDatabase, source: TypeId, guard: &TypeGuard) -> SolverResult<NarrowingResult> {
    NarrowingContext::new(db).narrow(source, guard)
}

#[cfg(test)]
#[path = "../tests/narrowing_tests.rs"]
mod tests;
