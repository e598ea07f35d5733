//! Type representation for the structural solver.
//!
//! Types are represented as `TypeData` values interned into `TypeId` handles.
//! Two structurally identical types always intern to the same `TypeId`, so
//! structural equality is a `u32` comparison.
//!
//! Variable-length payloads (member lists, object shapes, signatures) are
//! interned separately and referenced from `TypeData` by small id newtypes,
//! which keeps `TypeData` itself cheap to clone and hash.

use serde::Serialize;
use std::fmt;
use tyshape_common::interner::Atom;

/// Interned handle for a type.
///
/// Ids are allocated in creation order. Unions sort their members by id, so
/// the canonical member order of a union is the order in which the members
/// were first constructed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const NEVER: TypeId = TypeId(0);
    pub const UNKNOWN: TypeId = TypeId(1);
    pub const ANY: TypeId = TypeId(2);
    pub const VOID: TypeId = TypeId(3);
    pub const UNDEFINED: TypeId = TypeId(4);
    pub const NULL: TypeId = TypeId(5);
    pub const BOOLEAN: TypeId = TypeId(6);
    pub const NUMBER: TypeId = TypeId(7);
    pub const STRING: TypeId = TypeId(8);
    pub const BIGINT: TypeId = TypeId(9);
    pub const SYMBOL: TypeId = TypeId(10);
    /// The non-primitive `object` type.
    pub const OBJECT: TypeId = TypeId(11);
    /// The literal `true`.
    pub const BOOLEAN_TRUE: TypeId = TypeId(12);
    /// The literal `false`.
    pub const BOOLEAN_FALSE: TypeId = TypeId(13);

    /// First id handed out for non-builtin types.
    pub const FIRST_USER: u32 = 14;

    /// Intrinsic types occupy the first fixed ids.
    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 <= Self::OBJECT.0
    }

    /// Built-in ids (intrinsics plus the two boolean literals).
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[inline]
    pub const fn is_nullish(self) -> bool {
        matches!(self.0, 3..=5)
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TypeId::NEVER => f.write_str("TypeId(never)"),
            TypeId::UNKNOWN => f.write_str("TypeId(unknown)"),
            TypeId::ANY => f.write_str("TypeId(any)"),
            TypeId::VOID => f.write_str("TypeId(void)"),
            TypeId::UNDEFINED => f.write_str("TypeId(undefined)"),
            TypeId::NULL => f.write_str("TypeId(null)"),
            TypeId::BOOLEAN => f.write_str("TypeId(boolean)"),
            TypeId::NUMBER => f.write_str("TypeId(number)"),
            TypeId::STRING => f.write_str("TypeId(string)"),
            TypeId::BIGINT => f.write_str("TypeId(bigint)"),
            TypeId::SYMBOL => f.write_str("TypeId(symbol)"),
            TypeId::OBJECT => f.write_str("TypeId(object)"),
            TypeId::BOOLEAN_TRUE => f.write_str("TypeId(true)"),
            TypeId::BOOLEAN_FALSE => f.write_str("TypeId(false)"),
            TypeId(raw) => write!(f, "TypeId({raw})"),
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Interned list of type ids (union / intersection members).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

/// Interned list of tuple elements.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleListId(pub u32);

/// Interned list of template literal spans.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TemplateLiteralId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeReferenceId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalTypeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappedTypeId(pub u32);

/// The structural payload behind a `TypeId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// Built-in primitive and top/bottom types.
    Intrinsic(IntrinsicKind),

    /// A single value type (`"a"`, `42`, `true`, `10n`).
    Literal(LiteralValue),

    /// Object shape with named properties and optional index signatures.
    Object(ObjectShapeId),

    /// `T[]`
    Array(TypeId),

    /// `[A, B?, ...C[]]`
    Tuple(TupleListId),

    /// `A | B`, normalized: flat, deduplicated, sorted by id.
    Union(TypeListId),

    /// `A & B`, normalized: flat, deduplicated, sorted by id.
    Intersection(TypeListId),

    /// `(a: A, b?: B, ...rest: C[]) => R`
    Function(FunctionShapeId),

    /// A generic type parameter `T extends C = D`.
    TypeParameter(TypeParamInfo),

    /// An `infer X` placeholder. Only meaningful inside a conditional type's
    /// `extends` clause.
    Infer(TypeParamInfo),

    /// Named reference `Name<Args>` resolved through a `TypeResolver`.
    Reference(TypeReferenceId),

    /// `C extends E ? T : F`
    Conditional(ConditionalTypeId),

    /// `{ [K in C]: Template }`
    Mapped(MappedTypeId),

    /// `keyof T`
    KeyOf(TypeId),

    /// `T[K]`
    IndexAccess(TypeId, TypeId),

    /// `` `prefix${A}middle${B}` ``
    TemplateLiteral(TemplateLiteralId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IntrinsicKind {
    Never,
    Unknown,
    Any,
    Void,
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Bigint,
    Symbol,
    Object,
}

impl IntrinsicKind {
    pub const ALL: [IntrinsicKind; 12] = [
        IntrinsicKind::Never,
        IntrinsicKind::Unknown,
        IntrinsicKind::Any,
        IntrinsicKind::Void,
        IntrinsicKind::Undefined,
        IntrinsicKind::Null,
        IntrinsicKind::Boolean,
        IntrinsicKind::Number,
        IntrinsicKind::String,
        IntrinsicKind::Bigint,
        IntrinsicKind::Symbol,
        IntrinsicKind::Object,
    ];

    pub const fn to_type_id(self) -> TypeId {
        match self {
            IntrinsicKind::Never => TypeId::NEVER,
            IntrinsicKind::Unknown => TypeId::UNKNOWN,
            IntrinsicKind::Any => TypeId::ANY,
            IntrinsicKind::Void => TypeId::VOID,
            IntrinsicKind::Undefined => TypeId::UNDEFINED,
            IntrinsicKind::Null => TypeId::NULL,
            IntrinsicKind::Boolean => TypeId::BOOLEAN,
            IntrinsicKind::Number => TypeId::NUMBER,
            IntrinsicKind::String => TypeId::STRING,
            IntrinsicKind::Bigint => TypeId::BIGINT,
            IntrinsicKind::Symbol => TypeId::SYMBOL,
            IntrinsicKind::Object => TypeId::OBJECT,
        }
    }

    /// Primitive kinds are the ones a value can inhabit without being an object.
    pub const fn is_primitive(self) -> bool {
        matches!(
            self,
            IntrinsicKind::Boolean
                | IntrinsicKind::Number
                | IntrinsicKind::String
                | IntrinsicKind::Bigint
                | IntrinsicKind::Symbol
                | IntrinsicKind::Null
                | IntrinsicKind::Undefined
                | IntrinsicKind::Void
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            IntrinsicKind::Never => "never",
            IntrinsicKind::Unknown => "unknown",
            IntrinsicKind::Any => "any",
            IntrinsicKind::Void => "void",
            IntrinsicKind::Undefined => "undefined",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::Number => "number",
            IntrinsicKind::String => "string",
            IntrinsicKind::Bigint => "bigint",
            IntrinsicKind::Symbol => "symbol",
            IntrinsicKind::Object => "object",
        }
    }
}

/// Float wrapper with bitwise equality so number literals can be hashed.
#[derive(Copy, Clone, Debug)]
pub struct OrderedFloat(pub f64);

impl OrderedFloat {
    fn canonical_bits(self) -> u64 {
        // 0.0 and -0.0 are the same literal type.
        if self.0 == 0.0 {
            0.0f64.to_bits()
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(Atom),
    Number(OrderedFloat),
    Boolean(bool),
    BigInt(Atom),
}

impl LiteralValue {
    /// The primitive this literal is a subtype of.
    pub const fn base_type(&self) -> TypeId {
        match self {
            LiteralValue::String(_) => TypeId::STRING,
            LiteralValue::Number(_) => TypeId::NUMBER,
            LiteralValue::Boolean(_) => TypeId::BOOLEAN,
            LiteralValue::BigInt(_) => TypeId::BIGINT,
        }
    }

    /// Whether the literal is a falsy runtime value.
    pub fn is_falsy(&self) -> bool {
        match self {
            // The empty string always interns to `Atom::NONE`.
            LiteralValue::String(atom) => atom.is_none(),
            LiteralValue::Number(n) => n.0 == 0.0 || n.0.is_nan(),
            LiteralValue::Boolean(b) => !b,
            LiteralValue::BigInt(_) => false,
        }
    }
}

/// Property visibility for class members.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub optional: bool,
    pub readonly: bool,
    pub visibility: Visibility,
    /// Declaring class for class members. Non-public members only relate to
    /// members with the same declaring class.
    pub parent_id: Option<Atom>,
}

impl PropertyInfo {
    pub fn new(name: Atom, type_id: TypeId) -> Self {
        PropertyInfo {
            name,
            type_id,
            optional: false,
            readonly: false,
            visibility: Visibility::Public,
            parent_id: None,
        }
    }

    pub fn opt(name: Atom, type_id: TypeId) -> Self {
        PropertyInfo {
            optional: true,
            ..Self::new(name, type_id)
        }
    }

    pub fn readonly(name: Atom, type_id: TypeId) -> Self {
        PropertyInfo {
            readonly: true,
            ..Self::new(name, type_id)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexSignature {
    pub key_type: TypeId,
    pub value_type: TypeId,
    pub readonly: bool,
}

/// Object type shape.
///
/// `properties` is kept sorted by name atom and free of duplicate names.
/// `origin` is an opaque nominal tag; it only participates in identity and
/// in `instanceof` narrowing, never in structural assignability.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ObjectShape {
    pub properties: Vec<PropertyInfo>,
    pub string_index: Option<IndexSignature>,
    pub number_index: Option<IndexSignature>,
    pub origin: Option<Atom>,
}

impl ObjectShape {
    pub fn find_property(&self, name: Atom) -> Option<&PropertyInfo> {
        self.properties
            .binary_search_by_key(&name, |p| p.name)
            .ok()
            .map(|idx| &self.properties[idx])
    }

    pub fn has_index_signature(&self) -> bool {
        self.string_index.is_some() || self.number_index.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub type_id: TypeId,
    pub name: Option<Atom>,
    pub optional: bool,
    /// A rest element (`...T[]`); `type_id` is the array type.
    pub rest: bool,
}

impl TupleElement {
    pub fn required(type_id: TypeId) -> Self {
        TupleElement {
            type_id,
            name: None,
            optional: false,
            rest: false,
        }
    }

    pub fn optional(type_id: TypeId) -> Self {
        TupleElement {
            optional: true,
            ..Self::required(type_id)
        }
    }

    pub fn rest(array_type: TypeId) -> Self {
        TupleElement {
            rest: true,
            ..Self::required(array_type)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Option<Atom>,
    pub type_id: TypeId,
    pub optional: bool,
    /// A rest parameter (`...args: T[]`); `type_id` is the array/tuple type.
    pub rest: bool,
}

impl ParamInfo {
    pub fn required(name: Option<Atom>, type_id: TypeId) -> Self {
        ParamInfo {
            name,
            type_id,
            optional: false,
            rest: false,
        }
    }

    pub fn optional(name: Option<Atom>, type_id: TypeId) -> Self {
        ParamInfo {
            optional: true,
            ..Self::required(name, type_id)
        }
    }

    pub fn rest(name: Option<Atom>, type_id: TypeId) -> Self {
        ParamInfo {
            rest: true,
            ..Self::required(name, type_id)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub type_params: Vec<TypeParamInfo>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

impl FunctionShape {
    pub fn new(params: Vec<ParamInfo>, return_type: TypeId) -> Self {
        FunctionShape {
            type_params: Vec::new(),
            params,
            return_type,
        }
    }

    /// Number of parameters a caller must supply.
    pub fn required_param_count(&self) -> usize {
        self.params
            .iter()
            .filter(|p| !p.optional && !p.rest)
            .count()
    }

    pub fn rest_param(&self) -> Option<&ParamInfo> {
        self.params.last().filter(|p| p.rest)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub constraint: Option<TypeId>,
    pub default: Option<TypeId>,
}

impl TypeParamInfo {
    pub fn new(name: Atom) -> Self {
        TypeParamInfo {
            name,
            constraint: None,
            default: None,
        }
    }

    pub fn with_constraint(mut self, constraint: TypeId) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn with_default(mut self, default: TypeId) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeReference {
    pub name: Atom,
    pub args: Vec<TypeId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalType {
    pub check_type: TypeId,
    pub extends_type: TypeId,
    pub true_type: TypeId,
    pub false_type: TypeId,
}

/// Modifier applied to a mapped type's optional / readonly flags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum MappedModifier {
    /// Copy the flag from the homomorphic source property.
    #[default]
    Preserve,
    /// `+?` / `+readonly`
    Add,
    /// `-?` / `-readonly`
    Remove,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappedType {
    /// The key parameter (`K` in `[K in C]`).
    pub type_param: TypeParamInfo,
    /// The key source (`C` in `[K in C]`).
    pub constraint: TypeId,
    /// Per-key property type, may reference `type_param`.
    pub template: TypeId,
    pub optional_modifier: MappedModifier,
    pub readonly_modifier: MappedModifier,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TemplateSpan {
    Text(Atom),
    Type(TypeId),
}
