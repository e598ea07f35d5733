//! Hash-consing arena for type descriptors.
//!
//! Every constructor normalizes its input (flattening, sorting, absorbing
//! literals into primitives, merging object intersections) before looking it
//! up, so two structurally equal types always share a `TypeId` and equality
//! is an integer compare.
//!
//! Ids come from a single sequential table, so `TypeId` order is creation
//! order. Union and intersection member lists are sorted by id, which makes
//! the canonical member order the order in which members were first built.

use crate::types::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};
use tyshape_common::interner::{Atom, Interner};

const TYPE_LIST_INLINE: usize = 8;

/// Upper bound on the member product when distributing an intersection over
/// union members. Larger products keep the intersection unreduced.
const INTERSECTION_DISTRIBUTION_LIMIT: usize = 64;

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PrimitiveClass {
    String,
    Number,
    Boolean,
    Bigint,
    Symbol,
    Null,
    Undefined,
}

struct TypeTable {
    key_to_id: FxHashMap<TypeData, TypeId>,
    id_to_key: Vec<TypeData>,
}

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }

        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }

        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Arc<[T]> {
        self.items
            .get(id as usize)
            .unwrap_or(&self.items[0])
            .clone()
    }
}

struct ValueInterner<T> {
    items: Vec<Arc<T>>,
    map: FxHashMap<Arc<T>, u32>,
}

impl<T> ValueInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }

        let arc = Arc::new(value);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }
}

/// Type interning table.
/// Thread-safe via `RwLock` for concurrent access.
pub struct TypeInterner {
    /// String interner for property names, parameter names and string literals
    pub string_interner: Interner,
    types: RwLock<TypeTable>,
    type_lists: RwLock<SliceInterner<TypeId>>,
    tuple_lists: RwLock<SliceInterner<TupleElement>>,
    template_lists: RwLock<SliceInterner<TemplateSpan>>,
    object_shapes: RwLock<ValueInterner<ObjectShape>>,
    function_shapes: RwLock<ValueInterner<FunctionShape>>,
    references: RwLock<ValueInterner<TypeReference>>,
    conditional_types: RwLock<ValueInterner<ConditionalType>>,
    mapped_types: RwLock<ValueInterner<MappedType>>,
}

impl TypeInterner {
    /// Intrinsics occupy the reserved ids below `TypeId::FIRST_USER`.
    pub fn new() -> Self {
        let mut table = TypeTable {
            key_to_id: FxHashMap::default(),
            id_to_key: Vec::with_capacity(256),
        };
        for kind in IntrinsicKind::ALL {
            let key = TypeData::Intrinsic(kind);
            let id = TypeId(table.id_to_key.len() as u32);
            debug_assert_eq!(id, kind.to_type_id());
            table.id_to_key.push(key.clone());
            table.key_to_id.insert(key, id);
        }
        for value in [true, false] {
            let key = TypeData::Literal(LiteralValue::Boolean(value));
            let id = TypeId(table.id_to_key.len() as u32);
            table.id_to_key.push(key.clone());
            table.key_to_id.insert(key, id);
        }
        debug_assert_eq!(table.id_to_key.len() as u32, TypeId::FIRST_USER);

        TypeInterner {
            string_interner: Interner::new(),
            types: RwLock::new(table),
            type_lists: RwLock::new(SliceInterner::new()),
            tuple_lists: RwLock::new(SliceInterner::new()),
            template_lists: RwLock::new(SliceInterner::new()),
            object_shapes: RwLock::new(ValueInterner::new()),
            function_shapes: RwLock::new(ValueInterner::new()),
            references: RwLock::new(ValueInterner::new()),
            conditional_types: RwLock::new(ValueInterner::new()),
            mapped_types: RwLock::new(ValueInterner::new()),
        }
    }

    /// Intern a string into an Atom.
    pub fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    /// Resolve an Atom back to its string value.
    pub fn resolve_atom(&self, atom: Atom) -> String {
        self.string_interner.resolve(atom).to_string()
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self.type_lists.read().unwrap_or_else(PoisonError::into_inner);
        lists.get(id.0)
    }

    pub fn tuple_list(&self, id: TupleListId) -> Arc<[TupleElement]> {
        let lists = self.tuple_lists.read().unwrap_or_else(PoisonError::into_inner);
        lists.get(id.0)
    }

    pub fn template_list(&self, id: TemplateLiteralId) -> Arc<[TemplateSpan]> {
        let lists = self
            .template_lists
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        lists.get(id.0)
    }

    pub fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        self.object_shapes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
            .unwrap_or_else(|| Arc::new(ObjectShape::default()))
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        self.function_shapes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
            .unwrap_or_else(|| Arc::new(FunctionShape::new(Vec::new(), TypeId::UNKNOWN)))
    }

    pub fn type_reference(&self, id: TypeReferenceId) -> Arc<TypeReference> {
        self.references
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(TypeReference {
                    name: Atom::NONE,
                    args: Vec::new(),
                })
            })
    }

    pub fn conditional_type(&self, id: ConditionalTypeId) -> Arc<ConditionalType> {
        self.conditional_types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(ConditionalType {
                    check_type: TypeId::NEVER,
                    extends_type: TypeId::NEVER,
                    true_type: TypeId::NEVER,
                    false_type: TypeId::NEVER,
                })
            })
    }

    pub fn mapped_type(&self, id: MappedTypeId) -> Arc<MappedType> {
        self.mapped_types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(MappedType {
                    type_param: TypeParamInfo::new(Atom::NONE),
                    constraint: TypeId::NEVER,
                    template: TypeId::NEVER,
                    optional_modifier: MappedModifier::Preserve,
                    readonly_modifier: MappedModifier::Preserve,
                })
            })
    }

    /// Intern a type key and return its `TypeId`.
    /// If the key already exists, returns the existing `TypeId`.
    pub fn intern(&self, key: TypeData) -> TypeId {
        if let TypeData::Intrinsic(kind) = key {
            return kind.to_type_id();
        }

        {
            let table = self.types.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(&id) = table.key_to_id.get(&key) {
                return id;
            }
        }

        let mut table = self.types.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(&id) = table.key_to_id.get(&key) {
            return id;
        }

        let id = TypeId(table.id_to_key.len() as u32);
        table.id_to_key.push(key.clone());
        table.key_to_id.insert(key, id);
        id
    }

    /// Look up the `TypeData` for a given `TypeId`.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        let table = self.types.read().unwrap_or_else(PoisonError::into_inner);
        table.id_to_key.get(id.0 as usize).cloned()
    }

    fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId {
        let mut lists = self.type_lists.write().unwrap_or_else(PoisonError::into_inner);
        TypeListId(lists.intern(members))
    }

    fn intern_tuple_list(&self, elements: Vec<TupleElement>) -> TupleListId {
        let mut lists = self.tuple_lists.write().unwrap_or_else(PoisonError::into_inner);
        TupleListId(lists.intern(elements))
    }

    fn intern_template_list(&self, spans: Vec<TemplateSpan>) -> TemplateLiteralId {
        let mut lists = self
            .template_lists
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        TemplateLiteralId(lists.intern(spans))
    }

    fn intern_object_shape(&self, shape: ObjectShape) -> ObjectShapeId {
        let mut shapes = self
            .object_shapes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        ObjectShapeId(shapes.intern(shape))
    }

    fn intern_function_shape(&self, shape: FunctionShape) -> FunctionShapeId {
        let mut shapes = self
            .function_shapes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        FunctionShapeId(shapes.intern(shape))
    }

    pub fn len(&self) -> usize {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .id_to_key
            .len()
    }

    /// Only the reserved intrinsics are present.
    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_USER as usize
    }

    // -- constructors --

    pub fn intrinsic(&self, kind: IntrinsicKind) -> TypeId {
        kind.to_type_id()
    }

    pub fn literal_string(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.intern(TypeData::Literal(LiteralValue::String(atom)))
    }

    pub fn literal_number(&self, value: f64) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Number(OrderedFloat(value))))
    }

    pub fn literal_boolean(&self, value: bool) -> TypeId {
        if value {
            TypeId::BOOLEAN_TRUE
        } else {
            TypeId::BOOLEAN_FALSE
        }
    }

    pub fn literal_bigint(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.intern(TypeData::Literal(LiteralValue::BigInt(atom)))
    }

    /// Flattens nested unions; `any` and `unknown` absorb, `never` vanishes.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.union_from_iter(members)
    }

    pub fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union_from_iter([left, right])
    }

    fn union_from_iter<I>(&self, members: I) -> TypeId
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut iter = members.into_iter();
        let Some(first) = iter.next() else {
            return TypeId::NEVER;
        };
        let Some(second) = iter.next() else {
            return first;
        };

        let mut flat: TypeListBuffer = SmallVec::new();
        self.push_union_member(&mut flat, first);
        self.push_union_member(&mut flat, second);
        for member in iter {
            self.push_union_member(&mut flat, member);
        }

        self.normalize_union(flat)
    }

    fn push_union_member(&self, flat: &mut TypeListBuffer, member: TypeId) {
        if let Some(TypeData::Union(inner)) = self.lookup(member) {
            let members = self.type_list(inner);
            flat.extend(members.iter().copied());
        } else {
            flat.push(member);
        }
    }

    fn normalize_union(&self, mut flat: TypeListBuffer) -> TypeId {
        flat.sort_by_key(|id| id.0);
        flat.dedup();

        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        if flat.contains(&TypeId::UNKNOWN) {
            return TypeId::UNKNOWN;
        }
        flat.retain(|id| *id != TypeId::NEVER);

        // true | false is boolean
        if flat.contains(&TypeId::BOOLEAN_TRUE) && flat.contains(&TypeId::BOOLEAN_FALSE) {
            flat.retain(|id| *id != TypeId::BOOLEAN_TRUE && *id != TypeId::BOOLEAN_FALSE);
            flat.push(TypeId::BOOLEAN);
            flat.sort_by_key(|id| id.0);
            flat.dedup();
        }

        // "a" | string collapses to string.
        self.absorb_literals_into_primitives(&mut flat);

        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => {
                let list_id = self.intern_type_list(flat.into_vec());
                self.intern(TypeData::Union(list_id))
            }
        }
    }

    fn absorb_literals_into_primitives(&self, flat: &mut TypeListBuffer) {
        let has_string = flat.contains(&TypeId::STRING);
        let has_number = flat.contains(&TypeId::NUMBER);
        let has_boolean = flat.contains(&TypeId::BOOLEAN);
        let has_bigint = flat.contains(&TypeId::BIGINT);
        if !(has_string || has_number || has_boolean || has_bigint) {
            return;
        }

        flat.retain(|id| match self.lookup(*id) {
            Some(TypeData::Literal(LiteralValue::String(_))) => !has_string,
            Some(TypeData::Literal(LiteralValue::Number(_))) => !has_number,
            Some(TypeData::Literal(LiteralValue::Boolean(_))) => !has_boolean,
            Some(TypeData::Literal(LiteralValue::BigInt(_))) => !has_bigint,
            Some(TypeData::TemplateLiteral(_)) => !has_string,
            _ => true,
        });
    }

    /// Disjoint primitives collapse to `never`; all-object members merge.
    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        self.intersection_from_iter(members)
    }

    pub fn intersection2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.intersection_from_iter([left, right])
    }

    fn intersection_from_iter<I>(&self, members: I) -> TypeId
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut iter = members.into_iter();
        let Some(first) = iter.next() else {
            return TypeId::UNKNOWN;
        };
        let Some(second) = iter.next() else {
            return first;
        };

        let mut flat: TypeListBuffer = SmallVec::new();
        self.push_intersection_member(&mut flat, first);
        self.push_intersection_member(&mut flat, second);
        for member in iter {
            self.push_intersection_member(&mut flat, member);
        }

        self.normalize_intersection(flat)
    }

    fn push_intersection_member(&self, flat: &mut TypeListBuffer, member: TypeId) {
        if let Some(TypeData::Intersection(inner)) = self.lookup(member) {
            let members = self.type_list(inner);
            flat.extend(members.iter().copied());
        } else {
            flat.push(member);
        }
    }

    fn normalize_intersection(&self, mut flat: TypeListBuffer) -> TypeId {
        flat.sort_by_key(|id| id.0);
        flat.dedup();

        if flat.contains(&TypeId::NEVER) {
            return TypeId::NEVER;
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        // `unknown` is the identity element
        flat.retain(|id| *id != TypeId::UNKNOWN);

        if let Some(distributed) = self.distribute_intersection_over_union(&flat) {
            return distributed;
        }
        if self.intersection_has_disjoint_primitives(&flat) {
            return TypeId::NEVER;
        }
        self.reduce_literals_against_primitives(&mut flat);

        if flat.is_empty() {
            return TypeId::UNKNOWN;
        }
        if flat.len() == 1 {
            return flat[0];
        }

        if let Some(merged) = self.try_merge_objects_in_intersection(&flat) {
            return merged;
        }

        let list_id = self.intern_type_list(flat.into_vec());
        self.intern(TypeData::Intersection(list_id))
    }

    /// `(A | B) & C` becomes `(A & C) | (B & C)`.
    fn distribute_intersection_over_union(&self, flat: &[TypeId]) -> Option<TypeId> {
        let mut product = 1usize;
        let mut has_union = false;
        let mut member_lists: Vec<Arc<[TypeId]>> = Vec::with_capacity(flat.len());
        for &member in flat {
            if let Some(TypeData::Union(list_id)) = self.lookup(member) {
                let members = self.type_list(list_id);
                product = product.saturating_mul(members.len());
                has_union = true;
                member_lists.push(members);
            } else {
                member_lists.push(Arc::from(vec![member]));
            }
        }
        if !has_union || product > INTERSECTION_DISTRIBUTION_LIMIT {
            return None;
        }

        let mut combinations: Vec<Vec<TypeId>> = vec![Vec::new()];
        for members in &member_lists {
            let mut next = Vec::with_capacity(combinations.len() * members.len());
            for combo in &combinations {
                for &member in members.iter() {
                    let mut extended = combo.clone();
                    extended.push(member);
                    next.push(extended);
                }
            }
            combinations = next;
        }

        let results: Vec<TypeId> = combinations
            .into_iter()
            .map(|combo| self.intersection(combo))
            .collect();
        Some(self.union(results))
    }

    fn primitive_class(&self, type_id: TypeId) -> Option<PrimitiveClass> {
        match type_id {
            TypeId::STRING => Some(PrimitiveClass::String),
            TypeId::NUMBER => Some(PrimitiveClass::Number),
            TypeId::BOOLEAN | TypeId::BOOLEAN_TRUE | TypeId::BOOLEAN_FALSE => {
                Some(PrimitiveClass::Boolean)
            }
            TypeId::BIGINT => Some(PrimitiveClass::Bigint),
            TypeId::SYMBOL => Some(PrimitiveClass::Symbol),
            TypeId::NULL => Some(PrimitiveClass::Null),
            TypeId::UNDEFINED | TypeId::VOID => Some(PrimitiveClass::Undefined),
            _ => match self.lookup(type_id) {
                Some(TypeData::Literal(LiteralValue::String(_))) => Some(PrimitiveClass::String),
                Some(TypeData::Literal(LiteralValue::Number(_))) => Some(PrimitiveClass::Number),
                Some(TypeData::Literal(LiteralValue::BigInt(_))) => Some(PrimitiveClass::Bigint),
                Some(TypeData::TemplateLiteral(_)) => Some(PrimitiveClass::String),
                _ => None,
            },
        }
    }

    fn is_unit_literal(&self, type_id: TypeId) -> bool {
        type_id == TypeId::BOOLEAN_TRUE
            || type_id == TypeId::BOOLEAN_FALSE
            || matches!(self.lookup(type_id), Some(TypeData::Literal(_)))
    }

    /// `string & number`, `"a" & "b"`, `"a" & number` and `null & object`
    /// have no inhabitants.
    fn intersection_has_disjoint_primitives(&self, flat: &[TypeId]) -> bool {
        let mut class: Option<PrimitiveClass> = None;
        let mut literal: Option<TypeId> = None;
        let mut has_object = false;
        for &member in flat {
            let Some(member_class) = self.primitive_class(member) else {
                has_object |= member == TypeId::OBJECT
                    || matches!(
                        self.lookup(member),
                        Some(
                            TypeData::Object(_)
                                | TypeData::Array(_)
                                | TypeData::Tuple(_)
                                | TypeData::Function(_)
                        )
                    );
                continue;
            };
            match class {
                Some(existing) if existing != member_class => return true,
                _ => class = Some(member_class),
            }
            if self.is_unit_literal(member) {
                match literal {
                    Some(existing) if existing != member => return true,
                    _ => literal = Some(member),
                }
            }
        }
        has_object && matches!(class, Some(PrimitiveClass::Null | PrimitiveClass::Undefined))
    }

    /// `"a" & string` is `"a"`.
    fn reduce_literals_against_primitives(&self, flat: &mut TypeListBuffer) {
        let has_literal_of = |base: TypeId| {
            flat.iter().any(|&id| match self.lookup(id) {
                Some(TypeData::Literal(lit)) => lit.base_type() == base,
                _ => false,
            })
        };
        let drop_string = has_literal_of(TypeId::STRING);
        let drop_number = has_literal_of(TypeId::NUMBER);
        let drop_boolean = has_literal_of(TypeId::BOOLEAN);
        let drop_bigint = has_literal_of(TypeId::BIGINT);
        flat.retain(|id| match *id {
            TypeId::STRING => !drop_string,
            TypeId::NUMBER => !drop_number,
            TypeId::BOOLEAN => !drop_boolean,
            TypeId::BIGINT => !drop_bigint,
            _ => true,
        });
    }

    fn try_merge_objects_in_intersection(&self, members: &[TypeId]) -> Option<TypeId> {
        let mut objects: Vec<Arc<ObjectShape>> = Vec::with_capacity(members.len());
        for &member in members {
            match self.lookup(member) {
                Some(TypeData::Object(shape_id)) => objects.push(self.object_shape(shape_id)),
                _ => return None,
            }
        }

        let mut merged_props: Vec<PropertyInfo> = Vec::new();
        let mut string_index: Option<IndexSignature> = None;
        let mut number_index: Option<IndexSignature> = None;
        let mut origin = objects.first().and_then(|o| o.origin);

        for obj in &objects {
            if obj.origin != origin {
                origin = None;
            }
            for prop in &obj.properties {
                if let Some(existing) = merged_props.iter_mut().find(|p| p.name == prop.name) {
                    if existing.type_id != prop.type_id {
                        let both_units =
                            self.is_unit_literal(existing.type_id) && self.is_unit_literal(prop.type_id);
                        if both_units {
                            // Conflicting discriminants: no value inhabits the intersection.
                            return Some(TypeId::NEVER);
                        }
                        existing.type_id = self.intersection2(existing.type_id, prop.type_id);
                    }
                    // Required wins over optional, readonly is cumulative
                    existing.optional = existing.optional && prop.optional;
                    existing.readonly = existing.readonly || prop.readonly;
                } else {
                    merged_props.push(prop.clone());
                }
            }

            string_index = self.merge_index(string_index, obj.string_index.as_ref());
            number_index = self.merge_index(number_index, obj.number_index.as_ref());
        }

        Some(self.object_with_index(ObjectShape {
            properties: merged_props,
            string_index,
            number_index,
            origin,
        }))
    }

    fn merge_index(
        &self,
        current: Option<IndexSignature>,
        next: Option<&IndexSignature>,
    ) -> Option<IndexSignature> {
        match (current, next) {
            (None, None) => None,
            (Some(idx), None) => Some(idx),
            (None, Some(idx)) => Some(idx.clone()),
            (Some(a), Some(b)) => Some(IndexSignature {
                key_type: a.key_type,
                value_type: self.intersection2(a.value_type, b.value_type),
                readonly: a.readonly || b.readonly,
            }),
        }
    }

    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    pub fn tuple(&self, elements: Vec<TupleElement>) -> TypeId {
        let list_id = self.intern_tuple_list(elements);
        self.intern(TypeData::Tuple(list_id))
    }

    /// Intern an object type from its properties.
    ///
    /// Later duplicates of a property name replace earlier ones. Properties
    /// are stored sorted by name atom.
    pub fn object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        self.object_with_index(ObjectShape {
            properties,
            ..ObjectShape::default()
        })
    }

    pub fn object_with_index(&self, mut shape: ObjectShape) -> TypeId {
        canonicalize_properties(&mut shape.properties);
        let shape_id = self.intern_object_shape(shape);
        self.intern(TypeData::Object(shape_id))
    }

    pub fn function(&self, shape: FunctionShape) -> TypeId {
        let shape_id = self.intern_function_shape(shape);
        self.intern(TypeData::Function(shape_id))
    }

    pub fn type_param(&self, info: TypeParamInfo) -> TypeId {
        self.intern(TypeData::TypeParameter(info))
    }

    pub fn infer(&self, info: TypeParamInfo) -> TypeId {
        self.intern(TypeData::Infer(info))
    }

    pub fn reference(&self, name: Atom, args: Vec<TypeId>) -> TypeId {
        let id = {
            let mut refs = self.references.write().unwrap_or_else(PoisonError::into_inner);
            TypeReferenceId(refs.intern(TypeReference { name, args }))
        };
        self.intern(TypeData::Reference(id))
    }

    pub fn conditional(&self, conditional: ConditionalType) -> TypeId {
        let id = {
            let mut types = self
                .conditional_types
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            ConditionalTypeId(types.intern(conditional))
        };
        self.intern(TypeData::Conditional(id))
    }

    pub fn mapped(&self, mapped: MappedType) -> TypeId {
        let id = {
            let mut types = self
                .mapped_types
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            MappedTypeId(types.intern(mapped))
        };
        self.intern(TypeData::Mapped(id))
    }

    pub fn keyof(&self, operand: TypeId) -> TypeId {
        self.intern(TypeData::KeyOf(operand))
    }

    pub fn index_access(&self, object: TypeId, index: TypeId) -> TypeId {
        self.intern(TypeData::IndexAccess(object, index))
    }

    /// Intern a template literal type.
    ///
    /// Adjacent text spans are merged and empty text spans dropped; a
    /// template with no type spans is just a string literal.
    pub fn template_literal(&self, spans: Vec<TemplateSpan>) -> TypeId {
        let mut normalized: Vec<TemplateSpan> = Vec::with_capacity(spans.len());
        let mut pending = String::new();
        for span in spans {
            match span {
                TemplateSpan::Text(atom) => {
                    pending.push_str(&self.string_interner.resolve(atom));
                }
                TemplateSpan::Type(type_id) => {
                    if !pending.is_empty() {
                        normalized.push(TemplateSpan::Text(self.intern_string(&pending)));
                        pending.clear();
                    }
                    normalized.push(TemplateSpan::Type(type_id));
                }
            }
        }
        if normalized.is_empty() {
            return self.literal_string(&pending);
        }
        if !pending.is_empty() {
            normalized.push(TemplateSpan::Text(self.intern_string(&pending)));
        }
        let list_id = self.intern_template_list(normalized);
        self.intern(TypeData::TemplateLiteral(list_id))
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort properties by name and keep the last declaration of each name.
fn canonicalize_properties(properties: &mut Vec<PropertyInfo>) {
    // Stable sort keeps declaration order among equal names; reversing
    // before dedup keeps the last declaration.
    properties.reverse();
    properties.sort_by_key(|p| p.name);
    properties.dedup_by_key(|p| p.name);
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
