//! Class instance and constructor type construction.
//!
//! A class instance type is the base class's instance properties merged
//! with the class's own members, own members winning. Own members are
//! stamped with the class as their declaring `parent_id`, which is what
//! private and protected members are compared by. The instance shape also
//! carries the class name as its nominal `origin`, used only by
//! `instanceof` narrowing.
//!
//! The constructor side (static members) is a separate object type whose
//! `prototype` property is the instance type.
//!
//! Cyclic heritage is not rejected here; the store's ancestry walk is
//! bounded, so a cycle only yields a truncated property set.

use crate::compat::{CompatChecker, Freshness};
use crate::db::TypeDatabase;
use crate::def::{DefinitionInfo, DefinitionStore, TypeResolver};
use crate::errors::SolverResult;
use crate::types::{ObjectShape, PropertyInfo, TypeData, TypeId};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use tyshape_common::interner::Atom;

pub struct ClassTypeBuilder<'a> {
    db: &'a dyn TypeDatabase,
    store: &'a DefinitionStore,
}

impl<'a> ClassTypeBuilder<'a> {
    pub fn new(db: &'a dyn TypeDatabase, store: &'a DefinitionStore) -> Self {
        ClassTypeBuilder { db, store }
    }

    /// Build the instance type of class `name` and register it, with its
    /// base, in the store.
    pub fn create_instance_type(
        &self,
        name: Atom,
        base: Option<Atom>,
        own_members: Vec<PropertyInfo>,
    ) -> TypeId {
        self.build_instance(name, base, own_members, false)
    }

    /// Like [`create_instance_type`](Self::create_instance_type) for an
    /// `abstract class`.
    pub fn create_abstract_instance_type(
        &self,
        name: Atom,
        base: Option<Atom>,
        own_members: Vec<PropertyInfo>,
    ) -> TypeId {
        self.build_instance(name, base, own_members, true)
    }

    fn build_instance(
        &self,
        name: Atom,
        base: Option<Atom>,
        own_members: Vec<PropertyInfo>,
        is_abstract: bool,
    ) -> TypeId {
        let base_props = match base {
            Some(base_name) => self.instance_properties(base_name),
            None => Vec::new(),
        };
        let properties = merge_properties(base_props, own_members, name);
        let instance = self.db.object_with_index(ObjectShape {
            properties,
            origin: Some(name),
            ..ObjectShape::default()
        });
        trace!(class = name.0, base = ?base.map(|b| b.0), ?instance, "class instance type");

        self.store
            .register(DefinitionInfo::class(name, instance, base).with_abstract(is_abstract));
        instance
    }

    /// Instance properties of a registered class, inherited members
    /// included.
    fn instance_properties(&self, class: Atom) -> Vec<PropertyInfo> {
        let Some(definition) = self.store.resolve_definition(class) else {
            debug!(class = class.0, "base class is not registered");
            return Vec::new();
        };
        match self.db.lookup(definition.body) {
            Some(TypeData::Object(shape_id)) => self.db.object_shape(shape_id).properties.clone(),
            _ => Vec::new(),
        }
    }

    /// Build the constructor type of a class: its static members plus a
    /// `prototype` property holding the instance type.
    pub fn create_constructor_type(
        &self,
        instance_type: TypeId,
        static_members: Vec<PropertyInfo>,
    ) -> TypeId {
        let mut properties = static_members;
        properties.push(PropertyInfo::readonly(
            self.db.intern_string("prototype"),
            instance_type,
        ));
        self.db.object(properties)
    }

    /// `class C implements I`: the instance type must be assignable to
    /// the interface type.
    pub fn check_implements(&self, instance_type: TypeId, interface: TypeId) -> SolverResult<()> {
        CompatChecker::with_resolver(self.db, self.store).check(
            instance_type,
            interface,
            Freshness::Regular,
        )
    }
}

/// Base properties overridden by own members. Every member is inherited,
/// private ones included; own members are stamped with `class`.
fn merge_properties(
    base: Vec<PropertyInfo>,
    own: Vec<PropertyInfo>,
    class: Atom,
) -> Vec<PropertyInfo> {
    let mut merged: FxHashMap<Atom, PropertyInfo> = FxHashMap::default();
    for prop in base {
        merged.insert(prop.name, prop);
    }
    for mut prop in own {
        prop.parent_id = Some(class);
        merged.insert(prop.name, prop);
    }
    // The interner sorts by name.
    merged.into_values().collect()
}

#[cfg(test)]
#[path = "../tests/class_hierarchy_tests.rs"]
mod tests;
