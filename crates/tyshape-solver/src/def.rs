//! Named definitions and reference resolution.
//!
//! `TypeData::Reference(name, args)` is resolved through a [`TypeResolver`].
//! The solver ships [`DefinitionStore`], a concurrent registry of generic
//! type aliases, interfaces and classes, and [`NoopResolver`] for callers
//! that only build anonymous structural types.
//!
//! | Kind | Expansion | Nominal |
//! |------|-----------|---------|
//! | TypeAlias | Always expand | No |
//! | Interface | Expand on use | No |
//! | Class | Expand on use | Only for `instanceof` narrowing |

use crate::types::{TypeId, TypeParamInfo};
use dashmap::DashMap;
use tracing::trace;
use tyshape_common::interner::Atom;

/// Kind of named definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefKind {
    /// `type Foo<T> = T | null`
    TypeAlias,
    /// `interface Point { x: number; y: number }`
    Interface,
    /// `class User { ... }`; the body is the instance shape.
    Class,
}

/// A registered definition: generic parameters plus the body they scope over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionInfo {
    pub kind: DefKind,
    pub name: Atom,
    pub type_params: Vec<TypeParamInfo>,
    pub body: TypeId,
    /// For classes: the base class name.
    pub extends: Option<Atom>,
    /// For classes: `abstract class` (no direct construction).
    pub is_abstract: bool,
}

impl DefinitionInfo {
    pub fn type_alias(name: Atom, type_params: Vec<TypeParamInfo>, body: TypeId) -> Self {
        DefinitionInfo {
            kind: DefKind::TypeAlias,
            name,
            type_params,
            body,
            extends: None,
            is_abstract: false,
        }
    }

    pub fn interface(name: Atom, type_params: Vec<TypeParamInfo>, body: TypeId) -> Self {
        DefinitionInfo {
            kind: DefKind::Interface,
            ..Self::type_alias(name, type_params, body)
        }
    }

    pub fn class(name: Atom, instance_type: TypeId, extends: Option<Atom>) -> Self {
        DefinitionInfo {
            kind: DefKind::Class,
            extends,
            ..Self::type_alias(name, Vec::new(), instance_type)
        }
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }
}

/// Resolves named references for the relation and evaluation components.
pub trait TypeResolver {
    /// Look up the definition a `Reference` names.
    fn resolve_definition(&self, name: Atom) -> Option<DefinitionInfo>;

    /// Whether class `origin` is `ancestor` or derives from it.
    fn is_derived_from(&self, origin: Atom, ancestor: Atom) -> bool {
        origin == ancestor
    }
}

/// Resolver with no definitions. References stay opaque.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopResolver;

impl TypeResolver for NoopResolver {
    fn resolve_definition(&self, _name: Atom) -> Option<DefinitionInfo> {
        None
    }
}

/// Concurrent registry of named definitions.
///
/// Uses `DashMap` so a host may register and resolve from multiple threads.
#[derive(Default)]
pub struct DefinitionStore {
    definitions: DashMap<Atom, DefinitionInfo>,
}

impl DefinitionStore {
    pub fn new() -> Self {
        DefinitionStore {
            definitions: DashMap::new(),
        }
    }

    /// Register (or replace) a definition under its name.
    pub fn register(&self, info: DefinitionInfo) {
        trace!(name = info.name.0, kind = ?info.kind, "register definition");
        self.definitions.insert(info.name, info);
    }

    pub fn get(&self, name: Atom) -> Option<DefinitionInfo> {
        self.definitions.get(&name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: Atom) -> bool {
        self.definitions.contains_key(&name)
    }

    pub fn get_extends(&self, name: Atom) -> Option<Atom> {
        self.definitions.get(&name).and_then(|entry| entry.extends)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl TypeResolver for DefinitionStore {
    fn resolve_definition(&self, name: Atom) -> Option<DefinitionInfo> {
        self.get(name)
    }

    fn is_derived_from(&self, origin: Atom, ancestor: Atom) -> bool {
        let mut current = Some(origin);
        // Bounded walk; a malformed cyclic heritage never loops forever.
        for _ in 0..=self.definitions.len() {
            match current {
                Some(name) if name == ancestor => return true,
                Some(name) => current = self.get_extends(name),
                None => return false,
            }
        }
        false
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
