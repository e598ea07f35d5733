//! String interner for property names, type parameter names and string literals.
//!
//! Strings are interned into a single shared table and referred to by `Atom`
//! handles. Comparisons become integer comparisons.
//!
//! Atoms are allocated sequentially, so ordering atoms numerically orders the
//! strings by the time they were first interned. The solver relies on this to
//! keep object properties in a canonical order that matches declaration order.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

/// Handle for a string stored in an [`Interner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty string, always at index 0.
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

#[derive(Default)]
struct InternerState {
    map: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

/// Thread-safe string interner.
///
/// A single table guarded by an `RwLock`: lookups of already-interned strings
/// only take the read lock.
pub struct Interner {
    state: RwLock<InternerState>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    pub fn new() -> Self {
        let empty: Arc<str> = Arc::from("");
        let mut state = InternerState::default();
        state.strings.push(empty.clone());
        state.map.insert(empty, Atom::NONE);
        Interner {
            state: RwLock::new(state),
        }
    }

    /// Returns the existing atom when `s` was seen before.
    pub fn intern(&self, s: &str) -> Atom {
        if s.is_empty() {
            return Atom::NONE;
        }

        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(&atom) = state.map.get(s) {
                return atom;
            }
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have raced us between the two locks.
        if let Some(&atom) = state.map.get(s) {
            return atom;
        }

        let atom = Atom(state.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s);
        state.strings.push(owned.clone());
        state.map.insert(owned, atom);
        atom
    }

    /// Unknown atoms resolve to the empty string.
    /// Returns the empty string if the atom is out of bounds.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .strings
            .get(atom.0 as usize)
            .cloned()
            .unwrap_or_else(|| Arc::from(""))
    }

    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.strings.get(atom.0 as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .strings
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}
