//! Depth, cycle and work bounds for recursive type walks.
//!
//! `SubtypeChecker` and `TypeEvaluator` each own a [`RecursionGuard`] keyed by
//! whatever identifies one step of their walk (a type pair, a type id).
//! Instantiation only needs a [`DepthCounter`], since substituting the same
//! type at several nesting levels is not a cycle.
//!
//! A guard refuses entry in three situations: the key is already on the
//! current path ([`RecursionResult::Cycle`]), the path is too deep, or the
//! guard has handed out too many entries overall. The defaults come from
//! [`RecursionProfile`]; `SolverOptions` can lower or raise the depth:
//!
//! ```ignore
//! let guard = RecursionGuard::new(options.max_evaluation_depth, limits::MAX_GUARD_ITERATIONS);
//! ```
//!
//! Debug builds panic when a guard is dropped with entries still open or when
//! `leave` is called for a key that was never entered.

use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;
use std::hash::Hash;
use tyshape_common::limits;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Which walk a guard protects; also names the walk in
/// `SolverError::RecursionLimitExceeded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecursionProfile {
    /// Pairwise structural comparison (depth 100).
    SubtypeCheck,
    /// Alias expansion and type operators (depth 50).
    TypeEvaluation,
    /// Substitution into a generic body (depth 50).
    TypeInstantiation,
    /// Read-only walks such as "does this contain a type parameter" (depth 64).
    ShallowTraversal,
    /// Cartesian product of template spans; only the iteration budget applies.
    TemplateExpansion,
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::SubtypeCheck => limits::MAX_SUBTYPE_DEPTH,
            Self::TypeEvaluation => limits::MAX_EVALUATION_DEPTH,
            Self::TypeInstantiation => limits::MAX_INSTANTIATION_DEPTH,
            Self::ShallowTraversal => limits::MAX_TRAVERSAL_DEPTH,
            Self::TemplateExpansion => 1,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::TemplateExpansion => limits::TEMPLATE_LITERAL_EXPANSION_LIMIT as u32,
            Self::Custom { max_iterations, .. } => max_iterations,
            _ => limits::MAX_GUARD_ITERATIONS,
        }
    }
}

impl fmt::Display for RecursionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubtypeCheck => f.write_str("subtype check"),
            Self::TypeEvaluation => f.write_str("type evaluation"),
            Self::TypeInstantiation => f.write_str("type instantiation"),
            Self::ShallowTraversal => f.write_str("type traversal"),
            Self::TemplateExpansion => f.write_str("template literal expansion"),
            Self::Custom { .. } => f.write_str("custom guard"),
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

/// Outcome of [`RecursionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already on the current path.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Visiting set plus depth and iteration counters.
///
/// Every `Entered` must be paired with a `leave` for the same key. Callers
/// that propagate errors with `?` compute the inner result, leave, and only
/// then apply `?`.
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    /// Depth inherited from an enclosing computation (e.g. an evaluator
    /// spawned from inside a subtype check).
    base_depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            base_depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Count from a depth inherited from an enclosing walk.
    pub fn with_base_depth(mut self, base_depth: u32) -> Self {
        self.base_depth = base_depth;
        self
    }

    /// Iterations are counted even for refused entries.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.base_depth + self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        if self.visiting.contains(&key) {
            return RecursionResult::Cycle;
        }

        self.visiting.insert(key);
        self.depth += 1;
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);

        debug_assert!(was_present, "leave() without a matching enter()");

        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` between `enter` and `leave`, or report why entry was refused.
    pub fn scope<T>(&mut self, key: K, f: impl FnOnce() -> T) -> Result<T, RecursionResult> {
        match self.enter(key) {
            RecursionResult::Entered => {
                let result = f();
                self.leave(key);
                Ok(result)
            }
            denied => Err(denied),
        }
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    /// Current depth, including the inherited base depth.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.base_depth + self.depth
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Sticky until [`reset`](Self::reset).
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    #[inline]
    pub fn mark_exceeded(&mut self) {
        self.exceeded = true;
    }

    pub fn reset(&mut self) {
        self.visiting.clear();
        self.depth = 0;
        self.iterations = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!("recursion guard dropped with {} unbalanced enter()", self.visiting.len());
        }
    }
}

// ---------------------------------------------------------------------------
// DepthCounter: depth-only guard (no cycle detection)
// ---------------------------------------------------------------------------

/// Depth-only bound, no visiting set.
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// `false` at the limit; the depth is unchanged and must not be left.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "leave() at depth 0");
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl Drop for DepthCounter {
    fn drop(&mut self) {
        if !std::thread::panicking() && self.depth > 0 {
            panic!("depth counter dropped at depth {}", self.depth);
        }
    }
}
