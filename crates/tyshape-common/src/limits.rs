//! Centralized limits and thresholds for the type solver.
//!
//! These values are the defaults behind `SolverOptions`. Every recursive
//! algorithm in the solver reads its cap from the options, so a host can tune
//! them per call; the constants here only document the shipped defaults.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth for structural subtype checks.
///
/// Structural comparison of recursive types can legitimately nest deeply
/// before the coinductive cache finds the cycle, so this is the deepest of
/// the solver limits.
///
/// # TypeScript example
///
/// ```typescript
/// type Deep<T> = { next: Deep<{ wrap: T }> };
/// declare let a: Deep<string>;
/// declare let b: Deep<number>;
/// a = b; // every level produces a new pair, no cycle is ever re-entered
/// ```
pub const MAX_SUBTYPE_DEPTH: u32 = 100;

/// Maximum depth for type evaluation (conditional, mapped, indexed access,
/// alias expansion).
///
/// Exceeding it is reported as a recursion limit error, never truncated.
///
/// # TypeScript example
///
/// ```typescript
/// type InfiniteUnwrap<T> = T extends { inner: infer U } ? InfiniteUnwrap<U> : T;
/// ```
pub const MAX_EVALUATION_DEPTH: u32 = 50;

/// Maximum depth for generic type instantiation.
///
/// # TypeScript example
///
/// ```typescript
/// type Foo<T> = { value: Foo<Foo<T>> };
/// type Boom = Foo<string>;
/// ```
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum depth for shallow traversals (contains-infer checks and similar).
pub const MAX_TRAVERSAL_DEPTH: u32 = 64;

// =============================================================================
// Operation Counts
// =============================================================================

/// Maximum number of recursive entries a single guard accepts before it
/// bails out, independent of depth.
pub const MAX_GUARD_ITERATIONS: u32 = 100_000;

/// Maximum number of literals a template literal expansion may produce.
///
/// The Cartesian product of placeholder unions grows multiplicatively; past
/// this size the expansion is reported as exceeding the limit.
///
/// # TypeScript example
///
/// ```typescript
/// type Digit = "0" | "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9";
/// type Six = `${Digit}${Digit}${Digit}${Digit}${Digit}${Digit}`; // 1,000,000
/// ```
pub const TEMPLATE_LITERAL_EXPANSION_LIMIT: usize = 100_000;
