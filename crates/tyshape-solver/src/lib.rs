//! Structural type solver.
//!
//! Types are immutable `TypeData` values hash-consed by a [`TypeInterner`]
//! into `TypeId` handles, so structural equality is id equality. On top of
//! that representation the solver provides:
//!
//! - **Relations**: structural subtyping with coinductive cycle handling,
//!   and assignability with object-literal freshness
//! - **Narrowing**: splitting a union under `typeof`, `in`, `instanceof`,
//!   discriminant, predicate and truthiness guards
//! - **Inference**: binding generic signatures from explicit or call-site
//!   arguments through an `ena` union-find context
//! - **Evaluation**: conditional types with `infer`, mapped types,
//!   template literal expansion, `keyof`, indexed access and the standard
//!   utility types
//!
//! Every query is bounded by a `RecursionGuard` and reports exhaustion as
//! `SolverError::RecursionLimitExceeded`.

mod binder;
mod class_hierarchy;
pub mod compat;
mod db;
pub mod def;
mod diagnostics;
pub mod errors;
mod evaluate;
pub mod evaluate_rules;
mod format;
mod infer;
mod instantiate;
mod intern;
mod narrowing;
pub mod options;
pub mod recursion;
mod subtype;
mod subtype_explain;
mod subtype_rules;
pub mod types;
pub mod visitor;
pub mod widening;

pub use binder::*;
pub use class_hierarchy::ClassTypeBuilder;
pub use compat::*;
pub use db::TypeDatabase;
pub use def::*;
pub use diagnostics::SubtypeFailureReason;
pub use errors::{PropertyPath, SolverError, SolverResult};
pub use evaluate::*;
pub use evaluate_rules::conditional::evaluate_conditional;
pub use evaluate_rules::index_access::evaluate_index_access;
pub use evaluate_rules::keyof::evaluate_keyof;
pub use evaluate_rules::mapped::expand_mapped;
pub use evaluate_rules::template_literal::expand_template_literal;
pub use evaluate_rules::utility::{evaluate_utility, register_utility_types, utility_definitions};
pub use format::{TypeFormatter, format_type};
pub use infer::*;
pub use instantiate::{
    TypeInstantiator, TypeSubstitution, instantiate_type, instantiate_type_with_depth,
    instantiate_with_args,
};
pub use intern::TypeInterner;
pub use narrowing::*;
pub use options::{LiteralWidening, SolverOptions};
pub use recursion::{RecursionGuard, RecursionProfile, RecursionResult};
pub use subtype::{SubtypeChecker, SubtypeResult, is_subtype_of};
pub use types::*;
pub use widening::*;

// Most test modules are loaded by their source files via #[path].
#[cfg(test)]
#[path = "../tests/property_tests.rs"]
mod property_tests;
#[cfg(test)]
#[path = "../tests/concurrency_tests.rs"]
mod concurrency_tests;
