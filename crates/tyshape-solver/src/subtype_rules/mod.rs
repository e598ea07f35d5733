//! Subtype rules, one file per family of type kinds.
//!
//! Each file adds `pub(crate)` methods to `SubtypeChecker`; dispatch lives in
//! `subtype.rs`.

mod functions;
mod intrinsics;
mod literals;
pub(crate) mod objects;
mod tuples;
mod unions;
