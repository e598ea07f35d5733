//! Common types and utilities for the tyshape crates.
//!
//! This crate provides the pieces shared by the solver and the facade:
//! - String interning (`Atom`, `Interner`)
//! - Centralized recursion and expansion limits

// String interning for property names and string literals
pub mod interner;
pub use interner::{Atom, Interner};

// Centralized limits and thresholds
pub mod limits;
