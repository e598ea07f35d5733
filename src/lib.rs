//! tyshape: a structural type system core.
//!
//! The heavy lifting lives in `tyshape-solver`; this crate re-exports it and
//! adds the process-level pieces a host needs: tracing setup and loading
//! [`SolverOptions`] from JSON.
//!
//! ```ignore
//! use tyshape::{TypeId, TypeInterner, is_assignable};
//!
//! tyshape::tracing_config::init_tracing();
//! let interner = TypeInterner::new();
//! let hello = interner.literal_string("hello");
//! assert!(is_assignable(&interner, hello, TypeId::STRING));
//! ```

pub mod config;
pub mod tracing_config;

pub use config::{load_options, parse_options};
pub use tyshape_common::limits;
pub use tyshape_solver::*;

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;
