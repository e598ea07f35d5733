//! Typed failures returned by solver operations.
//!
//! Every public operation reports failure through `SolverResult`; nothing in
//! the solver panics on malformed or pathological input.

use crate::recursion::RecursionProfile;
use crate::types::TypeId;
use thiserror::Error;

/// Property path from the outermost compared type down to the conflict,
/// e.g. `["address", "zip"]`.
pub type PropertyPath = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("type {source_type} is not assignable to {target_type} at `{}`", render_path(.path))]
    StructuralMismatch {
        path: PropertyPath,
        source_type: TypeId,
        target_type: TypeId,
    },

    #[error("object literal may only specify known properties, `{property}` does not exist")]
    ExcessProperty { property: String },

    #[error("type {offending} does not satisfy the constraint {constraint} of `{param}`")]
    ConstraintViolation {
        param: String,
        constraint: TypeId,
        offending: TypeId,
    },

    #[error("could not infer `{name}` and it has no default")]
    UnresolvedInference { name: String },

    #[error("property `{property}` does not exist on type {object}")]
    PropertyNotFound { property: String, object: TypeId },

    #[error("{profile} exceeded its limit of {limit}")]
    RecursionLimitExceeded {
        profile: RecursionProfile,
        limit: u32,
    },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub fn recursion_limit(profile: RecursionProfile, limit: u32) -> Self {
        SolverError::RecursionLimitExceeded { profile, limit }
    }

    pub fn is_recursion_limit(&self) -> bool {
        matches!(self, SolverError::RecursionLimitExceeded { .. })
    }
}

fn render_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}
