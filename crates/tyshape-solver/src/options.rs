//! Per-call solver configuration.

use serde::{Deserialize, Serialize};
use tyshape_common::limits;

/// Whether literal types inferred for a type parameter or an `infer`
/// placeholder keep their literal identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralWidening {
    /// `"test"` stays `"test"`.
    #[default]
    Preserve,
    /// `"test"` widens to `string`.
    Widen,
}

/// Limits and policies for a single solver invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverOptions {
    pub max_subtype_depth: u32,
    pub max_evaluation_depth: u32,
    pub max_instantiation_depth: u32,
    pub template_expansion_limit: u32,
    pub literal_widening: LiteralWidening,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            max_subtype_depth: limits::MAX_SUBTYPE_DEPTH,
            max_evaluation_depth: limits::MAX_EVALUATION_DEPTH,
            max_instantiation_depth: limits::MAX_INSTANTIATION_DEPTH,
            template_expansion_limit: limits::TEMPLATE_LITERAL_EXPANSION_LIMIT as u32,
            literal_widening: LiteralWidening::Preserve,
        }
    }
}

impl SolverOptions {
    pub fn with_literal_widening(mut self, widening: LiteralWidening) -> Self {
        self.literal_widening = widening;
        self
    }

    pub fn with_max_subtype_depth(mut self, depth: u32) -> Self {
        self.max_subtype_depth = depth;
        self
    }

    pub fn with_max_evaluation_depth(mut self, depth: u32) -> Self {
        self.max_evaluation_depth = depth;
        self
    }

    pub fn with_template_expansion_limit(mut self, limit: u32) -> Self {
        self.template_expansion_limit = limit;
        self
    }
}
