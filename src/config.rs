//! Loading [`SolverOptions`] from JSON.
//!
//! Keys are camelCase and every key is optional; missing keys keep the
//! defaults from `tyshape_common::limits`.
//!
//! ```json
//! {
//!   "maxSubtypeDepth": 64,
//!   "templateExpansionLimit": 5000,
//!   "literalWidening": "widen"
//! }
//! ```

use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::debug;
use tyshape_solver::SolverOptions;

pub fn parse_options(source: &str) -> Result<SolverOptions> {
    let options: SolverOptions =
        serde_json::from_str(source).context("failed to parse solver options JSON")?;
    validate(&options)?;
    Ok(options)
}

pub fn load_options(path: &Path) -> Result<SolverOptions> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read solver options: {}", path.display()))?;
    let options = parse_options(&source)
        .with_context(|| format!("invalid solver options: {}", path.display()))?;
    debug!(path = %path.display(), ?options, "loaded solver options");
    Ok(options)
}

/// A zero limit would make every non-trivial query fail immediately.
fn validate(options: &SolverOptions) -> Result<()> {
    let limits = [
        ("maxSubtypeDepth", options.max_subtype_depth),
        ("maxEvaluationDepth", options.max_evaluation_depth),
        ("maxInstantiationDepth", options.max_instantiation_depth),
        ("templateExpansionLimit", options.template_expansion_limit),
    ];
    for (key, value) in limits {
        if value == 0 {
            bail!("solver option '{}' must be greater than zero", key);
        }
    }
    Ok(())
}
