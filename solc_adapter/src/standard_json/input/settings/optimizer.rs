//!
//! The `solc --standard-json` input settings optimizer.
//!

use serde::Serialize;

///
/// The `solc --standard-json` input settings optimizer.
///
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimizer {
    /// Whether the optimizer is enabled.
    pub enabled: bool,
    /// The optimization step count.
    pub runs: u32,
}

impl Optimizer {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(enabled: bool, runs: u32) -> Self {
        Self { enabled, runs }
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(false, 200)
    }
}
