//!
//! The compilation configuration.
//!

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

///
/// The compilation configuration.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CompilationConfig {
    /// The path to the `solc` executable. Looked up in `${PATH}` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solc_path: Option<PathBuf>,
    /// The Solidity source glob patterns.
    pub sources: Vec<String>,
    /// Whether the `solc` optimizer is enabled.
    pub optimizer: bool,
    /// The `solc` optimizer run count.
    pub optimizer_runs: u32,
    /// The target EVM version, passed through to `solc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<String>,
}

impl Default for CompilationConfig {
    fn default() -> Self {
        Self {
            solc_path: None,
            sources: vec!["contracts/**/*.sol".to_owned()],
            optimizer: false,
            optimizer_runs: 200,
            evm_version: None,
        }
    }
}
