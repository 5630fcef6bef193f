//!
//! The `solc --standard-json` input settings.
//!

pub mod optimizer;
pub mod selection;

use serde::Serialize;

use self::optimizer::Optimizer;
use self::selection::Selection;

///
/// The `solc --standard-json` input settings.
///
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// The target EVM version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<String>,
    /// The optimizer settings.
    pub optimizer: Optimizer,
    /// The output selection.
    pub output_selection: Selection,
}

impl Settings {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(
        evm_version: Option<String>,
        optimizer: Optimizer,
        output_selection: Selection,
    ) -> Self {
        Self {
            evm_version,
            optimizer,
            output_selection,
        }
    }
}
