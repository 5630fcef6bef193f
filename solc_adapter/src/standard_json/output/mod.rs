//!
//! The `solc --standard-json` output.
//!

pub mod contract;
pub mod error;

use std::collections::BTreeMap;

use serde::Deserialize;

use self::contract::Contract;
use self::error::Error;

///
/// The `solc --standard-json` output.
///
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    /// The compilation errors and warnings.
    #[serde(default)]
    pub errors: Vec<Error>,
    /// The contracts, keyed by source file path, then by contract name.
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, Contract>>,
}

impl Output {
    ///
    /// Returns the messages with the `error` severity.
    ///
    pub fn errors(&self) -> Vec<&Error> {
        self.errors
            .iter()
            .filter(|error| error.severity == "error")
            .collect()
    }

    ///
    /// Returns the messages with the `warning` severity.
    ///
    pub fn warnings(&self) -> Vec<&Error> {
        self.errors
            .iter()
            .filter(|error| error.severity == "warning")
            .collect()
    }
}
