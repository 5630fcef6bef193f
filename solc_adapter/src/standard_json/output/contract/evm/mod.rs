//!
//! The `solc --standard-json` output contract EVM artifacts.
//!

pub mod bytecode;

use serde::Deserialize;

use self::bytecode::Bytecode;

///
/// The `solc --standard-json` output contract EVM artifacts.
///
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evm {
    /// The deploy bytecode.
    #[serde(default)]
    pub bytecode: Option<Bytecode>,
}
