//!
//! The `solc --standard-json` input language.
//!

use serde::Serialize;

///
/// The `solc --standard-json` input language.
///
#[derive(Debug, Clone, Copy, Serialize)]
pub enum Language {
    /// The Solidity language.
    Solidity,
}
