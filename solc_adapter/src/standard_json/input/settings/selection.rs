//!
//! The `solc --standard-json` input settings output selection.
//!

use std::collections::BTreeMap;

use serde::Serialize;

///
/// The `solc --standard-json` input settings output selection.
///
/// Maps file patterns to contract patterns to requested output artifacts.
///
#[derive(Debug, Serialize)]
pub struct Selection(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl Selection {
    ///
    /// The selection required by the fuzzer: the ABI and the deploy bytecode
    /// of every contract.
    ///
    pub fn new_required() -> Self {
        let mut outputs = BTreeMap::new();
        outputs.insert(
            "*".to_owned(),
            vec!["abi".to_owned(), "evm.bytecode.object".to_owned()],
        );

        let mut selection = BTreeMap::new();
        selection.insert("*".to_owned(), outputs);
        Self(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::Selection;

    #[test]
    fn serializes_the_wildcard_form() {
        let json = serde_json::to_value(Selection::new_required()).expect("Always valid");
        assert_eq!(
            json,
            serde_json::json!({ "*": { "*": ["abi", "evm.bytecode.object"] } }),
        );
    }
}
