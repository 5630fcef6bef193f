//!
//! The contract fuzzer filters.
//!

use std::collections::HashSet;

///
/// The contract fuzzer filters.
///
#[derive(Debug, Default)]
pub struct Filters {
    /// The target contract name filters.
    contract_filters: HashSet<String>,
    /// The test name filters.
    test_filters: HashSet<String>,
}

impl Filters {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(contract_filters: Vec<String>, test_filters: Vec<String>) -> Self {
        Self {
            contract_filters: contract_filters.into_iter().collect(),
            test_filters: test_filters.into_iter().collect(),
        }
    }

    ///
    /// Check if the contract name is compatible with the filters.
    ///
    pub fn check_contract(&self, name: &str) -> bool {
        self.contract_filters.is_empty()
            || self
                .contract_filters
                .iter()
                .any(|filter| name.contains(filter.as_str()))
    }

    ///
    /// Check if the test name is compatible with the filters.
    ///
    pub fn check_test(&self, name: &str) -> bool {
        self.test_filters.is_empty()
            || self
                .test_filters
                .iter()
                .any(|filter| name.contains(filter.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::Filters;

    #[test]
    fn empty_filters_pass_everything() {
        let filters = Filters::default();
        assert!(filters.check_contract("Token"));
        assert!(filters.check_test("Token.fuzz_supply_is_constant()"));
    }

    #[test]
    fn filters_match_substrings() {
        let filters = Filters::new(vec!["Tok".to_owned()], vec!["supply".to_owned()]);
        assert!(filters.check_contract("Token"));
        assert!(!filters.check_contract("Vault"));
        assert!(filters.check_test("Token.fuzz_supply_is_constant()"));
        assert!(!filters.check_test("Token.fuzz_balances_add_up()"));
    }
}
