//!
//! The test configuration.
//!

use serde::Deserialize;
use serde::Serialize;

///
/// The test configuration.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TestingConfig {
    /// Whether the campaign stops at the first failed test.
    pub stop_on_failed_test: bool,
    /// Whether test functions are discovered on all deployed contracts
    /// rather than only on the target contracts.
    pub test_all_contracts: bool,
    /// The property testing configuration.
    pub property_testing: PropertyTestingConfig,
    /// The assertion testing configuration.
    pub assertion_testing: AssertionTestingConfig,
    /// The optimization testing configuration.
    pub optimization_testing: OptimizationTestingConfig,
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            stop_on_failed_test: true,
            test_all_contracts: false,
            property_testing: PropertyTestingConfig::default(),
            assertion_testing: AssertionTestingConfig::default(),
            optimization_testing: OptimizationTestingConfig::default(),
        }
    }
}

///
/// The property testing configuration.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PropertyTestingConfig {
    /// Whether property tests are checked.
    pub enabled: bool,
    /// The name prefixes marking a function as a property test.
    pub test_prefixes: Vec<String>,
}

impl Default for PropertyTestingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            test_prefixes: vec!["fuzz_".to_owned()],
        }
    }
}

///
/// The assertion testing configuration.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AssertionTestingConfig {
    /// Whether assertion failures fail the campaign.
    pub enabled: bool,
    /// The `Panic(uint256)` codes treated as failures.
    /// The default covers `assert` only; compiler-inserted checks like
    /// arithmetic overflow (0x11) may be added here.
    pub panic_codes: Vec<u64>,
}

impl Default for AssertionTestingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            panic_codes: vec![0x01],
        }
    }
}

///
/// The optimization testing configuration.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct OptimizationTestingConfig {
    /// Whether optimization tests are maximized.
    pub enabled: bool,
    /// The name prefixes marking a function as an optimization test.
    pub test_prefixes: Vec<String>,
}

impl Default for OptimizationTestingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            test_prefixes: vec!["optimize_".to_owned()],
        }
    }
}
