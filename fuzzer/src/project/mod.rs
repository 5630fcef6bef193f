//!
//! The fuzzing project.
//!

pub mod function;

use std::collections::BTreeSet;

use solc_adapter::Build;
use solc_adapter::ContractBuild;

use crate::config::Config;
use crate::filters::Filters;

use self::function::FunctionHandle;

///
/// The fuzzing universe derived from a compiled build and the configuration:
/// the contracts to deploy, the functions to fuzz, and the discovered tests.
///
#[derive(Debug)]
pub struct Project {
    /// The contracts to deploy, in deterministic order.
    pub targets: Vec<ContractBuild>,
    /// The state-mutating call surface the generator draws from.
    pub fuzzed: Vec<FunctionHandle>,
    /// The discovered property tests.
    pub properties: Vec<FunctionHandle>,
    /// The discovered optimization tests.
    pub optimizations: Vec<FunctionHandle>,
    /// The tests excluded by the filters, reported as ignored.
    pub ignored: Vec<String>,
    /// The non-fatal findings to log.
    pub warnings: Vec<String>,
}

impl Project {
    ///
    /// Builds the fuzzing universe.
    ///
    /// The deploy set is the configured target contracts, or every compiled
    /// contract when none are named or when `testAllContracts` is set. The
    /// fuzzed call surface always comes from the named targets only; test
    /// discovery extends to the whole deploy set under `testAllContracts`.
    ///
    pub fn try_from_build(
        build: &Build,
        config: &Config,
        filters: &Filters,
    ) -> anyhow::Result<Self> {
        let testing = &config.fuzzing.testing;
        let mut warnings = Vec::new();

        let named_targets: Vec<&ContractBuild> = config
            .fuzzing
            .target_contracts
            .iter()
            .map(|name| build.find(name.as_str()))
            .collect::<anyhow::Result<Vec<&ContractBuild>>>()?;

        let mut targets: Vec<&ContractBuild> =
            if named_targets.is_empty() || testing.test_all_contracts {
                build.contracts.values().collect()
            } else {
                named_targets.clone()
            };
        targets.retain(|contract| filters.check_contract(contract.name.as_str()));

        // Contracts pulled in implicitly must deploy without arguments;
        // explicitly named ones fail hard below.
        targets.retain(|contract| {
            let parameterless = contract
                .abi
                .constructor
                .as_ref()
                .map(|constructor| constructor.inputs.is_empty())
                .unwrap_or(true);
            if !parameterless && !named_targets.iter().any(|named| named.full_name() == contract.full_name()) {
                warnings.push(format!(
                    "Contract `{}` is skipped: its constructor takes arguments",
                    contract.full_name(),
                ));
            }
            parameterless || named_targets.iter().any(|named| named.full_name() == contract.full_name())
        });
        for contract in named_targets.iter() {
            if let Some(constructor) = contract.abi.constructor.as_ref() {
                if !constructor.inputs.is_empty() {
                    anyhow::bail!(
                        "Target contract `{}` has a constructor with arguments; \
                         deployment would not be deterministic across workers",
                        contract.full_name(),
                    );
                }
            }
        }

        if targets.is_empty() {
            anyhow::bail!("No target contracts left to fuzz after filtering");
        }

        let mut bare_names = BTreeSet::new();
        for contract in targets.iter() {
            if !bare_names.insert(contract.name.as_str()) {
                anyhow::bail!(
                    "Contract name `{}` is not unique across the deploy set; \
                     narrow `fuzzing.targetContracts` down",
                    contract.name,
                );
            }
        }

        let fuzz_surface: Vec<&ContractBuild> = if named_targets.is_empty() {
            targets.clone()
        } else {
            targets
                .iter()
                .copied()
                .filter(|contract| {
                    named_targets
                        .iter()
                        .any(|named| named.full_name() == contract.full_name())
                })
                .collect()
        };

        let mut properties = Vec::new();
        let mut optimizations = Vec::new();
        let mut ignored = Vec::new();
        let mut test_selectors = BTreeSet::new();

        for contract in targets.iter() {
            for function in contract.abi.functions() {
                let handle = FunctionHandle::new(contract.name.clone(), function.clone());

                let matches_property = testing.property_testing.enabled
                    && Self::matches_prefix(
                        function.name.as_str(),
                        testing.property_testing.test_prefixes.as_slice(),
                    );
                let matches_optimization = testing.optimization_testing.enabled
                    && Self::matches_prefix(
                        function.name.as_str(),
                        testing.optimization_testing.test_prefixes.as_slice(),
                    );

                match (matches_property, matches_optimization) {
                    (true, true) => anyhow::bail!(
                        "Test `{}` matches both a property and an optimization prefix",
                        handle.name(),
                    ),
                    (true, false) => {
                        Self::check_property_shape(&handle)?;
                        test_selectors.insert((contract.name.clone(), function.name.clone()));
                        if filters.check_test(handle.name().as_str()) {
                            properties.push(handle);
                        } else {
                            ignored.push(handle.name());
                        }
                    }
                    (false, true) => {
                        Self::check_optimization_shape(&handle)?;
                        test_selectors.insert((contract.name.clone(), function.name.clone()));
                        if filters.check_test(handle.name().as_str()) {
                            optimizations.push(handle);
                        } else {
                            ignored.push(handle.name());
                        }
                    }
                    (false, false) => {}
                }
            }
        }

        let mut fuzzed = Vec::new();
        for contract in fuzz_surface.iter() {
            for function in contract.abi.functions() {
                if test_selectors
                    .contains(&(contract.name.clone(), function.name.clone()))
                {
                    continue;
                }
                // View methods cannot change state, so fuzzing them only
                // burns the call budget.
                if matches!(
                    function.state_mutability,
                    ethabi::StateMutability::Pure | ethabi::StateMutability::View,
                ) {
                    continue;
                }
                fuzzed.push(FunctionHandle::new(contract.name.clone(), function.clone()));
            }
        }

        // The ABI function map is hash-ordered; sort so that a seed
        // reproduces the same campaign across runs.
        properties.sort_by_key(FunctionHandle::name);
        optimizations.sort_by_key(FunctionHandle::name);
        fuzzed.sort_by_key(FunctionHandle::name);

        if fuzzed.is_empty() {
            anyhow::bail!(
                "The target contracts expose no state-mutating functions; nothing to fuzz"
            );
        }
        if properties.is_empty() && optimizations.is_empty() && !testing.assertion_testing.enabled {
            anyhow::bail!(
                "No tests discovered: no function matches the configured prefixes \
                 and assertion testing is disabled"
            );
        }

        Ok(Self {
            targets: targets.into_iter().cloned().collect(),
            fuzzed,
            properties,
            optimizations,
            ignored,
            warnings,
        })
    }

    ///
    /// Resolves the fuzzed function a call was generated from, by contract
    /// name and selector.
    ///
    pub fn resolve_call(
        &self,
        call: &crate::sequence::call::Call,
    ) -> Option<&FunctionHandle> {
        self.fuzzed.iter().find(|handle| {
            handle.contract == call.contract
                && call.calldata.len() >= 4
                && handle.function.short_signature() == call.calldata[..4]
        })
    }

    ///
    /// Whether the function name carries one of the test prefixes.
    ///
    fn matches_prefix(name: &str, prefixes: &[String]) -> bool {
        prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }

    ///
    /// A property test takes no arguments and returns a single `bool`.
    ///
    /// A matching name with the wrong shape is a hard error: a silently
    /// skipped property test must not happen.
    ///
    fn check_property_shape(handle: &FunctionHandle) -> anyhow::Result<()> {
        let function = &handle.function;
        if !function.inputs.is_empty()
            || function.outputs.len() != 1
            || !matches!(function.outputs[0].kind, ethabi::ParamType::Bool)
        {
            anyhow::bail!(
                "Property test `{}` must take no arguments and return a single `bool`",
                handle.name(),
            );
        }
        Ok(())
    }

    ///
    /// An optimization test takes no arguments and returns a single integer.
    ///
    fn check_optimization_shape(handle: &FunctionHandle) -> anyhow::Result<()> {
        let function = &handle.function;
        if !function.inputs.is_empty()
            || function.outputs.len() != 1
            || !matches!(
                function.outputs[0].kind,
                ethabi::ParamType::Int(256) | ethabi::ParamType::Uint(256),
            )
        {
            anyhow::bail!(
                "Optimization test `{}` must take no arguments and return a single `int256`",
                handle.name(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use solc_adapter::Build;
    use solc_adapter::StandardJsonOutput;

    use crate::config::Config;
    use crate::filters::Filters;

    use super::Project;

    fn build() -> Build {
        let output: StandardJsonOutput = serde_json::from_value(serde_json::json!({
            "contracts": {
                "contracts/Token.sol": {
                    "Token": {
                        "abi": [
                            {
                                "inputs": [
                                    { "name": "to", "type": "address" },
                                    { "name": "amount", "type": "uint256" }
                                ],
                                "name": "transfer",
                                "outputs": [ { "name": "", "type": "bool" } ],
                                "stateMutability": "nonpayable",
                                "type": "function"
                            },
                            {
                                "inputs": [],
                                "name": "totalSupply",
                                "outputs": [ { "name": "", "type": "uint256" } ],
                                "stateMutability": "view",
                                "type": "function"
                            },
                            {
                                "inputs": [],
                                "name": "fuzz_supply_is_constant",
                                "outputs": [ { "name": "", "type": "bool" } ],
                                "stateMutability": "view",
                                "type": "function"
                            }
                        ],
                        "evm": { "bytecode": { "object": "6001" } }
                    }
                },
                "contracts/Helper.sol": {
                    "Helper": {
                        "abi": [
                            {
                                "inputs": [],
                                "name": "poke",
                                "outputs": [],
                                "stateMutability": "nonpayable",
                                "type": "function"
                            },
                            {
                                "inputs": [],
                                "name": "fuzz_helper_is_sane",
                                "outputs": [ { "name": "", "type": "bool" } ],
                                "stateMutability": "view",
                                "type": "function"
                            }
                        ],
                        "evm": { "bytecode": { "object": "6002" } }
                    }
                }
            }
        }))
        .expect("Parsing failed");
        Build::try_from_standard_json(output).expect("Build failed")
    }

    #[test]
    fn discovers_and_classifies_tests() {
        let config = Config::default();
        let project = Project::try_from_build(&build(), &config, &Filters::default())
            .expect("Project building failed");

        assert_eq!(project.targets.len(), 2);
        assert_eq!(project.properties.len(), 2);
        // `transfer` and `poke`; the view `totalSupply` and the tests are excluded.
        assert_eq!(project.fuzzed.len(), 2);
    }

    #[test]
    fn named_targets_restrict_discovery() {
        let mut config = Config::default();
        config.fuzzing.target_contracts = vec!["Token".to_owned()];
        let project = Project::try_from_build(&build(), &config, &Filters::default())
            .expect("Project building failed");

        assert_eq!(project.targets.len(), 1);
        assert_eq!(project.properties.len(), 1);
        assert_eq!(project.properties[0].name().as_str(), "Token.fuzz_supply_is_constant()");
    }

    #[test]
    fn test_all_contracts_extends_discovery_but_not_the_fuzz_surface() {
        let mut config = Config::default();
        config.fuzzing.target_contracts = vec!["Token".to_owned()];
        config.fuzzing.testing.test_all_contracts = true;
        let project = Project::try_from_build(&build(), &config, &Filters::default())
            .expect("Project building failed");

        assert_eq!(project.targets.len(), 2);
        assert_eq!(project.properties.len(), 2);
        assert_eq!(project.fuzzed.len(), 1);
        assert_eq!(project.fuzzed[0].name().as_str(), "Token.transfer(address,uint256)");
    }

    #[test]
    fn a_misshapen_property_test_is_an_error() {
        let output: StandardJsonOutput = serde_json::from_value(serde_json::json!({
            "contracts": {
                "contracts/Bad.sol": {
                    "Bad": {
                        "abi": [
                            {
                                "inputs": [ { "name": "x", "type": "uint256" } ],
                                "name": "fuzz_with_arguments",
                                "outputs": [ { "name": "", "type": "bool" } ],
                                "stateMutability": "view",
                                "type": "function"
                            },
                            {
                                "inputs": [],
                                "name": "poke",
                                "outputs": [],
                                "stateMutability": "nonpayable",
                                "type": "function"
                            }
                        ],
                        "evm": { "bytecode": { "object": "6001" } }
                    }
                }
            }
        }))
        .expect("Parsing failed");
        let build = Build::try_from_standard_json(output).expect("Build failed");

        let error = Project::try_from_build(&build, &Config::default(), &Filters::default())
            .expect_err("Project building must fail");
        assert!(error.to_string().contains("fuzz_with_arguments"));
    }

    #[test]
    fn filtered_tests_are_reported_as_ignored() {
        let filters = Filters::new(Vec::new(), vec!["supply".to_owned()]);
        let project = Project::try_from_build(&build(), &Config::default(), &filters)
            .expect("Project building failed");

        assert_eq!(project.properties.len(), 1);
        assert_eq!(project.ignored.len(), 1);
        assert_eq!(project.ignored[0].as_str(), "Helper.fuzz_helper_is_sane()");
    }
}
