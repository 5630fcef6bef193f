//!
//! The project build.
//!

pub mod contract;

use std::collections::BTreeMap;

use crate::standard_json::output::Output as StandardJsonOutput;

use self::contract::ContractBuild;

///
/// The project build: every compiled contract keyed by its `path:Name`
/// identifier.
///
#[derive(Debug, Default)]
pub struct Build {
    /// The compiled contracts.
    pub contracts: BTreeMap<String, ContractBuild>,
    /// The compiler warnings, rendered.
    pub warnings: Vec<String>,
}

impl Build {
    ///
    /// Flattens a `solc --standard-json` output into a build.
    ///
    /// Compilation errors abort the conversion; warnings are carried along
    /// for the caller to log.
    ///
    pub fn try_from_standard_json(output: StandardJsonOutput) -> anyhow::Result<Self> {
        let errors = output.errors();
        if !errors.is_empty() {
            anyhow::bail!(
                "`solc` reported {} error(s):\n{}",
                errors.len(),
                errors
                    .iter()
                    .map(|error| error.to_string())
                    .collect::<Vec<String>>()
                    .join("\n"),
            );
        }

        let warnings = output
            .warnings()
            .into_iter()
            .map(|warning| warning.to_string())
            .collect();

        let mut contracts = BTreeMap::new();
        for (path, file_contracts) in output.contracts.into_iter() {
            for (name, contract) in file_contracts.into_iter() {
                if let Some(build) =
                    ContractBuild::try_from_standard_json(path.clone(), name, contract)?
                {
                    contracts.insert(build.full_name(), build);
                }
            }
        }

        Ok(Self {
            contracts,
            warnings,
        })
    }

    ///
    /// Resolves a contract by its `path:Name` identifier or its bare name.
    ///
    /// A bare name is accepted only when it is unambiguous across the build.
    ///
    pub fn find(&self, name: &str) -> anyhow::Result<&ContractBuild> {
        if let Some(build) = self.contracts.get(name) {
            return Ok(build);
        }

        let matches: Vec<&ContractBuild> = self
            .contracts
            .values()
            .filter(|build| build.name == name)
            .collect();
        match matches.as_slice() {
            [] => anyhow::bail!("Contract `{name}` is not present in the build"),
            [build] => Ok(build),
            _ => anyhow::bail!(
                "Contract name `{name}` is ambiguous; use one of: {}",
                matches
                    .iter()
                    .map(|build| build.full_name())
                    .collect::<Vec<String>>()
                    .join(", "),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Build;
    use crate::standard_json::output::Output;

    fn output_with_two_files() -> Output {
        serde_json::from_value(serde_json::json!({
            "contracts": {
                "contracts/A.sol": {
                    "Token": {
                        "abi": [],
                        "evm": { "bytecode": { "object": "6001" } }
                    }
                },
                "contracts/B.sol": {
                    "Token": {
                        "abi": [],
                        "evm": { "bytecode": { "object": "6002" } }
                    },
                    "Vault": {
                        "abi": [],
                        "evm": { "bytecode": { "object": "6003" } }
                    }
                }
            }
        }))
        .expect("Parsing failed")
    }

    #[test]
    fn resolves_unambiguous_bare_names() {
        let build = Build::try_from_standard_json(output_with_two_files()).expect("Build failed");
        assert_eq!(build.find("Vault").expect("Lookup failed").bytecode, vec![0x60, 0x03]);
    }

    #[test]
    fn rejects_ambiguous_bare_names() {
        let build = Build::try_from_standard_json(output_with_two_files()).expect("Build failed");
        assert!(build.find("Token").is_err());
        assert!(build.find("contracts/A.sol:Token").is_ok());
    }

    #[test]
    fn fails_on_compiler_errors() {
        let output: Output = serde_json::from_value(serde_json::json!({
            "errors": [ { "severity": "error", "message": "Expected `;`." } ]
        }))
        .expect("Parsing failed");
        assert!(Build::try_from_standard_json(output).is_err());
    }
}
