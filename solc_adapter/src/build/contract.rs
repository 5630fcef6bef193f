//!
//! The compiled contract build artifact.
//!

use crate::standard_json::output::contract::Contract as StandardJsonOutputContract;

///
/// The compiled contract build artifact consumed by the fuzzer.
///
#[derive(Debug, Clone)]
pub struct ContractBuild {
    /// The contract name.
    pub name: String,
    /// The source file path.
    pub path: String,
    /// The parsed contract ABI.
    pub abi: ethabi::Contract,
    /// The deploy bytecode.
    pub bytecode: Vec<u8>,
}

impl ContractBuild {
    ///
    /// Converts a `solc --standard-json` output contract into a build artifact.
    ///
    /// Returns `None` for contracts without deploy bytecode, that is,
    /// interfaces and abstract contracts.
    ///
    pub fn try_from_standard_json(
        path: String,
        name: String,
        contract: StandardJsonOutputContract,
    ) -> anyhow::Result<Option<Self>> {
        let object = match contract.evm.and_then(|evm| evm.bytecode) {
            Some(bytecode) => bytecode.object,
            None => return Ok(None),
        };
        if object.is_empty() {
            return Ok(None);
        }

        // Hexadecimal bytecode only contains `[0-9a-f]`, so an underscore can
        // only come from a `__$...$__` library placeholder.
        if object.contains("__") {
            anyhow::bail!(
                "Contract `{path}:{name}` contains unlinked library references; \
                 deploy-time library linking is not supported",
            );
        }

        let bytecode = hex::decode(object.strip_prefix("0x").unwrap_or(object.as_str()))
            .map_err(|error| {
                anyhow::anyhow!("Contract `{path}:{name}` bytecode is invalid hex: {error}")
            })?;

        let abi_json = contract
            .abi
            .ok_or_else(|| anyhow::anyhow!("Contract `{path}:{name}` is missing its ABI"))?;
        let abi: ethabi::Contract = serde_json::from_value(abi_json).map_err(|error| {
            anyhow::anyhow!("Contract `{path}:{name}` ABI parsing error: {error}")
        })?;

        Ok(Some(Self {
            name,
            path,
            abi,
            bytecode,
        }))
    }

    ///
    /// The fully qualified `path:Name` identifier.
    ///
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.path, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::ContractBuild;
    use crate::standard_json::output::contract::Contract;

    fn contract_json(object: &str) -> Contract {
        serde_json::from_value(serde_json::json!({
            "abi": [
                {
                    "inputs": [],
                    "name": "fuzz_never_false",
                    "outputs": [ { "internalType": "bool", "name": "", "type": "bool" } ],
                    "stateMutability": "view",
                    "type": "function"
                }
            ],
            "evm": { "bytecode": { "object": object } }
        }))
        .expect("Parsing failed")
    }

    #[test]
    fn builds_a_contract_with_bytecode() {
        let build = ContractBuild::try_from_standard_json(
            "contracts/Token.sol".to_owned(),
            "Token".to_owned(),
            contract_json("6080604052"),
        )
        .expect("Conversion failed")
        .expect("Bytecode is present");

        assert_eq!(build.full_name().as_str(), "contracts/Token.sol:Token");
        assert_eq!(build.bytecode, vec![0x60, 0x80, 0x60, 0x40, 0x52]);
        assert!(build.abi.function("fuzz_never_false").is_ok());
    }

    #[test]
    fn skips_an_interface() {
        let build = ContractBuild::try_from_standard_json(
            "contracts/IToken.sol".to_owned(),
            "IToken".to_owned(),
            contract_json(""),
        )
        .expect("Conversion failed");
        assert!(build.is_none());
    }

    #[test]
    fn rejects_unlinked_bytecode() {
        let result = ContractBuild::try_from_standard_json(
            "contracts/Token.sol".to_owned(),
            "Token".to_owned(),
            contract_json("6080__$fb58009a6b1ecea3b9d99bedd645df4ec3$__604052"),
        );
        assert!(result.is_err());
    }
}
