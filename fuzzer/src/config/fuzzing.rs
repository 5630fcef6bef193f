//!
//! The fuzzing campaign configuration.
//!

use serde::Deserialize;
use serde::Serialize;

use crate::config::testing::TestingConfig;
use crate::utils;

///
/// The fuzzing campaign configuration.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FuzzingConfig {
    /// The number of parallel fuzzing workers.
    pub workers: usize,
    /// The number of call sequences a worker executes before resetting its
    /// chain state to the post-deployment snapshot.
    pub worker_reset_limit: usize,
    /// The maximum number of calls per generated sequence.
    pub call_sequence_length: usize,
    /// The total number of calls across all workers after which the campaign
    /// stops. Zero means unlimited.
    pub test_limit: u64,
    /// The campaign wall-clock budget in seconds. Zero means unlimited.
    pub timeout: u64,
    /// The number of candidate executions spent minimizing a failing sequence.
    pub shrink_limit: u64,
    /// The RNG seed. Derived from the system time when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// The corpus directory. Corpus persistence is disabled when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_directory: Option<String>,
    /// The names of the contracts to deploy and fuzz. An empty list selects
    /// every compiled contract with bytecode.
    pub target_contracts: Vec<String>,
    /// The simulated account deploying the target contracts.
    pub deployer_address: String,
    /// The simulated accounts transactions are sent from.
    pub sender_addresses: Vec<String>,
    /// The block gas limit of the simulated chain.
    pub block_gas_limit: u64,
    /// The gas limit of each generated transaction.
    pub transaction_gas_limit: u64,
    /// The maximum number of blocks a generated call may jump ahead.
    pub block_number_delay_max: u32,
    /// The maximum number of seconds a generated call may jump ahead.
    pub block_timestamp_delay_max: u32,
    /// The test configuration.
    pub testing: TestingConfig,
}

impl FuzzingConfig {
    ///
    /// Parses the deployer address.
    ///
    pub fn deployer_address(&self) -> anyhow::Result<ethabi::Address> {
        utils::parse_address(self.deployer_address.as_str())
            .map_err(|error| anyhow::anyhow!("`fuzzing.deployerAddress`: {error}"))
    }

    ///
    /// Parses the sender addresses.
    ///
    pub fn sender_addresses(&self) -> anyhow::Result<Vec<ethabi::Address>> {
        self.sender_addresses
            .iter()
            .map(|sender| {
                utils::parse_address(sender.as_str())
                    .map_err(|error| anyhow::anyhow!("`fuzzing.senderAddresses`: {error}"))
            })
            .collect()
    }
}

impl Default for FuzzingConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            worker_reset_limit: 50,
            call_sequence_length: 100,
            test_limit: 0,
            timeout: 0,
            shrink_limit: 5000,
            seed: None,
            corpus_directory: None,
            target_contracts: Vec::new(),
            deployer_address: "0x30000".to_owned(),
            sender_addresses: vec![
                "0x10000".to_owned(),
                "0x20000".to_owned(),
                "0x30000".to_owned(),
            ],
            block_gas_limit: 125_000_000,
            transaction_gas_limit: 12_500_000,
            block_number_delay_max: 60_480,
            block_timestamp_delay_max: 604_800,
            testing: TestingConfig::default(),
        }
    }
}
