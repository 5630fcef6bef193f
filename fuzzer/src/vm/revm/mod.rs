//!
//! The REVM adapter.
//!

pub mod type_conversions;

use revm::db::CacheDB;
use revm::db::EmptyDB;
use revm::primitives::AccountInfo;
use revm::primitives::Bytes;
use revm::primitives::ExecutionResult;
use revm::primitives::HaltReason;
use revm::primitives::Output;
use revm::primitives::SpecId;
use revm::primitives::TxKind;
use revm::primitives::B256;
use revm::primitives::U256;
use revm::Evm;

use crate::vm::execution_result::CallOutcome;
use crate::vm::execution_result::RevertReason;

use self::type_conversions::abi_address_to_revm_address;
use self::type_conversions::revm_address_to_abi_address;

///
/// The chain state captured by `snapshot`.
///
#[derive(Debug, Clone)]
struct Snapshot {
    /// The cached database.
    db: CacheDB<EmptyDB>,
    /// The block number at the time of the snapshot.
    block_number: U256,
    /// The block timestamp at the time of the snapshot.
    block_timestamp: U256,
}

///
/// REVM instance with its internal state.
///
/// One instance backs one fuzzing worker for the whole campaign; sequences
/// are isolated from each other via `snapshot`/`rollback` over the cached
/// database.
///
pub struct EvmEnv {
    /// REVM internal state.
    evm: Evm<'static, (), CacheDB<EmptyDB>>,
    /// The snapshot restored by `rollback`.
    snapshot: Option<Snapshot>,
    /// The per-transaction gas limit.
    transaction_gas_limit: u64,
}

impl EvmEnv {
    /// The simulated chain identifier.
    const CHAIN_ID: u64 = 1;

    /// The genesis block number.
    const GENESIS_BLOCK_NUMBER: u64 = 1;

    /// The genesis block timestamp.
    const GENESIS_BLOCK_TIMESTAMP: u64 = 1_700_000_000;

    /// The simulated account balance.
    const ACCOUNT_BALANCE: u128 = u128::MAX;

    /// The deployed code size limit, raised far above EIP-170 so that large
    /// test contracts remain deployable.
    const CONTRACT_CODE_SIZE_LIMIT: usize = 0x0010_0000;

    ///
    /// A shortcut constructor.
    ///
    /// Funds every simulated account at genesis.
    ///
    pub fn new(
        accounts: &[ethabi::Address],
        block_gas_limit: u64,
        transaction_gas_limit: u64,
    ) -> Self {
        let mut db = CacheDB::new(EmptyDB::default());
        for account in accounts.iter() {
            db.insert_account_info(
                abi_address_to_revm_address(account),
                AccountInfo {
                    balance: U256::from(Self::ACCOUNT_BALANCE),
                    ..AccountInfo::default()
                },
            );
        }

        let evm = Evm::builder()
            .with_db(db)
            .with_spec_id(SpecId::CANCUN)
            .modify_cfg_env(|cfg| {
                cfg.chain_id = Self::CHAIN_ID;
                cfg.limit_contract_code_size = Some(Self::CONTRACT_CODE_SIZE_LIMIT);
            })
            .modify_block_env(|block| {
                block.number = U256::from(Self::GENESIS_BLOCK_NUMBER);
                block.timestamp = U256::from(Self::GENESIS_BLOCK_TIMESTAMP);
                block.gas_limit = U256::from(block_gas_limit);
                block.basefee = U256::ZERO;
                block.difficulty = U256::ZERO;
                block.prevrandao = Some(B256::ZERO);
            })
            .build();

        Self {
            evm,
            snapshot: None,
            transaction_gas_limit,
        }
    }

    ///
    /// Runs a deploy transaction and returns the deployed address.
    ///
    /// Target contracts must deploy cleanly, so every non-address outcome is
    /// an error.
    ///
    pub fn deploy(
        &mut self,
        name: &str,
        deployer: &ethabi::Address,
        init_code: Vec<u8>,
    ) -> anyhow::Result<ethabi::Address> {
        self.prepare_transaction(deployer, TxKind::Create, init_code, 0);
        let result = self.evm.transact_commit().map_err(|error| {
            anyhow::anyhow!("Deploy transaction error for `{name}`: {error:?}")
        })?;

        match result {
            ExecutionResult::Success {
                output: Output::Create(_, Some(address)),
                ..
            } => Ok(revm_address_to_abi_address(&address)),
            ExecutionResult::Success { .. } => {
                anyhow::bail!("Deploy transaction for `{name}` produced no address")
            }
            ExecutionResult::Revert { output, .. } => anyhow::bail!(
                "Deploy of `{name}` reverted with {}",
                RevertReason::decode(output.as_ref()),
            ),
            ExecutionResult::Halt { reason, .. } => {
                anyhow::bail!("Deploy of `{name}` halted with {reason:?}")
            }
        }
    }

    ///
    /// Runs a call transaction, committing its state changes.
    ///
    pub fn call(
        &mut self,
        sender: &ethabi::Address,
        address: &ethabi::Address,
        calldata: Vec<u8>,
        value: u128,
    ) -> anyhow::Result<CallOutcome> {
        self.prepare_transaction(
            sender,
            TxKind::Call(abi_address_to_revm_address(address)),
            calldata,
            value,
        );
        let result = self
            .evm
            .transact_commit()
            .map_err(|error| anyhow::anyhow!("Call transaction error: {error:?}"))?;
        Ok(Self::classify(result))
    }

    ///
    /// Runs a call transaction without committing, so that test functions
    /// cannot perturb the fuzzed state.
    ///
    pub fn view_call(
        &mut self,
        sender: &ethabi::Address,
        address: &ethabi::Address,
        calldata: Vec<u8>,
    ) -> anyhow::Result<CallOutcome> {
        self.prepare_transaction(
            sender,
            TxKind::Call(abi_address_to_revm_address(address)),
            calldata,
            0,
        );
        let result_and_state = self
            .evm
            .transact()
            .map_err(|error| anyhow::anyhow!("Simulated call error: {error:?}"))?;
        Ok(Self::classify(result_and_state.result))
    }

    ///
    /// Advances the simulated block.
    ///
    pub fn advance_block(&mut self, number_delay: u32, timestamp_delay: u32) {
        let block = self.evm.block_mut();
        block.number += U256::from(number_delay);
        block.timestamp += U256::from(timestamp_delay);
    }

    ///
    /// Captures the chain state for later `rollback` calls.
    ///
    pub fn snapshot(&mut self) {
        let block_number = self.evm.block().number;
        let block_timestamp = self.evm.block().timestamp;
        self.snapshot = Some(Snapshot {
            db: self.evm.db_mut().clone(),
            block_number,
            block_timestamp,
        });
    }

    ///
    /// Restores the chain state captured by the last `snapshot`.
    ///
    pub fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.as_ref() {
            *self.evm.db_mut() = snapshot.db.clone();
            let block = self.evm.block_mut();
            block.number = snapshot.block_number;
            block.timestamp = snapshot.block_timestamp;
        }
    }

    ///
    /// Sets up the transaction environment for the next execution.
    ///
    /// The nonce is left unset, which disables the nonce check; the gas price
    /// is zero so that simulated accounts are never drained by gas costs.
    ///
    fn prepare_transaction(
        &mut self,
        caller: &ethabi::Address,
        kind: TxKind,
        data: Vec<u8>,
        value: u128,
    ) {
        let gas_limit = self.transaction_gas_limit;
        let tx = self.evm.tx_mut();
        tx.caller = abi_address_to_revm_address(caller);
        tx.transact_to = kind;
        tx.data = Bytes::from(data);
        tx.value = U256::from(value);
        tx.gas_limit = gas_limit;
        tx.gas_price = U256::ZERO;
        tx.gas_priority_fee = None;
        tx.nonce = None;
    }

    ///
    /// Classifies an execution result into a call outcome.
    ///
    fn classify(result: ExecutionResult) -> CallOutcome {
        match result {
            ExecutionResult::Success {
                output, gas_used, ..
            } => CallOutcome::Success {
                output: output.into_data().to_vec(),
                gas_used,
            },
            ExecutionResult::Revert { output, gas_used } => CallOutcome::Revert {
                reason: RevertReason::decode(output.as_ref()),
                gas_used,
            },
            ExecutionResult::Halt { reason, gas_used } => CallOutcome::Halt {
                invalid_opcode: matches!(reason, HaltReason::InvalidFEOpcode),
                reason: format!("{reason:?}"),
                gas_used,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EvmEnv;
    use crate::utils;
    use crate::vm::execution_result::CallOutcome;

    fn env() -> (EvmEnv, ethabi::Address) {
        let deployer = utils::parse_address("0x30000").expect("Always valid");
        let env = EvmEnv::new(&[deployer], 125_000_000, 12_500_000);
        (env, deployer)
    }

    /// `PUSH1 0x00 PUSH1 0x00 RETURN`: deploys a contract with empty runtime code.
    const EMPTY_RUNTIME_INIT: [u8; 5] = [0x60, 0x00, 0x60, 0x00, 0xf3];

    #[test]
    fn deploys_and_calls() {
        let (mut env, deployer) = env();
        let address = env
            .deploy("Empty", &deployer, EMPTY_RUNTIME_INIT.to_vec())
            .expect("Deploy failed");
        assert_ne!(address, ethabi::Address::zero());

        let outcome = env
            .call(&deployer, &address, vec![0xab, 0xcd], 0)
            .expect("Call failed");
        match outcome {
            CallOutcome::Success { output, .. } => assert!(output.is_empty()),
            other => panic!("Unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn a_reverting_constructor_is_a_deploy_error() {
        let (mut env, deployer) = env();
        // `PUSH1 0x00 PUSH1 0x00 REVERT`
        let error = env
            .deploy("Reverting", &deployer, vec![0x60, 0x00, 0x60, 0x00, 0xfd])
            .expect_err("Deploy must fail");
        assert!(error.to_string().contains("reverted"));
    }

    #[test]
    fn an_invalid_opcode_halts_the_deploy() {
        let (mut env, deployer) = env();
        let error = env
            .deploy("Invalid", &deployer, vec![0xfe])
            .expect_err("Deploy must fail");
        assert!(error.to_string().contains("halted"));
    }

    #[test]
    fn rollback_restores_the_create_nonce() {
        let (mut env, deployer) = env();
        env.deploy("First", &deployer, EMPTY_RUNTIME_INIT.to_vec())
            .expect("Deploy failed");
        env.snapshot();

        let second = env
            .deploy("Second", &deployer, EMPTY_RUNTIME_INIT.to_vec())
            .expect("Deploy failed");
        env.rollback();
        let second_again = env
            .deploy("Second", &deployer, EMPTY_RUNTIME_INIT.to_vec())
            .expect("Deploy failed");
        assert_eq!(second, second_again);
    }

    #[test]
    fn view_calls_do_not_commit() {
        let (mut env, deployer) = env();
        env.snapshot();
        let address = utils::parse_address("0x50000").expect("Always valid");

        // A plain value-free call to an empty account; committing it would
        // only bump the sender nonce, so probe via the deploy address instead.
        env.view_call(&deployer, &address, Vec::new())
            .expect("Simulated call failed");
        let first = env
            .deploy("First", &deployer, EMPTY_RUNTIME_INIT.to_vec())
            .expect("Deploy failed");

        env.rollback();
        env.call(&deployer, &address, Vec::new(), 0)
            .expect("Call failed");
        let second = env
            .deploy("First", &deployer, EMPTY_RUNTIME_INIT.to_vec())
            .expect("Deploy failed");

        // The committed call consumed a nonce; the simulated one did not.
        assert_ne!(first, second);
    }
}
