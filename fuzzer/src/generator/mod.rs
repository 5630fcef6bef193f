//!
//! The call sequence generator.
//!

pub mod value;

use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use crate::project::function::FunctionHandle;
use crate::project::Project;
use crate::sequence::call::Call;
use crate::sequence::CallSequence;

///
/// The seeded per-worker generator.
///
/// Everything it produces is a pure function of the seed and the call
/// history, so a campaign is reproducible from its printed seed.
///
#[derive(Debug)]
pub struct Generator {
    /// The pseudorandom number generator. Not cryptographically secure.
    rng: SmallRng,
    /// The sender accounts.
    senders: Vec<ethabi::Address>,
    /// The deployed contract addresses, used as an address generation pool.
    contract_addresses: Vec<ethabi::Address>,
    /// The maximum generated sequence length.
    max_sequence_length: usize,
    /// The maximum block number delta per call.
    block_number_delay_max: u32,
    /// The maximum block timestamp delta per call.
    block_timestamp_delay_max: u32,
}

impl Generator {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(
        seed: u64,
        senders: Vec<ethabi::Address>,
        max_sequence_length: usize,
        block_number_delay_max: u32,
        block_timestamp_delay_max: u32,
    ) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            senders,
            contract_addresses: Vec::new(),
            max_sequence_length,
            block_number_delay_max,
            block_timestamp_delay_max,
        }
    }

    ///
    /// Adds a deployed contract address to the generation pool.
    ///
    pub fn register_address(&mut self, address: ethabi::Address) {
        self.contract_addresses.push(address);
    }

    ///
    /// Generates a fresh random call sequence.
    ///
    pub fn sequence(&mut self, project: &Project) -> CallSequence {
        let length = self.rng.gen_range(1..=self.max_sequence_length);
        let calls = (0..length).map(|_| self.call(project)).collect();
        CallSequence::new(calls)
    }

    ///
    /// Generates a single random call against the fuzzed surface.
    ///
    pub fn call(&mut self, project: &Project) -> Call {
        let index = self.rng.gen_range(0..project.fuzzed.len());
        let handle = project.fuzzed[index].clone();
        self.call_for(&handle)
    }

    ///
    /// Generates a call for the specified function.
    ///
    pub fn call_for(&mut self, handle: &FunctionHandle) -> Call {
        let tokens: Vec<ethabi::Token> = handle
            .function
            .inputs
            .iter()
            .map(|param| self.token(&param.kind))
            .collect();
        let calldata = handle
            .function
            .encode_input(tokens.as_slice())
            .expect("Always valid");

        let sender = self.senders[self.rng.gen_range(0..self.senders.len())];
        let value = if handle.is_payable() {
            self.value()
        } else {
            0
        };

        Call {
            contract: handle.contract.clone(),
            function: handle.function.name.clone(),
            sender,
            value,
            tokens,
            calldata,
            block_number_delay: self.delay(self.block_number_delay_max),
            block_timestamp_delay: self.delay(self.block_timestamp_delay_max),
        }
    }

    ///
    /// Mutates a corpus sequence: truncation, splicing with a fresh tail,
    /// argument regeneration, call replacement, or a swap.
    ///
    pub fn mutate(&mut self, seed: &CallSequence, project: &Project) -> CallSequence {
        let mut calls = seed.calls.clone();
        calls.truncate(self.max_sequence_length);
        if calls.is_empty() {
            return self.sequence(project);
        }

        match self.rng.gen_range(0..5_u32) {
            0 => {
                let length = self.rng.gen_range(1..=calls.len());
                calls.truncate(length);
            }
            1 => {
                let budget = self.max_sequence_length.saturating_sub(calls.len());
                if budget > 0 {
                    let tail = self.rng.gen_range(1..=budget);
                    for _ in 0..tail {
                        calls.push(self.call(project));
                    }
                }
            }
            2 => {
                let index = self.rng.gen_range(0..calls.len());
                if let Some(handle) = project.resolve_call(&calls[index]).cloned() {
                    let delays = (
                        calls[index].block_number_delay,
                        calls[index].block_timestamp_delay,
                    );
                    calls[index] = self.call_for(&handle);
                    calls[index].block_number_delay = delays.0;
                    calls[index].block_timestamp_delay = delays.1;
                }
            }
            3 => {
                let index = self.rng.gen_range(0..calls.len());
                calls[index] = self.call(project);
            }
            _ => {
                if calls.len() >= 2 {
                    let first = self.rng.gen_range(0..calls.len());
                    let second = self.rng.gen_range(0..calls.len());
                    calls.swap(first, second);
                }
            }
        }

        CallSequence::new(calls)
    }

    ///
    /// Flips a biased coin; used by the worker to pick between fresh
    /// generation and corpus mutation.
    ///
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability)
    }

    ///
    /// Generates an index into a non-empty collection.
    ///
    pub fn pick_index(&mut self, length: usize) -> usize {
        self.rng.gen_range(0..length)
    }

    ///
    /// Generates an attached value for a payable call.
    ///
    fn value(&mut self) -> u128 {
        match self.rng.gen_range(0..4_u32) {
            0 => 0,
            1 => 1,
            2 => self.rng.gen_range(0..1_000_000),
            _ => self.rng.gen_range(0..1_000_000_000_000_000_000),
        }
    }

    ///
    /// Generates a block delta, biased toward staying in the same block.
    ///
    fn delay(&mut self, max: u32) -> u32 {
        if max == 0 || self.rng.gen_bool(0.5) {
            0
        } else {
            self.rng.gen_range(0..=max)
        }
    }

}
