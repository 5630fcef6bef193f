//!
//! The on-disk call sequence record.
//!

use serde::Deserialize;
use serde::Serialize;

use crate::project::Project;
use crate::sequence::call::Call;
use crate::sequence::CallSequence;
use crate::utils;

///
/// The on-disk call sequence record.
///
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceRecord {
    /// The recorded calls.
    pub calls: Vec<CallRecord>,
}

///
/// The on-disk call record.
///
/// Arguments are stored as encoded calldata and re-decoded against the
/// current ABI on load, so a stale record degrades into a load warning
/// instead of corrupting a campaign.
///
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    /// The target contract name.
    pub contract: String,
    /// The called function name.
    pub function: String,
    /// The sender account, hex-encoded.
    pub sender: String,
    /// The attached value in wei, decimal.
    pub value: String,
    /// The ABI-encoded calldata, hex-encoded, selector included.
    pub calldata: String,
    /// The block number delta applied before the call.
    pub block_number_delay: u32,
    /// The block timestamp delta applied before the call.
    pub block_timestamp_delay: u32,
}

impl SequenceRecord {
    ///
    /// Converts a call sequence into its on-disk record.
    ///
    pub fn from_sequence(sequence: &CallSequence) -> Self {
        Self {
            calls: sequence
                .calls
                .iter()
                .map(|call| CallRecord {
                    contract: call.contract.clone(),
                    function: call.function.clone(),
                    sender: utils::address_as_string(&call.sender),
                    value: call.value.to_string(),
                    calldata: hex::encode(call.calldata.as_slice()),
                    block_number_delay: call.block_number_delay,
                    block_timestamp_delay: call.block_timestamp_delay,
                })
                .collect(),
        }
    }

    ///
    /// Re-binds the record to the current project ABI.
    ///
    pub fn try_into_sequence(self, project: &Project) -> anyhow::Result<CallSequence> {
        let mut calls = Vec::with_capacity(self.calls.len());
        for (index, record) in self.calls.into_iter().enumerate() {
            let call = record
                .try_into_call(project)
                .map_err(|error| anyhow::anyhow!("Call #{index} is invalid: {error}"))?;
            calls.push(call);
        }
        Ok(CallSequence::new(calls))
    }
}

impl CallRecord {
    ///
    /// Re-binds a single call to the current project ABI.
    ///
    fn try_into_call(self, project: &Project) -> anyhow::Result<Call> {
        let calldata = hex::decode(self.calldata.as_str())
            .map_err(|error| anyhow::anyhow!("Invalid calldata hex: {error}"))?;
        if calldata.len() < 4 {
            anyhow::bail!("Calldata is shorter than a selector");
        }

        let handle = project
            .fuzzed
            .iter()
            .find(|handle| {
                handle.contract == self.contract
                    && handle.function.name == self.function
                    && handle.function.short_signature() == calldata[..4]
            })
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Function `{}.{}` is no longer part of the fuzzed surface",
                    self.contract,
                    self.function,
                )
            })?;

        let tokens = handle
            .function
            .decode_input(&calldata[4..])
            .map_err(|error| anyhow::anyhow!("Calldata does not decode: {error}"))?;

        Ok(Call {
            contract: self.contract,
            function: self.function,
            sender: utils::parse_address(self.sender.as_str())?,
            value: self
                .value
                .parse::<u128>()
                .map_err(|error| anyhow::anyhow!("Invalid value: {error}"))?,
            tokens,
            calldata,
            block_number_delay: self.block_number_delay,
            block_timestamp_delay: self.block_timestamp_delay,
        })
    }
}
