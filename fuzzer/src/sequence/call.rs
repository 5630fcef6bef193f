//!
//! The generated call.
//!

use crate::utils;

///
/// A single generated transaction against a target contract.
///
#[derive(Debug, Clone)]
pub struct Call {
    /// The target contract name.
    pub contract: String,
    /// The called function name.
    pub function: String,
    /// The sender account.
    pub sender: ethabi::Address,
    /// The attached value in wei.
    pub value: u128,
    /// The generated arguments.
    pub tokens: Vec<ethabi::Token>,
    /// The ABI-encoded calldata, selector included.
    pub calldata: Vec<u8>,
    /// The block number delta applied before the call.
    pub block_number_delay: u32,
    /// The block timestamp delta applied before the call.
    pub block_timestamp_delay: u32,
}

impl Call {
    ///
    /// Renders the call as a single report line.
    ///
    pub fn render(&self) -> String {
        let arguments = self
            .tokens
            .iter()
            .map(render_token)
            .collect::<Vec<String>>()
            .join(", ");

        let mut line = format!(
            "{}.{}({}) (sender: {}",
            self.contract,
            self.function,
            arguments,
            utils::address_as_string(&self.sender),
        );
        if self.value > 0 {
            line.push_str(format!(", value: {}", self.value).as_str());
        }
        if self.block_number_delay > 0 || self.block_timestamp_delay > 0 {
            line.push_str(
                format!(
                    ", block: +{}, time: +{}",
                    self.block_number_delay, self.block_timestamp_delay
                )
                .as_str(),
            );
        }
        line.push(')');
        line
    }
}

///
/// Renders an ABI token the way it would appear in Solidity source.
///
pub fn render_token(token: &ethabi::Token) -> String {
    match token {
        ethabi::Token::Address(address) => utils::address_as_string(address),
        ethabi::Token::Bytes(bytes) | ethabi::Token::FixedBytes(bytes) => {
            format!("0x{}", hex::encode(bytes))
        }
        ethabi::Token::Uint(value) => value.to_string(),
        ethabi::Token::Int(value) => utils::int_as_string(*value),
        ethabi::Token::Bool(value) => value.to_string(),
        ethabi::Token::String(value) => format!("{value:?}"),
        ethabi::Token::Array(elements) | ethabi::Token::FixedArray(elements) => format!(
            "[{}]",
            elements
                .iter()
                .map(render_token)
                .collect::<Vec<String>>()
                .join(", "),
        ),
        ethabi::Token::Tuple(elements) => format!(
            "({})",
            elements
                .iter()
                .map(render_token)
                .collect::<Vec<String>>()
                .join(", "),
        ),
    }
}
