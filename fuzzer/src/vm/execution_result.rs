//!
//! The VM execution result.
//!

use once_cell::sync::Lazy;

use crate::utils;

/// The `Error(string)` revert selector.
static ERROR_SELECTOR: Lazy<[u8; 4]> = Lazy::new(|| utils::selector("Error(string)"));

/// The `Panic(uint256)` revert selector.
static PANIC_SELECTOR: Lazy<[u8; 4]> = Lazy::new(|| utils::selector("Panic(uint256)"));

///
/// The outcome of a single committed or simulated call.
///
#[derive(Debug, Clone)]
pub enum CallOutcome {
    /// The call succeeded.
    Success {
        /// The return data.
        output: Vec<u8>,
        /// The gas used.
        gas_used: u64,
    },
    /// The call reverted.
    Revert {
        /// The decoded revert reason.
        reason: RevertReason,
        /// The gas used.
        gas_used: u64,
    },
    /// The call halted the VM.
    Halt {
        /// The halt reason, rendered.
        reason: String,
        /// Whether the halt was an `INVALID` opcode, which older compilers
        /// emit for failing assertions.
        invalid_opcode: bool,
        /// The gas used.
        gas_used: u64,
    },
}

impl CallOutcome {
    ///
    /// Returns the `Panic(uint256)` code, if the call reverted with one.
    ///
    pub fn panic_code(&self) -> Option<ethabi::Uint> {
        match self {
            Self::Revert {
                reason: RevertReason::Panic(code),
                ..
            } => Some(*code),
            _ => None,
        }
    }

    ///
    /// Whether the call ended in a state the assertion tester reports.
    ///
    pub fn is_assertion_failure(&self, panic_codes: &[u64]) -> bool {
        match self {
            Self::Revert {
                reason: RevertReason::Panic(code),
                ..
            } => panic_codes
                .iter()
                .any(|known| ethabi::Uint::from(*known) == *code),
            Self::Halt { invalid_opcode, .. } => *invalid_opcode,
            _ => false,
        }
    }

    ///
    /// A short description for reports.
    ///
    pub fn describe(&self) -> String {
        match self {
            Self::Success { output, .. } if output.is_empty() => "returned".to_owned(),
            Self::Success { output, .. } => format!("returned 0x{}", hex::encode(output)),
            Self::Revert { reason, .. } => format!("reverted with {reason}"),
            Self::Halt { reason, .. } => format!("halted with {reason}"),
        }
    }
}

///
/// The decoded revert reason.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// A `Panic(uint256)` revert, emitted by compiler-inserted checks
    /// and `assert`.
    Panic(ethabi::Uint),
    /// An `Error(string)` revert, emitted by `require` and `revert`.
    Error(String),
    /// Raw revert data without a recognized shape, including empty data.
    Raw(Vec<u8>),
}

impl RevertReason {
    ///
    /// Decodes the revert data.
    ///
    /// Falls back to `Raw` whenever the payload does not decode cleanly
    /// under its claimed selector.
    ///
    pub fn decode(data: &[u8]) -> Self {
        if data.len() >= 4 + 32 {
            let (selector, payload) = data.split_at(4);

            if selector == PANIC_SELECTOR.as_slice() && payload.len() == 32 {
                return Self::Panic(ethabi::Uint::from_big_endian(payload));
            }

            if selector == ERROR_SELECTOR.as_slice() {
                if let Ok(tokens) = ethabi::decode(&[ethabi::ParamType::String], payload) {
                    if let Some(ethabi::Token::String(message)) = tokens.into_iter().next() {
                        return Self::Error(message);
                    }
                }
            }
        }

        Self::Raw(data.to_vec())
    }
}

impl std::fmt::Display for RevertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Panic(code) => write!(f, "Panic(0x{code:02x})"),
            Self::Error(message) => write!(f, "Error({message:?})"),
            Self::Raw(data) if data.is_empty() => write!(f, "no revert data"),
            Self::Raw(data) => write!(f, "0x{}", hex::encode(data)),
        }
    }
}
