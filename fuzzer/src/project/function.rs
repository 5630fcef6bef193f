//!
//! The fuzzed function handle.
//!

use itertools::Itertools;

///
/// A function bound to the contract it lives on.
///
#[derive(Debug, Clone)]
pub struct FunctionHandle {
    /// The bare contract name.
    pub contract: String,
    /// The ABI function.
    pub function: ethabi::Function,
}

impl FunctionHandle {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(contract: String, function: ethabi::Function) -> Self {
        Self { contract, function }
    }

    ///
    /// The report name: `Contract.function(types)`.
    ///
    /// Input types are included so that overloads stay distinguishable.
    ///
    pub fn name(&self) -> String {
        format!(
            "{}.{}({})",
            self.contract,
            self.function.name,
            self.function
                .inputs
                .iter()
                .map(|param| param.kind.to_string())
                .join(","),
        )
    }

    ///
    /// Whether the function accepts attached value.
    ///
    pub fn is_payable(&self) -> bool {
        matches!(self.function.state_mutability, ethabi::StateMutability::Payable)
    }
}
