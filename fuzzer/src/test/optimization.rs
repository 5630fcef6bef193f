//!
//! The optimization test checker.
//!

use crate::project::function::FunctionHandle;
use crate::vm::execution_result::CallOutcome;
use crate::vm::revm::EvmEnv;

///
/// The optimization test checker.
///
/// Optimization tests are never falsified; their integer return value is
/// sampled after every call and the campaign-wide maximum is tracked by the
/// shared state.
///
#[derive(Debug)]
pub struct OptimizationChecker {
    /// The optimization tests with their deployed addresses.
    tests: Vec<(FunctionHandle, ethabi::Address)>,
    /// The account the samples are called from.
    sender: ethabi::Address,
}

impl OptimizationChecker {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(tests: Vec<(FunctionHandle, ethabi::Address)>, sender: ethabi::Address) -> Self {
        Self { tests, sender }
    }

    ///
    /// Whether there are any optimization tests to sample.
    ///
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    ///
    /// Samples every optimization test against the current state.
    ///
    /// Reverting or malformed samples are skipped: an optimization test that
    /// cannot produce a value simply contributes nothing.
    ///
    pub fn observe(&self, env: &mut EvmEnv) -> anyhow::Result<Vec<(String, ethabi::Uint)>> {
        let mut samples = Vec::new();
        for (handle, address) in self.tests.iter() {
            let calldata = handle.function.encode_input(&[]).expect("Always valid");
            let outcome = env.view_call(&self.sender, address, calldata)?;

            if let CallOutcome::Success { ref output, .. } = outcome {
                if let Ok(tokens) = handle.function.decode_output(output.as_slice()) {
                    if let Some(ethabi::Token::Int(word) | ethabi::Token::Uint(word)) =
                        tokens.into_iter().next()
                    {
                        samples.push((handle.name(), word));
                    }
                }
            }
        }
        Ok(samples)
    }
}
