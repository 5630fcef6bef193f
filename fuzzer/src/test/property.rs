//!
//! The property test checker.
//!

use std::collections::BTreeSet;

use crate::project::function::FunctionHandle;
use crate::vm::execution_result::CallOutcome;
use crate::vm::revm::EvmEnv;

///
/// A falsified property.
///
#[derive(Debug, Clone)]
pub struct PropertyFailure {
    /// The test name.
    pub name: String,
    /// The failure description.
    pub reason: String,
}

///
/// The property test checker.
///
/// Properties are evaluated as simulated calls, so checking them never
/// perturbs the fuzzed state.
///
#[derive(Debug)]
pub struct PropertyChecker {
    /// The property tests with their deployed addresses.
    tests: Vec<(FunctionHandle, ethabi::Address)>,
    /// The account the checks are called from.
    sender: ethabi::Address,
}

impl PropertyChecker {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(tests: Vec<(FunctionHandle, ethabi::Address)>, sender: ethabi::Address) -> Self {
        Self { tests, sender }
    }

    ///
    /// Whether there are any properties to check.
    ///
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    ///
    /// Checks every property not present in `skip` against the current state.
    ///
    pub fn check(
        &self,
        env: &mut EvmEnv,
        skip: &BTreeSet<String>,
    ) -> anyhow::Result<Vec<PropertyFailure>> {
        let mut failures = Vec::new();
        for (handle, address) in self.tests.iter() {
            let name = handle.name();
            if skip.contains(name.as_str()) {
                continue;
            }
            if let Some(reason) = self.check_test(env, handle, address)? {
                failures.push(PropertyFailure { name, reason });
            }
        }
        Ok(failures)
    }

    ///
    /// Checks a single property by its name.
    ///
    /// Used by the shrinker to re-verify a candidate witness.
    ///
    pub fn check_single(&self, env: &mut EvmEnv, name: &str) -> anyhow::Result<Option<String>> {
        for (handle, address) in self.tests.iter() {
            if handle.name() == name {
                return self.check_test(env, handle, address);
            }
        }
        Ok(None)
    }

    ///
    /// Runs one property and interprets its result.
    ///
    /// A decoded `false`, a revert, or a halt falsifies the property.
    ///
    fn check_test(
        &self,
        env: &mut EvmEnv,
        handle: &FunctionHandle,
        address: &ethabi::Address,
    ) -> anyhow::Result<Option<String>> {
        let calldata = handle.function.encode_input(&[]).expect("Always valid");
        let outcome = env.view_call(&self.sender, address, calldata)?;

        let reason = match outcome {
            CallOutcome::Success { ref output, .. } => {
                match handle.function.decode_output(output.as_slice()) {
                    Ok(tokens) => match tokens.into_iter().next() {
                        Some(ethabi::Token::Bool(true)) => None,
                        Some(ethabi::Token::Bool(false)) => Some("returned false".to_owned()),
                        _ => Some("returned malformed data".to_owned()),
                    },
                    Err(_) => Some("returned malformed data".to_owned()),
                }
            }
            ref other => Some(other.describe()),
        };

        Ok(reason)
    }
}
