//!
//! The simulated chain.
//!

pub mod execution_result;
pub mod revm;
