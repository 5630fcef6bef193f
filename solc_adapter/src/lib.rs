//!
//! The Solidity compiler adapter library.
//!

pub mod build;
pub mod solc;
pub mod standard_json;

pub use self::build::contract::ContractBuild;
pub use self::build::Build;
pub use self::solc::version::Version as SolcVersion;
pub use self::solc::Compiler as SolcCompiler;
pub use self::standard_json::input::settings::optimizer::Optimizer as StandardJsonInputSettingsOptimizer;
pub use self::standard_json::input::Input as StandardJsonInput;
pub use self::standard_json::output::Output as StandardJsonOutput;
