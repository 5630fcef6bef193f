//!
//! The contract fuzzer configuration.
//!

pub mod compilation;
pub mod fuzzing;
pub mod testing;

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use self::compilation::CompilationConfig;
use self::fuzzing::FuzzingConfig;

///
/// The contract fuzzer configuration.
///
/// Every field is defaulted, so an empty JSON object is a valid configuration
/// file. Unknown keys are rejected so that a typo cannot silently disable
/// testing.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Config {
    /// The fuzzing campaign settings.
    pub fuzzing: FuzzingConfig,
    /// The compilation settings.
    pub compilation: CompilationConfig,
}

impl Config {
    /// The default configuration file name.
    pub const DEFAULT_PATH: &'static str = "fuzzer.json";

    ///
    /// Reads and validates the configuration file.
    ///
    pub fn try_from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|error| {
            anyhow::anyhow!(
                "Configuration file `{}` reading error: {}",
                path.display(),
                error
            )
        })?;
        let config: Self = serde_json::from_str(text.as_str()).map_err(|error| {
            anyhow::anyhow!(
                "Configuration file `{}` parsing error: {}",
                path.display(),
                error
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    ///
    /// Writes the default configuration to the specified path.
    ///
    /// Refuses to overwrite an existing file.
    ///
    pub fn write_default(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Configuration file `{}` already exists; remove it first",
                path.display()
            );
        }

        let text = serde_json::to_string_pretty(&Self::default()).expect("Always valid");
        std::fs::write(path, text + "\n").map_err(|error| {
            anyhow::anyhow!(
                "Configuration file `{}` writing error: {}",
                path.display(),
                error
            )
        })
    }

    ///
    /// Validates the cross-field invariants.
    ///
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fuzzing.workers == 0 {
            anyhow::bail!("`fuzzing.workers` must be at least 1");
        }
        if self.fuzzing.call_sequence_length == 0 {
            anyhow::bail!("`fuzzing.callSequenceLength` must be at least 1");
        }
        if self.fuzzing.sender_addresses.is_empty() {
            anyhow::bail!("`fuzzing.senderAddresses` must not be empty");
        }
        self.fuzzing.deployer_address()?;
        self.fuzzing.sender_addresses()?;

        let testing = &self.fuzzing.testing;
        if !testing.property_testing.enabled
            && !testing.assertion_testing.enabled
            && !testing.optimization_testing.enabled
        {
            anyhow::bail!("All test modes are disabled; nothing to fuzz");
        }
        if testing.property_testing.enabled && testing.property_testing.test_prefixes.is_empty() {
            anyhow::bail!("`fuzzing.testing.propertyTesting.testPrefixes` must not be empty");
        }
        if testing.optimization_testing.enabled
            && testing.optimization_testing.test_prefixes.is_empty()
        {
            anyhow::bail!("`fuzzing.testing.optimizationTesting.testPrefixes` must not be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn an_empty_object_is_a_valid_configuration() {
        let config: Config = serde_json::from_str("{}").expect("Parsing failed");
        config.validate().expect("Validation failed");
        assert_eq!(config.fuzzing.workers, 8);
        assert_eq!(config.fuzzing.call_sequence_length, 100);
        assert_eq!(
            config.fuzzing.testing.property_testing.test_prefixes,
            vec!["fuzz_".to_owned()],
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{ "fuzing": {} }"#).is_err());
        assert!(
            serde_json::from_str::<Config>(r#"{ "fuzzing": { "workres": 4 } }"#).is_err()
        );
    }

    #[test]
    fn partial_sections_keep_the_other_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "fuzzing": { "workers": 2, "testing": { "testAllContracts": true } } }"#,
        )
        .expect("Parsing failed");
        assert_eq!(config.fuzzing.workers, 2);
        assert!(config.fuzzing.testing.test_all_contracts);
        assert_eq!(config.fuzzing.worker_reset_limit, 50);
        assert!(config.fuzzing.testing.stop_on_failed_test);
    }

    #[test]
    fn zero_workers_fail_validation() {
        let config: Config =
            serde_json::from_str(r#"{ "fuzzing": { "workers": 0 } }"#).expect("Parsing failed");
        assert!(config.validate().is_err());
    }

    #[test]
    fn disabling_every_test_mode_fails_validation() {
        let config: Config = serde_json::from_str(
            r#"{ "fuzzing": { "testing": {
                "propertyTesting": { "enabled": false },
                "assertionTesting": { "enabled": false },
                "optimizationTesting": { "enabled": false }
            } } }"#,
        )
        .expect("Parsing failed");
        assert!(config.validate().is_err());
    }

    #[test]
    fn the_default_configuration_round_trips() {
        let text = serde_json::to_string(&Config::default()).expect("Serialization failed");
        let config: Config = serde_json::from_str(text.as_str()).expect("Parsing failed");
        config.validate().expect("Validation failed");
    }
}
