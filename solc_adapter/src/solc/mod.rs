//!
//! The `solc` Solidity compiler.
//!

pub mod version;

use std::io::Write;
use std::path::PathBuf;

use crate::standard_json::input::Input as StandardJsonInput;
use crate::standard_json::output::Output as StandardJsonOutput;

use self::version::Version;

///
/// The `solc` Solidity compiler.
///
#[derive(Debug, Clone)]
pub struct Compiler {
    /// The executable name or path.
    pub executable: String,
    /// The compiler version, probed on construction.
    pub version: Version,
}

impl Compiler {
    /// The default executable name, looked up in `${PATH}`.
    pub const DEFAULT_EXECUTABLE_NAME: &'static str = "solc";

    /// The first version of `solc` emitting `Panic(uint256)` revert data,
    /// which the assertion tester relies on.
    pub const FIRST_SUPPORTED_VERSION: semver::Version = semver::Version::new(0, 8, 0);

    ///
    /// A shortcut constructor.
    ///
    /// Locates the executable, probes its version, and rejects versions
    /// that predate `Panic(uint256)` revert data.
    ///
    pub fn new(executable: Option<PathBuf>) -> anyhow::Result<Self> {
        let executable = executable
            .map(|path| path.to_string_lossy().to_string())
            .unwrap_or_else(|| Self::DEFAULT_EXECUTABLE_NAME.to_owned());
        if let Err(error) = which::which(executable.as_str()) {
            anyhow::bail!("The `{executable}` executable not found in ${{PATH}}: {error}");
        }

        let version = Self::probe_version(executable.as_str())?;
        if version.default < Self::FIRST_SUPPORTED_VERSION {
            anyhow::bail!(
                "`solc` v{} is not supported: versions below v{} do not emit `Panic(uint256)` revert data",
                version.default,
                Self::FIRST_SUPPORTED_VERSION,
            );
        }

        Ok(Self {
            executable,
            version,
        })
    }

    ///
    /// Runs the `solc --version` subprocess and parses its output.
    ///
    fn probe_version(executable: &str) -> anyhow::Result<Version> {
        let output = std::process::Command::new(executable)
            .arg("--version")
            .output()
            .map_err(|error| {
                anyhow::anyhow!("{executable} subprocess spawning error: {error:?}")
            })?;
        if !output.status.success() {
            anyhow::bail!(
                "{} version probing error: {}",
                executable,
                String::from_utf8_lossy(output.stderr.as_slice())
            );
        }

        Version::try_from_output(String::from_utf8_lossy(output.stdout.as_slice()).as_ref())
    }

    ///
    /// Runs the `solc --standard-json` subprocess and returns the parsed output.
    ///
    pub fn standard_json(
        &self,
        input: StandardJsonInput,
        base_path: Option<String>,
        include_paths: Vec<String>,
        allow_paths: Option<String>,
    ) -> anyhow::Result<StandardJsonOutput> {
        let mut command = std::process::Command::new(self.executable.as_str());
        command.stdin(std::process::Stdio::piped());
        command.stdout(std::process::Stdio::piped());
        command.stderr(std::process::Stdio::piped());
        command.arg("--standard-json");

        if let Some(base_path) = base_path {
            command.arg("--base-path");
            command.arg(base_path);
        }
        for include_path in include_paths.into_iter() {
            command.arg("--include-path");
            command.arg(include_path);
        }
        if let Some(allow_paths) = allow_paths {
            command.arg("--allow-paths");
            command.arg(allow_paths);
        }

        let input_json = serde_json::to_vec(&input).expect("Always valid");

        let process = command.spawn().map_err(|error| {
            anyhow::anyhow!("{} subprocess spawning error: {:?}", self.executable, error)
        })?;
        process
            .stdin
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("{} stdin getting error", self.executable))?
            .write_all(input_json.as_slice())
            .map_err(|error| {
                anyhow::anyhow!("{} stdin writing error: {:?}", self.executable, error)
            })?;

        let output = process.wait_with_output().map_err(|error| {
            anyhow::anyhow!("{} subprocess output error: {:?}", self.executable, error)
        })?;
        if !output.status.success() {
            anyhow::bail!(
                "{} error: {}",
                self.executable,
                String::from_utf8_lossy(output.stderr.as_slice())
            );
        }

        let output: StandardJsonOutput = serde_json::from_slice(output.stdout.as_slice())
            .map_err(|error| {
                anyhow::anyhow!(
                    "{} subprocess output parsing error: {}\n{}",
                    self.executable,
                    error,
                    String::from_utf8_lossy(output.stdout.as_slice()),
                )
            })?;

        Ok(output)
    }
}
