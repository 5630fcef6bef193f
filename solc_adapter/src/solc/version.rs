//!
//! The `solc` compiler version.
//!

///
/// The `solc` compiler version.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// The long version string, as printed by `solc --version`.
    pub long: String,
    /// The short semver.
    pub default: semver::Version,
}

impl Version {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(long: String, default: semver::Version) -> Self {
        Self { long, default }
    }

    ///
    /// Parses the version out of the `solc --version` output.
    ///
    /// The output ends with a line like
    /// `Version: 0.8.24+commit.e11b9ed9.Linux.g++`.
    ///
    pub fn try_from_output(output: &str) -> anyhow::Result<Self> {
        let long = output
            .lines()
            .find_map(|line| line.strip_prefix("Version: "))
            .ok_or_else(|| {
                anyhow::anyhow!("The `Version:` line is missing from the `solc --version` output")
            })?
            .trim()
            .to_owned();

        let short = long
            .split('+')
            .next()
            .expect("Always valid")
            .parse::<semver::Version>()
            .map_err(|error| anyhow::anyhow!("Invalid `solc` version `{long}`: {error}"))?;

        Ok(Self::new(long, short))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::Version;

    #[test]
    fn parses_a_release_version() {
        let output = "solc, the solidity compiler commandline interface\nVersion: 0.8.24+commit.e11b9ed9.Linux.g++\n";
        let version = Version::try_from_output(output).expect("Parsing failed");
        assert_eq!(version.default, semver::Version::new(0, 8, 24));
        assert_eq!(version.long.as_str(), "0.8.24+commit.e11b9ed9.Linux.g++");
    }

    #[test]
    fn parses_a_prerelease_version() {
        let output = "Version: 0.8.30-develop.2025.5.12+commit.01b0ff23.Linux.g++";
        let version = Version::try_from_output(output).expect("Parsing failed");
        assert_eq!(version.default.major, 0);
        assert_eq!(version.default.minor, 8);
        assert_eq!(version.default.patch, 30);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Version::try_from_output("not a compiler").is_err());
        assert!(Version::try_from_output("Version: yes").is_err());
    }
}
