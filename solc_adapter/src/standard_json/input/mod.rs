//!
//! The `solc --standard-json` input.
//!

pub mod language;
pub mod settings;
pub mod source;

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use self::language::Language;
use self::settings::optimizer::Optimizer;
use self::settings::selection::Selection;
use self::settings::Settings;
use self::source::Source;

///
/// The `solc --standard-json` input.
///
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// The input language.
    pub language: Language,
    /// The input source code files.
    pub sources: BTreeMap<String, Source>,
    /// The compiler settings.
    pub settings: Settings,
}

impl Input {
    ///
    /// A shortcut constructor from source file paths.
    ///
    pub fn try_from_paths(
        paths: &[PathBuf],
        evm_version: Option<String>,
        optimizer: Optimizer,
    ) -> anyhow::Result<Self> {
        let mut sources = BTreeMap::new();
        for path in paths.iter() {
            let content = std::fs::read_to_string(path.as_path()).map_err(|error| {
                anyhow::anyhow!("Source file `{}` reading error: {}", path.display(), error)
            })?;
            sources.insert(path.to_string_lossy().to_string(), Source::from(content));
        }

        Ok(Self {
            language: Language::Solidity,
            sources,
            settings: Settings::new(evm_version, optimizer, Selection::new_required()),
        })
    }

    ///
    /// Expands the source glob patterns into a sorted deduplicated path list.
    ///
    pub fn expand_patterns(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for pattern in patterns.iter() {
            if Path::new(pattern.as_str()).is_file() {
                paths.push(PathBuf::from(pattern));
                continue;
            }

            for entry in glob::glob(pattern.as_str())
                .map_err(|error| anyhow::anyhow!("Invalid source pattern `{pattern}`: {error}"))?
            {
                let path = entry.map_err(|error| {
                    anyhow::anyhow!("Source pattern `{pattern}` reading error: {error}")
                })?;
                if path.is_file() {
                    paths.push(path);
                }
            }
        }
        paths.sort();
        paths.dedup();

        if paths.is_empty() {
            anyhow::bail!(
                "No Solidity sources found for patterns: {}",
                patterns.join(", ")
            );
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::Input;

    #[test]
    fn empty_patterns_are_rejected() {
        assert!(Input::expand_patterns(&[]).is_err());
        assert!(Input::expand_patterns(&["/nonexistent/**/*.sol".to_owned()]).is_err());
    }
}
