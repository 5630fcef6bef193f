//!
//! The contract fuzzer library.
//!

pub(crate) mod campaign;
pub(crate) mod config;
pub(crate) mod corpus;
pub(crate) mod filters;
pub(crate) mod generator;
pub(crate) mod project;
pub(crate) mod sequence;
pub(crate) mod summary;
pub(crate) mod test;
pub(crate) mod utils;
pub(crate) mod vm;

pub use self::config::Config;
pub use self::filters::Filters;
pub use self::summary::Summary;
pub use self::utils::time_seed;

use std::sync::Arc;
use std::sync::Mutex;

use colored::Colorize;

use solc_adapter::Build;
use solc_adapter::SolcCompiler;
use solc_adapter::StandardJsonInput;
use solc_adapter::StandardJsonInputSettingsOptimizer;

use crate::campaign::Campaign;
use crate::corpus::Corpus;
use crate::project::Project;

///
/// The contract fuzzer.
///
pub struct Fuzzer {
    /// The shared summary.
    summary: Arc<Mutex<Summary>>,
    /// The filters.
    filters: Filters,
    /// The configuration.
    config: Config,
    /// Whether console output is suppressed.
    quiet: bool,
}

impl Fuzzer {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(
        summary: Arc<Mutex<Summary>>,
        filters: Filters,
        config: Config,
        quiet: bool,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            summary,
            filters,
            config,
            quiet,
        })
    }

    ///
    /// Compiles the sources, discovers the tests, and runs the campaign.
    ///
    pub fn run(self, seed: u64) -> anyhow::Result<()> {
        let build = self.compile()?;

        let project = Project::try_from_build(&build, &self.config, &self.filters)?;
        for warning in project.warnings.iter() {
            self.warn(warning.as_str());
        }
        if !self.quiet {
            println!(
                "     {} {} target contract(s): {} fuzzed function(s), \
                 {} property test(s), {} optimization test(s)",
                "Fuzzing".bright_green().bold(),
                project.targets.len(),
                project.fuzzed.len(),
                project.properties.len(),
                project.optimizations.len(),
            );
        }

        let corpus = match self.config.fuzzing.corpus_directory.as_deref() {
            Some(directory) => {
                let corpus = Corpus::open(std::path::Path::new(directory), &project)?;
                for warning in corpus.load_warnings() {
                    self.warn(warning.as_str());
                }
                if !self.quiet {
                    println!(
                        "      {} {} corpus sequence(s) from `{}`",
                        "Loaded".bright_green().bold(),
                        corpus.len(),
                        directory,
                    );
                }
                Some(Arc::new(corpus))
            }
            None => None,
        };

        Campaign::new(
            self.summary,
            Arc::new(project),
            self.config,
            corpus,
            self.quiet,
        )
        .run(seed)
    }

    ///
    /// Compiles the configured sources with `solc`.
    ///
    fn compile(&self) -> anyhow::Result<Build> {
        let compiler = SolcCompiler::new(self.config.compilation.solc_path.clone())?;

        let paths =
            StandardJsonInput::expand_patterns(self.config.compilation.sources.as_slice())?;
        if !self.quiet {
            println!(
                "   {} {} source file(s) with solc v{}",
                "Compiling".bright_green().bold(),
                paths.len(),
                compiler.version,
            );
        }

        let input = StandardJsonInput::try_from_paths(
            paths.as_slice(),
            self.config.compilation.evm_version.clone(),
            StandardJsonInputSettingsOptimizer::new(
                self.config.compilation.optimizer,
                self.config.compilation.optimizer_runs,
            ),
        )?;
        let output = compiler.standard_json(input, None, Vec::new(), None)?;

        let build = Build::try_from_standard_json(output)?;
        for warning in build.warnings.iter() {
            self.warn(warning.as_str());
        }
        if build.contracts.is_empty() {
            anyhow::bail!("The sources contain no deployable contracts");
        }

        Ok(build)
    }

    ///
    /// Prints a warning line.
    ///
    fn warn(&self, message: &str) {
        if !self.quiet {
            println!("     {} {}", "Warning".bright_yellow().bold(), message);
        }
    }
}
