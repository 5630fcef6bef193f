//!
//! The contract fuzzer arguments.
//!

use std::path::PathBuf;

use clap::Parser;

///
/// The contract fuzzer arguments.
///
#[derive(Debug, Parser)]
#[command(name = "contract-fuzzer", about, long_about = None)]
pub struct Arguments {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

///
/// The contract fuzzer subcommands.
///
#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Runs a fuzzing campaign.
    Fuzz(FuzzArguments),
    /// Writes the default configuration file.
    Init {
        /// The configuration file path.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

///
/// The `fuzz` subcommand arguments.
///
/// Every override falls back to the configuration file value.
///
#[derive(Debug, clap::Args)]
pub struct FuzzArguments {
    /// The logging level.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppresses the output completely.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// The configuration file path.
    /// When omitted, `fuzzer.json` is read if present.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sets the number of fuzzing workers.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Stops the campaign after the specified total number of calls.
    #[arg(long)]
    pub test_limit: Option<u64>,

    /// Stops the campaign after the specified number of seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Sets the campaign seed for reproduction.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fuzzes only contracts whose name contains any of the specified strings.
    #[arg(long)]
    pub target: Vec<String>,

    /// Runs only tests whose name contains any of the specified strings.
    #[arg(long)]
    pub test: Vec<String>,

    /// Path to the `solc` executable.
    /// Is looked up in `${PATH}` by default.
    #[arg(long)]
    pub solc: Option<PathBuf>,

    /// The corpus directory, enabling sequence persistence.
    #[arg(long)]
    pub corpus_dir: Option<PathBuf>,
}
