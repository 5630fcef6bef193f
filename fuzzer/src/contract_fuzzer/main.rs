//!
//! The contract fuzzer executable.
//!

pub(crate) mod arguments;

use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use colored::Colorize;

use contract_fuzzer::Config;
use contract_fuzzer::Filters;
use contract_fuzzer::Fuzzer;
use contract_fuzzer::Summary;

use self::arguments::Arguments;
use self::arguments::Command;
use self::arguments::FuzzArguments;

/// The success exit code.
const EXIT_CODE_SUCCESS: i32 = 0;

/// The failure exit code.
const EXIT_CODE_FAILURE: i32 = 1;

/// The rayon worker stack size.
const RAYON_WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

///
/// The application entry point.
///
fn main() {
    let exit_code = match Arguments::try_parse()
        .map_err(|error| anyhow::anyhow!(error))
        .and_then(main_inner)
    {
        Ok(()) => EXIT_CODE_SUCCESS,
        Err(error) => {
            eprintln!("{error:?}");
            EXIT_CODE_FAILURE
        }
    };
    std::process::exit(exit_code);
}

///
/// The entry point wrapper used for proper error handling.
///
fn main_inner(arguments: Arguments) -> anyhow::Result<()> {
    match arguments.command {
        Command::Init { config } => {
            let path = config.unwrap_or_else(|| PathBuf::from(Config::DEFAULT_PATH));
            Config::write_default(path.as_path())?;
            println!(
                "     {} the default configuration to `{}`",
                "Written".bright_green().bold(),
                path.display(),
            );
            Ok(())
        }
        Command::Fuzz(arguments) => fuzz(arguments),
    }
}

///
/// Runs a fuzzing campaign.
///
fn fuzz(arguments: FuzzArguments) -> anyhow::Result<()> {
    let mut config = match arguments.config {
        Some(path) => Config::try_from_path(path.as_path())?,
        None => {
            let path = Path::new(Config::DEFAULT_PATH);
            if path.exists() {
                Config::try_from_path(path)?
            } else {
                Config::default()
            }
        }
    };

    if let Some(workers) = arguments.workers {
        config.fuzzing.workers = workers;
    }
    if let Some(test_limit) = arguments.test_limit {
        config.fuzzing.test_limit = test_limit;
    }
    if let Some(timeout) = arguments.timeout {
        config.fuzzing.timeout = timeout;
    }
    if let Some(seed) = arguments.seed {
        config.fuzzing.seed = Some(seed);
    }
    if let Some(solc) = arguments.solc {
        config.compilation.solc_path = Some(solc);
    }
    if let Some(corpus_dir) = arguments.corpus_dir {
        config.fuzzing.corpus_directory = Some(corpus_dir.to_string_lossy().to_string());
    }
    config.validate()?;

    let seed = config.fuzzing.seed.unwrap_or_else(contract_fuzzer::time_seed);
    if !arguments.quiet {
        println!(
            "    {} {} v{} (seed {})",
            "Starting".bright_green().bold(),
            env!("CARGO_PKG_DESCRIPTION"),
            env!("CARGO_PKG_VERSION"),
            seed,
        );
    }

    let mut thread_pool_builder = rayon::ThreadPoolBuilder::new();
    thread_pool_builder = thread_pool_builder.num_threads(config.fuzzing.workers);
    thread_pool_builder
        .stack_size(RAYON_WORKER_STACK_SIZE)
        .build_global()
        .expect("Thread pool configuration failure");

    let summary = Summary::new(arguments.verbose, arguments.quiet).wrap();
    let filters = Filters::new(arguments.target, arguments.test);
    let fuzzer = Fuzzer::new(summary.clone(), filters, config, arguments.quiet)?;

    let run_time_start = Instant::now();
    fuzzer.run(seed)?;

    let summary = Summary::unwrap_arc(summary);
    print!("{summary}");
    if !arguments.quiet {
        println!(
            "    {} fuzzing in {}m{:02}s",
            "Finished".bright_green().bold(),
            run_time_start.elapsed().as_secs() / 60,
            run_time_start.elapsed().as_secs() % 60,
        );
    }

    if !summary.is_successful() {
        anyhow::bail!(
            "{} test(s) did not survive the campaign",
            summary.failed_count(),
        );
    }

    Ok(())
}
