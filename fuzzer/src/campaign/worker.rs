//!
//! The fuzzing worker.
//!

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use colored::Colorize;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::campaign::shrink;
use crate::campaign::SharedState;
use crate::config::Config;
use crate::corpus::Corpus;
use crate::generator::Generator;
use crate::project::Project;
use crate::sequence::CallSequence;
use crate::summary::Summary;
use crate::test::assertion::AssertionChecker;
use crate::test::optimization::OptimizationChecker;
use crate::test::property::PropertyChecker;
use crate::vm::revm::EvmEnv;

/// The interval between status lines printed by worker zero.
const STATUS_INTERVAL: Duration = Duration::from_secs(5);

/// The share of sequences seeded from the corpus when it is non-empty.
const CORPUS_MUTATION_PROBABILITY: f64 = 0.5;

///
/// The checkers a worker runs after every executed call.
///
struct Checkers {
    /// The property test checker.
    property: PropertyChecker,
    /// The assertion checker, when assertion testing is enabled.
    assertion: Option<AssertionChecker>,
    /// The optimization test checker.
    optimization: OptimizationChecker,
}

///
/// The test a failure witness must keep falsifying while it is shrunk.
///
enum FailureKind {
    /// A property test, re-checked against the end state of the candidate.
    Property,
    /// An assertion failure, re-checked on the calls to the panicking
    /// function.
    Assertion {
        /// The panicking contract.
        contract: String,
        /// The panicking function selector.
        selector: [u8; 4],
    },
}

///
/// The fuzzing worker: one EVM instance generating, executing, and checking
/// call sequences until a shared stop condition fires.
///
pub struct Worker {
    /// The worker index.
    index: usize,
    /// The shared summary.
    summary: Arc<Mutex<Summary>>,
    /// The shared campaign state.
    shared: Arc<SharedState>,
    /// The fuzzing universe.
    project: Arc<Project>,
    /// The configuration.
    config: Config,
    /// The corpus, when persistence is enabled.
    corpus: Option<Arc<Corpus>>,
    /// The call sequence generator.
    generator: Generator,
    /// The RNG driving the shrinker, kept separate so that shrinking does
    /// not perturb the generation stream.
    shrink_rng: SmallRng,
    /// The simulated chain.
    env: EvmEnv,
    /// The deployed target addresses by contract name.
    addresses: BTreeMap<String, ethabi::Address>,
    /// The funded accounts.
    accounts: Vec<ethabi::Address>,
    /// The deployer account.
    deployer: ethabi::Address,
    /// Whether console output is suppressed.
    quiet: bool,
    /// The campaign start time.
    started_at: Instant,
    /// The last status line time.
    last_status: Instant,
}

impl Worker {
    ///
    /// Builds and runs a worker, downgrading any error into an `invalid`
    /// summary element so that the sibling workers finish their work.
    ///
    #[allow(clippy::too_many_arguments)]
    pub fn run_detached(
        index: usize,
        seed: u64,
        summary: Arc<Mutex<Summary>>,
        shared: Arc<SharedState>,
        project: Arc<Project>,
        config: Config,
        corpus: Option<Arc<Corpus>>,
        quiet: bool,
    ) {
        let result = Self::new(
            index,
            seed,
            summary.clone(),
            shared.clone(),
            project,
            config,
            corpus,
            quiet,
        )
        .and_then(Self::run);

        if let Err(error) = result {
            Summary::invalid(summary, format!("worker #{index}"), error);
            shared.request_stop();
        }
    }

    ///
    /// A shortcut constructor.
    ///
    #[allow(clippy::too_many_arguments)]
    fn new(
        index: usize,
        seed: u64,
        summary: Arc<Mutex<Summary>>,
        shared: Arc<SharedState>,
        project: Arc<Project>,
        config: Config,
        corpus: Option<Arc<Corpus>>,
        quiet: bool,
    ) -> anyhow::Result<Self> {
        let senders = config.fuzzing.sender_addresses()?;
        let deployer = config.fuzzing.deployer_address()?;
        let mut accounts = senders.clone();
        if !accounts.contains(&deployer) {
            accounts.push(deployer);
        }

        let env = EvmEnv::new(
            accounts.as_slice(),
            config.fuzzing.block_gas_limit,
            config.fuzzing.transaction_gas_limit,
        );
        let generator = Generator::new(
            seed,
            senders,
            config.fuzzing.call_sequence_length,
            config.fuzzing.block_number_delay_max,
            config.fuzzing.block_timestamp_delay_max,
        );

        Ok(Self {
            index,
            summary,
            shared,
            project,
            config,
            corpus,
            generator,
            // A distinct stream: shrinking must not replay the generator.
            shrink_rng: SmallRng::seed_from_u64(seed ^ 0x5348_5249_4e4b),
            env,
            addresses: BTreeMap::new(),
            accounts,
            deployer,
            quiet,
            started_at: Instant::now(),
            last_status: Instant::now(),
        })
    }

    ///
    /// The worker loop: deploy, check the genesis state, then generate,
    /// execute, and check sequences until the campaign stops.
    ///
    fn run(mut self) -> anyhow::Result<()> {
        self.deploy(true)?;
        let checkers = self.checkers();

        let skip = self.shared.falsified_set();
        let genesis_failures = checkers.property.check(&mut self.env, &skip)?;
        for failure in genesis_failures {
            self.report_failure(
                &checkers,
                failure.name,
                failure.reason,
                CallSequence::default(),
                FailureKind::Property,
            )?;
        }
        self.observe_optimizations(&checkers, &CallSequence::default())?;

        self.env.snapshot();

        let mut since_reset = 0;
        while !self.shared.should_stop() {
            let sequence = self.next_sequence();
            self.run_sequence(&checkers, &sequence)?;
            self.env.rollback();
            self.shared.count_sequence();

            since_reset += 1;
            if since_reset >= self.config.fuzzing.worker_reset_limit {
                self.reset()?;
                since_reset = 0;
            }

            self.print_status();
        }

        Ok(())
    }

    ///
    /// Deploys the target contracts.
    ///
    /// On the first pass the addresses are recorded and fed to the
    /// generator; on worker resets they are verified instead, since every
    /// checker holds on to them.
    ///
    fn deploy(&mut self, register: bool) -> anyhow::Result<()> {
        let targets: Vec<(String, Vec<u8>)> = self
            .project
            .targets
            .iter()
            .map(|contract| (contract.name.clone(), contract.bytecode.clone()))
            .collect();

        for (name, bytecode) in targets {
            let address = self.env.deploy(name.as_str(), &self.deployer, bytecode)?;
            if register {
                self.generator.register_address(address);
                self.addresses.insert(name, address);
            } else if self.addresses.get(name.as_str()) != Some(&address) {
                anyhow::bail!("Worker reset produced a different address for `{name}`");
            }
        }
        Ok(())
    }

    ///
    /// Binds the discovered tests to their deployed addresses.
    ///
    fn checkers(&self) -> Checkers {
        let sender = self.accounts[0];
        let bind = |handles: &[crate::project::function::FunctionHandle]| {
            handles
                .iter()
                .filter_map(|handle| {
                    self.addresses
                        .get(handle.contract.as_str())
                        .map(|address| (handle.clone(), *address))
                })
                .collect::<Vec<_>>()
        };

        Checkers {
            property: PropertyChecker::new(bind(self.project.properties.as_slice()), sender),
            assertion: if self.config.fuzzing.testing.assertion_testing.enabled {
                Some(AssertionChecker::new(
                    self.config
                        .fuzzing
                        .testing
                        .assertion_testing
                        .panic_codes
                        .clone(),
                ))
            } else {
                None
            },
            optimization: OptimizationChecker::new(
                bind(self.project.optimizations.as_slice()),
                sender,
            ),
        }
    }

    ///
    /// Picks the next sequence: a corpus mutation when the corpus has
    /// entries, a fresh random sequence otherwise.
    ///
    fn next_sequence(&mut self) -> CallSequence {
        if let Some(corpus) = self.corpus.as_ref() {
            let length = corpus.len();
            if length > 0 && self.generator.chance(CORPUS_MUTATION_PROBABILITY) {
                let index = self.generator.pick_index(length);
                if let Some(seed_sequence) = corpus.sample(index) {
                    return self.generator.mutate(&seed_sequence, self.project.as_ref());
                }
            }
        }
        self.generator.sequence(self.project.as_ref())
    }

    ///
    /// Executes a sequence call by call, running the checkers after every
    /// call.
    ///
    /// Returns early once a new failure has been reported, since shrinking
    /// has destroyed the sequence state by then.
    ///
    fn run_sequence(
        &mut self,
        checkers: &Checkers,
        sequence: &CallSequence,
    ) -> anyhow::Result<()> {
        for index in 0..sequence.len() {
            if self.shared.should_stop() {
                break;
            }

            let call = sequence.calls[index].clone();
            let address = match self.addresses.get(call.contract.as_str()).copied() {
                Some(address) => address,
                None => continue,
            };

            self.env
                .advance_block(call.block_number_delay, call.block_timestamp_delay);
            let outcome = self
                .env
                .call(&call.sender, &address, call.calldata.clone(), call.value)?;
            self.shared.count_calls(1);

            if let Some(assertion) = checkers.assertion.as_ref() {
                if call.calldata.len() >= 4 {
                    if let Some(reason) = assertion.inspect(&outcome) {
                        let name = self
                            .project
                            .resolve_call(&call)
                            .map(|handle| handle.name())
                            .unwrap_or_else(|| {
                                format!("{}.{}", call.contract, call.function)
                            });
                        let selector: [u8; 4] =
                            call.calldata[..4].try_into().expect("Always valid");
                        let handled = self.report_failure(
                            checkers,
                            name,
                            reason,
                            sequence.prefix(index + 1),
                            FailureKind::Assertion {
                                contract: call.contract.clone(),
                                selector,
                            },
                        )?;
                        if handled {
                            return Ok(());
                        }
                    }
                }
            }

            if !checkers.property.is_empty() {
                let skip = self.shared.falsified_set();
                let failures = checkers.property.check(&mut self.env, &skip)?;
                let mut handled = false;
                for failure in failures {
                    handled |= self.report_failure(
                        checkers,
                        failure.name,
                        failure.reason,
                        sequence.prefix(index + 1),
                        FailureKind::Property,
                    )?;
                }
                if handled {
                    return Ok(());
                }
            }

            self.observe_optimizations(checkers, &sequence.prefix(index + 1))?;
        }

        Ok(())
    }

    ///
    /// Samples the optimization tests; an improved maximum stores its
    /// witness sequence as a corpus mutation seed.
    ///
    fn observe_optimizations(
        &mut self,
        checkers: &Checkers,
        witness: &CallSequence,
    ) -> anyhow::Result<()> {
        if checkers.optimization.is_empty() {
            return Ok(());
        }

        let samples = checkers.optimization.observe(&mut self.env)?;
        for (name, value) in samples {
            if self.shared.observe_maximum(name.as_str(), value) {
                if let Some(corpus) = self.corpus.as_ref() {
                    if !witness.is_empty() {
                        corpus.add_sequence(witness)?;
                    }
                }
            }
        }
        Ok(())
    }

    ///
    /// Reports a falsified test: shrinks the witness, pushes the failure
    /// into the summary, and persists the witness.
    ///
    /// Returns `false` when another worker already reported the same test.
    ///
    fn report_failure(
        &mut self,
        checkers: &Checkers,
        name: String,
        reason: String,
        witness: CallSequence,
        kind: FailureKind,
    ) -> anyhow::Result<bool> {
        if !self.shared.mark_falsified(name.as_str()) {
            return Ok(false);
        }

        let witness = if witness.is_empty() {
            witness
        } else {
            self.shrink_witness(checkers, name.as_str(), witness, &kind)
        };

        if let Some(corpus) = self.corpus.as_ref() {
            if !witness.is_empty() {
                corpus.add_failure(&witness)?;
            }
        }
        Summary::failed(self.summary.clone(), name, reason, witness.render_lines());
        Ok(true)
    }

    ///
    /// Minimizes a failure witness within the configured shrink budget.
    ///
    /// Leaves the chain rolled back to the post-deployment snapshot.
    ///
    fn shrink_witness(
        &mut self,
        checkers: &Checkers,
        name: &str,
        witness: CallSequence,
        kind: &FailureKind,
    ) -> CallSequence {
        let limit = self.config.fuzzing.shrink_limit;
        if limit == 0 {
            return witness;
        }

        let env = &mut self.env;
        let addresses = &self.addresses;
        let shrink_rng = &mut self.shrink_rng;
        let project = self.project.as_ref();

        let shrunk = shrink::shrink(witness, limit, shrink_rng, project, |candidate| {
            Self::replay_fails(env, addresses, checkers, candidate, name, kind).unwrap_or(false)
        });

        self.env.rollback();
        shrunk
    }

    ///
    /// Replays a candidate witness from the post-deployment snapshot and
    /// re-checks the falsified test.
    ///
    fn replay_fails(
        env: &mut EvmEnv,
        addresses: &BTreeMap<String, ethabi::Address>,
        checkers: &Checkers,
        candidate: &CallSequence,
        name: &str,
        kind: &FailureKind,
    ) -> anyhow::Result<bool> {
        env.rollback();

        for call in candidate.calls.iter() {
            let address = match addresses.get(call.contract.as_str()) {
                Some(address) => *address,
                None => return Ok(false),
            };
            env.advance_block(call.block_number_delay, call.block_timestamp_delay);
            let outcome = env.call(&call.sender, &address, call.calldata.clone(), call.value)?;

            if let FailureKind::Assertion { contract, selector } = kind {
                if call.contract == *contract
                    && call.calldata.len() >= 4
                    && call.calldata[..4] == *selector
                {
                    if let Some(assertion) = checkers.assertion.as_ref() {
                        if assertion.inspect(&outcome).is_some() {
                            return Ok(true);
                        }
                    }
                }
            }
        }

        match kind {
            FailureKind::Property => {
                Ok(checkers.property.check_single(env, name)?.is_some())
            }
            FailureKind::Assertion { .. } => Ok(false),
        }
    }

    ///
    /// Tears the chain down and redeploys, bounding the state accumulated
    /// by a long-lived worker.
    ///
    fn reset(&mut self) -> anyhow::Result<()> {
        self.env = EvmEnv::new(
            self.accounts.as_slice(),
            self.config.fuzzing.block_gas_limit,
            self.config.fuzzing.transaction_gas_limit,
        );
        self.deploy(false)?;
        self.env.snapshot();
        Ok(())
    }

    ///
    /// Prints the periodic throughput line from worker zero.
    ///
    fn print_status(&mut self) {
        if self.index != 0 || self.quiet {
            return;
        }
        if self.last_status.elapsed() < STATUS_INTERVAL {
            return;
        }
        self.last_status = Instant::now();

        let elapsed = self.started_at.elapsed().as_secs();
        println!(
            "     {} {} calls, {} sequences, elapsed {}m{:02}s",
            "Fuzzing".bright_green().bold(),
            self.shared.calls_executed(),
            self.shared.sequences_executed(),
            elapsed / 60,
            elapsed % 60,
        );
    }
}
