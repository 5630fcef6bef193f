//!
//! The fuzzing campaign.
//!

pub mod shrink;
pub mod worker;

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;

use crate::config::Config;
use crate::corpus::Corpus;
use crate::project::Project;
use crate::summary::Summary;
use crate::utils;

use self::worker::Worker;

///
/// The fuzzing campaign: a set of workers fuzzing the same project over a
/// shared summary and shared stop conditions.
///
pub struct Campaign {
    /// The shared summary.
    summary: Arc<Mutex<Summary>>,
    /// The fuzzing universe.
    project: Arc<Project>,
    /// The configuration.
    config: Config,
    /// The corpus, when persistence is enabled.
    corpus: Option<Arc<Corpus>>,
    /// Whether console output is suppressed.
    quiet: bool,
}

impl Campaign {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(
        summary: Arc<Mutex<Summary>>,
        project: Arc<Project>,
        config: Config,
        corpus: Option<Arc<Corpus>>,
        quiet: bool,
    ) -> Self {
        Self {
            summary,
            project,
            config,
            corpus,
            quiet,
        }
    }

    ///
    /// Runs the campaign to completion.
    ///
    /// Worker `index` fuzzes with `seed + index`, so a campaign is
    /// reproducible from the printed seed and the worker count.
    ///
    pub fn run(self, seed: u64) -> anyhow::Result<()> {
        let shared = Arc::new(SharedState::new(&self.config, self.project.as_ref()));

        let workers = self.config.fuzzing.workers;
        let _: Vec<()> = (0..workers)
            .into_par_iter()
            .map(|index| {
                Worker::run_detached(
                    index,
                    seed.wrapping_add(index as u64),
                    self.summary.clone(),
                    shared.clone(),
                    self.project.clone(),
                    self.config.clone(),
                    self.corpus.clone(),
                    self.quiet,
                )
            })
            .collect();

        self.finish(shared.as_ref());
        Ok(())
    }

    ///
    /// Pushes the closing summary elements: tests that survived the whole
    /// campaign, optimization maxima, and filtered-out tests.
    ///
    fn finish(&self, shared: &SharedState) {
        for name in self.project.ignored.iter() {
            Summary::ignored(self.summary.clone(), name.clone());
        }

        for handle in self.project.properties.iter() {
            let name = handle.name();
            if !shared.is_falsified(name.as_str()) {
                Summary::passed_property(self.summary.clone(), name);
            }
        }

        let maxima = shared.maxima();
        for handle in self.project.optimizations.iter() {
            let name = handle.name();
            let value = maxima
                .get(name.as_str())
                .map(|value| utils::int_as_string(*value))
                .unwrap_or_else(|| "never observed".to_owned());
            Summary::passed_optimization(self.summary.clone(), name, value);
        }

        if self.config.fuzzing.testing.assertion_testing.enabled {
            for handle in self.project.fuzzed.iter() {
                let name = handle.name();
                if !shared.is_falsified(name.as_str()) {
                    Summary::passed_assertion(self.summary.clone(), name);
                }
            }
        }
    }
}

///
/// The state shared between the campaign workers.
///
#[derive(Debug)]
pub struct SharedState {
    /// The stop flag.
    stop: AtomicBool,
    /// The total number of executed calls.
    calls_executed: AtomicU64,
    /// The total number of executed sequences.
    sequences_executed: AtomicU64,
    /// The call budget; zero means unlimited.
    test_limit: u64,
    /// The wall-clock deadline.
    deadline: Option<Instant>,
    /// Whether a failed test stops the campaign.
    stop_on_failed_test: bool,
    /// The names of the already-falsified tests.
    falsified: Mutex<BTreeSet<String>>,
    /// The optimization maxima, as 256-bit two's complement words.
    maxima: Mutex<BTreeMap<String, ethabi::Uint>>,
    /// The number of property tests; once every one of them is falsified and
    /// no other test mode keeps the campaign busy, fuzzing on is pointless.
    property_count: usize,
    /// Whether assertion or optimization testing keeps the campaign going
    /// after every property is falsified.
    has_open_ended_work: bool,
}

impl SharedState {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(config: &Config, project: &Project) -> Self {
        let deadline = if config.fuzzing.timeout > 0 {
            Some(Instant::now() + Duration::from_secs(config.fuzzing.timeout))
        } else {
            None
        };

        Self {
            stop: AtomicBool::new(false),
            calls_executed: AtomicU64::new(0),
            sequences_executed: AtomicU64::new(0),
            test_limit: config.fuzzing.test_limit,
            deadline,
            stop_on_failed_test: config.fuzzing.testing.stop_on_failed_test,
            falsified: Mutex::new(BTreeSet::new()),
            maxima: Mutex::new(BTreeMap::new()),
            property_count: project.properties.len(),
            has_open_ended_work: config.fuzzing.testing.assertion_testing.enabled
                || !project.optimizations.is_empty(),
        }
    }

    ///
    /// Whether the workers should wind down.
    ///
    pub fn should_stop(&self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        if self.test_limit > 0 && self.calls_executed.load(Ordering::Relaxed) >= self.test_limit {
            return true;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        if !self.has_open_ended_work
            && self.property_count > 0
            && self.falsified.lock().expect("Sync").len() >= self.property_count
        {
            return true;
        }

        false
    }

    ///
    /// Raises the stop flag.
    ///
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    ///
    /// Records executed calls.
    ///
    pub fn count_calls(&self, count: u64) {
        self.calls_executed.fetch_add(count, Ordering::Relaxed);
    }

    ///
    /// Records an executed sequence.
    ///
    pub fn count_sequence(&self) {
        self.sequences_executed.fetch_add(1, Ordering::Relaxed);
    }

    ///
    /// The total number of executed calls.
    ///
    pub fn calls_executed(&self) -> u64 {
        self.calls_executed.load(Ordering::Relaxed)
    }

    ///
    /// The total number of executed sequences.
    ///
    pub fn sequences_executed(&self) -> u64 {
        self.sequences_executed.load(Ordering::Relaxed)
    }

    ///
    /// Marks a test as falsified.
    ///
    /// Returns `false` when another worker already reported it, which also
    /// raises the stop flag under `stopOnFailedTest`.
    ///
    pub fn mark_falsified(&self, name: &str) -> bool {
        let newly_inserted = self
            .falsified
            .lock()
            .expect("Sync")
            .insert(name.to_owned());
        if newly_inserted && self.stop_on_failed_test {
            self.request_stop();
        }
        newly_inserted
    }

    ///
    /// Whether a test has already been falsified.
    ///
    pub fn is_falsified(&self, name: &str) -> bool {
        self.falsified.lock().expect("Sync").contains(name)
    }

    ///
    /// A snapshot of the falsified test set.
    ///
    pub fn falsified_set(&self) -> BTreeSet<String> {
        self.falsified.lock().expect("Sync").clone()
    }

    ///
    /// Records an optimization sample; returns whether it improved the
    /// campaign-wide maximum.
    ///
    pub fn observe_maximum(&self, name: &str, value: ethabi::Uint) -> bool {
        let mut maxima = self.maxima.lock().expect("Sync");
        match maxima.get(name) {
            Some(current) if !utils::signed_gt(value, *current) => false,
            _ => {
                maxima.insert(name.to_owned(), value);
                true
            }
        }
    }

    ///
    /// A snapshot of the optimization maxima.
    ///
    pub fn maxima(&self) -> BTreeMap<String, ethabi::Uint> {
        self.maxima.lock().expect("Sync").clone()
    }
}

#[cfg(test)]
mod tests {
    use solc_adapter::Build;
    use solc_adapter::StandardJsonOutput;

    use crate::config::Config;
    use crate::filters::Filters;
    use crate::project::Project;

    use super::SharedState;

    fn project() -> Project {
        let output: StandardJsonOutput = serde_json::from_value(serde_json::json!({
            "contracts": {
                "contracts/Token.sol": {
                    "Token": {
                        "abi": [
                            {
                                "inputs": [],
                                "name": "poke",
                                "outputs": [],
                                "stateMutability": "nonpayable",
                                "type": "function"
                            },
                            {
                                "inputs": [],
                                "name": "fuzz_ok",
                                "outputs": [ { "name": "", "type": "bool" } ],
                                "stateMutability": "view",
                                "type": "function"
                            }
                        ],
                        "evm": { "bytecode": { "object": "6001" } }
                    }
                }
            }
        }))
        .expect("Parsing failed");
        let build = Build::try_from_standard_json(output).expect("Build failed");
        Project::try_from_build(&build, &Config::default(), &Filters::default())
            .expect("Project building failed")
    }

    #[test]
    fn the_test_limit_stops_the_campaign() {
        let mut config = Config::default();
        config.fuzzing.test_limit = 10;
        let shared = SharedState::new(&config, &project());

        assert!(!shared.should_stop());
        shared.count_calls(10);
        assert!(shared.should_stop());
    }

    #[test]
    fn a_falsified_test_is_reported_once() {
        let mut config = Config::default();
        config.fuzzing.testing.stop_on_failed_test = false;
        let shared = SharedState::new(&config, &project());

        assert!(shared.mark_falsified("Token.fuzz_ok()"));
        assert!(!shared.mark_falsified("Token.fuzz_ok()"));
        // The only property is falsified and nothing else keeps the
        // campaign busy.
        assert!(shared.should_stop());
    }

    #[test]
    fn stop_on_failed_test_raises_the_stop_flag() {
        let config = Config::default();
        let shared = SharedState::new(&config, &project());

        shared.mark_falsified("Token.fuzz_ok()");
        assert!(shared.should_stop());
    }

    #[test]
    fn maxima_compare_as_signed_integers() {
        let shared = SharedState::new(&Config::default(), &project());

        let minus_one = ethabi::Uint::MAX;
        assert!(shared.observe_maximum("Token.optimize_x()", minus_one));
        assert!(shared.observe_maximum("Token.optimize_x()", ethabi::Uint::zero()));
        assert!(!shared.observe_maximum("Token.optimize_x()", minus_one));
    }
}
