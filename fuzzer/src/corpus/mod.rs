//!
//! The call sequence corpus.
//!

pub mod record;

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::project::Project;
use crate::sequence::CallSequence;
use crate::utils;

use self::record::SequenceRecord;

///
/// The call sequence corpus.
///
/// Mutation seeds live under `sequences/`; failure witnesses under
/// `failures/`, kept out of the mutation pool. Files are named after the
/// digest of their content, so writes are idempotent across runs.
///
#[derive(Debug)]
pub struct Corpus {
    /// The mutation seed directory.
    sequences_directory: PathBuf,
    /// The failure witness directory.
    failures_directory: PathBuf,
    /// The in-memory mutation pool.
    pool: Mutex<Vec<CallSequence>>,
    /// The entries dropped during loading, with their reasons.
    load_warnings: Vec<String>,
}

impl Corpus {
    /// The mutation seed subdirectory name.
    const SEQUENCES_DIRECTORY: &'static str = "sequences";

    /// The failure witness subdirectory name.
    const FAILURES_DIRECTORY: &'static str = "failures";

    ///
    /// Opens the corpus, creating the layout if needed and re-binding every
    /// stored sequence to the current project ABI.
    ///
    pub fn open(directory: &Path, project: &Project) -> anyhow::Result<Self> {
        let sequences_directory = directory.join(Self::SEQUENCES_DIRECTORY);
        let failures_directory = directory.join(Self::FAILURES_DIRECTORY);
        for directory in [&sequences_directory, &failures_directory] {
            std::fs::create_dir_all(directory).map_err(|error| {
                anyhow::anyhow!(
                    "Corpus directory `{}` creation error: {}",
                    directory.display(),
                    error
                )
            })?;
        }

        let mut pool = Vec::new();
        let mut load_warnings = Vec::new();
        let entries = std::fs::read_dir(sequences_directory.as_path()).map_err(|error| {
            anyhow::anyhow!(
                "Corpus directory `{}` reading error: {}",
                sequences_directory.display(),
                error
            )
        })?;
        for entry in entries {
            let path = entry
                .map_err(|error| anyhow::anyhow!("Corpus entry reading error: {error}"))?
                .path();
            if path.extension() != Some(std::ffi::OsStr::new("json")) {
                continue;
            }

            match Self::load_sequence(path.as_path(), project) {
                Ok(sequence) => pool.push(sequence),
                Err(error) => load_warnings.push(format!(
                    "Corpus entry `{}` is dropped: {}",
                    path.display(),
                    error
                )),
            }
        }

        Ok(Self {
            sequences_directory,
            failures_directory,
            pool: Mutex::new(pool),
            load_warnings,
        })
    }

    ///
    /// The number of mutation seeds currently in the pool.
    ///
    pub fn len(&self) -> usize {
        self.pool.lock().expect("Sync").len()
    }

    ///
    /// Whether the mutation pool is empty.
    ///
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    ///
    /// The entries dropped during loading.
    ///
    pub fn load_warnings(&self) -> &[String] {
        self.load_warnings.as_slice()
    }

    ///
    /// Returns a clone of the pool entry at `index % len`.
    ///
    pub fn sample(&self, index: usize) -> Option<CallSequence> {
        let pool = self.pool.lock().expect("Sync");
        if pool.is_empty() {
            return None;
        }
        Some(pool[index % pool.len()].clone())
    }

    ///
    /// Persists a sequence as a mutation seed and adds it to the pool.
    ///
    pub fn add_sequence(&self, sequence: &CallSequence) -> anyhow::Result<()> {
        self.write_record(self.sequences_directory.as_path(), sequence)?;
        self.pool.lock().expect("Sync").push(sequence.clone());
        Ok(())
    }

    ///
    /// Persists a failure witness, keeping it out of the mutation pool.
    ///
    pub fn add_failure(&self, sequence: &CallSequence) -> anyhow::Result<()> {
        self.write_record(self.failures_directory.as_path(), sequence)
    }

    ///
    /// Loads a single stored sequence.
    ///
    fn load_sequence(path: &Path, project: &Project) -> anyhow::Result<CallSequence> {
        let text = std::fs::read_to_string(path)?;
        let record: SequenceRecord = serde_json::from_str(text.as_str())?;
        record.try_into_sequence(project)
    }

    ///
    /// Writes a sequence record under its content digest.
    ///
    fn write_record(&self, directory: &Path, sequence: &CallSequence) -> anyhow::Result<()> {
        let record = SequenceRecord::from_sequence(sequence);
        let text = serde_json::to_string_pretty(&record).expect("Always valid");
        let path = directory.join(format!("{}.json", utils::keccak256_hex(text.as_bytes())));
        if path.exists() {
            return Ok(());
        }

        std::fs::write(path.as_path(), text + "\n").map_err(|error| {
            anyhow::anyhow!("Corpus file `{}` writing error: {}", path.display(), error)
        })
    }
}
