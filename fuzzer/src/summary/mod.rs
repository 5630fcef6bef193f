//!
//! The campaign summary.
//!

pub mod element;

use std::sync::Arc;
use std::sync::Mutex;

use colored::Colorize;

use self::element::outcome::Outcome;
use self::element::outcome::PassedVariant;
use self::element::Element;

///
/// The campaign summary.
///
/// Shared across the workers; elements are printed the moment they resolve
/// and the totals are rendered at the end of the campaign.
///
#[derive(Debug)]
pub struct Summary {
    /// The summary elements.
    elements: Vec<Element>,
    /// The output verbosity.
    verbosity: bool,
    /// Whether the output is suppressed.
    quiet: bool,
    /// The passed tests counter.
    passed: usize,
    /// The failed tests counter.
    failed: usize,
    /// The invalid tests counter.
    invalid: usize,
    /// The ignored tests counter.
    ignored: usize,
}

impl Summary {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(verbosity: bool, quiet: bool) -> Self {
        Self {
            elements: Vec::new(),
            verbosity,
            quiet,
            passed: 0,
            failed: 0,
            invalid: 0,
            ignored: 0,
        }
    }

    ///
    /// Whether the campaign has been successful.
    ///
    pub fn is_successful(&self) -> bool {
        for element in self.elements.iter() {
            match element.outcome {
                Outcome::Passed { .. } => continue,
                Outcome::Failed { .. } => return false,
                Outcome::Invalid { .. } => return false,
                Outcome::Ignored => continue,
            }
        }

        true
    }

    ///
    /// The number of failed tests.
    ///
    pub fn failed_count(&self) -> usize {
        self.failed
    }

    ///
    /// Wraps data into a synchronized shared reference.
    ///
    pub fn wrap(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }

    ///
    /// Extracts the data from the synchronized shared reference.
    ///
    pub fn unwrap_arc(summary: Arc<Mutex<Self>>) -> Self {
        Arc::try_unwrap(summary)
            .expect("Last shared reference")
            .into_inner()
            .expect("Last shared reference")
    }

    ///
    /// Adds a passed property test outcome.
    ///
    pub fn passed_property(summary: Arc<Mutex<Self>>, name: String) {
        let element = Element::new(name, Outcome::passed(PassedVariant::Property));
        summary.lock().expect("Sync").push_element(element);
    }

    ///
    /// Adds a passed assertion sweep outcome.
    ///
    pub fn passed_assertion(summary: Arc<Mutex<Self>>, name: String) {
        let element = Element::new(name, Outcome::passed(PassedVariant::Assertion));
        summary.lock().expect("Sync").push_element(element);
    }

    ///
    /// Adds a finished optimization test outcome.
    ///
    pub fn passed_optimization(summary: Arc<Mutex<Self>>, name: String, value: String) {
        let element = Element::new(
            name,
            Outcome::passed(PassedVariant::Optimization { value }),
        );
        summary.lock().expect("Sync").push_element(element);
    }

    ///
    /// Adds a failed outcome with its falsifying call sequence.
    ///
    pub fn failed(
        summary: Arc<Mutex<Self>>,
        name: String,
        reason: String,
        sequence: Vec<String>,
    ) {
        let element = Element::new(name, Outcome::failed(reason, sequence));
        summary.lock().expect("Sync").push_element(element);
    }

    ///
    /// Adds an invalid outcome.
    ///
    pub fn invalid<S>(summary: Arc<Mutex<Self>>, name: String, error: S)
    where
        S: ToString,
    {
        let element = Element::new(name, Outcome::invalid(error));
        summary.lock().expect("Sync").push_element(element);
    }

    ///
    /// Adds an ignored outcome.
    ///
    pub fn ignored(summary: Arc<Mutex<Self>>, name: String) {
        let element = Element::new(name, Outcome::ignored());
        summary.lock().expect("Sync").push_element(element);
    }

    ///
    /// Pushes an element to the summary, printing it.
    ///
    fn push_element(&mut self, element: Element) {
        if !self.quiet {
            if let Some(string) = element.print(self.verbosity) {
                println!("{string}");
            }
        }

        match element.outcome {
            Outcome::Passed { .. } => self.passed += 1,
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Invalid { .. } => self.invalid += 1,
            Outcome::Ignored => self.ignored += 1,
        }

        self.elements.push(element);
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.quiet {
            return Ok(());
        }

        writeln!(
            f,
            "╔════════════════════╡ PROPERTY FUZZING ╞═════════════════════╗"
        )?;
        writeln!(
            f,
            "║                                                              ║"
        )?;
        writeln!(
            f,
            "║     {:7}                                   {:10}     ║",
            "PASSED".green(),
            self.passed.to_string().green(),
        )?;
        writeln!(
            f,
            "║     {:7}                                   {:10}     ║",
            "FAILED".bright_red(),
            self.failed.to_string().bright_red(),
        )?;
        writeln!(
            f,
            "║     {:7}                                   {:10}     ║",
            "INVALID".red(),
            self.invalid.to_string().red(),
        )?;
        writeln!(
            f,
            "║     {:7}                                   {:10}     ║",
            "IGNORED".bright_black(),
            self.ignored.to_string().bright_black(),
        )?;
        writeln!(
            f,
            "╚══════════════════════════════════════════════════════════════╝"
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Summary;

    #[test]
    fn a_failed_element_fails_the_campaign() {
        let summary = Summary::new(false, true).wrap();
        Summary::passed_property(summary.clone(), "Token.fuzz_a()".to_owned());
        assert!(summary.lock().expect("Sync").is_successful());

        Summary::failed(
            summary.clone(),
            "Token.fuzz_b()".to_owned(),
            "returned false".to_owned(),
            vec!["1. Token.transfer(...)".to_owned()],
        );
        let summary = Summary::unwrap_arc(summary);
        assert!(!summary.is_successful());
        assert_eq!(summary.failed_count(), 1);
    }

    #[test]
    fn ignored_elements_do_not_fail_the_campaign() {
        let summary = Summary::new(false, true).wrap();
        Summary::ignored(summary.clone(), "Token.fuzz_filtered()".to_owned());
        assert!(Summary::unwrap_arc(summary).is_successful());
    }
}
