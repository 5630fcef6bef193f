//!
//! The campaign summary element.
//!

pub mod outcome;

use colored::Colorize;

use self::outcome::Outcome;
use self::outcome::PassedVariant;

///
/// The campaign summary element.
///
#[derive(Debug)]
pub struct Element {
    /// The test name.
    pub name: String,
    /// The test outcome.
    pub outcome: Outcome,
}

impl Element {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(name: String, outcome: Outcome) -> Self {
        Self { name, outcome }
    }

    ///
    /// Prints the element.
    ///
    pub fn print(&self, verbosity: bool) -> Option<String> {
        match self.outcome {
            Outcome::Passed { .. } if !verbosity => return None,
            Outcome::Ignored => return None,
            _ => {}
        }

        let outcome = match self.outcome {
            Outcome::Passed { .. } => "PASSED".green(),
            Outcome::Failed { .. } => "FAILED".bright_red(),
            Outcome::Invalid { .. } => "INVALID".red(),
            Outcome::Ignored => "IGNORED".bright_black(),
        };

        let details = match self.outcome {
            Outcome::Passed {
                variant: PassedVariant::Optimization { ref value },
            } => format!("(max value {})", value.bright_white()),
            Outcome::Passed { .. } => String::new(),
            Outcome::Failed {
                ref reason,
                ref sequence,
            } => {
                let mut details = format!("({reason})");
                if sequence.is_empty() {
                    details.push_str("\n    falsified by the initial deployment state");
                } else {
                    details.push_str("\n    call sequence:");
                    for line in sequence.iter() {
                        details.push_str(format!("\n    {line}").as_str());
                    }
                }
                details
            }
            Outcome::Invalid { ref error } => error.to_string(),
            Outcome::Ignored => String::new(),
        };

        Some(format!("{:>7} {} {}", outcome, self.name, details))
    }
}
