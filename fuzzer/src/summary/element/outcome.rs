//!
//! The campaign summary element outcome.
//!

///
/// The campaign summary element outcome.
///
#[derive(Debug)]
pub enum Outcome {
    /// The `passed` outcome.
    Passed {
        /// The outcome variant.
        variant: PassedVariant,
    },
    /// The `failed` outcome. The test was falsified.
    Failed {
        /// The failure description.
        reason: String,
        /// The rendered falsifying call sequence.
        sequence: Vec<String>,
    },
    /// The `invalid` outcome. The campaign could not exercise the test.
    Invalid {
        /// The error description.
        error: String,
    },
    /// The `ignored` outcome. The test was excluded by the filters.
    Ignored,
}

///
/// The `passed` outcome variant.
///
#[derive(Debug)]
pub enum PassedVariant {
    /// A property test that was never falsified.
    Property,
    /// An assertion-tested function that never panicked.
    Assertion,
    /// An optimization test with its maximum observed value.
    Optimization {
        /// The maximum value, rendered as a signed decimal.
        value: String,
    },
}

impl Outcome {
    ///
    /// A shortcut constructor.
    ///
    pub fn passed(variant: PassedVariant) -> Self {
        Self::Passed { variant }
    }

    ///
    /// A shortcut constructor.
    ///
    pub fn failed(reason: String, sequence: Vec<String>) -> Self {
        Self::Failed { reason, sequence }
    }

    ///
    /// A shortcut constructor.
    ///
    pub fn invalid<S>(error: S) -> Self
    where
        S: ToString,
    {
        Self::Invalid {
            error: error.to_string(),
        }
    }

    ///
    /// A shortcut constructor.
    ///
    pub fn ignored() -> Self {
        Self::Ignored
    }
}
