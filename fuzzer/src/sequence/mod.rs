//!
//! The call sequence.
//!

pub mod call;

use self::call::Call;

///
/// An ordered list of generated transactions applied to the system under
/// test. This is the artifact reported back to the user when it falsifies a
/// test.
///
#[derive(Debug, Clone, Default)]
pub struct CallSequence {
    /// The calls, in execution order.
    pub calls: Vec<Call>,
}

impl CallSequence {
    ///
    /// A shortcut constructor.
    ///
    pub fn new(calls: Vec<Call>) -> Self {
        Self { calls }
    }

    ///
    /// The number of calls.
    ///
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    ///
    /// Whether the sequence is empty.
    ///
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    ///
    /// The sequence truncated to its first `length` calls.
    ///
    pub fn prefix(&self, length: usize) -> Self {
        Self::new(self.calls[..length.min(self.calls.len())].to_vec())
    }

    ///
    /// The sequence with the call at `index` removed.
    ///
    pub fn without_call(&self, index: usize) -> Self {
        let mut calls = self.calls.clone();
        calls.remove(index);
        Self::new(calls)
    }

    ///
    /// Renders the sequence as numbered report lines.
    ///
    pub fn render_lines(&self) -> Vec<String> {
        self.calls
            .iter()
            .enumerate()
            .map(|(index, call)| format!("{}. {}", index + 1, call.render()))
            .collect()
    }
}
