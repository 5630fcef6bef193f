//!
//! The `solc --standard-json` output error.
//!

use serde::Deserialize;

///
/// The `solc --standard-json` output error.
///
/// Carries both hard errors and warnings; the two are told apart by the
/// `severity` field.
///
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    /// The error severity: `error`, `warning`, or `info`.
    pub severity: String,
    /// The short message.
    pub message: String,
    /// The message with the source location rendered in.
    #[serde(default)]
    pub formatted_message: Option<String>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.formatted_message.as_deref() {
            Some(formatted) => write!(f, "{formatted}"),
            None => write!(f, "{}", self.message),
        }
    }
}
