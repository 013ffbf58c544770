/// Core types for the gradebox verifier
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One example parsed out of a test specification.
///
/// `source` is a single line of candidate-language code. `want` holds the
/// expected textual representation of its evaluation, absent for bare
/// statements that carry no comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Statement or expression text following the prompt marker
    pub source: String,
    /// Expected representation, if any lines followed the prompt line
    pub want: Option<String>,
}

/// Outcome of replaying a single example.
///
/// `expected`, `received` and `correct` appear together or not at all: a bare
/// statement records only its `call`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExampleResult {
    /// The example source as it appeared after the prompt
    pub call: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}

impl ExampleResult {
    /// Result for a bare statement with no expected representation.
    pub fn bare(call: impl Into<String>) -> Self {
        ExampleResult {
            call: call.into(),
            expected: None,
            received: None,
            correct: None,
        }
    }

    /// Result for a compared example; `correct` is representation equality.
    pub fn compared(call: impl Into<String>, expected: String, received: String) -> Self {
        let correct = expected == received;
        ExampleResult {
            call: call.into(),
            expected: Some(expected),
            received: Some(received),
            correct: Some(correct),
        }
    }
}

/// The run verdict returned to the caller.
///
/// Exactly one of `results` / `errors` is present after a completed run:
/// `errors` carries the fault message when candidate or example code faulted,
/// otherwise `results` carries one entry per replayed example in spec order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// True iff no fault occurred and every compared example was correct
    pub solved: bool,
    /// Everything written to stdout/stderr while the run was active
    pub printed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ExampleResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
}

/// Errors raised by the verifier machinery itself.
///
/// Candidate-code faults never surface here; they are folded into the
/// `errors` field of the [`Report`]. These variants indicate grader bugs or
/// environment failures.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stream capture error: {0}")]
    Stream(String),

    #[error("The standard streams were not switched")]
    NotSwitched,

    #[error("Runner has already been run")]
    AlreadyRan,
}

/// Result type alias for gradebox operations
pub type Result<T> = std::result::Result<T, VerifyError>;

impl From<nix::errno::Errno> for VerifyError {
    fn from(err: nix::errno::Errno) -> Self {
        VerifyError::Stream(err.to_string())
    }
}
