//! gradebox: a doctest-style solution verifier
//!
//! Grades a submitted piece of source code against interactive-session-style
//! examples: the candidate runs once against a fresh execution scope, each
//! example then replays against the same scope, side-effect output is
//! captured, and the result is a structured, serializable verdict. A runtime
//! fault in candidate or example code becomes part of the verdict instead of
//! crashing the grader.
//!
//! # Architecture
//!
//! - [`capture`]: process-stream interception (switch/restore/close over fds
//!   1 and 2, with an injectable in-memory fake for tests)
//! - [`extract`]: parses the `>>>`-prompted specification text into examples
//! - [`lang`]: the embedded candidate language — lexer, parser, values with
//!   a canonical representation rule, and the shared execution [`lang::Scope`]
//! - [`runner`]: orchestration — run solution, replay examples, aggregate
//!   the verdict
//! - [`types`]: shared data model and error taxonomy
//! - [`cli`]: thin `verify` command printing the JSON report
//!
//! # Concurrency
//!
//! Stream redirection is process-global, so at most one [`TestRunner::run`]
//! may be active per process; callers grading concurrently must serialize
//! runs or use per-instance interceptors via
//! [`TestRunner::run_with`](runner::TestRunner::run_with).

pub mod capture;
pub mod cli;
pub mod extract;
pub mod lang;
pub mod runner;
pub mod types;

pub use capture::{MemoryStreams, StandardStreams, StreamInterceptor};
pub use runner::TestRunner;
pub use types::{Example, ExampleResult, Report, Result, VerifyError};
