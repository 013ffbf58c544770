//! Embedded candidate language.
//!
//! Submissions and example expressions are written in a small
//! Python-flavoured language executed entirely in-process: assignments,
//! arithmetic, comparisons, boolean logic, strings, lists, function
//! definitions, `if`/`while`/`for`, calls, indexing and a handful of
//! builtins. Two primitives operate against one mutable [`Scope`]:
//! [`Scope::exec`] runs source for its side effects, [`Scope::eval`]
//! evaluates a single expression to a [`Value`].
//!
//! Fault messages follow the conventional interpreter wording (for example
//! `name 'x' is not defined`) because graded reports surface them verbatim.

pub mod ast;
pub mod interp;
pub mod parser;
pub mod token;
pub mod value;

pub use interp::Scope;
pub use value::Value;

use thiserror::Error;

/// Runtime or parse fault raised by candidate/example code.
///
/// These are candidate-code problems, never grader bugs; the runner folds
/// them into the `errors` field of the report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LangError {
    #[error("name '{0}' is not defined")]
    Name(String),

    #[error("invalid syntax: {0}")]
    Syntax(String),

    #[error("{0}")]
    Type(String),

    #[error("division by zero")]
    ZeroDivision,

    #[error("{0} index out of range")]
    Index(String),

    #[error("{func}() takes {expected} arguments ({given} given)")]
    Arity {
        func: String,
        expected: usize,
        given: usize,
    },

    #[error("{0}")]
    Value(String),

    #[error("maximum recursion depth exceeded")]
    RecursionLimit,

    #[error("IO error: {0}")]
    Io(String),
}
