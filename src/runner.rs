//! Grading orchestration.
//!
//! A [`TestRunner`] owns one execution scope for its whole lifetime: the
//! candidate solution runs first, then every extracted example replays
//! against the same scope in order, so later examples observe earlier
//! mutations. Output interception wraps the entire sequence and is restored
//! on every exit path.

use crate::capture::{StandardStreams, StreamInterceptor};
use crate::extract::extract_examples;
use crate::lang::{LangError, Scope, Value};
use crate::types::{Example, ExampleResult, Report, Result, VerifyError};
use log::{debug, warn};

/// Reserved binding holding the raw submission text.
pub const SOLUTION_BINDING: &str = "YOUR_SOLUTION";
/// Reserved binding holding the submission's line count, so examples can
/// check style constraints like line budgets.
pub const SOLUTION_LINES_BINDING: &str = "LINES_IN_YOUR_SOLUTION";

/// Runs a candidate solution and grades it against a test specification.
///
/// One runner = one scope = one run. `run()` may be invoked once; the
/// verdict is then read through [`TestRunner::solved`] and
/// [`TestRunner::to_report`].
pub struct TestRunner {
    solution: String,
    tests: String,
    scope: Scope,
    results: Option<Vec<ExampleResult>>,
    errors: Option<String>,
    printed: Option<String>,
}

impl TestRunner {
    pub fn new(solution: impl Into<String>, tests: impl Into<String>) -> Self {
        let mut scope = Scope::new();
        // Prime the scope with an empty program so it is valid for
        // inspection even if run() is never called. Cannot fault.
        let _ = scope.exec("");
        TestRunner {
            solution: solution.into(),
            tests: tests.into(),
            scope,
            results: None,
            errors: None,
            printed: None,
        }
    }

    /// Run the grading sequence with the real process-stream interceptor.
    ///
    /// Stream redirection is process-global, so concurrent `run()` calls in
    /// one process must be serialized by the caller.
    pub fn run(&mut self) -> Result<()> {
        let mut patcher = StandardStreams::new();
        self.run_with(&mut patcher)
    }

    /// Run the grading sequence with an injected interceptor.
    pub fn run_with<I: StreamInterceptor>(&mut self, patcher: &mut I) -> Result<()> {
        if self.printed.is_some() {
            return Err(VerifyError::AlreadyRan);
        }

        patcher.switch()?;
        let outcome = match self.run_solution() {
            Ok(()) => self.run_tests(),
            Err(fault) => Err(fault),
        };
        match outcome {
            Ok(results) => self.results = Some(results),
            Err(fault) => {
                warn!("grading run faulted: {fault}");
                self.errors = Some(fault.to_string());
            }
        }

        // Unconditional: streams are never left redirected
        let printed = patcher.restore();
        patcher.close();
        self.printed = Some(printed?);
        Ok(())
    }

    fn run_solution(&mut self) -> std::result::Result<(), LangError> {
        self.scope.exec(&self.solution)?;
        self.scope
            .bind(SOLUTION_BINDING, Value::Str(self.solution.clone()));
        self.scope.bind(
            SOLUTION_LINES_BINDING,
            Value::Int(self.solution.lines().count() as i64),
        );
        Ok(())
    }

    fn run_tests(&mut self) -> std::result::Result<Vec<ExampleResult>, LangError> {
        let examples = extract_examples(&self.tests);
        debug!("replaying {} examples", examples.len());
        let mut results = Vec::with_capacity(examples.len());
        for example in &examples {
            results.push(self.run_example(example)?);
        }
        Ok(results)
    }

    fn run_example(&mut self, example: &Example) -> std::result::Result<ExampleResult, LangError> {
        match &example.want {
            None => {
                self.scope.exec(&example.source)?;
                Ok(ExampleResult::bare(example.source.as_str()))
            }
            Some(want) => {
                // Both sides go through the same canonical representation,
                // and correctness is equality of the representation text.
                let expected = self.scope.eval(want)?.repr();
                let received = self.scope.eval(&example.source)?.repr();
                Ok(ExampleResult::compared(
                    example.source.as_str(),
                    expected,
                    received,
                ))
            }
        }
    }

    /// True iff the run completed without fault and every compared example
    /// is correct. Bare statements never affect solvability. Derived; does
    /// not re-run anything.
    pub fn solved(&self) -> bool {
        if self.errors.is_some() {
            return false;
        }
        match &self.results {
            Some(results) => results.iter().all(|r| r.correct.unwrap_or(true)),
            None => false,
        }
    }

    pub fn results(&self) -> Option<&[ExampleResult]> {
        self.results.as_deref()
    }

    pub fn errors(&self) -> Option<&str> {
        self.errors.as_deref()
    }

    pub fn printed(&self) -> Option<&str> {
        self.printed.as_deref()
    }

    /// The scope examples executed against, for inspection.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Assemble the run verdict. Exactly one of `results`/`errors` is set
    /// after a completed run.
    pub fn to_report(&self) -> Report {
        let mut report = Report {
            solved: self.solved(),
            printed: self.printed.clone().unwrap_or_default(),
            results: None,
            errors: None,
        };
        if let Some(errors) = &self.errors {
            report.errors = Some(errors.clone());
        } else {
            report.results = self.results.clone();
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MemoryStreams;

    fn run_graded(solution: &str, tests: &str) -> TestRunner {
        let mut runner = TestRunner::new(solution, tests);
        let mut fake = MemoryStreams::new();
        runner.run_with(&mut fake).unwrap();
        runner
    }

    #[test]
    fn test_correct_solution_is_solved() {
        let runner = run_graded("foo = 1", ">>> foo\n1");
        assert_eq!(
            runner.results(),
            Some(
                &[ExampleResult {
                    call: "foo".to_string(),
                    expected: Some("1".to_string()),
                    received: Some("1".to_string()),
                    correct: Some(true),
                }][..]
            )
        );
        assert!(runner.solved());
        assert_eq!(runner.printed(), Some(""));
    }

    #[test]
    fn test_wrong_value_is_unsolved() {
        let runner = run_graded("foo = 2", ">>> foo\n1");
        let results = runner.results().unwrap();
        assert_eq!(results[0].received.as_deref(), Some("2"));
        assert_eq!(results[0].correct, Some(false));
        assert!(!runner.solved());
    }

    #[test]
    fn test_undefined_name_becomes_errors() {
        let runner = run_graded("foo = bar", ">>> foo\n1");
        assert!(runner.results().is_none());
        assert_eq!(runner.errors(), Some("name 'bar' is not defined"));
        assert!(!runner.solved());
    }

    #[test]
    fn test_bare_statement_records_only_call() {
        let runner = run_graded("a=1", ">>> a=2");
        assert_eq!(runner.results(), Some(&[ExampleResult::bare("a=2")][..]));
        assert!(runner.solved());
    }

    #[test]
    fn test_empty_spec_is_solved() {
        let runner = run_graded("x = 5", "");
        assert_eq!(runner.results(), Some(&[][..]));
        assert!(runner.solved());
    }

    #[test]
    fn test_examples_share_the_scope_in_order() {
        let runner = run_graded("a = 1", ">>> a = a + 1\n>>> a\n2");
        let results = runner.results().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].correct, Some(true));
        assert!(runner.solved());
    }

    #[test]
    fn test_representation_equality_not_value_equality() {
        // 1.0 == 1 semantically, but the representations differ
        let runner = run_graded("foo = 1.0", ">>> foo\n1");
        let results = runner.results().unwrap();
        assert_eq!(results[0].expected.as_deref(), Some("1"));
        assert_eq!(results[0].received.as_deref(), Some("1.0"));
        assert_eq!(results[0].correct, Some(false));
        assert!(!runner.solved());
    }

    #[test]
    fn test_solution_introspection_bindings() {
        let runner = run_graded(
            "foo = 1\nbar = 2",
            ">>> LINES_IN_YOUR_SOLUTION\n2\n\n>>> len(YOUR_SOLUTION)\n15",
        );
        assert!(runner.solved(), "results: {:?}", runner.results());
    }

    #[test]
    fn test_function_solution_with_example_calls() {
        let runner = run_graded("def foo(x):\n  return x*2", ">>> foo(2)\n4");
        assert!(runner.solved());
    }

    #[test]
    fn test_fault_mid_examples_drops_results() {
        let runner = run_graded("a = 1", ">>> a\n1\n\n>>> b\n2");
        assert!(runner.results().is_none());
        assert_eq!(runner.errors(), Some("name 'b' is not defined"));
        assert!(!runner.solved());
    }

    #[test]
    fn test_run_twice_is_rejected() {
        let mut runner = TestRunner::new("a = 1", "");
        let mut fake = MemoryStreams::new();
        runner.run_with(&mut fake).unwrap();
        match runner.run_with(&mut fake) {
            Err(VerifyError::AlreadyRan) => {}
            other => panic!("expected AlreadyRan, got {other:?}"),
        }
    }

    #[test]
    fn test_unrun_runner_is_not_solved_but_scope_exists() {
        let runner = TestRunner::new("a = 1", ">>> a\n1");
        assert!(!runner.solved());
        assert!(runner.scope().is_empty());
        assert!(runner.printed().is_none());
    }

    #[test]
    fn test_report_shape_for_success_and_fault() {
        let report = run_graded("foo = 1", ">>> foo\n1").to_report();
        assert!(report.solved);
        assert!(report.results.is_some());
        assert!(report.errors.is_none());

        let report = run_graded("foo = bar", "").to_report();
        assert!(!report.solved);
        assert!(report.results.is_none());
        assert_eq!(report.errors.as_deref(), Some("name 'bar' is not defined"));
    }
}
