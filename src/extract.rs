//! Example extraction from interactive-session-style test specifications.
//!
//! A specification is a block of text where each example starts with a
//! prompt-marked line (`>>> statement`); any following non-blank, non-prompt
//! lines up to the first blank line form the expected representation. Each
//! example's statement is exactly one line; continuation prompts are not
//! supported. Text that fits no example simply yields none — extraction
//! never fails a run.

use crate::types::Example;
use log::debug;

/// Session prompt marker opening each example line.
pub const PROMPT: &str = ">>>";

/// Parse a test specification into examples, in order of appearance.
pub fn extract_examples(text: &str) -> Vec<Example> {
    let mut examples = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if let Some(rest) = line.strip_prefix(PROMPT) {
            if let Some(pending) = current.take() {
                push_example(&mut examples, pending);
            }
            current = Some((rest.trim().to_string(), Vec::new()));
        } else if line.is_empty() {
            if let Some(pending) = current.take() {
                push_example(&mut examples, pending);
            }
        } else if let Some((_, want_lines)) = current.as_mut() {
            want_lines.push(line.to_string());
        }
        // Prose before the first prompt is ignored
    }
    if let Some(pending) = current.take() {
        push_example(&mut examples, pending);
    }

    debug!("extracted {} examples", examples.len());
    examples
}

fn push_example(examples: &mut Vec<Example>, (source, want_lines): (String, Vec<String>)) {
    if source.is_empty() {
        // A bare prompt carries nothing to run
        return;
    }
    let joined = want_lines.join("\n");
    let trimmed = joined.trim();
    examples.push(Example {
        source,
        want: if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        },
    });
}
