//! Per-kind answer grading.
//!
//! Pure functions over a question and a stored answer. An absent or
//! wrongly-shaped answer is incorrect, never an error; an unrecognized
//! question kind is incorrect too. The one impure path is executable code-ide
//! grading, which defers to a [`CodeRunner`].

use std::sync::OnceLock;

use regex::Regex;

use crate::content::question::{Answer, Payload, Question};
use crate::engine::constructs;
use crate::engine::sandbox::CodeRunner;
use crate::error::ExecError;

/// Whether the stored answer is correct for this question.
pub fn check_answer(question: &Question, answer: Option<&Answer>, runner: &dyn CodeRunner) -> bool {
    let Some(answer) = answer else {
        return false;
    };
    match &question.payload {
        Payload::Single { correct_answer, .. } => answer
            .as_text()
            .is_some_and(|a| correct_answer.first() == Some(a)),
        Payload::Multiple { correct_answer, .. } => answer.as_choices().is_some_and(|a| {
            if a.len() != correct_answer.len() {
                return false;
            }
            let mut learner = a.to_vec();
            let mut correct = correct_answer.clone();
            learner.sort();
            correct.sort();
            learner == correct
        }),
        Payload::DragAndDrop { correct_order, .. } => answer.as_slots().is_some_and(|slots| {
            slots.len() == correct_order.len()
                && slots
                    .iter()
                    .zip(correct_order)
                    .all(|(slot, &expected)| *slot == Some(expected))
        }),
        Payload::SqlCompletion { correct_answer, .. }
        | Payload::CodeCompletion { correct_answer, .. } => {
            answer.as_blanks().is_some_and(|blanks| {
                blanks.len() == correct_answer.len()
                    && blanks
                        .iter()
                        .zip(correct_answer)
                        .all(|(blank, expected)| blank.as_deref() == Some(expected.as_str()))
            })
        }
        Payload::CodeIde {
            language,
            correct_answer,
            ..
        } => {
            let Some(code) = answer.as_text() else {
                return false;
            };
            if language.as_deref() == Some("python") {
                check_executable(&question.question, code, correct_answer, runner)
            } else {
                normalize_code(code) == normalize_code(correct_answer)
            }
        }
        Payload::Unknown => false,
    }
}

/// Executable grading: run both sides, compare normalized stdout, then demand
/// every required construct from the prompt. Execution failure on either side
/// is incorrect; an absent interpreter degrades to source comparison.
fn check_executable(prompt: &str, code: &str, correct: &str, runner: &dyn CodeRunner) -> bool {
    match (runner.run(code), runner.run(correct)) {
        (Ok(learner_out), Ok(correct_out)) => {
            if normalize_code(&learner_out) != normalize_code(&correct_out) {
                return false;
            }
            constructs::required_constructs(prompt)
                .iter()
                .all(|c| constructs::source_uses(code, c))
        }
        (Err(ExecError::Unavailable(_)), _) | (_, Err(ExecError::Unavailable(_))) => {
            normalize_code(code) == normalize_code(correct)
        }
        _ => false,
    }
}

fn trailing_ws() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)[ \t]+$").expect("valid trailing-ws pattern"))
}

fn blank_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid blank-run pattern"))
}

/// Normalize code or captured output for comparison: trim, CRLF/CR to LF,
/// strip trailing whitespace per line, collapse runs of blank lines down to
/// one blank line.
pub fn normalize_code(code: &str) -> String {
    let unified = code.trim().replace("\r\n", "\n").replace('\r', "\n");
    let stripped = trailing_ws().replace_all(&unified, "");
    blank_run().replace_all(&stripped, "\n\n").into_owned()
}
