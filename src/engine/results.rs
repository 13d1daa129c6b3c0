//! Aggregate grading and the score report.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::content::question::{Answer, OneOrMany, Payload, Question};
use crate::engine::evaluate;
use crate::engine::sandbox::CodeRunner;

/// Minimum percentage score that counts as a pass.
pub const PASS_THRESHOLD: f64 = 85.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
    /// Percentage, rounded to two decimals.
    pub score: f64,
    pub passed: bool,
    pub time_spent_secs: u64,
    pub question_results: Vec<QuestionResult>,
}

/// Per-question record for the report view, in original order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question: Question,
    pub user_answer: Option<Answer>,
    pub is_correct: bool,
    /// Canonical correct answer for display: the `correctOrder` index
    /// permutation for drag-and-drop, the value-based key otherwise.
    pub correct_answer: Option<DisplayAnswer>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayAnswer {
    Order(Vec<usize>),
    Values(Vec<String>),
    Value(String),
}

fn display_answer(question: &Question) -> Option<DisplayAnswer> {
    match &question.payload {
        Payload::Single { correct_answer, .. } => match correct_answer {
            OneOrMany::One(v) => Some(DisplayAnswer::Value(v.clone())),
            OneOrMany::Many(vs) => Some(DisplayAnswer::Values(vs.clone())),
        },
        Payload::Multiple { correct_answer, .. }
        | Payload::SqlCompletion { correct_answer, .. }
        | Payload::CodeCompletion { correct_answer, .. } => {
            Some(DisplayAnswer::Values(correct_answer.clone()))
        }
        Payload::DragAndDrop { correct_order, .. } => {
            Some(DisplayAnswer::Order(correct_order.clone()))
        }
        Payload::CodeIde { correct_answer, .. } => {
            Some(DisplayAnswer::Value(correct_answer.clone()))
        }
        Payload::Unknown => None,
    }
}

/// Whether a percentage score passes the session.
pub fn is_passing(score: f64) -> bool {
    score >= PASS_THRESHOLD
}

/// Grade every question in original order against the answer snapshot.
///
/// `incorrect` counts only questions with a stored-but-wrong answer; a
/// genuinely absent answer lands in `unanswered`. Idempotent for a fixed
/// snapshot and deterministic runner.
pub fn compute_results(
    questions: &[Question],
    answers: &HashMap<usize, Answer>,
    runner: &dyn CodeRunner,
    time_spent_secs: u64,
) -> SessionResults {
    let mut correct = 0;
    let mut incorrect = 0;
    let mut question_results = Vec::with_capacity(questions.len());

    for (index, question) in questions.iter().enumerate() {
        let user_answer = answers.get(&index);
        let is_correct = evaluate::check_answer(question, user_answer, runner);
        if is_correct {
            correct += 1;
        } else if user_answer.is_some() {
            incorrect += 1;
        }
        question_results.push(QuestionResult {
            question: question.clone(),
            user_answer: user_answer.cloned(),
            is_correct,
            correct_answer: display_answer(question),
        });
    }

    let total = questions.len();
    let score = if total > 0 {
        correct as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let score = (score * 100.0).round() / 100.0;

    SessionResults {
        total,
        correct,
        incorrect,
        unanswered: total - correct - incorrect,
        score,
        passed: is_passing(score),
        time_spent_secs,
        question_results,
    }
}
