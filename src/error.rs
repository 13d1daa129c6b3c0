//! Error taxonomy for content loading and sandboxed grading.
//!
//! Only two failure classes are typed: a content load failure aborts the
//! session before it starts, and a sandbox failure downgrades a code question
//! to "incorrect" inside the evaluator. Invalid commands (stale indices, bad
//! mode transitions) are not errors at all — the store silently ignores them
//! so the UI stays resilient to stale renders.

use std::time::Duration;

use thiserror::Error;

/// Failure to fetch or parse a question-set or case-study payload.
///
/// Any of these aborts the session and returns the learner to the landing
/// view; the engine stays in the `Loading` phase with no half-initialized
/// state behind it.
#[derive(Debug, Error)]
pub enum ContentLoadError {
    #[error("content not found: {0}")]
    NotFound(String),

    #[error("failed to read content: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse content: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("content contains no questions: {0}")]
    Empty(String),
}

/// Failure inside the sandboxed interpreter while grading a code question.
///
/// Never propagated out of grading: `Unavailable` falls back to normalized
/// source comparison, everything else marks the question incorrect.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The interpreter could not be spawned at all (not installed, bad path).
    #[error("interpreter unavailable: {0}")]
    Unavailable(String),

    /// The code ran but exited with an error.
    #[error("execution failed: {0}")]
    Failed(String),

    #[error("execution timed out after {0:?}")]
    Timeout(Duration),

    #[error("sandbox io error: {0}")]
    Io(#[from] std::io::Error),
}
