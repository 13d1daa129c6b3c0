//! The session state machine.
//!
//! All mutation funnels through [`SessionStore::apply`] with a [`Command`];
//! each application is atomic against the prior state, which is what makes
//! the 1 Hz timer tick safe against user edits without any locking ceremony.
//! Index-taking commands silently no-op out of range — the controller range-
//! checks first, but a stale render must never panic the store. Once
//! submitted, the session is frozen and every further command is ignored.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::content::question::{Answer, Question};
use crate::engine::results::SessionResults;
use crate::session::review::{self, Projection, ReviewMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Active,
    Submitted,
}

#[derive(Clone, Debug)]
pub enum Command {
    /// Reset everything and start the clock over the given question set.
    Load {
        questions: Vec<Question>,
        session_seconds: u32,
    },
    /// Move the display pointer (an index into the current visible list).
    SetCurrentIndex(usize),
    /// Store or overwrite the answer at an original index.
    SetAnswer { index: usize, answer: Answer },
    ToggleBookmark(usize),
    /// Enter or leave a review mode; entering `Unanswered` freezes the
    /// snapshot, and the display pointer resets atomically with the change.
    SetReviewMode(Option<ReviewMode>),
    /// Drop bookmarks from every fully answered question (review-mode exit,
    /// where the per-answer auto-removal was suppressed).
    CleanupBookmarks,
    UpdateTimer(u32),
    Submit(SessionResults),
}

pub struct SessionStore {
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub answers: HashMap<usize, Answer>,
    pub bookmarks: HashSet<usize>,
    pub review_mode: Option<ReviewMode>,
    pub unanswered_snapshot: HashSet<usize>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub time_remaining: u32,
    pub phase: Phase,
    pub results: Option<SessionResults>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            questions: Vec::new(),
            current_index: 0,
            answers: HashMap::new(),
            bookmarks: HashSet::new(),
            review_mode: None,
            unanswered_snapshot: HashSet::new(),
            started_at: None,
            ended_at: None,
            time_remaining: 0,
            phase: Phase::Loading,
            results: None,
        }
    }

    pub fn apply(&mut self, command: Command) {
        if self.phase == Phase::Submitted {
            return;
        }
        match command {
            Command::Load {
                questions,
                session_seconds,
            } => {
                self.questions = questions;
                self.current_index = 0;
                self.answers.clear();
                self.bookmarks.clear();
                self.review_mode = None;
                self.unanswered_snapshot.clear();
                self.started_at = Some(Utc::now());
                self.ended_at = None;
                self.time_remaining = session_seconds;
                self.phase = Phase::Active;
                self.results = None;
            }
            Command::SetCurrentIndex(index) => {
                if index < self.projection().len() {
                    self.current_index = index;
                }
            }
            Command::SetAnswer { index, answer } => {
                let Some(question) = self.questions.get(index) else {
                    return;
                };
                let fully = question.is_fully_answered(Some(&answer));
                self.answers.insert(index, answer);
                // A bookmarked question loses its bookmark only once it is
                // fully answered, and never while any review mode is active
                // (that would make it vanish from the review list mid-answer).
                if self.review_mode.is_none() && fully {
                    self.bookmarks.remove(&index);
                }
            }
            Command::ToggleBookmark(index) => {
                if index >= self.questions.len() {
                    return;
                }
                if self.bookmarks.insert(index) {
                    // Bookmarking resets progress on that question: it forces
                    // a deliberate re-visit during review.
                    self.answers.remove(&index);
                } else {
                    self.bookmarks.remove(&index);
                }
            }
            Command::SetReviewMode(mode) => {
                self.unanswered_snapshot = match mode {
                    Some(ReviewMode::Unanswered) => self.unanswered_indices().into_iter().collect(),
                    _ => HashSet::new(),
                };
                self.review_mode = mode;
                self.current_index = 0;
            }
            Command::CleanupBookmarks => {
                let answered: Vec<usize> = self
                    .bookmarks
                    .iter()
                    .copied()
                    .filter(|&i| self.is_fully_answered(i))
                    .collect();
                for index in answered {
                    self.bookmarks.remove(&index);
                }
                self.unanswered_snapshot.clear();
            }
            Command::UpdateTimer(seconds) => {
                if self.phase == Phase::Active {
                    self.time_remaining = seconds;
                }
            }
            Command::Submit(results) => {
                if self.phase == Phase::Active {
                    self.results = Some(results);
                    self.ended_at = Some(Utc::now());
                    self.phase = Phase::Submitted;
                }
            }
        }
    }

    /// The visible list for the current mode.
    pub fn projection(&self) -> Projection {
        review::project(
            self.questions.len(),
            &self.bookmarks,
            &self.unanswered_snapshot,
            self.review_mode,
        )
    }

    /// Original index of the question under the display pointer.
    pub fn original_index(&self) -> usize {
        self.projection().to_original(self.current_index)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.original_index())
    }

    pub fn answer(&self, original_index: usize) -> Option<&Answer> {
        self.answers.get(&original_index)
    }

    pub fn is_fully_answered(&self, original_index: usize) -> bool {
        self.questions
            .get(original_index)
            .is_some_and(|q| q.is_fully_answered(self.answers.get(&original_index)))
    }

    /// Original indices of not-fully-answered questions, ascending.
    pub fn unanswered_indices(&self) -> Vec<usize> {
        (0..self.questions.len())
            .filter(|&i| !self.is_fully_answered(i))
            .collect()
    }

    pub fn answered_count(&self) -> usize {
        (0..self.questions.len())
            .filter(|&i| self.is_fully_answered(i))
            .count()
    }

    /// Session duration so far, in whole seconds.
    pub fn elapsed_secs(&self) -> u64 {
        let Some(start) = self.started_at else {
            return 0;
        };
        let end = self.ended_at.unwrap_or_else(Utc::now);
        end.signed_duration_since(start).num_seconds().max(0) as u64
    }
}
