//! Session orchestration.
//!
//! The controller sits between the UI shell and the store: it validates
//! learner-initiated transitions, owns the timer and the grading worker, and
//! serializes submission so exactly one result set can ever be committed. The
//! shell calls the action methods from its event loop and pumps the session
//! channel once per frame; ticks and grading completions arrive there and go
//! through the same single-threaded dispatch as user actions.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::content::loader::{self, CaseStudyScenario, ContentSource};
use crate::content::question::{Answer, Question};
use crate::delivery;
use crate::engine::results::{self, SessionResults};
use crate::engine::sandbox::CodeRunner;
use crate::error::ContentLoadError;
use crate::session::review::{Projection, ReviewMode};
use crate::session::store::{Command, Phase, SessionStore};
use crate::session::timer::{SessionEvent, TimerDriver};

/// Identity of the loaded set, carried into result delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionMeta {
    /// Display name of the set ("Sql Fundamentals").
    pub name: String,
    /// Exam identifier: the content category segment ("mocks").
    pub exam_id: String,
}

/// Outcome of a submit request; the shell turns these into dialogs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitCheck {
    /// All gates passed; `confirm_submit` will start grading.
    Ready,
    /// Already submitted, or a grading pass is in flight.
    Rejected,
    /// Bookmarked review: this many bookmarked questions are incomplete.
    IncompleteBookmarked(usize),
    /// Unanswered review: this many questions are still incomplete.
    IncompleteUnanswered(usize),
    /// Bookmarks remain; offer a bookmarked review pass first.
    BookmarksRemain(usize),
    /// This many questions unanswered; offer review or submit anyway.
    UnansweredRemain(usize),
}

/// Outcome of exiting review mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReview {
    /// Everything answered and no bookmarks left; ready to submit.
    ReadyToSubmit,
    Continue,
}

pub struct SessionController {
    store: SessionStore,
    config: Config,
    runner: Arc<dyn CodeRunner>,
    tx: Sender<SessionEvent>,
    rx: Receiver<SessionEvent>,
    timer: Option<TimerDriver>,
    grading_in_flight: bool,
    meta: Option<SessionMeta>,
    scenario: Option<CaseStudyScenario>,
}

impl SessionController {
    pub fn new(config: Config, runner: Arc<dyn CodeRunner>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            store: SessionStore::new(),
            config,
            runner,
            tx,
            rx,
            timer: None,
            grading_in_flight: false,
            meta: None,
            scenario: None,
        }
    }

    /// Load a plain quiz payload and start the session clock. On failure the
    /// session stays in `Loading` with nothing half-initialized behind it.
    pub fn load_quiz(
        &mut self,
        source: &dyn ContentSource,
        path: &str,
    ) -> Result<(), ContentLoadError> {
        let questions = loader::load_question_set(source, path)?;
        self.scenario = None;
        self.start(questions, path);
        Ok(())
    }

    /// Load a case-study payload: same session machinery, plus scenario
    /// metadata for the shell's context panel.
    pub fn load_case_study(
        &mut self,
        source: &dyn ContentSource,
        path: &str,
    ) -> Result<(), ContentLoadError> {
        let case_study = loader::load_case_study(source, path)?;
        self.scenario = Some(case_study.scenario);
        self.start(case_study.questions, path);
        Ok(())
    }

    fn start(&mut self, questions: Vec<Question>, path: &str) {
        self.meta = Some(SessionMeta {
            name: loader::display_name(path),
            exam_id: path.split('/').next().unwrap_or("").to_string(),
        });
        self.store.apply(Command::Load {
            questions,
            session_seconds: self.config.session_seconds(),
        });
        self.grading_in_flight = false;
        self.timer = Some(TimerDriver::spawn(self.tx.clone()));
    }

    // --- event pump ---

    /// Drain and handle every pending event. Call once per frame.
    pub fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Block up to `timeout` for one event and handle it.
    pub fn pump_blocking(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                true
            }
            Err(_) => false,
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Tick => self.tick(),
            SessionEvent::Graded(results) => self.commit_results(results),
        }
    }

    fn tick(&mut self) {
        if self.store.phase != Phase::Active || self.grading_in_flight {
            return;
        }
        let remaining = self.store.time_remaining;
        if remaining <= 1 {
            // Expiry: clamp to zero and force-grade the current answer
            // snapshot. The in-flight flag keeps later ticks out.
            self.store.apply(Command::UpdateTimer(0));
            self.begin_grading();
        } else {
            self.store.apply(Command::UpdateTimer(remaining - 1));
        }
    }

    /// Spawn the grading worker over a snapshot of the current answers.
    /// Grading can be slow (sandboxed execution); the session stays
    /// responsive and the result lands as a `Graded` event.
    fn begin_grading(&mut self) {
        if self.grading_in_flight || self.store.phase != Phase::Active {
            return;
        }
        self.grading_in_flight = true;
        let questions = self.store.questions.clone();
        let answers = self.store.answers.clone();
        let elapsed = self.store.elapsed_secs();
        let runner = Arc::clone(&self.runner);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let results = results::compute_results(&questions, &answers, runner.as_ref(), elapsed);
            // Receiver gone means the session was torn down; nothing to do.
            let _ = tx.send(SessionEvent::Graded(results));
        });
    }

    fn commit_results(&mut self, results: SessionResults) {
        self.grading_in_flight = false;
        if self.store.phase != Phase::Active {
            return;
        }
        self.store.apply(Command::Submit(results.clone()));
        self.timer = None;

        // Fire-and-forget delivery; failures are logged, never surfaced.
        let config = self.config.clone();
        let meta = self.meta.clone();
        thread::spawn(move || {
            delivery::deliver(&config, meta.as_ref(), &results);
        });
    }

    // --- navigation ---

    pub fn next_question(&mut self) {
        let len = self.store.projection().len();
        if len > 0 && self.store.current_index + 1 < len {
            self.store
                .apply(Command::SetCurrentIndex(self.store.current_index + 1));
        }
    }

    pub fn previous_question(&mut self) {
        if self.store.current_index > 0 {
            self.store
                .apply(Command::SetCurrentIndex(self.store.current_index - 1));
        }
    }

    /// Jump to a position in the visible list. Out of range is a no-op.
    pub fn jump_to(&mut self, visible_index: usize) {
        self.store.apply(Command::SetCurrentIndex(visible_index));
    }

    // --- answering and bookmarks ---

    /// Store an answer for the question under the display pointer.
    pub fn set_answer(&mut self, answer: Answer) {
        let index = self.store.original_index();
        self.store.apply(Command::SetAnswer { index, answer });
        self.ensure_review_consistency();
    }

    pub fn toggle_bookmark(&mut self) {
        let index = self.store.original_index();
        self.store.apply(Command::ToggleBookmark(index));
        self.ensure_review_consistency();
    }

    // --- review modes ---

    /// Enter a review mode. Only reachable from plain mode; no nesting.
    /// Returns whether the mode is active afterwards (an empty review list
    /// exits immediately).
    pub fn enter_review(&mut self, mode: ReviewMode) -> bool {
        if self.store.phase != Phase::Active || self.store.review_mode.is_some() {
            return false;
        }
        self.store.apply(Command::SetReviewMode(Some(mode)));
        self.ensure_review_consistency();
        self.store.review_mode == Some(mode)
    }

    /// Leave review mode: sweep bookmarks off fully answered questions, drop
    /// the snapshot, reset the pointer.
    pub fn exit_review(&mut self) -> ExitReview {
        if self.store.review_mode.is_none() {
            return ExitReview::Continue;
        }
        self.store.apply(Command::CleanupBookmarks);
        self.store.apply(Command::SetReviewMode(None));
        if self.store.bookmarks.is_empty() && self.store.unanswered_indices().is_empty() {
            ExitReview::ReadyToSubmit
        } else {
            ExitReview::Continue
        }
    }

    /// An empty visible list must never be a steady state: exit review
    /// immediately, and clamp a pointer left beyond the end of a shrunken
    /// list.
    fn ensure_review_consistency(&mut self) {
        if self.store.phase != Phase::Active {
            return;
        }
        let projection = self.store.projection();
        if self.store.review_mode.is_some() && projection.is_empty() {
            self.store.apply(Command::CleanupBookmarks);
            self.store.apply(Command::SetReviewMode(None));
            return;
        }
        if !projection.is_empty() && self.store.current_index >= projection.len() {
            self.store.apply(Command::SetCurrentIndex(projection.len() - 1));
        }
    }

    // --- submission ---

    /// Run the submit gates. May transition review modes as a side effect
    /// (leaving bookmarked review once every bookmarked question is done),
    /// mirroring what an invigilator-style flow demands before the final
    /// confirmation.
    pub fn request_submit(&mut self) -> SubmitCheck {
        if self.store.phase != Phase::Active || self.grading_in_flight {
            return SubmitCheck::Rejected;
        }
        match self.store.review_mode {
            Some(ReviewMode::Bookmarked) => {
                let incomplete = self
                    .store
                    .bookmarks
                    .iter()
                    .filter(|&&i| !self.store.is_fully_answered(i))
                    .count();
                if incomplete > 0 {
                    return SubmitCheck::IncompleteBookmarked(incomplete);
                }
                self.store.apply(Command::CleanupBookmarks);
                self.store.apply(Command::SetReviewMode(None));
                let unanswered = self.store.unanswered_indices().len();
                if unanswered > 0 {
                    SubmitCheck::UnansweredRemain(unanswered)
                } else {
                    SubmitCheck::Ready
                }
            }
            Some(ReviewMode::Unanswered) => {
                let unanswered = self.store.unanswered_indices().len();
                if unanswered > 0 {
                    return SubmitCheck::IncompleteUnanswered(unanswered);
                }
                self.store.apply(Command::SetReviewMode(None));
                SubmitCheck::Ready
            }
            None => {
                let bookmarks = self.store.bookmarks.len();
                if bookmarks > 0 {
                    return SubmitCheck::BookmarksRemain(bookmarks);
                }
                let unanswered = self.store.unanswered_indices().len();
                if unanswered > 0 {
                    return SubmitCheck::UnansweredRemain(unanswered);
                }
                SubmitCheck::Ready
            }
        }
    }

    /// Start the grading pass. Returns false when a pass is already in
    /// flight or the session is not active — submission is serialized and a
    /// second attempt is rejected, never coalesced into a second result set.
    pub fn confirm_submit(&mut self) -> bool {
        if self.store.phase != Phase::Active || self.grading_in_flight {
            return false;
        }
        self.begin_grading();
        true
    }

    // --- read-only projections for the shell ---

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.store.phase
    }

    pub fn projection(&self) -> Projection {
        self.store.projection()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.store.current_question()
    }

    pub fn current_answer(&self) -> Option<&Answer> {
        self.store.answer(self.store.original_index())
    }

    pub fn time_remaining(&self) -> u32 {
        self.store.time_remaining
    }

    pub fn results(&self) -> Option<&SessionResults> {
        self.store.results.as_ref()
    }

    pub fn meta(&self) -> Option<&SessionMeta> {
        self.meta.as_ref()
    }

    pub fn scenario(&self) -> Option<&CaseStudyScenario> {
        self.scenario.as_ref()
    }

    /// Percentage of fully answered questions, for the progress bar.
    pub fn progress_percent(&self) -> f64 {
        let total = self.store.questions.len();
        if total == 0 {
            return 0.0;
        }
        self.store.answered_count() as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::question::{OneOrMany, Payload};
    use crate::engine::sandbox::NoopRunner;
    use crate::session::store::Command;

    fn single(label: &str, correct: &str) -> Question {
        Question {
            question: label.to_string(),
            payload: Payload::Single {
                options: vec!["a".into(), "b".into()],
                correct_answer: OneOrMany::One(correct.into()),
            },
            image: None,
            explanation: None,
        }
    }

    fn controller_with(n: usize) -> SessionController {
        let mut controller = SessionController::new(Config::default(), Arc::new(NoopRunner));
        controller.store.apply(Command::Load {
            questions: (0..n).map(|i| single(&format!("q{i}"), "a")).collect(),
            session_seconds: 60,
        });
        controller
    }

    fn answer_current(controller: &mut SessionController, value: &str) {
        controller.set_answer(Answer::Text(value.to_string()));
    }

    #[test]
    fn test_navigation_is_bounds_checked() {
        let mut c = controller_with(3);
        c.previous_question();
        assert_eq!(c.store.current_index, 0);
        c.next_question();
        c.next_question();
        c.next_question();
        assert_eq!(c.store.current_index, 2);
        c.jump_to(99);
        assert_eq!(c.store.current_index, 2);
    }

    #[test]
    fn test_empty_review_exits_immediately() {
        let mut c = controller_with(3);
        assert!(!c.enter_review(ReviewMode::Bookmarked));
        assert!(c.store.review_mode.is_none());
    }

    #[test]
    fn test_unbookmarking_last_question_exits_review() {
        let mut c = controller_with(3);
        c.toggle_bookmark();
        assert!(c.enter_review(ReviewMode::Bookmarked));
        // The only bookmarked question loses its bookmark.
        c.toggle_bookmark();
        assert!(c.store.review_mode.is_none());
        assert_eq!(c.store.current_index, 0);
    }

    #[test]
    fn test_no_review_nesting() {
        let mut c = controller_with(3);
        assert!(c.enter_review(ReviewMode::Unanswered));
        assert!(!c.enter_review(ReviewMode::Bookmarked));
        assert_eq!(c.store.review_mode, Some(ReviewMode::Unanswered));
    }

    #[test]
    fn test_request_submit_offers_review_passes_in_order() {
        let mut c = controller_with(2);
        c.toggle_bookmark();
        assert_eq!(c.request_submit(), SubmitCheck::BookmarksRemain(1));

        assert!(c.enter_review(ReviewMode::Bookmarked));
        // The bookmarked question is unanswered, so submission is blocked.
        assert_eq!(c.request_submit(), SubmitCheck::IncompleteBookmarked(1));
        answer_current(&mut c, "a");
        // Completing it clears the gate; review exits, q1 is still blank.
        assert_eq!(c.request_submit(), SubmitCheck::UnansweredRemain(1));
        assert!(c.store.review_mode.is_none());
        assert!(c.store.bookmarks.is_empty());

        assert!(c.enter_review(ReviewMode::Unanswered));
        assert_eq!(c.request_submit(), SubmitCheck::IncompleteUnanswered(1));
        answer_current(&mut c, "b");
        assert_eq!(c.request_submit(), SubmitCheck::Ready);
        assert!(c.store.review_mode.is_none());
    }

    #[test]
    fn test_exit_review_reports_ready_when_everything_done() {
        let mut c = controller_with(2);
        answer_current(&mut c, "a");
        c.next_question();
        c.toggle_bookmark();
        assert!(c.enter_review(ReviewMode::Bookmarked));
        answer_current(&mut c, "a");
        assert_eq!(c.exit_review(), ExitReview::ReadyToSubmit);
    }

    #[test]
    fn test_forced_submit_happens_exactly_once() {
        let mut c = controller_with(5);
        c.store.apply(Command::UpdateTimer(2));
        answer_current(&mut c, "a");
        c.next_question();
        answer_current(&mut c, "b");

        c.handle_event(SessionEvent::Tick); // 2 -> 1
        assert_eq!(c.time_remaining(), 1);
        c.handle_event(SessionEvent::Tick); // expiry: grade + submit
        c.handle_event(SessionEvent::Tick); // must not re-enter
        assert_eq!(c.time_remaining(), 0);

        assert!(c.pump_blocking(Duration::from_secs(5)));
        assert_eq!(c.phase(), Phase::Submitted);
        let results = c.results().unwrap();
        assert_eq!(results.total, 5);
        assert_eq!(results.correct, 1);
        assert_eq!(results.incorrect, 1);
        assert_eq!(results.unanswered, 3);

        // Any straggler events leave the committed results untouched.
        let committed = results.clone();
        c.handle_event(SessionEvent::Tick);
        c.pump();
        assert_eq!(c.results(), Some(&committed));
    }

    #[test]
    fn test_second_submit_attempt_is_rejected() {
        let mut c = controller_with(1);
        answer_current(&mut c, "a");
        assert_eq!(c.request_submit(), SubmitCheck::Ready);
        assert!(c.confirm_submit());
        assert!(!c.confirm_submit());
        assert_eq!(c.request_submit(), SubmitCheck::Rejected);

        assert!(c.pump_blocking(Duration::from_secs(5)));
        assert_eq!(c.phase(), Phase::Submitted);
        assert!(!c.confirm_submit());
    }

    #[test]
    fn test_answer_edits_do_not_touch_the_countdown() {
        let mut c = controller_with(2);
        c.store.apply(Command::UpdateTimer(30));
        answer_current(&mut c, "a");
        c.next_question();
        answer_current(&mut c, "b");
        assert_eq!(c.time_remaining(), 30);
    }

    #[test]
    fn test_progress_counts_fully_answered() {
        let mut c = controller_with(4);
        answer_current(&mut c, "a");
        assert_eq!(c.progress_percent(), 25.0);
        answer_current(&mut c, "a");
        assert_eq!(c.progress_percent(), 25.0);
        c.next_question();
        answer_current(&mut c, "a");
        assert_eq!(c.progress_percent(), 50.0);
    }
}
