use std::sync::Arc;
use std::time::Duration;

use examdrill::config::Config;
use examdrill::content::loader::EmbeddedSource;
use examdrill::content::question::{Answer, Payload, Question};
use examdrill::engine::sandbox::NoopRunner;
use examdrill::session::controller::{ExitReview, SessionController, SubmitCheck};
use examdrill::session::review::ReviewMode;
use examdrill::session::store::Phase;

fn controller(config: Config) -> SessionController {
    SessionController::new(config, Arc::new(NoopRunner))
}

/// Build the correct answer for a question straight from its payload.
fn correct_answer_for(question: &Question) -> Answer {
    match &question.payload {
        Payload::Single { correct_answer, .. } => {
            Answer::Text(correct_answer.first().unwrap_or("").to_string())
        }
        Payload::Multiple { correct_answer, .. } => Answer::Choices(correct_answer.clone()),
        Payload::DragAndDrop { correct_order, .. } => {
            Answer::Slots(correct_order.iter().map(|&i| Some(i)).collect())
        }
        Payload::SqlCompletion { correct_answer, .. }
        | Payload::CodeCompletion { correct_answer, .. } => {
            Answer::Blanks(correct_answer.iter().map(|v| Some(v.clone())).collect())
        }
        Payload::CodeIde { correct_answer, .. } => Answer::Text(correct_answer.clone()),
        Payload::Unknown => Answer::Text(String::new()),
    }
}

fn answer_all_correctly(c: &mut SessionController) {
    let total = c.store().questions.len();
    for visible in 0..total {
        c.jump_to(visible);
        let answer = correct_answer_for(c.current_question().unwrap());
        c.set_answer(answer);
    }
}

fn wait_for_results(c: &mut SessionController) {
    for _ in 0..100 {
        if c.phase() == Phase::Submitted {
            return;
        }
        c.pump_blocking(Duration::from_millis(300));
    }
    panic!("session never reached the submitted phase");
}

#[test]
fn embedded_quiz_starts_a_full_session() {
    let mut c = controller(Config::default());
    c.load_quiz(&EmbeddedSource, "mocks/sql-fundamentals.json")
        .unwrap();

    assert_eq!(c.phase(), Phase::Active);
    assert_eq!(c.time_remaining(), 90 * 60);
    let meta = c.meta().unwrap();
    assert_eq!(meta.name, "Sql Fundamentals");
    assert_eq!(meta.exam_id, "mocks");
    assert!(c.scenario().is_none());
    assert_eq!(c.store().questions.len(), 8);
    assert_eq!(c.projection().len(), 8);
}

#[test]
fn case_study_carries_scenario_and_grades_to_full_marks() {
    let mut c = controller(Config::default());
    c.load_case_study(&EmbeddedSource, "case-studies/azure-migration.json")
        .unwrap();

    let scenario = c.scenario().unwrap();
    assert!(scenario.overview.general_overview.is_some());
    assert!(!scenario.requirements.is_empty());

    answer_all_correctly(&mut c);
    assert_eq!(c.request_submit(), SubmitCheck::Ready);
    assert!(c.confirm_submit());
    wait_for_results(&mut c);

    let results = c.results().unwrap();
    assert_eq!(results.total, 5);
    assert_eq!(results.correct, 5);
    assert_eq!(results.score, 100.0);
    assert!(results.passed);
    assert!(results.question_results.iter().all(|r| r.is_correct));
}

#[test]
fn expired_timer_forces_submission_of_partial_answers() {
    let mut c = controller(Config {
        session_minutes: 0,
        ..Config::default()
    });
    c.load_quiz(&EmbeddedSource, "mocks/sql-fundamentals.json")
        .unwrap();
    let answer = correct_answer_for(c.current_question().unwrap());
    c.set_answer(answer);

    // The real timer thread delivers the expiry tick within a second or two.
    wait_for_results(&mut c);

    let committed = c.results().unwrap().clone();
    assert_eq!(committed.total, 8);
    assert_eq!(committed.correct, 1);
    assert_eq!(committed.unanswered, 7);
    assert!(!committed.passed);

    // The session is frozen: nothing mutates after submission.
    assert!(!c.confirm_submit());
    assert_eq!(c.request_submit(), SubmitCheck::Rejected);
    c.set_answer(Answer::Text("late".to_string()));
    c.pump();
    assert_eq!(c.results(), Some(&committed));
}

#[test]
fn bookmarked_review_sees_only_bookmarks_and_sweeps_them_on_exit() {
    let mut c = controller(Config::default());
    c.load_quiz(&EmbeddedSource, "mocks/sql-fundamentals.json")
        .unwrap();

    c.jump_to(2);
    c.toggle_bookmark();
    c.jump_to(5);
    c.toggle_bookmark();
    assert_eq!(c.store().bookmarks.len(), 2);

    assert!(c.enter_review(ReviewMode::Bookmarked));
    assert_eq!(c.projection().len(), 2);

    // Answering inside review keeps the bookmark until exit.
    let answer = correct_answer_for(c.current_question().unwrap());
    c.set_answer(answer);
    assert_eq!(c.store().bookmarks.len(), 2);

    assert_eq!(c.exit_review(), ExitReview::Continue);
    assert_eq!(c.store().bookmarks.len(), 1);
    assert_eq!(c.projection().len(), 8);
}

#[test]
fn answer_outside_review_clears_the_bookmark() {
    let mut c = controller(Config::default());
    c.load_quiz(&EmbeddedSource, "mocks/sql-fundamentals.json")
        .unwrap();

    c.toggle_bookmark();
    assert_eq!(c.store().bookmarks.len(), 1);
    let answer = correct_answer_for(c.current_question().unwrap());
    c.set_answer(answer);
    assert!(c.store().bookmarks.is_empty());
}

#[test]
fn unanswered_review_list_is_a_frozen_snapshot() {
    let mut c = controller(Config::default());
    c.load_quiz(&EmbeddedSource, "mocks/sql-fundamentals.json")
        .unwrap();

    let answer = correct_answer_for(c.current_question().unwrap());
    c.set_answer(answer);

    assert!(c.enter_review(ReviewMode::Unanswered));
    assert_eq!(c.projection().len(), 7);

    // Answering inside review does not shrink the visible list.
    let answer = correct_answer_for(c.current_question().unwrap());
    c.set_answer(answer);
    assert_eq!(c.projection().len(), 7);

    assert_eq!(c.exit_review(), ExitReview::Continue);
    assert_eq!(c.projection().len(), 8);
}

#[test]
fn submit_gates_walk_bookmarks_then_unanswered() {
    let mut c = controller(Config::default());
    c.load_quiz(&EmbeddedSource, "mocks/sql-fundamentals.json")
        .unwrap();

    answer_all_correctly(&mut c);
    c.jump_to(3);
    c.toggle_bookmark();
    // Bookmarking wipes the stored answer, so both gates now apply.
    assert_eq!(c.request_submit(), SubmitCheck::BookmarksRemain(1));

    assert!(c.enter_review(ReviewMode::Bookmarked));
    assert_eq!(c.request_submit(), SubmitCheck::IncompleteBookmarked(1));
    let answer = correct_answer_for(c.current_question().unwrap());
    c.set_answer(answer);
    assert_eq!(c.request_submit(), SubmitCheck::Ready);
    assert!(c.store().review_mode.is_none());

    assert!(c.confirm_submit());
    wait_for_results(&mut c);
    assert_eq!(c.results().unwrap().score, 100.0);
}
