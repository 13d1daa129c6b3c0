//! Load-time randomization of a question set.
//!
//! Both the question order and each question's option list get an unbiased
//! Fisher–Yates shuffle (via `rand`), applied once when content loads. The
//! input slice is never mutated; callers keep the authored payload intact.
//!
//! Drag-and-drop questions are exempt at the option level: their
//! `correctOrder` is a fixed index permutation over the authored option list,
//! so reordering the options would silently re-key the answer.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::content::question::{Payload, Question};

/// Shuffle a question set with a fresh entropy-seeded RNG.
pub fn shuffle_question_set(questions: &[Question]) -> Vec<Question> {
    let mut rng = SmallRng::from_entropy();
    shuffle_question_set_with(questions, &mut rng)
}

/// Shuffle with a caller-supplied RNG (seeded in tests).
pub fn shuffle_question_set_with(questions: &[Question], rng: &mut SmallRng) -> Vec<Question> {
    let mut shuffled: Vec<Question> = questions
        .iter()
        .map(|q| shuffle_options(q.clone(), rng))
        .collect();
    shuffled.shuffle(rng);
    shuffled
}

/// Shuffle one question's option list. Correct answers for single/multiple
/// kinds are keyed by value, never by position, so the option shuffle cannot
/// re-key them. Kinds without a shufflable option list pass through
/// untouched.
fn shuffle_options(mut question: Question, rng: &mut SmallRng) -> Question {
    match &mut question.payload {
        Payload::Single { options, .. } | Payload::Multiple { options, .. } => {
            options.shuffle(rng);
        }
        _ => {}
    }
    question
}
