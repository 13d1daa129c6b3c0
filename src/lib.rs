//! Embeddable mock-exam session engine.
//!
//! The crate owns the session state machine: question-set loading and
//! randomization, the answer store, bookmark/review filtering, the countdown
//! timer, grading, and result delivery. Rendering belongs to a UI shell; the
//! shell drives a [`session::controller::SessionController`], feeds it learner
//! actions, and pumps its event channel once per frame.

pub mod config;
pub mod content;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod session;
