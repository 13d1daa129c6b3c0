//! Fire-and-forget result delivery.
//!
//! Both channels are best effort: a failed post or email is logged and
//! swallowed, never surfaced to the learner. Everything here runs on a
//! background thread after results are committed.

pub mod backend;
pub mod email;

use crate::config::Config;
use crate::engine::results::SessionResults;
use crate::session::controller::SessionMeta;

/// Push the committed results to every configured channel.
pub fn deliver(config: &Config, meta: Option<&SessionMeta>, results: &SessionResults) {
    let name = meta.map(|m| m.name.as_str()).unwrap_or("");
    let exam_id = meta.map(|m| m.exam_id.as_str()).unwrap_or("");

    if let Err(err) = backend::post_score(config, results, name, exam_id) {
        tracing::warn!("failed to post score to backend: {err}");
    }
    if let Err(err) = email::send_report(config, results, name) {
        tracing::warn!("failed to send results email: {err}");
    }
}
