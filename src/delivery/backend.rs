//! Score posting to the legacy form-based backend.
//!
//! The receiving page reads classic form fields by name, so the field names
//! below are load-bearing: `AchievedScore` is the raw correct count,
//! `maxscore` the question count, `accuracy` the percentage score,
//! `MocknumberVal` the set name and `ExamIDVal` the exam category.

use anyhow::Result;

use crate::config::Config;
use crate::engine::results::SessionResults;

/// Form-encoded payload for the score endpoint, in the order the backend
/// expects to read the fields.
pub fn score_form(results: &SessionResults, name: &str, exam_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("AchievedScore", results.correct.to_string()),
        ("maxscore", results.total.to_string()),
        ("accuracy", results.score.to_string()),
        ("MocknumberVal", name.to_string()),
        ("ExamIDVal", exam_id.to_string()),
    ]
}

#[cfg(feature = "network")]
pub fn post_score(
    config: &Config,
    results: &SessionResults,
    name: &str,
    exam_id: &str,
) -> Result<()> {
    let Some(endpoint) = config.results_endpoint.as_deref() else {
        return Ok(());
    };
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;
    let response = client
        .post(endpoint)
        .form(&score_form(results, name, exam_id))
        .send()?;
    if !response.status().is_success() {
        anyhow::bail!("score endpoint returned {}", response.status());
    }
    Ok(())
}

#[cfg(not(feature = "network"))]
pub fn post_score(
    _config: &Config,
    _results: &SessionResults,
    _name: &str,
    _exam_id: &str,
) -> Result<()> {
    Ok(())
}
