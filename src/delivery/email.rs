//! Emailed results report.
//!
//! Renders the per-question report as an HTML document and hands it to an
//! EmailJS-compatible REST endpoint. All the formatting lives in pure
//! functions so the report can be tested without any network.

use std::fmt::Write as _;

use anyhow::Result;
use chrono::Local;

use crate::config::Config;
use crate::content::question::{Answer, Question};
use crate::engine::results::{DisplayAnswer, SessionResults};

#[cfg(feature = "network")]
const DEFAULT_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// One line of display text for what the learner submitted.
pub fn format_user_answer(question: &Question, answer: Option<&Answer>) -> String {
    let Some(answer) = answer else {
        return "Not answered".to_string();
    };
    match question.kind() {
        "drag-and-drop" => match answer.as_slots() {
            Some(slots) => {
                let options = question.options().unwrap_or(&[]);
                slots
                    .iter()
                    .map(|slot| match slot {
                        Some(i) => options
                            .get(*i)
                            .cloned()
                            .unwrap_or_else(|| format!("Option {i}")),
                        None => "(blank)".to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" → ")
            }
            None => fallback_answer(answer),
        },
        "sql-completion" | "code-completion" => match answer.as_blanks() {
            Some(blanks) => blanks
                .iter()
                .map(|blank| blank.as_deref().unwrap_or("(blank)").to_string())
                .collect::<Vec<_>>()
                .join(" | "),
            None => fallback_answer(answer),
        },
        "code-ide" => match answer.as_text() {
            Some(code) if !code.is_empty() => code.to_string(),
            _ => "No code provided".to_string(),
        },
        _ => fallback_answer(answer),
    }
}

fn fallback_answer(answer: &Answer) -> String {
    match answer {
        Answer::Text(text) => text.clone(),
        Answer::Choices(choices) => choices.join(", "),
        Answer::Blanks(blanks) => blanks
            .iter()
            .map(|blank| blank.as_deref().unwrap_or("(blank)").to_string())
            .collect::<Vec<_>>()
            .join(" | "),
        Answer::Slots(slots) => slots
            .iter()
            .map(|slot| match slot {
                Some(i) => i.to_string(),
                None => "(blank)".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" → "),
    }
}

/// One line of display text for the expected answer. Drag-and-drop keys are
/// index permutations and get resolved back to option text here.
pub fn format_correct_answer(question: &Question, correct: Option<&DisplayAnswer>) -> String {
    let Some(correct) = correct else {
        return "No correct answer provided".to_string();
    };
    match correct {
        DisplayAnswer::Order(indices) => {
            let options = question.options().unwrap_or(&[]);
            indices
                .iter()
                .map(|i| {
                    options
                        .get(*i)
                        .cloned()
                        .unwrap_or_else(|| format!("Option {i}"))
                })
                .collect::<Vec<_>>()
                .join(" → ")
        }
        DisplayAnswer::Values(values) => match question.kind() {
            "sql-completion" | "code-completion" => values.join(" | "),
            _ => values.join(", "),
        },
        DisplayAnswer::Value(value) => value.clone(),
    }
}

/// "Xh Ym Zs" with leading units dropped; zero reads as unavailable.
pub fn format_time_spent(seconds: u64) -> String {
    if seconds == 0 {
        return "N/A".to_string();
    }
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {mins}m {secs}s")
    } else if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

fn wrap_answer(text: &str, code: bool) -> String {
    if code {
        format!(
            "<pre style=\"background-color: #1e1e1e; color: #d4d4d4; padding: 15px; border-radius: 4px;\">{}</pre>",
            escape_html(text)
        )
    } else {
        format!("<p>{}</p>", escape_html(text))
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the full HTML report: header with pass/fail and score, the
/// aggregate statistics, then every question with the learner's answer, the
/// expected answer, and the explanation when one exists.
pub fn format_report_html(results: &SessionResults, name: &str) -> String {
    let generated = Local::now().format("%A, %-d %B %Y, %H:%M");
    let status = if results.passed { "PASSED" } else { "FAILED" };
    let header_color = if results.passed { "#4CAF50" } else { "#f44336" };

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"UTF-8\"></head>\n<body style=\"font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto;\">\n\
         <div style=\"background-color: {header_color}; color: white; padding: 20px; border-radius: 8px;\">\n\
         <h1>{}</h1>\n\
         <p><strong>Status:</strong> {status}</p>\n\
         <p><strong>Score:</strong> {}%</p>\n\
         <p><strong>Completed:</strong> {generated}</p>\n\
         </div>\n",
        escape_html(name),
        results.score,
    );
    let _ = write!(
        html,
        "<h2>Statistics</h2>\n<ul>\n\
         <li>Total Questions: {}</li>\n\
         <li>Correct: {}</li>\n\
         <li>Incorrect: {}</li>\n\
         <li>Unanswered: {}</li>\n\
         <li>Time Spent: {}</li>\n\
         </ul>\n<h2>Question Review</h2>\n",
        results.total,
        results.correct,
        results.incorrect,
        results.unanswered,
        format_time_spent(results.time_spent_secs),
    );

    for (index, result) in results.question_results.iter().enumerate() {
        let question = &result.question;
        let user = format_user_answer(question, result.user_answer.as_ref());
        let correct = format_correct_answer(question, result.correct_answer.as_ref());
        let verdict = if result.is_correct {
            "✓ Correct"
        } else {
            "✗ Incorrect"
        };
        let code = question.kind() == "code-ide";
        let _ = write!(
            html,
            "<div style=\"border: 1px solid #e0e0e0; border-radius: 8px; padding: 15px; margin-bottom: 20px;\">\n\
             <p><strong>Question {}</strong> &middot; {verdict}</p>\n\
             <p>{}</p>\n\
             <p><strong>Your Answer:</strong></p>\n{}\n\
             <p><strong>Correct Answer:</strong></p>\n{}\n",
            index + 1,
            escape_html(&question.question),
            wrap_answer(&user, code),
            wrap_answer(&correct, code),
        );
        if let Some(explanation) = &question.explanation {
            if explanation.starts_with("http://") || explanation.starts_with("https://") {
                let _ = write!(
                    html,
                    "<p><strong>Explanation:</strong> <a href=\"{}\">Learn more about this question</a></p>\n",
                    escape_html(explanation),
                );
            } else {
                let _ = write!(
                    html,
                    "<p><strong>Explanation:</strong> {}</p>\n",
                    escape_html(explanation),
                );
            }
        }
        html.push_str("</div>\n");
    }

    let _ = write!(
        html,
        "<p style=\"color: #666;\">This is an automated email containing your results. Generated on {generated}.</p>\n</body>\n</html>\n",
    );
    html
}

#[cfg(feature = "network")]
pub fn send_report(config: &Config, results: &SessionResults, name: &str) -> Result<()> {
    let (Some(to_email), Some(service_id), Some(template_id), Some(public_key)) = (
        config.user_email.as_deref(),
        config.email_service_id.as_deref(),
        config.email_template_id.as_deref(),
        config.email_public_key.as_deref(),
    ) else {
        return Ok(());
    };
    let endpoint = config.email_endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
    let status = if results.passed { "PASSED" } else { "FAILED" };
    let body = serde_json::json!({
        "service_id": service_id,
        "template_id": template_id,
        "user_id": public_key,
        "template_params": {
            "to_email": to_email,
            "subject": format!("Results: {name}"),
            "message": format_report_html(results, name),
            "quiz_name": name,
            "score": format!("{}%", results.score),
            "status": status,
            "total_questions": results.total,
            "correct_answers": results.correct,
            "incorrect_answers": results.incorrect,
            "unanswered": results.unanswered,
            "time_spent": format_time_spent(results.time_spent_secs),
        },
    });
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;
    let response = client.post(endpoint).json(&body).send()?;
    if !response.status().is_success() {
        anyhow::bail!("email endpoint returned {}", response.status());
    }
    Ok(())
}

#[cfg(not(feature = "network"))]
pub fn send_report(_config: &Config, _results: &SessionResults, _name: &str) -> Result<()> {
    Ok(())
}
