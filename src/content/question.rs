//! Question and answer model.
//!
//! Questions come in as duck-typed JSON; here they become a tagged union so
//! the evaluator and the fully-answered predicate can match exhaustively.
//! A question's identity is its position in the stored (post-shuffle) order —
//! the "original index" that answers and bookmarks key off. Unrecognized
//! `type` tags deserialize into [`Payload::Unknown`] and simply grade as
//! incorrect; a content typo must never take the session down.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Prompt text, markdown rendered by the shell.
    pub question: String,
    #[serde(flatten)]
    pub payload: Payload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Type-specific question payload, discriminated by the JSON `type` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Payload {
    #[serde(rename = "single", rename_all = "camelCase")]
    Single {
        options: Vec<String>,
        /// May be a bare string or a one-element list in the content.
        correct_answer: OneOrMany,
    },
    #[serde(rename = "multiple", rename_all = "camelCase")]
    Multiple {
        options: Vec<String>,
        correct_answer: Vec<String>,
    },
    #[serde(rename = "drag-and-drop", rename_all = "camelCase")]
    DragAndDrop {
        options: Vec<String>,
        /// Slot-to-option index permutation; never reordered by shuffling.
        correct_order: Vec<usize>,
    },
    #[serde(rename = "sql-completion", rename_all = "camelCase")]
    SqlCompletion {
        sql_lines: Vec<CompletionLine>,
        correct_answer: Vec<String>,
    },
    #[serde(rename = "code-completion", rename_all = "camelCase")]
    CodeCompletion {
        code_lines: Vec<CompletionLine>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        correct_answer: Vec<String>,
    },
    #[serde(rename = "code-ide", rename_all = "camelCase")]
    CodeIde {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        starter_code: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        correct_answer: String,
    },
    #[serde(other)]
    Unknown,
}

/// A correct-answer field that content sometimes writes as a one-element list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// The single expected value: the string itself, or the first list entry.
    pub fn first(&self) -> Option<&str> {
        match self {
            OneOrMany::One(s) => Some(s.as_str()),
            OneOrMany::Many(v) => v.first().map(String::as_str),
        }
    }
}

/// One rendered line of a completion question: either literal code or a blank
/// the learner fills from a dropdown.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

fn blank_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<BLANK\s+\d+>").expect("valid blank tag pattern"))
}

impl CompletionLine {
    /// A line is a blank if it is an explicit dropdown, or legacy content
    /// carrying a `<BLANK n>` tag alongside its options.
    pub fn is_blank(&self) -> bool {
        if self.options.is_none() {
            return false;
        }
        if self.kind.as_deref() == Some("dropdown") {
            return true;
        }
        self.text
            .as_deref()
            .is_some_and(|t| blank_tag().is_match(t))
    }
}

/// A stored learner answer. Shape is per question kind; partial answers keep
/// explicit `None` placeholders at every slot so the count of empty slots is
/// always recoverable.
///
/// The wire format is untagged and shape-driven, matching the loosely typed
/// content this crate ingests. That makes some shapes ambiguous on read-back:
/// a completion answer with every blank filled serializes as a plain string
/// array and deserializes as `Choices`, and an empty array reads as `Slots`.
/// In-session state never round-trips through JSON, so grading is unaffected;
/// consumers of a persisted results report must treat answers as display
/// values and match on shape via the `as_*` accessors, not on variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Drag-and-drop: slot position -> chosen option index.
    Slots(Vec<Option<usize>>),
    /// Multiple choice selections, by option value.
    Choices(Vec<String>),
    /// Completion blanks, in blank order.
    Blanks(Vec<Option<String>>),
    /// Single choice value or code-ide source.
    Text(String),
}

impl Answer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            Answer::Choices(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_slots(&self) -> Option<&[Option<usize>]> {
        match self {
            Answer::Slots(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_blanks(&self) -> Option<&[Option<String>]> {
        match self {
            Answer::Blanks(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

impl Question {
    pub fn kind(&self) -> &'static str {
        match self.payload {
            Payload::Single { .. } => "single",
            Payload::Multiple { .. } => "multiple",
            Payload::DragAndDrop { .. } => "drag-and-drop",
            Payload::SqlCompletion { .. } => "sql-completion",
            Payload::CodeCompletion { .. } => "code-completion",
            Payload::CodeIde { .. } => "code-ide",
            Payload::Unknown => "unknown",
        }
    }

    /// Top-level option list, where the kind has one.
    pub fn options(&self) -> Option<&[String]> {
        match &self.payload {
            Payload::Single { options, .. }
            | Payload::Multiple { options, .. }
            | Payload::DragAndDrop { options, .. } => Some(options.as_slice()),
            _ => None,
        }
    }

    /// Number of fillable blanks in a completion question, zero otherwise.
    pub fn blank_count(&self) -> usize {
        match &self.payload {
            Payload::SqlCompletion { sql_lines, .. } => {
                sql_lines.iter().filter(|l| l.is_blank()).count()
            }
            Payload::CodeCompletion { code_lines, .. } => {
                code_lines.iter().filter(|l| l.is_blank()).count()
            }
            _ => 0,
        }
    }

    /// Whether every required answer slot is populated. Deliberately looser
    /// than correctness: `multiple` counts as answered with any selection at
    /// all, matching exam behaviour where under/over-selection is allowed.
    pub fn is_fully_answered(&self, answer: Option<&Answer>) -> bool {
        let Some(answer) = answer else {
            return false;
        };
        match &self.payload {
            Payload::Multiple { .. } => answer
                .as_choices()
                .is_some_and(|v| !v.is_empty() && v.iter().all(|s| !s.is_empty())),
            Payload::DragAndDrop { correct_order, .. } => {
                if correct_order.is_empty() {
                    return false;
                }
                answer
                    .as_slots()
                    .is_some_and(|v| v.len() == correct_order.len() && v.iter().all(Option::is_some))
            }
            Payload::SqlCompletion { .. } | Payload::CodeCompletion { .. } => {
                let blanks = self.blank_count();
                if blanks == 0 {
                    // No blanks means nothing to fill in; never answerable.
                    return false;
                }
                answer.as_blanks().is_some_and(|v| {
                    v.len() == blanks
                        && v.iter().all(|s| s.as_deref().is_some_and(|s| !s.is_empty()))
                })
            }
            Payload::CodeIde { starter_code, .. } => {
                let Some(code) = answer.as_text() else {
                    return false;
                };
                let trimmed = code.trim();
                let starter = starter_code.as_deref().unwrap_or("").trim();
                !trimmed.is_empty() && trimmed != starter
            }
            // Single and anything unrecognized: any stored answer counts.
            Payload::Single { .. } | Payload::Unknown => true,
        }
    }
}
