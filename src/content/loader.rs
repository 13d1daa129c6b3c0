//! Content sources and payload loading.
//!
//! A [`ContentSource`] hands back raw bytes for a logical path ("category/
//! set-name.json"); the loader parses them into questions or a case study and
//! folds every failure into [`ContentLoadError`]. Two sources ship with the
//! crate: question sets embedded into the binary, and a plain directory for
//! externally managed content.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use crate::content::question::Question;
use crate::content::shuffle::shuffle_question_set;
use crate::error::ContentLoadError;

#[derive(Embed)]
#[folder = "content/"]
struct BundledContent;

/// Fetches raw content bytes by logical path.
pub trait ContentSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, ContentLoadError>;
}

/// Question sets compiled into the binary from `content/`.
pub struct EmbeddedSource;

impl ContentSource for EmbeddedSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, ContentLoadError> {
        BundledContent::get(path)
            .map(|f| f.data.into_owned())
            .ok_or_else(|| ContentLoadError::NotFound(path.to_string()))
    }
}

/// Question sets read from a directory on disk.
pub struct DirSource {
    base: PathBuf,
}

impl DirSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl ContentSource for DirSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, ContentLoadError> {
        let full = self.base.join(path);
        if !full.exists() {
            return Err(ContentLoadError::NotFound(path.to_string()));
        }
        Ok(fs::read(full)?)
    }
}

/// Scenario narrative shown alongside case-study questions. Sections are
/// free-form content maps; values may be prose or structured JSON the shell
/// renders verbatim.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyOverview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub it_structure: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_info: BTreeMap<String, String>,
}

/// Scenario metadata without the question list; what the context panel shows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyScenario {
    #[serde(default)]
    pub overview: CaseStudyOverview,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub existing_environment: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requirements: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseStudyContent {
    #[serde(flatten)]
    pub scenario: CaseStudyScenario,
    pub questions: Vec<Question>,
}

/// Load a plain quiz payload (a JSON array of questions), shuffled.
pub fn load_question_set(
    source: &dyn ContentSource,
    path: &str,
) -> Result<Vec<Question>, ContentLoadError> {
    let bytes = source.fetch(path)?;
    let questions: Vec<Question> = serde_json::from_slice(&bytes)?;
    if questions.is_empty() {
        return Err(ContentLoadError::Empty(path.to_string()));
    }
    Ok(shuffle_question_set(&questions))
}

/// Load a case-study payload (metadata + questions), questions shuffled.
pub fn load_case_study(
    source: &dyn ContentSource,
    path: &str,
) -> Result<CaseStudyContent, ContentLoadError> {
    let bytes = source.fetch(path)?;
    let mut case_study: CaseStudyContent = serde_json::from_slice(&bytes)?;
    if case_study.questions.is_empty() {
        return Err(ContentLoadError::Empty(path.to_string()));
    }
    case_study.questions = shuffle_question_set(&case_study.questions);
    Ok(case_study)
}

/// Derive a display name from a content path: file stem, dashes to spaces,
/// words capitalized ("mocks/sql-fundamentals.json" -> "Sql Fundamentals").
pub fn display_name(path: &str) -> String {
    let stem = path
        .rsplit('/')
        .next()
        .unwrap_or(path)
        .trim_end_matches(".json");
    stem.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_quiz_loads() {
        let questions = load_question_set(&EmbeddedSource, "mocks/sql-fundamentals.json").unwrap();
        assert!(!questions.is_empty());
    }

    #[test]
    fn test_embedded_case_study_loads() {
        let cs = load_case_study(&EmbeddedSource, "case-studies/azure-migration.json").unwrap();
        assert!(!cs.questions.is_empty());
        assert!(cs.scenario.overview.general_overview.is_some());
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let err = load_question_set(&EmbeddedSource, "mocks/nope.json").unwrap_err();
        assert!(matches!(err, ContentLoadError::NotFound(_)));
    }

    #[test]
    fn test_dir_source_reads_and_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), b"{ not json").unwrap();
        fs::write(dir.path().join("empty.json"), b"[]").unwrap();

        let source = DirSource::new(dir.path());
        assert!(matches!(
            load_question_set(&source, "bad.json").unwrap_err(),
            ContentLoadError::Parse(_)
        ));
        assert!(matches!(
            load_question_set(&source, "empty.json").unwrap_err(),
            ContentLoadError::Empty(_)
        ));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("mocks/sql-fundamentals.json"), "Sql Fundamentals");
        assert_eq!(display_name("azure-admin.json"), "Azure Admin");
    }
}
