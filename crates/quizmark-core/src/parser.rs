//! JSON question set parser.
//!
//! Loads question sets from JSON files and directories. Parsing fails
//! closed: a single malformed record rejects the whole set. Suspicious but
//! usable content is reported separately by [`validate_questions`].

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::QuizError;
use crate::model::Question;

/// Intermediate structure for one question record.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    correct: Option<Vec<usize>>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    difficulty: Option<f64>,
}

impl RawQuestion {
    fn into_question(self, index: usize) -> Result<Question, QuizError> {
        let invalid = |reason: &str| QuizError::InvalidQuestion {
            index,
            reason: reason.to_string(),
        };

        let question = self
            .question
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| invalid("missing question text"))?;
        let options = self
            .options
            .filter(|o| !o.is_empty())
            .ok_or_else(|| invalid("missing or empty options"))?;
        let correct = self
            .correct
            .filter(|c| !c.is_empty())
            .ok_or_else(|| invalid("missing or empty correct answers"))?;

        if let Some(&bad) = correct.iter().find(|&&i| i >= options.len()) {
            return Err(invalid(&format!(
                "correct index {bad} out of range for {} options",
                options.len()
            )));
        }

        // Duplicate indices collapse, first occurrence order kept.
        let mut seen = BTreeSet::new();
        let correct = correct.into_iter().filter(|i| seen.insert(*i)).collect();

        Ok(Question {
            question,
            options,
            correct,
            explanation: self.explanation.filter(|e| !e.trim().is_empty()),
            hint: self.hint.filter(|h| !h.trim().is_empty()),
            difficulty: self.difficulty,
        })
    }
}

/// Parse a single JSON file into a question list.
pub fn load_question_file(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question file: {}", path.display()))?;

    parse_questions_str(&content, &path.display().to_string())
}

/// Parse a JSON string into a question list. `origin` names the source in
/// error messages.
pub fn parse_questions_str(content: &str, origin: &str) -> Result<Vec<Question>> {
    let value: serde_json::Value = serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {origin}"))?;

    let records = match value {
        serde_json::Value::Array(records) if !records.is_empty() => records,
        _ => return Err(QuizError::EmptyQuiz(origin.to_string()).into()),
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let raw: RawQuestion = serde_json::from_value(record).map_err(|e| {
                QuizError::InvalidQuestion {
                    index,
                    reason: e.to_string(),
                }
            })?;
            Ok(raw.into_question(index)?)
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid question set: {origin}"))
}

/// Recursively load all `.json` question files from a directory.
///
/// Returns `(path, questions)` pairs; files that fail to parse are skipped
/// with a warning.
pub fn load_question_directory(dir: &Path) -> Result<Vec<(String, Vec<Question>)>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_question_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            match load_question_file(&path) {
                Ok(questions) => sets.push((path.display().to_string(), questions)),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// A warning from question set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question index (if applicable).
    pub index: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Check a parsed question set for plausible-but-suspicious content.
pub fn validate_questions(questions: &[Question]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_text = HashSet::new();
    for (i, q) in questions.iter().enumerate() {
        if !seen_text.insert(q.question.trim()) {
            warnings.push(ValidationWarning {
                index: Some(i),
                message: format!("duplicate question: {}", q.question.trim()),
            });
        }
    }

    for (i, q) in questions.iter().enumerate() {
        if !(2..=5).contains(&q.options.len()) {
            warnings.push(ValidationWarning {
                index: Some(i),
                message: format!("expected 2 to 5 options, found {}", q.options.len()),
            });
        }
    }

    for (i, q) in questions.iter().enumerate() {
        let mut seen = HashSet::new();
        if q.options.iter().any(|o| !seen.insert(o.trim())) {
            warnings.push(ValidationWarning {
                index: Some(i),
                message: "duplicate option text".into(),
            });
        }
    }

    for (i, q) in questions.iter().enumerate() {
        if let Some(d) = q.difficulty {
            if !(0.0..=1.0).contains(&d) {
                warnings.push(ValidationWarning {
                    index: Some(i),
                    message: format!("difficulty {d} outside 0.0..=1.0"),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_JSON: &str = r#"[
        {
            "question": "Which keyword declares an immutable binding?",
            "options": ["let", "mut", "static", "var"],
            "correct": [0],
            "explanation": "`let` bindings are immutable unless marked `mut`.",
            "difficulty": 0.2
        },
        {
            "question": "Which types are Copy?",
            "options": ["i32", "String", "bool"],
            "correct": [0, 2, 2],
            "hint": "Think about heap allocation."
        }
    ]"#;

    #[test]
    fn parse_valid_json() {
        let qs = parse_questions_str(VALID_JSON, "test.json").unwrap();
        assert_eq!(qs.len(), 2);
        assert_eq!(qs[0].options.len(), 4);
        assert_eq!(qs[0].difficulty, Some(0.2));
        assert_eq!(qs[1].correct, vec![0, 2]);
        assert_eq!(qs[1].hint.as_deref(), Some("Think about heap allocation."));
        assert!(qs[1].explanation.is_none());
    }

    #[test]
    fn empty_array_is_rejected() {
        let err = parse_questions_str("[]", "empty.json").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<QuizError>(),
            Some(QuizError::EmptyQuiz(_))
        ));
    }

    #[test]
    fn non_array_is_rejected() {
        assert!(parse_questions_str(r#"{"question": "x"}"#, "obj.json").is_err());
        assert!(parse_questions_str("not json", "bad.json").is_err());
    }

    #[test]
    fn out_of_range_correct_index_fails_closed() {
        let json = r#"[{"question": "Q", "options": ["a", "b"], "correct": [2]}]"#;
        let err = parse_questions_str(json, "bad.json").unwrap_err();
        let quiz_err = err.downcast_ref::<QuizError>().unwrap();
        assert!(matches!(quiz_err, QuizError::InvalidQuestion { index: 0, .. }));
        assert!(format!("{err:#}").contains("out of range"));
    }

    #[test]
    fn missing_fields_fail_closed() {
        for json in [
            r#"[{"options": ["a", "b"], "correct": [0]}]"#,
            r#"[{"question": "Q", "correct": [0]}]"#,
            r#"[{"question": "Q", "options": ["a", "b"]}]"#,
            r#"[{"question": "Q", "options": ["a", "b"], "correct": []}]"#,
            r#"[{"question": "Q", "options": ["a", "b"], "correct": [-1]}]"#,
        ] {
            assert!(parse_questions_str(json, "bad.json").is_err(), "{json}");
        }
    }

    #[test]
    fn error_reports_failing_index() {
        let json = r#"[
            {"question": "Q1", "options": ["a", "b"], "correct": [0]},
            {"question": "Q2", "options": [], "correct": [0]}
        ]"#;
        let err = parse_questions_str(json, "bad.json").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<QuizError>(),
            Some(QuizError::InvalidQuestion { index: 1, .. })
        ));
    }

    #[test]
    fn validate_flags_suspicious_content() {
        let json = r#"[
            {"question": "Same", "options": ["a"], "correct": [0]},
            {"question": "Same", "options": ["a", "a", "b"], "correct": [0], "difficulty": 3.0}
        ]"#;
        let qs = parse_questions_str(json, "warn.json").unwrap();
        let warnings = validate_questions(&qs);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate question")));
        assert!(warnings.iter().any(|w| w.message.contains("2 to 5 options")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate option")));
        assert!(warnings.iter().any(|w| w.message.contains("difficulty")));
    }

    #[test]
    fn validate_clean_set() {
        let qs = parse_questions_str(VALID_JSON, "test.json").unwrap();
        assert!(validate_questions(&qs).is_empty());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.json"), VALID_JSON).unwrap();
        std::fs::write(dir.path().join("bad.json"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let sets = load_question_directory(dir.path()).unwrap();
        assert_eq!(sets.len(), 1);
        assert!(sets[0].0.ends_with("good.json"));
        assert_eq!(sets[0].1.len(), 2);
    }

    #[test]
    fn load_missing_file() {
        assert!(load_question_file(Path::new("/nonexistent/quiz.json")).is_err());
    }
}
