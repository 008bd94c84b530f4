//! CSV export of grading results.
//!
//! One row per question with the header
//! `Question, Your answer, Correct answer, Result, Explanation`. Every field
//! is quoted and multiple answers are joined with `"; "`.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use quizmark_core::grading::{GradingResult, QuestionResult};

/// Separator between multiple selected or correct answers.
pub const ANSWER_SEPARATOR: &str = "; ";

/// One exported row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Your answer")]
    pub your_answer: String,
    #[serde(rename = "Correct answer")]
    pub correct_answer: String,
    #[serde(rename = "Result")]
    pub result: String,
    #[serde(rename = "Explanation")]
    pub explanation: String,
}

impl From<&QuestionResult> for CsvRow {
    fn from(r: &QuestionResult) -> Self {
        Self {
            question: r.question.clone(),
            your_answer: r.selected_option_texts.join(ANSWER_SEPARATOR),
            correct_answer: r.correct_option_texts.join(ANSWER_SEPARATOR),
            result: r.status.label().to_string(),
            explanation: r.explanation.clone(),
        }
    }
}

/// Write `result` as CSV to `writer`.
pub fn write_csv<W: Write>(result: &GradingResult, writer: W) -> Result<()> {
    let mut wtr = ::csv::WriterBuilder::new()
        .quote_style(::csv::QuoteStyle::Always)
        .from_writer(writer);

    if result.per_question.is_empty() {
        wtr.write_record(["Question", "Your answer", "Correct answer", "Result", "Explanation"])
            .context("failed to write CSV header")?;
    }
    for r in &result.per_question {
        wtr.serialize(CsvRow::from(r))
            .with_context(|| format!("failed to write CSV row for question {}", r.index + 1))?;
    }
    wtr.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// Render `result` as a CSV string.
pub fn to_csv_string(result: &GradingResult) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(result, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

/// Write `result` as CSV to a file, creating parent directories.
pub fn write_csv_file(result: &GradingResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(result, file)
}

/// Read rows back from an exported CSV.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<CsvRow>> {
    let mut rdr = ::csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row.context("failed to parse CSV row")?);
    }
    Ok(rows)
}

/// Suggested file name: `quiz_results_<title>_<YYYY-MM-DD>.csv`.
///
/// Characters that are unsafe in file names are replaced by `_`.
pub fn export_filename(title: &str, date: NaiveDate) -> String {
    let safe: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("quiz_results_{}_{}.csv", safe.trim(), date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizmark_core::answers::AnswerSet;
    use quizmark_core::grading::{grade, QuestionStatus, TimingInput};
    use quizmark_core::model::Question;

    fn sample_result() -> GradingResult {
        let questions = vec![
            Question {
                question: "Say \"hello\"".into(),
                options: vec!["hi".into(), "hello, world".into(), "bye".into()],
                correct: vec![0, 1],
                explanation: Some("Both are greetings.".into()),
                hint: None,
                difficulty: None,
            },
            Question {
                question: "Pick B".into(),
                options: vec!["A".into(), "B".into()],
                correct: vec![1],
                explanation: None,
                hint: None,
                difficulty: None,
            },
            Question {
                question: "Pick A".into(),
                options: vec!["A".into(), "B".into()],
                correct: vec![0],
                explanation: None,
                hint: None,
                difficulty: None,
            },
        ];
        let answers: AnswerSet = [(0, vec![0]), (1, vec![1])].into_iter().collect();
        grade(&questions, &answers, TimingInput::Unknown)
    }

    #[test]
    fn every_field_is_quoted() {
        let csv = to_csv_string(&sample_result()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            r#""Question","Your answer","Correct answer","Result","Explanation""#
        );
        assert_eq!(
            lines.next().unwrap(),
            r#""Say ""hello""","hi","hi; hello, world","Partial","Both are greetings.""#
        );
        assert_eq!(lines.next().unwrap(), r#""Pick B","B","B","Correct","""#);
        assert_eq!(lines.next().unwrap(), r#""Pick A","","A","Incorrect","""#);
        assert!(lines.next().is_none());
    }

    fn split_answers(field: &str) -> Vec<&str> {
        if field.is_empty() {
            Vec::new()
        } else {
            field.split(ANSWER_SEPARATOR).collect()
        }
    }

    #[test]
    fn round_trip_preserves_rows() {
        let result = sample_result();
        let csv = to_csv_string(&result).unwrap();
        let rows = read_csv_rows(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), result.per_question.len());
        for (row, r) in rows.iter().zip(&result.per_question) {
            assert_eq!(row.question, r.question);
            assert_eq!(QuestionStatus::from_label(&row.result), Some(r.status));
            assert_eq!(split_answers(&row.your_answer), r.selected_option_texts);
            assert_eq!(split_answers(&row.correct_answer), r.correct_option_texts);
            assert_eq!(row.explanation, r.explanation);
        }
    }

    #[test]
    fn empty_result_still_has_header() {
        let result = grade(&[], &AnswerSet::new(), TimingInput::Unknown);
        let csv = to_csv_string(&result).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(read_csv_rows(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/results.csv");
        write_csv_file(&sample_result(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("\"Question\""));
    }

    #[test]
    fn filename_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            export_filename("Rust basics", date),
            "quiz_results_Rust basics_2024-03-09.csv"
        );
        assert_eq!(
            export_filename("a/b:c", date),
            "quiz_results_a_b_c_2024-03-09.csv"
        );
    }
}
