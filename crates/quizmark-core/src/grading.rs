//! The grading engine.
//!
//! A pure function of (questions, answers, timing) to a [`GradingResult`].
//! It performs no I/O, never reads a clock, and never fails: malformed
//! questions are graded with the same set arithmetic as well-formed ones.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::answers::AnswerSet;
use crate::model::Question;

/// Outcome of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    /// Exactly the correct options were selected.
    Correct,
    /// Only correct options were selected, but not all of them.
    Partial,
    /// Nothing correct was selected, or a wrong option was.
    Incorrect,
}

impl QuestionStatus {
    /// Capitalized label used in exports.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionStatus::Correct => "Correct",
            QuestionStatus::Partial => "Partial",
            QuestionStatus::Incorrect => "Incorrect",
        }
    }

    /// Inverse of [`QuestionStatus::label`], case-insensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "correct" => Some(QuestionStatus::Correct),
            "partial" => Some(QuestionStatus::Partial),
            "incorrect" => Some(QuestionStatus::Incorrect),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Graded detail for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    /// Position in the presented subset.
    pub index: usize,
    /// The question text.
    pub question: String,
    pub status: QuestionStatus,
    /// Texts of the selected options, in option order.
    pub selected_option_texts: Vec<String>,
    /// Texts of the correct options.
    pub correct_option_texts: Vec<String>,
    /// Explanation, empty when the question has none.
    pub explanation: String,
    /// How many selected options were wrong.
    pub incorrect_selection_count: usize,
}

/// Outcome of a whole submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Number of questions graded correct.
    pub score: usize,
    pub total_questions: usize,
    /// `score / total_questions` as a rounded percentage.
    pub percentage: u32,
    pub correct_count: usize,
    pub partial_count: usize,
    pub incorrect_count: usize,
    /// Seconds the attempt took, `None` when unknown.
    pub time_taken_seconds: Option<f64>,
    pub per_question: Vec<QuestionResult>,
}

impl GradingResult {
    /// Performance band for this result.
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_percentage(self.percentage)
    }
}

/// How long the attempt took, as known to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimingInput {
    /// A countdown was running: time taken is `duration - remaining`.
    Countdown {
        duration_secs: u64,
        remaining_secs: u64,
    },
    /// Wall-clock timing between start and submission.
    Elapsed {
        started_at: Option<DateTime<Utc>>,
        submitted_at: DateTime<Utc>,
    },
    /// No timing information at all.
    Unknown,
}

impl TimingInput {
    /// Seconds taken, in fractional seconds for wall-clock timing.
    pub fn seconds_taken(&self) -> Option<f64> {
        match *self {
            TimingInput::Countdown {
                duration_secs,
                remaining_secs,
            } => Some(duration_secs.saturating_sub(remaining_secs) as f64),
            TimingInput::Elapsed {
                started_at,
                submitted_at,
            } => started_at
                .map(|start| (submitted_at - start).num_milliseconds() as f64 / 1000.0),
            TimingInput::Unknown => None,
        }
    }
}

/// Coarse performance band used for result messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 80 {
            ScoreBand::Excellent
        } else if percentage >= 60 {
            ScoreBand::Good
        } else if percentage >= 40 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent work!",
            ScoreBand::Good => "Good job.",
            ScoreBand::Fair => "Not bad, keep practicing.",
            ScoreBand::Poor => "Review the explanations and try again.",
        }
    }
}

/// `part / total * 100`, rounded half up; `0` when `total` is zero.
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let (part, total) = (part as u64, total as u64);
    ((part * 200 + total) / (total * 2)) as u32
}

/// Grade a single question against its selected options.
pub fn grade_question(
    index: usize,
    question: &Question,
    selected: Option<&BTreeSet<usize>>,
) -> QuestionResult {
    let empty = BTreeSet::new();
    let selected = selected.unwrap_or(&empty);
    let correct: BTreeSet<usize> = question.correct.iter().copied().collect();

    let correct_selections = selected.intersection(&correct).count();
    let incorrect_selections = selected.len() - correct_selections;

    let status = if correct_selections == correct.len() && incorrect_selections == 0 {
        QuestionStatus::Correct
    } else if correct_selections > 0 && incorrect_selections == 0 {
        QuestionStatus::Partial
    } else {
        QuestionStatus::Incorrect
    };

    QuestionResult {
        index,
        question: question.question.clone(),
        status,
        selected_option_texts: question.option_texts(selected),
        correct_option_texts: question.option_texts(&question.correct),
        explanation: question.explanation.clone().unwrap_or_default(),
        incorrect_selection_count: incorrect_selections,
    }
}

/// Grade a whole submission.
pub fn grade(questions: &[Question], answers: &AnswerSet, timing: TimingInput) -> GradingResult {
    let per_question: Vec<QuestionResult> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| grade_question(i, q, answers.selected(i)))
        .collect();

    let count = |status: QuestionStatus| {
        per_question.iter().filter(|r| r.status == status).count()
    };
    let correct_count = count(QuestionStatus::Correct);
    let partial_count = count(QuestionStatus::Partial);
    let incorrect_count = count(QuestionStatus::Incorrect);
    let total_questions = questions.len();

    GradingResult {
        score: correct_count,
        total_questions,
        percentage: percentage(correct_count, total_questions),
        correct_count,
        partial_count,
        incorrect_count,
        time_taken_seconds: timing.seconds_taken(),
        per_question,
    }
}

/// `true` when `selected` is exactly the set of correct options.
pub fn is_exact_match(question: &Question, selected: &BTreeSet<usize>) -> bool {
    !selected.is_empty()
        && selected.len() == question.correct.len()
        && selected.iter().all(|i| question.correct.contains(i))
}

/// Format seconds as `MM:SS`, or `N/A` when unknown or negative.
pub fn format_time(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => {
            let whole = s.floor() as u64;
            format!("{:02}:{:02}", whole / 60, whole % 60)
        }
        _ => "N/A".to_string(),
    }
}
