//! Core data model types for quizmark.
//!
//! These are the fundamental types the whole workspace uses to represent
//! questions, quiz catalog entries, and per-attempt settings.

use serde::{Deserialize, Serialize};

use crate::selection::SelectionPolicy;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// The question text.
    pub question: String,
    /// Answer options, in display order.
    pub options: Vec<String>,
    /// Indices into `options` that are correct.
    pub correct: Vec<usize>,
    /// Shown after grading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Optional hint shown on demand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Difficulty in `0.0..=1.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
}

impl Question {
    /// Texts of the options at `indices`, skipping indices with no option.
    pub fn option_texts<'a, I>(&self, indices: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a usize>,
    {
        indices
            .into_iter()
            .filter_map(|&i| self.options.get(i).cloned())
            .collect()
    }

    /// `true` when more than one option is correct.
    pub fn is_multi_select(&self) -> bool {
        self.correct.len() > 1
    }
}

/// A quiz available in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizInfo {
    /// Stable key used for high scores and saved sessions.
    pub key: String,
    /// Human-readable title.
    pub title: String,
    /// File path or http(s) URL of the question JSON.
    pub source: String,
    /// Description shown in listings.
    #[serde(default)]
    pub description: String,
}

/// Per-attempt settings chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Countdown length in minutes.
    #[serde(default = "default_timer_minutes")]
    pub timer_minutes: u32,
    /// How many questions to draw.
    #[serde(default)]
    pub question_count: SelectionPolicy,
    /// Reveal explanations during review.
    #[serde(default = "default_true")]
    pub show_explanations: bool,
    /// Flag each question as soon as it is answered.
    #[serde(default)]
    pub instant_feedback: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timer_minutes: default_timer_minutes(),
            question_count: SelectionPolicy::All,
            show_explanations: true,
            instant_feedback: false,
        }
    }
}

fn default_timer_minutes() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

/// Letter label for an option index (`0 -> 'A'`).
pub fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
