//! Quiz error types.
//!
//! Typed failures for question validation and session mutation. The grading
//! engine itself never produces one of these.

use thiserror::Error;

/// Errors raised while loading questions or mutating a quiz session.
#[derive(Debug, Error, PartialEq)]
pub enum QuizError {
    /// The payload was not a non-empty array of questions.
    #[error("quiz is empty or not a JSON array: {0}")]
    EmptyQuiz(String),

    /// A question record failed validation.
    #[error("invalid question #{index}: {reason}")]
    InvalidQuestion { index: usize, reason: String },

    /// The attempt was already submitted; answers are frozen.
    #[error("attempt already submitted")]
    AttemptFinalized,

    /// Submission refused because some questions have no answer.
    #[error("question {} is unanswered", first + 1)]
    Unanswered { first: usize },

    /// A question or option index outside the current subset.
    #[error("index out of range: question {question}, option {option:?}")]
    OutOfRange {
        question: usize,
        option: Option<usize>,
    },

    /// The countdown duration was not a positive number of minutes.
    #[error("invalid timer duration: {0}")]
    InvalidTimerDuration(String),

    /// The custom question count was not a positive integer.
    #[error("invalid question count: {0}")]
    InvalidQuestionCount(String),
}

impl QuizError {
    /// Returns `true` for errors caused by bad user input rather than data.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            QuizError::InvalidTimerDuration(_) | QuizError::InvalidQuestionCount(_)
        )
    }
}
