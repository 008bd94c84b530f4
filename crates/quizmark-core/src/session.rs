//! An explicitly owned quiz attempt.
//!
//! A [`QuizSession`] holds everything one attempt needs: the full question
//! list, the subset being presented, the answers so far, and the result once
//! submitted. Submitting freezes the answers; only [`QuizSession::reset`] or
//! [`QuizSession::apply_policy`] start a new attempt.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::answers::AnswerSet;
use crate::error::QuizError;
use crate::grading::{self, GradingResult, QuestionStatus, TimingInput};
use crate::model::{Question, QuizInfo, SessionSettings};
use crate::selection::{self, SelectionPolicy};

/// Whether answers can still change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Review,
}

/// Persisted record of an in-progress attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuizState {
    pub quiz_key: String,
    pub question_index: usize,
    pub answers: AnswerSet,
    #[serde(default)]
    pub time_left: Option<u64>,
    #[serde(rename = "timerDuration")]
    pub timer_minutes: u32,
    pub explanations_visible: bool,
    pub instant_feedback: bool,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub start_time: Option<i64>,
    pub selected_question_count: String,
    pub custom_question_count: String,
    /// Indices into the full question list, in presentation order.
    #[serde(default)]
    pub question_order: Vec<usize>,
}

/// One quiz attempt.
#[derive(Debug, Clone)]
pub struct QuizSession {
    info: QuizInfo,
    questions: Vec<Question>,
    order: Vec<usize>,
    subset: Vec<Question>,
    answers: AnswerSet,
    current: usize,
    started_at: Option<DateTime<Utc>>,
    settings: SessionSettings,
    status: SessionStatus,
    result: Option<GradingResult>,
}

impl QuizSession {
    /// Start a fresh attempt over a randomly selected subset.
    pub fn new<R: Rng + ?Sized>(
        info: QuizInfo,
        questions: Vec<Question>,
        settings: SessionSettings,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyQuiz(info.key));
        }

        let mut session = Self {
            info,
            questions,
            order: Vec::new(),
            subset: Vec::new(),
            answers: AnswerSet::new(),
            current: 0,
            started_at: None,
            settings,
            status: SessionStatus::Active,
            result: None,
        };
        session.reset(now, rng);
        Ok(session)
    }

    /// Rebuild an attempt from a saved record.
    ///
    /// Returns `None` when the record belongs to another quiz or its question
    /// order does not fit `questions`.
    pub fn restore(
        info: QuizInfo,
        questions: Vec<Question>,
        saved: SavedQuizState,
        settings: SessionSettings,
    ) -> Option<Self> {
        if saved.quiz_key != info.key {
            return None;
        }
        let mut seen = HashSet::new();
        let order_ok = !saved.question_order.is_empty()
            && saved
                .question_order
                .iter()
                .all(|&i| i < questions.len() && seen.insert(i));
        if !order_ok {
            tracing::warn!("saved session for '{}' does not match its questions", info.key);
            return None;
        }

        let subset: Vec<Question> = saved
            .question_order
            .iter()
            .map(|&i| questions[i].clone())
            .collect();
        let mut answers = saved.answers;
        let option_counts: Vec<usize> = subset.iter().map(|q| q.options.len()).collect();
        answers.retain_valid(&option_counts);

        let mut settings = settings;
        settings.timer_minutes = saved.timer_minutes;
        settings.question_count = SelectionPolicy::from_settings(
            &saved.selected_question_count,
            &saved.custom_question_count,
        );
        settings.show_explanations = saved.explanations_visible;
        settings.instant_feedback = saved.instant_feedback;

        Some(Self {
            current: saved.question_index.min(subset.len() - 1),
            info,
            questions,
            order: saved.question_order,
            subset,
            answers,
            started_at: saved.start_time.and_then(DateTime::from_timestamp_millis),
            settings,
            status: SessionStatus::Active,
            result: None,
        })
    }

    /// Discard answers and draw a new subset under the current policy.
    pub fn reset<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) {
        let order = selection::select_indices(
            self.questions.len(),
            self.settings.question_count,
            rng,
        );
        self.start_with_order(order, now);
    }

    /// Like [`reset`](Self::reset), but weights the subset by question
    /// difficulty given the user's past success rate in `0.0..=1.0`.
    pub fn reset_adaptive<R: Rng + ?Sized>(
        &mut self,
        performance: f64,
        now: DateTime<Utc>,
        rng: &mut R,
    ) {
        let count = selection::resolve_count(self.settings.question_count, self.questions.len());
        let difficulties: Vec<Option<f64>> = self.questions.iter().map(|q| q.difficulty).collect();
        let order = selection::select_by_difficulty(&difficulties, performance, count, rng);
        self.start_with_order(order, now);
    }

    fn start_with_order(&mut self, order: Vec<usize>, now: DateTime<Utc>) {
        self.order = order;
        self.subset = self.order.iter().map(|&i| self.questions[i].clone()).collect();
        self.answers.clear();
        self.current = 0;
        self.started_at = Some(now);
        self.status = SessionStatus::Active;
        self.result = None;
        tracing::debug!(
            "session '{}' reset with {} of {} questions",
            self.info.key,
            self.subset.len(),
            self.questions.len()
        );
    }

    /// Switch the question-count policy and start over.
    pub fn apply_policy<R: Rng + ?Sized>(
        &mut self,
        policy: SelectionPolicy,
        now: DateTime<Utc>,
        rng: &mut R,
    ) {
        self.settings.question_count = policy;
        self.reset(now, rng);
    }

    pub fn info(&self) -> &QuizInfo {
        &self.info
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn set_show_explanations(&mut self, show: bool) {
        self.settings.show_explanations = show;
    }

    pub fn set_instant_feedback(&mut self, enabled: bool) {
        self.settings.instant_feedback = enabled;
    }

    /// Questions being presented, in presentation order.
    pub fn questions(&self) -> &[Question] {
        &self.subset
    }

    /// Every question the quiz has.
    pub fn all_questions(&self) -> &[Question] {
        &self.questions
    }

    /// Full-list index of each presented question.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.subset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subset.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.subset.get(self.current)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_finalized(&self) -> bool {
        self.status == SessionStatus::Review
    }

    /// The grading result, once submitted.
    pub fn result(&self) -> Option<&GradingResult> {
        self.result.as_ref()
    }

    /// `(answered, total, percentage)` for the presented subset.
    pub fn progress(&self) -> (usize, usize, u32) {
        let total = self.subset.len();
        (
            self.answers.answered_count(total),
            total,
            self.answers.progress_percentage(total),
        )
    }

    /// Select or deselect one option.
    pub fn set_option(
        &mut self,
        question: usize,
        option: usize,
        selected: bool,
    ) -> Result<(), QuizError> {
        self.check_editable(question, option)?;
        self.answers.set_option(question, option, selected);
        Ok(())
    }

    /// Flip one option. Returns whether it is now selected.
    pub fn toggle_option(&mut self, question: usize, option: usize) -> Result<bool, QuizError> {
        self.check_editable(question, option)?;
        Ok(self.answers.toggle(question, option))
    }

    /// Make `options` the complete selection for `question`. Nothing changes
    /// unless every option is in range.
    pub fn replace_selection(
        &mut self,
        question: usize,
        options: &[usize],
    ) -> Result<(), QuizError> {
        if self.is_finalized() {
            return Err(QuizError::AttemptFinalized);
        }
        if options.is_empty() {
            self.check_question(question)?;
        }
        for &option in options {
            self.check_editable(question, option)?;
        }
        self.answers.replace(question, options.iter().copied());
        Ok(())
    }

    fn check_question(&self, question: usize) -> Result<usize, QuizError> {
        self.subset
            .get(question)
            .map(|q| q.options.len())
            .ok_or(QuizError::OutOfRange {
                question,
                option: None,
            })
    }

    fn check_editable(&self, question: usize, option: usize) -> Result<(), QuizError> {
        if self.is_finalized() {
            return Err(QuizError::AttemptFinalized);
        }
        if option >= self.check_question(question)? {
            return Err(QuizError::OutOfRange {
                question,
                option: Some(option),
            });
        }
        Ok(())
    }

    /// Move forward. Returns `false` on the last question.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.subset.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Move back. Returns `false` on the first question.
    pub fn previous(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn go_to(&mut self, question: usize) -> Result<(), QuizError> {
        if question >= self.subset.len() {
            return Err(QuizError::OutOfRange {
                question,
                option: None,
            });
        }
        self.current = question;
        Ok(())
    }

    /// Status of an answered question, when instant feedback is enabled.
    pub fn instant_feedback(&self, question: usize) -> Option<QuestionStatus> {
        if !self.settings.instant_feedback {
            return None;
        }
        let q = self.subset.get(question)?;
        let selected = self.answers.selected(question)?;
        Some(grading::grade_question(question, q, Some(selected)).status)
    }

    /// Wall-clock timing from the session start to `now`.
    pub fn elapsed_timing(&self, now: DateTime<Utc>) -> TimingInput {
        TimingInput::Elapsed {
            started_at: self.started_at,
            submitted_at: now,
        }
    }

    /// Grade the attempt. Every presented question must have an answer.
    pub fn submit(&mut self, timing: TimingInput) -> Result<&GradingResult, QuizError> {
        if self.is_finalized() {
            return Err(QuizError::AttemptFinalized);
        }
        if let Some(first) = self.answers.first_unanswered(self.subset.len()) {
            return Err(QuizError::Unanswered { first });
        }
        self.force_submit(timing)
    }

    /// Grade the attempt as it stands, unanswered questions included.
    pub fn force_submit(&mut self, timing: TimingInput) -> Result<&GradingResult, QuizError> {
        if self.is_finalized() {
            return Err(QuizError::AttemptFinalized);
        }
        let result = grading::grade(&self.subset, &self.answers, timing);
        tracing::info!(
            "quiz '{}' submitted: {}/{} ({}%)",
            self.info.key,
            result.score,
            result.total_questions,
            result.percentage
        );
        self.status = SessionStatus::Review;
        Ok(self.result.insert(result))
    }

    /// Record for resuming this attempt later.
    pub fn snapshot(&self, time_left: Option<u64>) -> SavedQuizState {
        let (selected, custom) = self
            .settings
            .question_count
            .to_settings(selection::DEFAULT_CUSTOM_COUNT);
        SavedQuizState {
            quiz_key: self.info.key.clone(),
            question_index: self.current,
            answers: self.answers.clone(),
            time_left,
            timer_minutes: self.settings.timer_minutes,
            explanations_visible: self.settings.show_explanations,
            instant_feedback: self.settings.instant_feedback,
            start_time: self.started_at.map(|t| t.timestamp_millis()),
            selected_question_count: selected,
            custom_question_count: custom,
            question_order: self.order.clone(),
        }
    }
}
