//! Mock question source for testing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizmark_core::model::Question;

use crate::error::SourceError;
use crate::source::QuestionSource;

/// A question source that serves a fixed set without touching the network
/// or the filesystem.
pub struct MockSource {
    questions: Vec<Question>,
    /// Locations that answer with `NotFound`.
    failing: HashSet<String>,
    call_count: AtomicU32,
    last_location: Mutex<Option<String>>,
}

impl MockSource {
    /// Serve `questions` for every location.
    pub fn new(questions: Vec<Question>) -> Self {
        Self::failing_for(questions, &[])
    }

    /// Serve `questions`, except for `failing` locations.
    pub fn failing_for(questions: Vec<Question>, failing: &[&str]) -> Self {
        Self {
            questions,
            failing: failing.iter().map(|s| s.to_string()).collect(),
            call_count: AtomicU32::new(0),
            last_location: Mutex::new(None),
        }
    }

    /// A small two-question set.
    pub fn sample_questions() -> Vec<Question> {
        vec![
            Question {
                question: "Which keyword declares a constant?".into(),
                options: vec!["let".into(), "const".into(), "static".into()],
                correct: vec![1],
                explanation: Some("`const` values are inlined at compile time.".into()),
                hint: None,
                difficulty: Some(0.3),
            },
            Question {
                question: "Which traits can be derived?".into(),
                options: vec!["Debug".into(), "Display".into(), "Clone".into()],
                correct: vec![0, 2],
                explanation: None,
                hint: Some("One of them needs a hand-written impl.".into()),
                difficulty: Some(0.6),
            },
        ]
    }

    /// Number of fetches made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The location of the most recent fetch.
    pub fn last_location(&self) -> Option<String> {
        self.last_location.lock().ok().and_then(|l| l.clone())
    }
}

#[async_trait]
impl QuestionSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, location: &str) -> anyhow::Result<Vec<Question>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_location.lock() {
            *last = Some(location.to_string());
        }

        if self.failing.contains(location) {
            return Err(SourceError::NotFound(location.to_string()).into());
        }
        Ok(self.questions.clone())
    }
}
