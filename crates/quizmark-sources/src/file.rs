//! Local file question source.

use async_trait::async_trait;
use tracing::instrument;

use quizmark_core::model::Question;
use quizmark_core::parser::parse_questions_str;

use crate::error::SourceError;
use crate::source::QuestionSource;

/// Reads question sets from the local filesystem.
#[derive(Debug, Default, Clone)]
pub struct FileSource;

impl FileSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    #[instrument(skip(self))]
    async fn fetch(&self, location: &str) -> anyhow::Result<Vec<Question>> {
        let content = tokio::fs::read_to_string(location)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => SourceError::NotFound(location.to_string()),
                _ => SourceError::Network(format!("failed to read {location}: {e}")),
            })?;

        let questions =
            parse_questions_str(&content, location).map_err(|e| SourceError::InvalidFormat {
                location: location.to_string(),
                reason: format!("{e:#}"),
            })?;

        tracing::debug!("loaded {} questions from {location}", questions.len());
        Ok(questions)
    }
}
