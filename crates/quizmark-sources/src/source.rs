//! The question source abstraction.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use quizmark_core::model::Question;

use crate::file::FileSource;
use crate::http::HttpSource;

/// Something that can produce a question set from a location string.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch and validate the question set at `location`.
    async fn fetch(&self, location: &str) -> anyhow::Result<Vec<Question>>;
}

/// `true` for `http://` and `https://` locations.
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Pick the source able to serve `location`.
pub fn source_for(location: &str) -> anyhow::Result<Box<dyn QuestionSource>> {
    if is_remote(location) {
        Ok(Box::new(HttpSource::new()?))
    } else {
        Ok(Box::new(FileSource::new()))
    }
}

/// Dispatches each location to the HTTP or file source.
pub struct AutoSource {
    http: HttpSource,
    file: FileSource,
}

impl AutoSource {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            http: HttpSource::new()?,
            file: FileSource::new(),
        })
    }
}

#[async_trait]
impl QuestionSource for AutoSource {
    fn name(&self) -> &str {
        "auto"
    }

    async fn fetch(&self, location: &str) -> anyhow::Result<Vec<Question>> {
        if is_remote(location) {
            self.http.fetch(location).await
        } else {
            self.file.fetch(location).await
        }
    }
}

/// Fetch several question sets with at most `parallelism` requests in
/// flight. Results come back in the order of `locations`.
pub async fn fetch_many(
    source: &dyn QuestionSource,
    locations: &[String],
    parallelism: usize,
) -> Vec<(String, anyhow::Result<Vec<Question>>)> {
    let mut results: Vec<(usize, String, anyhow::Result<Vec<Question>>)> =
        stream::iter(locations.iter().enumerate())
            .map(|(i, location)| async move {
                tracing::debug!(source = source.name(), "fetching {location}");
                (i, location.clone(), source.fetch(location).await)
            })
            .buffer_unordered(parallelism.max(1))
            .collect()
            .await;

    results.sort_by_key(|(i, _, _)| *i);
    results
        .into_iter()
        .map(|(_, location, result)| (location, result))
        .collect()
}
