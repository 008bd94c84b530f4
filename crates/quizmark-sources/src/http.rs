//! HTTP question source.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::instrument;

use quizmark_core::model::Question;
use quizmark_core::parser::parse_questions_str;

use crate::error::SourceError;
use crate::source::QuestionSource;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches question sets over HTTP(S).
pub struct HttpSource {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpSource {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn fetch(&self, location: &str) -> anyhow::Result<Vec<Question>> {
        let response = self
            .client
            .get(location)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    SourceError::Network(format!("could not connect to {location}"))
                } else {
                    SourceError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(SourceError::NotFound(location.to_string()).into());
        }
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                status,
                message: body,
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("failed to read response body: {e}")))?;

        let questions =
            parse_questions_str(&body, location).map_err(|e| SourceError::InvalidFormat {
                location: location.to_string(),
                reason: format!("{e:#}"),
            })?;

        tracing::debug!("fetched {} questions from {location}", questions.len());
        Ok(questions)
    }
}
