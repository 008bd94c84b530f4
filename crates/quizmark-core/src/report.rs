//! Grading report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grading::{format_time, GradingResult};

/// A graded attempt together with what was graded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Key of the quiz that was taken, when known.
    #[serde(default)]
    pub quiz_key: Option<String>,
    pub quiz_title: String,
    pub result: GradingResult,
}

impl GradingReport {
    pub fn new(
        quiz_key: Option<String>,
        quiz_title: impl Into<String>,
        result: GradingResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at,
            quiz_key,
            quiz_title: quiz_title.into(),
            result,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse report JSON")
    }

    /// One-line summary, e.g. `Rust: 8/10 (80%) in 04:05 - Excellent work!`.
    pub fn summary_line(&self) -> String {
        let r = &self.result;
        format!(
            "{}: {}/{} ({}%) in {} - {}",
            self.quiz_title,
            r.score,
            r.total_questions,
            r.percentage,
            format_time(r.time_taken_seconds),
            r.band().message()
        )
    }
}
