//! Configuration and quiz catalog.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizmark_core::model::{QuizInfo, SessionSettings};
use quizmark_core::selection::{SelectionPolicy, DEFAULT_CUSTOM_COUNT};

/// Environment variable that replaces `data_dir`.
pub const DATA_DIR_ENV: &str = "QUIZMARK_DATA_DIR";

/// Default attempt settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDefaults {
    #[serde(default = "default_timer_minutes")]
    pub timer_minutes: u32,
    /// `"all"`, `"custom"`, or a number.
    #[serde(default = "default_question_count")]
    pub question_count: String,
    #[serde(default = "default_custom_count")]
    pub custom_question_count: u32,
    #[serde(default = "default_true")]
    pub show_explanations: bool,
    #[serde(default)]
    pub instant_feedback: bool,
}

fn default_timer_minutes() -> u32 {
    10
}
fn default_question_count() -> String {
    "all".to_string()
}
fn default_custom_count() -> u32 {
    DEFAULT_CUSTOM_COUNT
}
fn default_true() -> bool {
    true
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            timer_minutes: default_timer_minutes(),
            question_count: default_question_count(),
            custom_question_count: default_custom_count(),
            show_explanations: true,
            instant_feedback: false,
        }
    }
}

impl SessionDefaults {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            timer_minutes: self.timer_minutes,
            question_count: SelectionPolicy::from_settings(
                &self.question_count,
                &self.custom_question_count.to_string(),
            ),
            show_explanations: self.show_explanations,
            instant_feedback: self.instant_feedback,
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizEntry {
    pub title: String,
    /// File path or http(s) URL.
    pub source: String,
    #[serde(default)]
    pub description: String,
}

/// Top-level quizmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizmarkConfig {
    /// Where sessions and high scores are stored.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Max concurrent question-set fetches.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    #[serde(default)]
    pub defaults: SessionDefaults,
    /// Catalog keyed by quiz key.
    #[serde(default)]
    pub quizzes: BTreeMap<String, QuizEntry>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./.quizmark")
}
fn default_parallelism() -> usize {
    4
}

impl Default for QuizmarkConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            parallelism: default_parallelism(),
            defaults: SessionDefaults::default(),
            quizzes: BTreeMap::new(),
        }
    }
}

impl QuizmarkConfig {
    /// Catalog entry for `key`.
    pub fn quiz(&self, key: &str) -> Option<QuizInfo> {
        self.quizzes.get(key).map(|entry| to_info(key, entry))
    }

    /// Every catalog entry, ordered by key.
    pub fn catalog(&self) -> Vec<QuizInfo> {
        self.quizzes
            .iter()
            .map(|(key, entry)| to_info(key, entry))
            .collect()
    }
}

fn to_info(key: &str, entry: &QuizEntry) -> QuizInfo {
    QuizInfo {
        key: key.to_string(),
        title: entry.title.clone(),
        source: entry.source.clone(),
        description: entry.description.clone(),
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizmark.toml` in the current directory
/// 2. `~/.config/quizmark/config.toml`
///
/// `QUIZMARK_DATA_DIR` overrides `data_dir`.
pub fn load_config() -> Result<QuizmarkConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizmarkConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizmark.toml");
            if local.exists() {
                Some(local)
            } else {
                global_config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|p| p.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizmarkConfig::default(),
    };

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }

    Ok(config)
}

/// Parse a config document and resolve `${VAR}` references.
pub fn parse_config(content: &str) -> Result<QuizmarkConfig> {
    let mut config: QuizmarkConfig = toml::from_str(content)?;

    config.data_dir = PathBuf::from(resolve_env_vars(&config.data_dir.to_string_lossy()));
    for entry in config.quizzes.values_mut() {
        entry.source = resolve_env_vars(&entry.source);
    }
    Ok(config)
}

fn global_config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizmark"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZMARK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZMARK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZMARK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${_QUIZMARK_UNSET_VAR}/x"), "/x");
        assert_eq!(resolve_env_vars("no ${closing"), "no ${closing");
        std::env::remove_var("_QUIZMARK_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = QuizmarkConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./.quizmark"));
        assert_eq!(config.parallelism, 4);
        assert!(config.quizzes.is_empty());

        let settings = config.defaults.session_settings();
        assert_eq!(settings, SessionSettings::default());
    }

    #[test]
    fn parse_catalog() {
        std::env::set_var("_QUIZMARK_QUIZ_HOST", "https://quiz.example.com");
        let toml_str = r#"
data_dir = "/tmp/quizmark-data"

[defaults]
timer_minutes = 5
question_count = "custom"
custom_question_count = 7
instant_feedback = true

[quizzes.rust-basics]
title = "Rust basics"
source = "quizzes/rust-basics.json"
description = "Ownership and borrowing"

[quizzes.remote]
title = "Remote quiz"
source = "${_QUIZMARK_QUIZ_HOST}/remote.json"
"#;
        let config = parse_config(toml_str).unwrap();
        std::env::remove_var("_QUIZMARK_QUIZ_HOST");

        assert_eq!(config.data_dir, PathBuf::from("/tmp/quizmark-data"));
        assert_eq!(config.quizzes.len(), 2);

        let info = config.quiz("rust-basics").unwrap();
        assert_eq!(info.key, "rust-basics");
        assert_eq!(info.title, "Rust basics");
        assert_eq!(info.description, "Ownership and borrowing");
        assert_eq!(
            config.quiz("remote").unwrap().source,
            "https://quiz.example.com/remote.json"
        );
        assert!(config.quiz("missing").is_none());

        let keys: Vec<String> = config.catalog().into_iter().map(|q| q.key).collect();
        assert_eq!(keys, vec!["remote", "rust-basics"]);

        let settings = config.defaults.session_settings();
        assert_eq!(settings.timer_minutes, 5);
        assert_eq!(settings.question_count, SelectionPolicy::CustomCount(7));
        assert!(settings.show_explanations);
        assert!(settings.instant_feedback);
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizmark.toml");
        std::fs::write(
            &path,
            "[quizzes.a]\ntitle = \"A\"\nsource = \"a.json\"\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.quiz("a").unwrap().source, "a.json");
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        assert!(load_config_from(Some(Path::new("/nonexistent/quizmark.toml"))).is_err());
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(parse_config("quizzes = 3").is_err());
    }
}
