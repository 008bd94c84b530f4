//! quizmark-sources: where question sets come from.
//!
//! Implements the `QuestionSource` trait for local files and HTTP(S) URLs,
//! and loads the TOML configuration that names the quiz catalog.

pub mod config;
pub mod error;
pub mod file;
pub mod http;
pub mod mock;
pub mod source;

pub use config::{load_config, load_config_from, QuizmarkConfig};
pub use error::SourceError;
pub use source::{fetch_many, source_for, AutoSource, QuestionSource};
