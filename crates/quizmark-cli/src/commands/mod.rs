pub mod grade;
pub mod init;
pub mod list;
pub mod scores;
pub mod take;
pub mod validate;

use std::path::PathBuf;

use quizmark_core::storage::FileStore;
use quizmark_sources::QuizmarkConfig;

/// The persistent store under the configured data directory.
pub fn open_store(config: &QuizmarkConfig) -> FileStore {
    FileStore::new(PathBuf::from(&config.data_dir))
}
