//! The `quizmark scores` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizmark_core::highscore::HighScoreBook;
use quizmark_sources::config::load_config_from;

use super::open_store;

pub fn execute(quiz: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = open_store(&config);
    let scores = HighScoreBook::new(&store).load();

    let rows: Vec<_> = scores
        .iter()
        .filter(|(key, _)| quiz.as_deref().map_or(true, |q| q == *key))
        .collect();

    if rows.is_empty() {
        match &quiz {
            Some(key) => println!("No high score recorded for {key}."),
            None => println!("No high scores recorded yet."),
        }
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Quiz", "Title", "Best", "Score", "Date"]);
    for (key, record) in rows {
        let title = config.quiz(key).map(|q| q.title).unwrap_or_default();
        table.add_row(vec![
            Cell::new(key),
            Cell::new(title),
            Cell::new(format!("{}%", record.percentage)),
            Cell::new(format!("{}/{}", record.score, record.total)),
            Cell::new(record.date.format("%Y-%m-%d %H:%M")),
        ]);
    }

    println!("{table}");
    Ok(())
}
