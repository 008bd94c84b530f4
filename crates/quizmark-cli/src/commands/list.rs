//! The `quizmark list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizmark_core::highscore::HighScoreBook;
use quizmark_sources::config::load_config_from;
use quizmark_sources::{fetch_many, AutoSource};

use super::open_store;

pub async fn execute(check: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalog = config.catalog();

    if catalog.is_empty() {
        println!("No quizzes configured. Run `quizmark init` to create a config file.");
        return Ok(());
    }

    let counts: Vec<Option<String>> = if check {
        let source = AutoSource::new()?;
        let locations: Vec<String> = catalog.iter().map(|q| q.source.clone()).collect();
        let results = fetch_many(&source, &locations, config.parallelism).await;
        results
            .into_iter()
            .map(|(location, result)| match result {
                Ok(questions) => questions.len().to_string(),
                Err(e) => {
                    tracing::warn!("failed to load {location}: {e:#}");
                    "error".to_string()
                }
            })
            .map(Some)
            .collect()
    } else {
        vec![None; catalog.len()]
    };

    let store = open_store(&config);
    let scores = HighScoreBook::new(&store).load();

    let mut table = Table::new();
    let mut header = vec!["Key", "Title", "Description", "Best"];
    if check {
        header.push("Questions");
    }
    table.set_header(header);

    for (info, count) in catalog.iter().zip(counts) {
        let best = scores
            .best(&info.key)
            .map(|r| format!("{}% ({}/{})", r.percentage, r.score, r.total))
            .unwrap_or_else(|| "-".to_string());
        let mut row = vec![
            Cell::new(&info.key),
            Cell::new(&info.title),
            Cell::new(&info.description),
            Cell::new(best),
        ];
        if let Some(count) = count {
            row.push(Cell::new(count));
        }
        table.add_row(row);
    }

    println!("{table}");
    Ok(())
}
