//! The `quizmark grade` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use quizmark_core::answers::AnswerSet;
use quizmark_core::grading::{self, format_time, GradingResult, TimingInput};
use quizmark_core::highscore::HighScoreBook;
use quizmark_core::parser;
use quizmark_core::report::GradingReport;
use quizmark_sources::config::load_config_from;

use super::open_store;

/// One year.
const MAX_TIME_TAKEN_SECS: f64 = 31_536_000.0;

pub struct GradeArgs {
    pub questions: PathBuf,
    pub answers: PathBuf,
    pub time_taken: Option<f64>,
    pub quiz: Option<String>,
    pub format: String,
    pub csv: Option<PathBuf>,
    pub html: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn execute(args: GradeArgs) -> Result<()> {
    anyhow::ensure!(
        matches!(args.format.as_str(), "text" | "json"),
        "unknown format '{}', expected text or json",
        args.format
    );
    if let Some(t) = args.time_taken {
        anyhow::ensure!(
            (0.0..=MAX_TIME_TAKEN_SECS).contains(&t),
            "time taken must be between 0 and {MAX_TIME_TAKEN_SECS} seconds"
        );
    }

    let config = load_config_from(args.config.as_deref())?;
    let questions = parser::load_question_file(&args.questions)?;
    for w in parser::validate_questions(&questions) {
        match w.index {
            Some(i) => tracing::warn!("question {}: {}", i + 1, w.message),
            None => tracing::warn!("{}", w.message),
        }
    }
    let answers = load_answers(&args.answers)?;

    let now = Utc::now();
    // Answers index the file order, so no shuffle here.
    let timing = match args.time_taken {
        Some(secs) => TimingInput::Elapsed {
            started_at: Some(now - chrono::Duration::milliseconds((secs * 1000.0) as i64)),
            submitted_at: now,
        },
        None => TimingInput::Unknown,
    };
    let result = grading::grade(&questions, &answers, timing);

    let title = args
        .quiz
        .as_deref()
        .and_then(|key| config.quiz(key))
        .map(|info| info.title)
        .unwrap_or_else(|| title_from_path(&args.questions));
    let report = GradingReport::new(args.quiz.clone(), title, result, now);

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_text(&report),
    }

    if let Some(key) = &args.quiz {
        let store = open_store(&config);
        let book = HighScoreBook::new(&store);
        if book.record(key, report.result.score, report.result.total_questions, now)
            && args.format == "text"
        {
            println!("New high score for {key}!");
        }
    }

    if let Some(path) = &args.csv {
        quizmark_report::write_csv_file(&report.result, path)?;
        eprintln!("CSV export: {}", path.display());
    }
    if let Some(path) = &args.html {
        quizmark_report::write_html_report(&report, path, config.defaults.show_explanations)?;
        eprintln!("HTML report: {}", path.display());
    }
    if let Some(path) = &args.report {
        report.save_json(path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn load_answers(path: &Path) -> Result<AnswerSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", path.display()))
}

pub(crate) fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_text(report: &GradingReport) {
    println!("{}", report.summary_line());
    print_result_table(&report.result, true);
}

/// Per-question table followed by the status counts.
pub(crate) fn print_result_table(result: &GradingResult, show_explanations: bool) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    let mut header = vec!["#", "Question", "Your answer", "Correct answer", "Result"];
    if show_explanations {
        header.push("Explanation");
    }
    table.set_header(header);

    for r in &result.per_question {
        let mut row = vec![
            Cell::new(r.index + 1),
            Cell::new(&r.question),
            Cell::new(r.selected_option_texts.join("; ")),
            Cell::new(r.correct_option_texts.join("; ")),
            Cell::new(r.status.label()),
        ];
        if show_explanations {
            row.push(Cell::new(&r.explanation));
        }
        table.add_row(row);
    }

    println!("{table}");
    println!(
        "Correct: {}  Partial: {}  Incorrect: {}  Time: {}",
        result.correct_count,
        result.partial_count,
        result.incorrect_count,
        format_time(result.time_taken_seconds)
    );
}
