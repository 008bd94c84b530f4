//! The `quizmark validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizmark_core::parser;

pub fn execute(path: PathBuf) -> Result<()> {
    let sets = if path.is_dir() {
        parser::load_question_directory(&path)?
    } else {
        vec![(
            path.display().to_string(),
            parser::load_question_file(&path)?,
        )]
    };

    anyhow::ensure!(
        !sets.is_empty(),
        "no valid question files found in {}",
        path.display()
    );

    let mut total_warnings = 0;

    for (name, questions) in &sets {
        let multi = questions.iter().filter(|q| q.is_multi_select()).count();
        println!(
            "Question set: {name} ({} questions, {multi} multi-select)",
            questions.len()
        );

        let warnings = parser::validate_questions(questions);
        for w in &warnings {
            let prefix = w
                .index
                .map(|i| format!("  [#{}]", i + 1))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All question sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
