//! The `quizmark init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("quizmark.toml").exists() {
        println!("quizmark.toml already exists, skipping.");
    } else {
        std::fs::write("quizmark.toml", SAMPLE_CONFIG)?;
        println!("Created quizmark.toml");
    }

    std::fs::create_dir_all("quizzes")?;
    let sample_path = Path::new("quizzes/sample.json");
    if sample_path.exists() {
        println!("quizzes/sample.json already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_QUIZ)?;
        println!("Created quizzes/sample.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: quizmark validate --questions quizzes/sample.json");
    println!("  2. Run: quizmark list");
    println!("  3. Run: quizmark take --quiz sample");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizmark configuration

# Where saved sessions and high scores live. QUIZMARK_DATA_DIR overrides it.
data_dir = "./.quizmark"

[defaults]
timer_minutes = 10
# "all", "custom", or a number
question_count = "all"
custom_question_count = 10
show_explanations = true
instant_feedback = false

[quizzes.sample]
title = "Rust warm-up"
source = "quizzes/sample.json"
description = "A few questions to try quizmark with"
"#;

const SAMPLE_QUIZ: &str = r#"[
  {
    "question": "Which keyword makes a binding mutable?",
    "options": ["let", "mut", "var", "static"],
    "correct": [1],
    "explanation": "Bindings are immutable unless declared with `let mut`.",
    "difficulty": 0.1
  },
  {
    "question": "Which of these types implement Copy?",
    "options": ["i32", "String", "bool", "Vec<u8>"],
    "correct": [0, 2],
    "explanation": "Scalars are Copy; heap-owning types are not.",
    "hint": "Think about which types own heap memory.",
    "difficulty": 0.4
  },
  {
    "question": "What does the `?` operator do on an Err value?",
    "options": ["Panics", "Returns the error early", "Ignores it"],
    "correct": [1],
    "explanation": "`?` converts and returns the error from the enclosing function.",
    "difficulty": 0.3
  }
]
"#;
