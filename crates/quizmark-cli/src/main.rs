//! quizmark CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizmark", version, about = "Multiple-choice quiz runner and grader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz interactively
    Take {
        /// Catalog key of the quiz
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        quiz: Option<String>,

        /// Question JSON file (instead of a catalog quiz)
        #[arg(long)]
        file: Option<PathBuf>,

        /// How many questions: "all" or a number
        #[arg(long)]
        count: Option<String>,

        /// Countdown length in minutes
        #[arg(long, allow_negative_numbers = true)]
        timer: Option<i64>,

        /// Run without a countdown
        #[arg(long, conflicts_with = "timer")]
        no_timer: bool,

        /// Weight the question draw by difficulty using your best score
        #[arg(long)]
        adaptive: bool,

        /// Seed for question selection
        #[arg(long)]
        seed: Option<u64>,

        /// Continue the saved session for this quiz
        #[arg(long)]
        resume: bool,

        /// Export results as CSV to this path after submitting
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade an answer file against a question file
    Grade {
        /// Question JSON file
        #[arg(long)]
        questions: PathBuf,

        /// Answers JSON: question index to selected option indices
        #[arg(long)]
        answers: PathBuf,

        /// Seconds the attempt took
        #[arg(long)]
        time_taken: Option<f64>,

        /// Record the result as a high score under this quiz key
        #[arg(long)]
        quiz: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Write a CSV export
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write an HTML results page
        #[arg(long)]
        html: Option<PathBuf>,

        /// Write the JSON report
        #[arg(long)]
        report: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question JSON files
    Validate {
        /// Path to a question file or directory
        #[arg(long)]
        questions: PathBuf,
    },

    /// List the quiz catalog
    List {
        /// Load every quiz and show its question count
        #[arg(long)]
        check: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show best scores
    Scores {
        /// Only this quiz
        #[arg(long)]
        quiz: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and sample quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizmark=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            quiz,
            file,
            count,
            timer,
            no_timer,
            adaptive,
            seed,
            resume,
            csv,
            config,
        } => {
            commands::take::execute(commands::take::TakeArgs {
                quiz,
                file,
                count,
                timer,
                no_timer,
                adaptive,
                seed,
                resume,
                csv,
                config,
            })
            .await
        }
        Commands::Grade {
            questions,
            answers,
            time_taken,
            quiz,
            format,
            csv,
            html,
            report,
            config,
        } => commands::grade::execute(commands::grade::GradeArgs {
            questions,
            answers,
            time_taken,
            quiz,
            format,
            csv,
            html,
            report,
            config,
        }),
        Commands::Validate { questions } => commands::validate::execute(questions),
        Commands::List { check, config } => commands::list::execute(check, config).await,
        Commands::Scores { quiz, config } => commands::scores::execute(quiz, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
