//! The `quizmark take` command: an interactive attempt in the terminal.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};

use quizmark_core::error::QuizError;
use quizmark_core::grading::format_time;
use quizmark_core::highscore::HighScoreBook;
use quizmark_core::model::{option_letter, Question, QuizInfo, SessionSettings};
use quizmark_core::parser::validate_questions;
use quizmark_core::report::GradingReport;
use quizmark_core::selection::{validate_custom_count, SelectionPolicy};
use quizmark_core::session::{QuizSession, SavedQuizState};
use quizmark_core::storage::{self, KeyValueStore, QUIZ_STATE_KEY};
use quizmark_core::timer::{
    timer_duration_from_minutes, Countdown, TimerEvent, LOW_TIME_THRESHOLD_SECS,
};
use quizmark_sources::config::{load_config_from, QuizmarkConfig};
use quizmark_sources::source_for;

use super::grade::{print_result_table, title_from_path};
use super::open_store;

pub struct TakeArgs {
    pub quiz: Option<String>,
    pub file: Option<PathBuf>,
    pub count: Option<String>,
    pub timer: Option<i64>,
    pub no_timer: bool,
    pub adaptive: bool,
    pub seed: Option<u64>,
    pub resume: bool,
    pub csv: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// One line of user input, or an event that stands in for one.
#[derive(Debug, PartialEq)]
enum Input {
    Select(Vec<usize>),
    Next,
    Previous,
    GoTo(usize),
    Submit { force: bool },
    Hint,
    Reset,
    Count(String),
    ToggleTimer,
    ToggleExplanations,
    ToggleFeedback,
    Show,
    Help,
    Quit,
    TimeUp,
    Invalid(String),
}

const HELP: &str = "\
Answer with option letters or numbers, e.g. `A`, `a,c` or `1 3`.
Commands (they win over option letters):
  n / p      next / previous question
  g <N>      go to question N
  h          show the hint
  clear      clear the current answer
  r          start over with a new draw
  count <N>  start over with N questions (or `count all`)
  t          pause or resume the timer
  x          show or hide explanations in the results
  f          instant feedback on or off
  s          submit (s! submits with unanswered questions)
  q          save and quit
  ?          this help";

pub async fn execute(args: TakeArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let info = resolve_quiz(&config, args.quiz.as_deref(), args.file.as_deref())?;

    let source = source_for(&info.source)?;
    let questions = source.fetch(&info.source).await?;
    for w in validate_questions(&questions) {
        match w.index {
            Some(i) => tracing::warn!("question {}: {}", i + 1, w.message),
            None => tracing::warn!("{}", w.message),
        }
    }

    // Reject bad input before anything is persisted.
    let mut settings = config.defaults.session_settings();
    if let Some(raw) = &args.count {
        settings.question_count = parse_count(raw, questions.len())?;
    }
    if let Some(minutes) = args.timer {
        timer_duration_from_minutes(minutes)?;
        settings.timer_minutes = u32::try_from(minutes).map_err(|_| {
            QuizError::InvalidTimerDuration(format!("{minutes} minutes is too long"))
        })?;
    }
    let timed = !args.no_timer;
    if timed {
        timer_duration_from_minutes(settings.timer_minutes.into())?;
    }

    let store = open_store(&config);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let adaptive = args.adaptive.then(|| {
        HighScoreBook::new(&store)
            .load()
            .best(&info.key)
            .map_or(0.5, |r| f64::from(r.percentage) / 100.0)
    });

    let restored = if args.resume {
        resume_session(&store, &info, &questions, &settings)
    } else {
        None
    };
    let (mut session, saved_time_left) = match restored {
        Some(pair) => {
            println!("Resuming saved session for {}.", info.title);
            pair
        }
        None => {
            if args.resume {
                println!("No saved session for {}; starting a new attempt.", info.key);
            }
            let mut session = QuizSession::new(info, questions, settings, Utc::now(), &mut rng)?;
            if let Some(performance) = adaptive {
                session.reset_adaptive(performance, Utc::now(), &mut rng);
            }
            (session, None)
        }
    };

    let (mut timer, mut events) = Countdown::new();
    let duration = if timed {
        Some(timer_duration_from_minutes(session.settings().timer_minutes.into())?)
    } else {
        None
    };
    if let Some(duration) = duration {
        match saved_time_left {
            Some(left) if left > 0 => {
                timer.restore(duration, left);
                timer.resume();
            }
            _ => timer.start(duration),
        }
    }
    let time_left = |timer: &Countdown| timed.then(|| timer.remaining());

    println!(
        "{}: {} questions. Type ? for help.",
        session.info().title,
        session.len()
    );
    save_progress(&store, &session, time_left(&timer));
    print_question(&session, time_left(&timer));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        // Ticks are absorbed here so the prompt is printed once per input.
        let input = loop {
            tokio::select! {
                line = lines.next_line() => break match line? {
                    Some(line) => {
                        let options = session.current_question().map_or(0, |q| q.options.len());
                        parse_input(&line, options)
                    }
                    None => Input::Quit,
                },
                Some(event) = events.recv(), if timed => match event {
                    TimerEvent::Tick { remaining } => {
                        if remaining == LOW_TIME_THRESHOLD_SECS {
                            println!("\nOne minute left!");
                            prompt();
                        }
                    }
                    TimerEvent::Expired => break Input::TimeUp,
                },
                _ = tokio::signal::ctrl_c() => break Input::Quit,
            }
        };

        match input {
            Input::Select(options) => {
                let current = session.current_index();
                if let Err(e) = session.replace_selection(current, &options) {
                    println!("{e}");
                    continue;
                }
                save_progress(&store, &session, time_left(&timer));
                if let Some(status) = session.instant_feedback(current) {
                    println!("{status}");
                }
                if !options.is_empty() && !session.next() {
                    println!("That was the last question. Type s to submit.");
                    continue;
                }
                print_question(&session, time_left(&timer));
            }
            Input::Next => {
                if !session.next() {
                    println!("Already at the last question.");
                }
                print_question(&session, time_left(&timer));
            }
            Input::Previous => {
                if !session.previous() {
                    println!("Already at the first question.");
                }
                print_question(&session, time_left(&timer));
            }
            Input::GoTo(n) => match n.checked_sub(1).map(|i| session.go_to(i)) {
                Some(Ok(())) => print_question(&session, time_left(&timer)),
                _ => println!("No question {n}; there are {}.", session.len()),
            },
            Input::Submit { force } => {
                let timing = if timed {
                    timer.timing()
                } else {
                    session.elapsed_timing(Utc::now())
                };
                let outcome = if force {
                    session.force_submit(timing).map(|_| ())
                } else {
                    session.submit(timing).map(|_| ())
                };
                match outcome {
                    Ok(()) => break,
                    Err(QuizError::Unanswered { first }) => {
                        println!(
                            "Question {} is unanswered. Answer it or type s! to submit anyway.",
                            first + 1
                        );
                        session.go_to(first)?;
                        print_question(&session, time_left(&timer));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Input::TimeUp => {
                println!("\nTime is up! Submitting your answers.");
                session.force_submit(timer.timing())?;
                break;
            }
            Input::Hint => match session.current_question().and_then(|q| q.hint.as_deref()) {
                Some(hint) => println!("Hint: {hint}"),
                None => println!("No hint for this question."),
            },
            Input::Reset => {
                restart(&mut session, adaptive, &mut rng);
                if let Some(duration) = duration {
                    timer.start(duration);
                }
                save_progress(&store, &session, time_left(&timer));
                println!("Started a new attempt with {} questions.", session.len());
                print_question(&session, time_left(&timer));
            }
            Input::Count(raw) => match parse_count(&raw, session.all_questions().len()) {
                Ok(policy) => {
                    session.apply_policy(policy, Utc::now(), &mut rng);
                    if adaptive.is_some() {
                        restart(&mut session, adaptive, &mut rng);
                    }
                    if let Some(duration) = duration {
                        timer.start(duration);
                    }
                    save_progress(&store, &session, time_left(&timer));
                    println!("Started a new attempt with {} questions.", session.len());
                    print_question(&session, time_left(&timer));
                }
                Err(e) => println!("{e}"),
            },
            Input::ToggleTimer => {
                if !timed {
                    println!("This attempt has no timer.");
                } else if timer.pause() {
                    println!(
                        "Timer paused at {}.",
                        format_time(Some(timer.remaining() as f64))
                    );
                    save_progress(&store, &session, time_left(&timer));
                } else if timer.resume() {
                    println!("Timer resumed.");
                } else {
                    println!("The timer is not running.");
                }
            }
            Input::ToggleExplanations => {
                let on = !session.settings().show_explanations;
                session.set_show_explanations(on);
                save_progress(&store, &session, time_left(&timer));
                println!("Explanations {}.", on_off(on));
            }
            Input::ToggleFeedback => {
                let on = !session.settings().instant_feedback;
                session.set_instant_feedback(on);
                save_progress(&store, &session, time_left(&timer));
                println!("Instant feedback {}.", on_off(on));
            }
            Input::Show => print_question(&session, time_left(&timer)),
            Input::Help => println!("{HELP}"),
            Input::Quit => {
                timer.pause();
                save_progress(&store, &session, time_left(&timer));
                println!(
                    "\nProgress saved. Continue with: quizmark take {} --resume",
                    resume_hint(&session)
                );
                return Ok(());
            }
            Input::Invalid(message) => println!("{message} (type ? for help)"),
        }
    }

    timer.cancel();
    storage::clear_key(&store, QUIZ_STATE_KEY);
    finish(&session, &store, args.csv.as_deref())
}

/// Draw a new subset, weighted by difficulty when `adaptive` carries a
/// success rate.
fn restart(session: &mut QuizSession, adaptive: Option<f64>, rng: &mut StdRng) {
    match adaptive {
        Some(performance) => session.reset_adaptive(performance, Utc::now(), rng),
        None => session.reset(Utc::now(), rng),
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

fn finish(session: &QuizSession, store: &dyn KeyValueStore, csv: Option<&Path>) -> Result<()> {
    let Some(result) = session.result() else {
        return Ok(());
    };
    let now = Utc::now();
    let info = session.info();
    let report = GradingReport::new(Some(info.key.clone()), &info.title, result.clone(), now);

    println!("\n{}", report.summary_line());
    print_result_table(result, session.settings().show_explanations);

    if HighScoreBook::new(store).record(&info.key, result.score, result.total_questions, now) {
        println!("New high score!");
    }

    if let Some(path) = csv {
        let path = if path.is_dir() {
            path.join(quizmark_report::export_filename(&info.title, now.date_naive()))
        } else {
            path.to_path_buf()
        };
        quizmark_report::write_csv_file(result, &path)?;
        println!("CSV export: {}", path.display());
    }
    Ok(())
}

fn resolve_quiz(
    config: &QuizmarkConfig,
    quiz: Option<&str>,
    file: Option<&Path>,
) -> Result<QuizInfo> {
    match (quiz, file) {
        (Some(key), _) => config.quiz(key).ok_or_else(|| {
            anyhow::anyhow!("unknown quiz '{key}'. Run `quizmark list` to see the catalog.")
        }),
        (None, Some(path)) => {
            let name = title_from_path(path);
            Ok(QuizInfo {
                key: name.clone(),
                title: name,
                source: path.display().to_string(),
                description: String::new(),
            })
        }
        (None, None) => anyhow::bail!("either --quiz or --file is required"),
    }
}

fn resume_session(
    store: &dyn KeyValueStore,
    info: &QuizInfo,
    questions: &[Question],
    settings: &SessionSettings,
) -> Option<(QuizSession, Option<u64>)> {
    let saved: SavedQuizState = storage::load_json(store, QUIZ_STATE_KEY)?;
    let time_left = saved.time_left;
    QuizSession::restore(info.clone(), questions.to_vec(), saved, settings.clone())
        .map(|session| (session, time_left))
}

fn save_progress(store: &dyn KeyValueStore, session: &QuizSession, time_left: Option<u64>) {
    storage::save_json(store, QUIZ_STATE_KEY, &session.snapshot(time_left));
}

fn resume_hint(session: &QuizSession) -> String {
    let info = session.info();
    if info.source.ends_with(".json") && info.key == info.title {
        format!("--file {}", info.source)
    } else {
        format!("--quiz {}", info.key)
    }
}

/// `"all"` or a positive count no larger than `available`.
fn parse_count(raw: &str, available: usize) -> Result<SelectionPolicy, QuizError> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return Ok(SelectionPolicy::All);
    }
    let count = validate_custom_count(raw, available)?;
    Ok(SelectionPolicy::CustomCount(count as i64))
}

fn parse_input(line: &str, option_count: usize) -> Input {
    let trimmed = line.trim();
    let lower = trimmed.to_ascii_lowercase();
    match lower.as_str() {
        "" => return Input::Show,
        "n" | "next" => return Input::Next,
        "p" | "prev" | "previous" => return Input::Previous,
        "s" | "submit" => return Input::Submit { force: false },
        "s!" => return Input::Submit { force: true },
        "h" | "hint" => return Input::Hint,
        "?" | "help" => return Input::Help,
        "q" | "quit" => return Input::Quit,
        "clear" => return Input::Select(Vec::new()),
        "r" | "reset" => return Input::Reset,
        "t" | "timer" => return Input::ToggleTimer,
        "x" | "explain" => return Input::ToggleExplanations,
        "f" | "feedback" => return Input::ToggleFeedback,
        _ => {}
    }

    if let Some(rest) = lower.strip_prefix("count ") {
        return Input::Count(rest.trim().to_string());
    }

    if let Some(rest) = lower.strip_prefix("g ") {
        return match rest.trim().parse::<usize>() {
            Ok(n) => Input::GoTo(n),
            Err(_) => Input::Invalid(format!("'{}' is not a question number", rest.trim())),
        };
    }

    match parse_selection(trimmed, option_count) {
        Ok(options) => Input::Select(options),
        Err(message) => Input::Invalid(message),
    }
}

/// Parse `A,C`, `a c` or `1 3` into zero-based option indices.
fn parse_selection(input: &str, option_count: usize) -> Result<Vec<usize>, String> {
    let mut options = Vec::new();
    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let index = if let Ok(n) = token.parse::<usize>() {
            n.checked_sub(1)
        } else {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => {
                    Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
                }
                _ => return Err(format!("unrecognized input '{token}'")),
            }
        };
        match index {
            Some(i) if i < option_count => options.push(i),
            _ => return Err(format!("no option '{token}'")),
        }
    }
    options.sort_unstable();
    options.dedup();
    Ok(options)
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_question(session: &QuizSession, time_left: Option<u64>) {
    let Some(question) = session.current_question() else {
        return;
    };
    let index = session.current_index();
    let (answered, total, pct) = session.progress();

    let mut status = format!(
        "Question {}/{total} | answered {answered}/{total} ({pct}%)",
        index + 1
    );
    if let Some(left) = time_left {
        status.push_str(&format!(" | time left {}", format_time(Some(left as f64))));
    }

    println!("\n{status}");
    println!("{}", question.question);
    if question.is_multi_select() {
        println!("(select all that apply)");
    }
    for (i, text) in question.options.iter().enumerate() {
        let mark = if session.answers().is_selected(index, i) {
            "x"
        } else {
            " "
        };
        println!("  [{mark}] {}) {text}", option_letter(i));
    }
}
