//! HTML results page.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use quizmark_core::grading::{format_time, GradingResult, QuestionStatus};
use quizmark_core::report::GradingReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn status_class(status: QuestionStatus) -> &'static str {
    match status {
        QuestionStatus::Correct => "correct",
        QuestionStatus::Partial => "partial",
        QuestionStatus::Incorrect => "incorrect",
    }
}

/// Generate the results page. Explanations are included only when
/// `show_explanations` is set.
pub fn generate_html(report: &GradingReport, show_explanations: bool) -> String {
    let result = &report.result;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Quiz results: {}</title>\n",
        html_escape(&report.quiz_title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.quiz_title)));
    html.push_str(&format!(
        "<p class=\"meta\">{} | time taken: {}</p>\n",
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        format_time(result.time_taken_seconds)
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"score\">\n");
    html.push_str(&format!(
        "<p class=\"big\">{}/{} <span>({}%)</span></p>\n",
        result.score, result.total_questions, result.percentage
    ));
    html.push_str(&format!(
        "<p class=\"band\">{}</p>\n",
        html_escape(result.band().message())
    ));
    html.push_str(&format!(
        "<p>Correct: {} | Partial: {} | Incorrect: {}</p>\n",
        result.correct_count, result.partial_count, result.incorrect_count
    ));
    if result.total_questions > 0 {
        html.push_str(&generate_breakdown_bar(result));
    }
    html.push_str("</section>\n");

    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<table id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">#</th><th onclick=\"sortTable(1)\">Question</th><th>Your answer</th><th>Correct answer</th><th onclick=\"sortTable(4)\">Result</th>");
    if show_explanations {
        html.push_str("<th>Explanation</th>");
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for r in &result.per_question {
        let class = status_class(r.status);
        let your_answer = if r.selected_option_texts.is_empty() {
            "<em>no answer</em>".to_string()
        } else {
            html_escape(&r.selected_option_texts.join("; "))
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            class,
            r.index + 1,
            html_escape(&r.question),
            your_answer,
            html_escape(&r.correct_option_texts.join("; ")),
            r.status.label()
        ));
        if show_explanations {
            html.push_str(&format!("<td>{}</td>", html_escape(&r.explanation)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the results page to a file.
pub fn write_html_report(
    report: &GradingReport,
    path: &Path,
    show_explanations: bool,
) -> Result<()> {
    let html = generate_html(report, show_explanations);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

/// Stacked SVG bar of correct / partial / incorrect shares.
fn generate_breakdown_bar(result: &GradingResult) -> String {
    let width = 600.0;
    let height = 24;
    let total = result.total_questions as f64;

    let segments = [
        (result.correct_count, "#22c55e"),
        (result.partial_count, "#eab308"),
        (result.incorrect_count, "#ef4444"),
    ];

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        width, height
    );
    let mut x = 0.0;
    for (count, color) in segments {
        if count == 0 {
            continue;
        }
        let w = count as f64 / total * width;
        svg.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"0\" width=\"{:.1}\" height=\"{}\" fill=\"{}\"/>\n",
            x, w, height, color
        ));
        x += w;
    }
    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --correct: #dcfce7; --partial: #fef9c3; --incorrect: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --correct: #064e3b; --partial: #713f12; --incorrect: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.big { font-size: 2.5rem; font-weight: bold; margin: 0.5rem 0; }
.big span { font-size: 1.5rem; color: #6b7280; }
.band { font-size: 1.2rem; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; vertical-align: top; }
th { background: var(--border); cursor: pointer; }
.correct { background: var(--correct); }
.partial { background: var(--partial); }
.incorrect { background: var(--incorrect); }
svg { margin: 1rem 0; border-radius: 4px; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = Number(va), nb = Number(vb);
    const cmp = !isNaN(na) && !isNaN(nb) ? na - nb : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quizmark_core::answers::AnswerSet;
    use quizmark_core::grading::{grade, TimingInput};
    use quizmark_core::model::Question;

    fn make_test_report() -> GradingReport {
        let questions = vec![
            Question {
                question: "Is <T> generic?".into(),
                options: vec!["yes".into(), "no".into()],
                correct: vec![0],
                explanation: Some("Angle brackets & type parameters.".into()),
                hint: None,
                difficulty: None,
            },
            Question {
                question: "Pick both".into(),
                options: vec!["a".into(), "b".into()],
                correct: vec![0, 1],
                explanation: None,
                hint: None,
                difficulty: None,
            },
        ];
        let answers: AnswerSet = [(0, vec![0])].into_iter().collect();
        let result = grade(
            &questions,
            &answers,
            TimingInput::Countdown {
                duration_secs: 300,
                remaining_secs: 210,
            },
        );
        GradingReport::new(Some("generics".into()), "Generics & traits", result, Utc::now())
    }

    #[test]
    fn html_contains_score_and_escaped_text() {
        let html = generate_html(&make_test_report(), true);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Generics &amp; traits"));
        assert!(html.contains("Is &lt;T&gt; generic?"));
        assert!(!html.contains("Is <T> generic?"));
        assert!(html.contains("1/2"));
        assert!(html.contains("(50%)"));
        assert!(html.contains("01:30"));
        assert!(html.contains("<em>no answer</em>"));
        assert!(html.contains("Angle brackets &amp; type parameters."));
    }

    #[test]
    fn explanations_can_be_hidden() {
        let html = generate_html(&make_test_report(), false);
        assert!(!html.contains("<th>Explanation</th>"));
        assert!(!html.contains("Angle brackets"));
    }

    #[test]
    fn html_report_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.html");

        write_html_report(&make_test_report(), &path, true).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
