//! quizmark-report: exports of grading results.
//!
//! CSV for spreadsheets and a self-contained HTML results page.

pub mod csv_export;
pub mod html;

pub use csv_export::{export_filename, read_csv_rows, to_csv_string, write_csv, write_csv_file};
pub use html::{generate_html, write_html_report};
