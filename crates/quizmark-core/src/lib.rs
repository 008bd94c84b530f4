//! quizmark-core: question model, selection, grading, and session state.
//!
//! Everything in this crate is synchronous and deterministic given an RNG,
//! except [`timer`], which drives a countdown on the tokio runtime.

pub mod answers;
pub mod error;
pub mod grading;
pub mod highscore;
pub mod model;
pub mod parser;
pub mod report;
pub mod selection;
pub mod session;
pub mod storage;
pub mod timer;
