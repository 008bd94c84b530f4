//! Question subset selection.
//!
//! Decides which questions one attempt presents and in which order. Every
//! selection goes through an unbiased Fisher–Yates shuffle; counts that are
//! out of range are clamped rather than rejected.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Below this many questions adaptive ordering degrades to a plain shuffle.
pub const MIN_QUESTIONS_FOR_ADAPTIVE: usize = 10;
/// Share of an adaptive selection taken from the difficulty-sorted head.
pub const ADAPTIVE_SPLIT: f64 = 0.7;
/// Performance inside this open range is considered average.
pub const PERFORMANCE_MID_RANGE: (f64, f64) = (0.4, 0.6);
/// Custom count offered before the user types one.
pub const DEFAULT_CUSTOM_COUNT: u32 = 10;

/// How many questions an attempt draws from the full list.
///
/// Counts that are not positive integers fall back to the whole list, so a
/// malformed setting is stored as `0` rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SelectionPolicy {
    /// Every question, shuffled.
    #[default]
    All,
    /// One of the preset counts.
    FixedCount(i64),
    /// A count typed in by the user.
    CustomCount(i64),
}

impl SelectionPolicy {
    /// Build a policy from the raw selector and custom-count inputs.
    ///
    /// `selected` is `"all"`, `"custom"`, or a number; `custom` is only read
    /// for `"custom"`. Non-numeric input maps to a count of zero.
    pub fn from_settings(selected: &str, custom: &str) -> Self {
        match selected.trim() {
            "all" => SelectionPolicy::All,
            "custom" => SelectionPolicy::CustomCount(parse_count(custom)),
            other => SelectionPolicy::FixedCount(parse_count(other)),
        }
    }

    /// The raw `(selected, custom)` pair persisted with a saved session.
    pub fn to_settings(&self, default_custom: u32) -> (String, String) {
        match self {
            SelectionPolicy::All => ("all".into(), default_custom.to_string()),
            SelectionPolicy::FixedCount(n) => (n.to_string(), default_custom.to_string()),
            SelectionPolicy::CustomCount(n) => ("custom".into(), n.to_string()),
        }
    }

    /// Requested count, if any.
    pub fn requested(&self) -> Option<i64> {
        match self {
            SelectionPolicy::All => None,
            SelectionPolicy::FixedCount(n) | SelectionPolicy::CustomCount(n) => Some(*n),
        }
    }
}

fn parse_count(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0)
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::All => write!(f, "all"),
            SelectionPolicy::FixedCount(n) => write!(f, "{n}"),
            SelectionPolicy::CustomCount(n) => write!(f, "custom:{n}"),
        }
    }
}

impl From<&str> for SelectionPolicy {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            SelectionPolicy::All
        } else if let Some(n) = s.strip_prefix("custom:") {
            SelectionPolicy::CustomCount(parse_count(n))
        } else {
            SelectionPolicy::FixedCount(parse_count(s))
        }
    }
}

impl From<String> for SelectionPolicy {
    fn from(s: String) -> Self {
        SelectionPolicy::from(s.as_str())
    }
}

impl From<SelectionPolicy> for String {
    fn from(p: SelectionPolicy) -> Self {
        p.to_string()
    }
}

/// Return a shuffled copy of `items` (Fisher–Yates).
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.gen_range(0..=i);
        out.swap(i, j);
    }
    out
}

/// Number of questions `policy` yields from a list of `len`.
pub fn resolve_count(policy: SelectionPolicy, len: usize) -> usize {
    match policy.requested() {
        None => len,
        Some(n) if n < 1 => len,
        Some(n) => usize::try_from(n).map_or(len, |n| n.min(len)),
    }
}

/// Original indices of the questions an attempt presents, in presentation
/// order.
pub fn select_indices<R: Rng + ?Sized>(
    len: usize,
    policy: SelectionPolicy,
    rng: &mut R,
) -> Vec<usize> {
    let all: Vec<usize> = (0..len).collect();
    let mut order = shuffle(&all, rng);
    order.truncate(resolve_count(policy, len));
    order
}

/// Randomly selected, randomly ordered subset of `items`.
pub fn select_subset<T: Clone, R: Rng + ?Sized>(
    items: &[T],
    policy: SelectionPolicy,
    rng: &mut R,
) -> Vec<T> {
    select_indices(items.len(), policy, rng)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

/// Validate a custom count typed by the user against the available questions.
pub fn validate_custom_count(raw: &str, available: usize) -> Result<usize, QuizError> {
    let count = raw
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| {
            QuizError::InvalidQuestionCount(format!("'{}' is not a positive number", raw.trim()))
        })?;

    let count = usize::try_from(count)
        .map_err(|_| QuizError::InvalidQuestionCount(raw.trim().to_string()))?;
    if count > available {
        return Err(QuizError::InvalidQuestionCount(format!(
            "cannot select more than {available} questions"
        )));
    }
    Ok(count)
}

/// Difficulty-aware selection of `count` question indices.
///
/// `performance` is the user's past success rate in `0.0..=1.0`. Strong
/// performers get the hardest questions first, weak performers the easiest;
/// average performers and short quizzes get a plain shuffle. Seventy percent
/// of the selection comes from the sorted head, the rest is drawn at random
/// from what remains, and the combination is shuffled.
pub fn select_by_difficulty<R: Rng + ?Sized>(
    difficulties: &[Option<f64>],
    performance: f64,
    count: usize,
    rng: &mut R,
) -> Vec<usize> {
    let len = difficulties.len();
    let count = count.min(len);
    let (low, high) = PERFORMANCE_MID_RANGE;

    if len <= MIN_QUESTIONS_FOR_ADAPTIVE || (performance > low && performance < high) {
        let mut order = shuffle(&(0..len).collect::<Vec<_>>(), rng);
        order.truncate(count);
        return order;
    }

    let mut sorted: Vec<usize> = (0..len).collect();
    // Zero and NaN count as unrated.
    let difficulty = |i: usize| {
        difficulties[i]
            .filter(|d| *d != 0.0 && !d.is_nan())
            .unwrap_or(0.5)
    };
    if performance > high {
        sorted.sort_by(|&a, &b| difficulty(b).total_cmp(&difficulty(a)));
    } else {
        sorted.sort_by(|&a, &b| difficulty(a).total_cmp(&difficulty(b)));
    }

    let adapted = (count as f64 * ADAPTIVE_SPLIT).floor() as usize;
    let mut picked: Vec<usize> = sorted[..adapted].to_vec();
    let mut rest = shuffle(&sorted[adapted..], rng);
    rest.truncate(count - adapted);
    picked.extend(rest);

    shuffle(&picked, rng)
}
