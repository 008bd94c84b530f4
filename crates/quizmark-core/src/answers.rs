//! Answer tracking for one attempt.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Selected option indices per question index.
///
/// A question with no selected option has no entry at all: an emptied set
/// is removed, so "answered with nothing" cannot be represented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<usize, BTreeSet<usize>>",
    into = "BTreeMap<usize, BTreeSet<usize>>"
)]
pub struct AnswerSet {
    selections: BTreeMap<usize, BTreeSet<usize>>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select or deselect one option.
    pub fn set_option(&mut self, question: usize, option: usize, selected: bool) {
        if selected {
            self.selections.entry(question).or_default().insert(option);
            return;
        }
        if let Some(set) = self.selections.get_mut(&question) {
            set.remove(&option);
            if set.is_empty() {
                self.selections.remove(&question);
            }
        }
    }

    /// Flip one option and return whether it is now selected.
    pub fn toggle(&mut self, question: usize, option: usize) -> bool {
        let now_selected = !self.is_selected(question, option);
        self.set_option(question, option, now_selected);
        now_selected
    }

    /// Replace the whole selection for a question.
    pub fn replace(&mut self, question: usize, options: impl IntoIterator<Item = usize>) {
        let set: BTreeSet<usize> = options.into_iter().collect();
        if set.is_empty() {
            self.selections.remove(&question);
        } else {
            self.selections.insert(question, set);
        }
    }

    pub fn is_selected(&self, question: usize, option: usize) -> bool {
        self.selections
            .get(&question)
            .is_some_and(|set| set.contains(&option))
    }

    /// Selected options for a question, `None` when unanswered.
    pub fn selected(&self, question: usize) -> Option<&BTreeSet<usize>> {
        self.selections.get(&question)
    }

    pub fn is_answered(&self, question: usize) -> bool {
        self.selections
            .get(&question)
            .is_some_and(|set| !set.is_empty())
    }

    /// `true` when every question in `[0, len)` has a selection.
    ///
    /// An empty quiz is never fully answered.
    pub fn is_fully_answered(&self, len: usize) -> bool {
        len > 0 && self.first_unanswered(len).is_none()
    }

    /// Smallest unanswered question index below `len`.
    pub fn first_unanswered(&self, len: usize) -> Option<usize> {
        (0..len).find(|&i| !self.is_answered(i))
    }

    pub fn answered_count(&self, len: usize) -> usize {
        (0..len).filter(|&i| self.is_answered(i)).count()
    }

    /// Share of answered questions, rounded to a whole percentage.
    pub fn progress_percentage(&self, len: usize) -> u32 {
        crate::grading::percentage(self.answered_count(len), len)
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Drop entries that are out of range for a quiz of `len` questions
    /// with the given option counts. Used when restoring saved state.
    pub fn retain_valid(&mut self, option_counts: &[usize]) {
        self.selections.retain(|&q, set| match option_counts.get(q) {
            Some(&n) => {
                set.retain(|&o| o < n);
                !set.is_empty()
            }
            None => false,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<usize>)> {
        self.selections.iter().map(|(q, set)| (*q, set))
    }
}

impl From<BTreeMap<usize, BTreeSet<usize>>> for AnswerSet {
    fn from(mut selections: BTreeMap<usize, BTreeSet<usize>>) -> Self {
        selections.retain(|_, set| !set.is_empty());
        Self { selections }
    }
}

impl From<AnswerSet> for BTreeMap<usize, BTreeSet<usize>> {
    fn from(answers: AnswerSet) -> Self {
        answers.selections
    }
}

impl FromIterator<(usize, Vec<usize>)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (usize, Vec<usize>)>>(iter: I) -> Self {
        let mut answers = AnswerSet::new();
        for (q, options) in iter {
            answers.replace(q, options);
        }
        answers
    }
}
