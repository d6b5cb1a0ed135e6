//! Per-instance vote distributions and plurality resolution.

use std::collections::BTreeMap;

/// Votes cast for each class label on one instance.
///
/// Labels are kept in sorted order, which fixes the tie-break: among labels
/// sharing the highest count, the one that sorts first wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct VoteTally {
    counts: BTreeMap<String, usize>,
}

impl VoteTally {
    /// Create an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one vote for `label`.
    pub fn add(&mut self, label: impl Into<String>) {
        *self.counts.entry(label.into()).or_insert(0) += 1;
    }

    /// Set the count for `label` directly, replacing any previous count.
    pub fn set(&mut self, label: impl Into<String>, count: usize) {
        self.counts.insert(label.into(), count);
    }

    /// Return the number of votes for `label`.
    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Return the total number of votes cast.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Return the plurality label, or `None` if no votes were cast.
    ///
    /// Ties resolve to the label that sorts first.
    #[must_use]
    pub fn winner(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (label, &count) in &self.counts {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((label.as_str(), count));
            }
        }
        best.map(|(label, _)| label)
    }

    /// Iterate `(label, count)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(label, &count)| (label.as_str(), count))
    }

    /// Return `true` if no votes were cast.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for VoteTally {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut tally = Self::new();
        for label in iter {
            tally.add(label);
        }
        tally
    }
}

/// Vote tallies keyed by row index.
///
/// Produced fresh by each `predict_ratio` call and handed back to
/// `generate_max_ratio` explicitly; the forest never caches one.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct VoteRatioMap {
    rows: BTreeMap<usize, VoteTally>,
}

impl VoteRatioMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the tally for `row`.
    pub fn insert(&mut self, row: usize, tally: VoteTally) {
        self.rows.insert(row, tally);
    }

    /// Return the tally for `row`, if present.
    #[must_use]
    pub fn get(&self, row: usize) -> Option<&VoteTally> {
        self.rows.get(&row)
    }

    /// Return the number of rows with a tally.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Return `true` if the map holds no tallies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Return the highest row index present, if any.
    #[must_use]
    pub fn max_row(&self) -> Option<usize> {
        self.rows.keys().next_back().copied()
    }

    /// Iterate `(row, tally)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &VoteTally)> {
        self.rows.iter().map(|(&row, tally)| (row, tally))
    }
}

impl FromIterator<(usize, VoteTally)> for VoteRatioMap {
    fn from_iter<T: IntoIterator<Item = (usize, VoteTally)>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
