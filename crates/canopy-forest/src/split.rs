use crate::node::Impurity;

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i)). Its decrease is ID3's information gain.
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// Returns [`Impurity::new(0.0)`] when `n_samples` is zero (pure node).
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        let n = n_samples as f64;
        let value = match self {
            SplitCriterion::Gini => {
                let sum_sq: f64 = class_counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p
                    })
                    .sum();
                1.0 - sum_sq
            }
            SplitCriterion::Entropy => {
                -class_counts
                    .iter()
                    .filter(|&&c| c > 0)
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p.ln()
                    })
                    .sum::<f64>()
            }
        };
        Impurity::new(value)
    }
}

/// Best multiway split found for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Position of the split column in the encoded column list.
    pub(crate) column: usize,
    /// Parent impurity minus the sample-weighted child impurity (never negative).
    pub(crate) impurity_decrease: f64,
    /// Non-empty partitions as `(value_id, sample_indices)`, ascending by value id.
    pub(crate) partitions: Vec<(usize, Vec<usize>)>,
}

/// Find the candidate column whose multiway split most decreases impurity.
///
/// `columns[c][sample]` holds the value id of sample `sample` in column `c`,
/// where ids range over `0..n_values[c]`. Ties keep the first candidate in
/// `candidates` order.
///
/// Returns `None` when there are no candidates or no samples.
pub(crate) fn find_best_split(
    columns: &[Vec<usize>],
    n_values: &[usize],
    labels: &[usize],
    sample_indices: &[usize],
    candidates: &[usize],
    n_classes: usize,
    criterion: &SplitCriterion,
) -> Option<SplitResult> {
    let n_samples = sample_indices.len();
    if n_samples == 0 || candidates.is_empty() {
        return None;
    }

    let mut parent_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        parent_counts[labels[si]] += 1;
    }
    let parent_impurity = criterion.impurity(&parent_counts, n_samples).value();
    let n = n_samples as f64;

    let mut best: Option<(usize, f64)> = None;
    for &column in candidates {
        let values = &columns[column];

        // counts[value_id][class]
        let mut counts = vec![vec![0usize; n_classes]; n_values[column]];
        let mut totals = vec![0usize; n_values[column]];
        for &si in sample_indices {
            counts[values[si]][labels[si]] += 1;
            totals[values[si]] += 1;
        }

        let weighted: f64 = counts
            .iter()
            .zip(&totals)
            .filter(|&(_, &total)| total > 0)
            .map(|(class_counts, &total)| {
                (total as f64 / n) * criterion.impurity(class_counts, total).value()
            })
            .sum();
        // Rounding can push a zero-gain split slightly negative.
        let decrease = (parent_impurity - weighted).max(0.0);

        if best.is_none_or(|(_, best_decrease)| decrease > best_decrease) {
            best = Some((column, decrease));
        }
    }

    let (column, impurity_decrease) = best?;

    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); n_values[column]];
    for &si in sample_indices {
        buckets[columns[column][si]].push(si);
    }
    let partitions = buckets
        .into_iter()
        .enumerate()
        .filter(|(_, samples)| !samples.is_empty())
        .collect();

    Some(SplitResult {
        column,
        impurity_decrease,
        partitions,
    })
}

#[cfg(test)]
mod tests {
    use super::{SplitCriterion, find_best_split};

    #[test]
    fn gini_pure() {
        let imp = SplitCriterion::Gini.impurity(&[10, 0, 0], 10);
        assert!((imp.value() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gini_binary_balanced() {
        let imp = SplitCriterion::Gini.impurity(&[5, 5], 10);
        assert!((imp.value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn entropy_pure() {
        let imp = SplitCriterion::Entropy.impurity(&[10, 0, 0], 10);
        assert!((imp.value() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn entropy_binary_balanced() {
        let imp = SplitCriterion::Entropy.impurity(&[5, 5], 10);
        assert!((imp.value() - 2.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn picks_the_informative_column() {
        // Column 0 is noise, column 1 determines the label.
        let columns = vec![vec![0, 1, 0, 1], vec![0, 0, 1, 1]];
        let n_values = vec![2, 2];
        let labels = vec![0, 0, 1, 1];
        let samples: Vec<usize> = (0..4).collect();

        let split = find_best_split(
            &columns,
            &n_values,
            &labels,
            &samples,
            &[0, 1],
            2,
            &SplitCriterion::Entropy,
        )
        .expect("should find a split");

        assert_eq!(split.column, 1);
        assert!((split.impurity_decrease - 2.0_f64.ln()).abs() < 1e-10);
        assert_eq!(split.partitions, vec![(0, vec![0, 1]), (1, vec![2, 3])]);
    }

    #[test]
    fn ties_keep_first_candidate() {
        let columns = vec![vec![0, 1], vec![0, 1]];
        let split = find_best_split(
            &columns,
            &[2, 2],
            &[0, 1],
            &[0, 1],
            &[1, 0],
            2,
            &SplitCriterion::Gini,
        )
        .unwrap();
        assert_eq!(split.column, 1);
    }

    #[test]
    fn constant_column_still_splits_with_zero_gain() {
        let columns = vec![vec![3, 3, 3]];
        let split = find_best_split(
            &columns,
            &[4],
            &[0, 1, 1],
            &[0, 1, 2],
            &[0],
            2,
            &SplitCriterion::Entropy,
        )
        .unwrap();
        assert_eq!(split.impurity_decrease, 0.0);
        assert_eq!(split.partitions, vec![(3, vec![0, 1, 2])]);
    }

    #[test]
    fn no_candidates_returns_none() {
        let result = find_best_split(
            &[vec![0]],
            &[1],
            &[0],
            &[0],
            &[],
            1,
            &SplitCriterion::Gini,
        );
        assert!(result.is_none());
    }
}
