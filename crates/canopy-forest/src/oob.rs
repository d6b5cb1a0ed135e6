//! Out-of-bag (OOB) evaluation for the random forest.

use crate::error::ForestError;
use crate::forest::Member;
use crate::grid::DataGrid;
use crate::inducer::TreeInducer;
use crate::vote::VoteTally;

/// Out-of-bag evaluation result.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OobScore {
    /// Fraction of OOB-evaluated rows whose plurality vote matches the class.
    pub accuracy: f64,
    /// Number of rows left out of at least one bootstrap sample.
    pub n_oob_samples: usize,
}

/// Compute out-of-bag predictions and accuracy.
///
/// Each row is voted on only by the trees whose bootstrap sample missed it.
/// Rows that every tree saw are skipped.
pub(crate) fn compute_oob<I: TreeInducer>(
    inducer: &I,
    members: &[Member<I::Model>],
    oob_indices_per_tree: &[Vec<usize>],
    grid: &DataGrid,
) -> Result<OobScore, ForestError> {
    let instances: Vec<_> = grid.instances().collect();
    let mut oob_votes = vec![VoteTally::new(); instances.len()];

    for (member, oob_indices) in members.iter().zip(oob_indices_per_tree) {
        for &row in oob_indices {
            let label = inducer.predict(&member.model, instances[row])?;
            oob_votes[row].add(label);
        }
    }

    let mut n_oob_samples = 0usize;
    let mut correct = 0usize;
    for (row, votes) in oob_votes.iter().enumerate() {
        let Some(predicted) = votes.winner() else {
            continue;
        };
        n_oob_samples += 1;
        if grid.class_value(row) == Some(predicted) {
            correct += 1;
        }
    }

    if n_oob_samples == 0 {
        return Err(ForestError::OobEvaluationFailed {
            reason: "every row appears in every bootstrap sample".to_string(),
        });
    }

    Ok(OobScore {
        accuracy: correct as f64 / n_oob_samples as f64,
        n_oob_samples,
    })
}
