//! Training summary recorded with a fitted ensemble.

use crate::oob::OobScore;

/// Metadata about the training run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrainingSummary {
    /// Number of training rows.
    pub n_rows: usize,
    /// Number of attributes, class attribute included.
    pub n_attributes: usize,
    /// Number of attributes eligible for feature sampling.
    pub n_non_class_attributes: usize,
    /// Distinct class labels seen in training, sorted.
    pub class_labels: Vec<String>,
    /// Number of trees trained.
    pub forest_size: usize,
    /// Number of attributes sampled per tree.
    pub features: usize,
    /// Out-of-bag score, if OOB evaluation was enabled.
    pub oob: Option<OobScore>,
}
