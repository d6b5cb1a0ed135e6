//! Capability interface for single-tree induction.

use crate::error::ForestError;
use crate::grid::{GridView, Instance};

/// Trains one predictive model from a restricted view and applies it to instances.
///
/// The forest only ever calls these two operations, so any learner that can
/// be trained on a row/column subset can serve as an ensemble member.
pub trait TreeInducer: Send + Sync {
    /// The trained model. Owned by the ensemble and never mutated after training.
    type Model: Send + Sync;

    /// Train a model on the rows and columns visible through `view`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; the forest propagates them unchanged.
    fn train(&self, view: &GridView<'_>) -> Result<Self::Model, ForestError>;

    /// Predict the class label of a full-width instance.
    ///
    /// # Errors
    ///
    /// Implementation-defined, typically [`ForestError::MissingAttributeValue`].
    fn predict(&self, model: &Self::Model, instance: Instance<'_>) -> Result<String, ForestError>;
}
