//! Configuration builder for random forest training.

use crate::error::ForestError;
use crate::forest::RandomForest;
use crate::inducer::TreeInducer;
use crate::tree::Id3Inducer;

/// Whether to compute out-of-bag evaluation during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OobMode {
    /// Vote each tree on the rows left out of its bootstrap sample.
    Enabled,
    /// Skip OOB evaluation.
    Disabled,
}

/// Configuration for random forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter  | Default    |
/// |------------|------------|
/// | `seed`     | 42         |
/// | `oob_mode` | `Disabled` |
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RandomForestConfig {
    pub(crate) forest_size: usize,
    pub(crate) features: usize,
    pub(crate) seed: u64,
    pub(crate) oob_mode: OobMode,
}

impl RandomForestConfig {
    /// Create a config growing `forest_size` trees, each on `features` randomly
    /// chosen non-class attributes.
    ///
    /// Whether `features` fits the data is only known at fit time.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`ForestError::InvalidForestSize`] | `forest_size` is zero |
    /// | [`ForestError::InvalidFeatureCount`] | `features` is zero |
    pub fn new(forest_size: usize, features: usize) -> Result<Self, ForestError> {
        if forest_size == 0 {
            return Err(ForestError::InvalidForestSize { forest_size });
        }
        if features == 0 {
            return Err(ForestError::InvalidFeatureCount { features });
        }
        Ok(Self {
            forest_size,
            features,
            seed: 42,
            oob_mode: OobMode::Disabled,
        })
    }

    /// Set the master random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the OOB evaluation mode.
    #[must_use]
    pub fn with_oob_mode(mut self, oob_mode: OobMode) -> Self {
        self.oob_mode = oob_mode;
        self
    }

    /// Return the number of trees.
    #[must_use]
    pub fn forest_size(&self) -> usize {
        self.forest_size
    }

    /// Return the number of attributes sampled per tree.
    #[must_use]
    pub fn features(&self) -> usize {
        self.features
    }

    /// Return the master random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the OOB evaluation mode.
    #[must_use]
    pub fn oob_mode(&self) -> OobMode {
        self.oob_mode
    }

    /// Create an unfitted forest that trains its members with `inducer`.
    #[must_use]
    pub fn build<I: TreeInducer>(self, inducer: I) -> RandomForest<I> {
        RandomForest::new(self, inducer)
    }

    /// Create an unfitted forest of unpruned ID3 trees.
    #[must_use]
    pub fn build_id3(self) -> RandomForest<Id3Inducer> {
        self.build(Id3Inducer::new())
    }
}
