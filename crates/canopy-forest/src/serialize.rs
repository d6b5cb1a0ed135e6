//! Model serialization and deserialization via bincode.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::ForestError;
use crate::forest::{Ensemble, RandomForest};
use crate::inducer::TreeInducer;

/// Current binary format version.
const FORMAT_VERSION: u32 = 1;

/// Versioned envelope for the serialized model.
///
/// Saved with borrowed `inducer`/`ensemble` and loaded with owned ones.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope<I, E> {
    /// Format version for compatibility checking.
    format_version: u32,
    /// Forest size, per-tree feature count, seed and OOB mode.
    config: RandomForestConfig,
    /// The inducer that trained the members.
    inducer: I,
    /// The fitted ensemble.
    ensemble: E,
}

impl<I> RandomForest<I>
where
    I: TreeInducer + Serialize + DeserializeOwned,
    I::Model: Serialize + DeserializeOwned,
{
    /// Save the fitted model to a binary file.
    ///
    /// Uses bincode encoding wrapped in a versioned envelope for
    /// forward-compatibility checking.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::NotFitted`] | no fit has succeeded |
    /// | [`ForestError::SerializeModel`] | bincode encoding failed |
    /// | [`ForestError::WriteModel`] | file write failed |
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ForestError> {
        let path = path.as_ref();
        let ensemble = self.fitted()?;

        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            config: self.config.clone(),
            inducer: &self.inducer,
            ensemble,
        };

        let bytes = bincode::serialize(&envelope)
            .map_err(|e| ForestError::SerializeModel { source: e })?;

        std::fs::write(path, &bytes).map_err(|e| ForestError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            size_bytes = bytes.len(),
            n_trees = ensemble.members.len(),
            "model saved"
        );

        Ok(())
    }

    /// Load a fitted model from a binary file.
    ///
    /// Checks the format version and returns an error on mismatch.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::ReadModel`] | file read failed |
    /// | [`ForestError::DeserializeModel`] | bincode decoding failed |
    /// | [`ForestError::IncompatibleModelVersion`] | format version mismatch |
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ForestError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|e| ForestError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        let envelope: ModelEnvelope<I, Ensemble<I::Model>> = bincode::deserialize(&bytes)
            .map_err(|e| ForestError::DeserializeModel {
                path: path.to_path_buf(),
                source: e,
            })?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(ForestError::IncompatibleModelVersion {
                expected: FORMAT_VERSION,
                found: envelope.format_version,
                path: path.to_path_buf(),
            });
        }

        debug!(
            forest_size = envelope.config.forest_size,
            features = envelope.config.features,
            n_trees = envelope.ensemble.members.len(),
            "model loaded"
        );

        Ok(Self {
            config: envelope.config,
            inducer: envelope.inducer,
            ensemble: Some(envelope.ensemble),
        })
    }
}
