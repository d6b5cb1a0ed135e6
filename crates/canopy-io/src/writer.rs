//! Result writer for predictions, vote ratios, and fit summaries.

use std::fs;
use std::path::{Path, PathBuf};

use canopy_forest::{DataGrid, TrainingSummary, VoteRatioMap};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes prediction and training artifacts under one output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_predictions.csv`,
/// `{experiment}_votes.json` and `{experiment}_fit.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write a labeled grid to `{experiment}_predictions.csv`.
    ///
    /// The header repeats the grid's attribute names; each row carries the
    /// original values with the predicted class in the class column.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteCsv`] if the file cannot be written.
    #[instrument(skip_all, fields(n_rows = labeled.n_rows()))]
    pub fn write_predictions(&self, labeled: &DataGrid) -> Result<PathBuf, IoError> {
        let path = self.file_path("predictions.csv");
        let to_csv_error = |e: csv::Error| IoError::WriteCsv {
            path: path.clone(),
            source: e,
        };

        let mut wtr = csv::Writer::from_path(&path).map_err(to_csv_error)?;
        wtr.write_record(labeled.attribute_names())
            .map_err(to_csv_error)?;
        for instance in labeled.instances() {
            wtr.write_record(instance.values()).map_err(to_csv_error)?;
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "predictions written");
        Ok(path)
    }

    /// Write per-row vote distributions to `{experiment}_votes.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::EncodeJson`] or [`IoError::WriteFile`] on failure.
    #[instrument(skip_all, fields(n_rows = ratios.len()))]
    pub fn write_votes(&self, ratios: &VoteRatioMap) -> Result<PathBuf, IoError> {
        let path = self.file_path("votes.json");
        let artifact = VotesArtifact {
            experiment: self.experiment.as_str(),
            n_rows: ratios.len(),
            votes: ratios,
        };
        self.write_json(&path, &artifact)?;

        info!(path = %path.display(), "vote ratios written");
        Ok(path)
    }

    /// Write a training summary to `{experiment}_fit.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::EncodeJson`] or [`IoError::WriteFile`] on failure.
    #[instrument(skip_all)]
    pub fn write_fit(&self, summary: &TrainingSummary, seed: u64) -> Result<PathBuf, IoError> {
        let path = self.file_path("fit.json");
        let model_path = self.model_path();
        let artifact = FitArtifact {
            experiment: self.experiment.as_str(),
            seed,
            model_path: &model_path,
            summary,
        };
        self.write_json(&path, &artifact)?;

        info!(path = %path.display(), "fit summary written");
        Ok(path)
    }

    /// Return the path where the model binary should be saved.
    ///
    /// Computes `{output_dir}/{experiment}_model.bin` without touching the filesystem.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.file_path("model.bin")
    }

    fn file_path(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{suffix}", self.experiment.as_str()))
    }

    fn write_json<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::EncodeJson {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, &json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct VotesArtifact<'a> {
    experiment: &'a str,
    n_rows: usize,
    votes: &'a VoteRatioMap,
}

#[derive(Serialize)]
struct FitArtifact<'a> {
    experiment: &'a str,
    seed: u64,
    model_path: &'a Path,
    #[serde(flatten)]
    summary: &'a TrainingSummary,
}
