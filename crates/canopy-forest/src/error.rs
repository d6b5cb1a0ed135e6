use std::path::PathBuf;

/// Errors from data grid, tree induction, and random forest operations.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when the forest size is zero.
    #[error("forest_size must be at least 1, got {forest_size}")]
    InvalidForestSize {
        /// The invalid forest size provided.
        forest_size: usize,
    },

    /// Returned when the per-tree feature count is zero.
    #[error("features must be at least 1, got {features}")]
    InvalidFeatureCount {
        /// The invalid feature count provided.
        features: usize,
    },

    /// Returned at fit time when more features are requested than the grid has.
    #[error(
        "random forest with {requested} features cannot fit data grid with {available} non-class attributes"
    )]
    TooManyFeatures {
        /// The configured per-tree feature count.
        requested: usize,
        /// The number of non-class attributes in the grid.
        available: usize,
    },

    /// Returned when the ID3 minimum gain is negative or not finite.
    #[error("min_gain must be a finite value >= 0.0, got {min_gain}")]
    InvalidMinGain {
        /// The invalid threshold provided.
        min_gain: f64,
    },

    /// Returned by any prediction-family call made before a successful fit.
    #[error("random forest has not been fitted")]
    NotFitted,

    /// Returned when a grid or view has zero rows, or a grid has zero attributes.
    #[error("data grid has no rows or no attributes")]
    EmptyDataset,

    /// Returned when the designated class attribute does not exist.
    #[error("class attribute {class_attribute} out of range for {n_attributes} attributes")]
    ClassAttributeOutOfRange {
        /// The requested class attribute index.
        class_attribute: usize,
        /// The number of attributes in the grid.
        n_attributes: usize,
    },

    /// Returned when the only attribute in a grid is the class attribute.
    #[error("data grid has no non-class attributes")]
    NoNonClassAttributes,

    /// Returned when two attributes share a name.
    #[error("duplicate attribute name \"{name}\"")]
    DuplicateAttributeName {
        /// The repeated name.
        name: String,
    },

    /// Returned when a row has a different number of values than there are attributes.
    #[error("row {row} has {got} values, expected {expected}")]
    RaggedRow {
        /// The zero-based row index.
        row: usize,
        /// The number of attributes.
        expected: usize,
        /// The number of values found in the row.
        got: usize,
    },

    /// Returned when a row index does not exist in the grid.
    #[error("row {row} out of range for grid with {n_rows} rows")]
    RowOutOfRange {
        /// The offending row index.
        row: usize,
        /// The number of rows in the grid.
        n_rows: usize,
    },

    /// Returned when a view is requested over the class attribute or a missing column.
    #[error("attribute {attribute} cannot be used as a view column")]
    InvalidViewColumn {
        /// The offending attribute index.
        attribute: usize,
    },

    /// Returned when the number of predicted labels differs from the row count.
    #[error("got {got} predicted labels for a grid with {expected} rows")]
    PredictionCountMismatch {
        /// The number of rows in the grid.
        expected: usize,
        /// The number of labels supplied.
        got: usize,
    },

    /// Returned when a prediction grid has a different attribute layout than the fit-time grid.
    #[error("schema mismatch: {reason}")]
    SchemaMismatch {
        /// Human-readable description of the difference.
        reason: String,
    },

    /// Returned when an attribute at a given index has a different name than at fit time.
    #[error("attribute {index} is named \"{got}\", expected \"{expected}\"")]
    AttributeMismatch {
        /// The zero-based attribute index.
        index: usize,
        /// The fit-time attribute name.
        expected: String,
        /// The attribute name found in the prediction grid.
        got: String,
    },

    /// Returned when an instance lacks a value for an attribute a tree splits on.
    #[error("instance has no value for attribute {attribute}")]
    MissingAttributeValue {
        /// The zero-based attribute index.
        attribute: usize,
    },

    /// Returned when a vote ratio map has no entry for a row.
    #[error("vote ratio map has no entry for row {row}")]
    MissingVotes {
        /// The zero-based row index.
        row: usize,
    },

    /// Returned when a vote ratio map entry contains no votes.
    #[error("vote tally for row {row} is empty")]
    EmptyVoteTally {
        /// The zero-based row index.
        row: usize,
    },

    /// Returned when OOB evaluation fails (no row has any OOB tree).
    #[error("OOB evaluation failed: {reason}")]
    OobEvaluationFailed {
        /// Human-readable description of why OOB evaluation failed.
        reason: String,
    },

    /// Returned when model serialization fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when model deserialization fails.
    #[error("failed to deserialize model from {path}")]
    DeserializeModel {
        /// Path to the model file that could not be deserialized.
        path: PathBuf,
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when loading a model with an incompatible format version.
    #[error("incompatible model version in {path}: expected {expected}, found {found}")]
    IncompatibleModelVersion {
        /// The model format version this build expects.
        expected: u32,
        /// The model format version found in the file.
        found: u32,
        /// Path to the model file with the incompatible version.
        path: PathBuf,
    },
}
