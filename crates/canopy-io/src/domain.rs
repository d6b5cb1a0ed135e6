//! Domain types for canopy-io.

use crate::IoError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which column of a CSV file holds the class attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClassColumn {
    /// The rightmost column.
    #[default]
    Last,
    /// The column with this header name.
    Named(String),
}

impl ClassColumn {
    /// Select by name when given, otherwise the last column.
    #[must_use]
    pub fn from_option(name: Option<String>) -> Self {
        name.map_or(Self::Last, Self::Named)
    }
}
