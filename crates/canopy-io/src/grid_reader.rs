//! CSV reader producing a categorical [`DataGrid`].

use std::path::{Path, PathBuf};

use canopy_forest::DataGrid;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ClassColumn;

/// Reads a labeled (or to-be-labeled) categorical table from a CSV file.
///
/// Expected CSV format:
/// - Header row required; every column is an attribute name
/// - One column is the class attribute, the last one unless named
/// - All rows must have the same number of columns
///
/// Every cell is kept verbatim as a categorical value. Rows to be predicted
/// may leave the class cell empty.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NoAttributeColumns`] | Header has fewer than two columns |
/// | [`IoError::UnknownClassColumn`] | Named class column is not in the header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InvalidGrid`] | Header names repeat |
pub struct GridReader {
    path: PathBuf,
    class_column: ClassColumn,
}

impl GridReader {
    /// Create a new reader for the given CSV file path, using the last column as class.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            class_column: ClassColumn::Last,
        }
    }

    /// Choose the class column.
    #[must_use]
    pub fn with_class_column(mut self, class_column: ClassColumn) -> Self {
        self.class_column = class_column;
        self
    }

    /// Read and validate the CSV file, returning a [`DataGrid`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<DataGrid, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) allows rows with varying column counts so that our own
        // InconsistentRowLength check fires instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.parse_error(e))?;
        let expected_cols = header.len();
        debug!(expected_cols, "read CSV header");

        if expected_cols < 2 {
            return Err(IoError::NoAttributeColumns {
                path: self.path.clone(),
            });
        }

        let attribute_names: Vec<String> = header.iter().map(String::from).collect();
        let class_attribute = match &self.class_column {
            ClassColumn::Last => expected_cols - 1,
            ClassColumn::Named(name) => attribute_names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| IoError::UnknownClassColumn {
                    path: self.path.clone(),
                    name: name.clone(),
                })?,
        };

        let mut rows = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            rows.push(record.iter().map(String::from).collect());
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let grid =
            DataGrid::new(attribute_names, class_attribute, rows).map_err(|e| {
                IoError::InvalidGrid {
                    path: self.path.clone(),
                    source: e,
                }
            })?;

        info!(
            n_rows = grid.n_rows(),
            n_attributes = grid.n_attributes(),
            class_attribute = %grid.class_attribute(),
            "data grid loaded"
        );

        Ok(grid)
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
