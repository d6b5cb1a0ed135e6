//! Categorical data grid: rows of string values with one class attribute.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::error::ForestError;

/// Zero-based attribute (column) index within a [`DataGrid`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct AttributeIndex(usize);

impl AttributeIndex {
    /// Create a new attribute index from a zero-based column position.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AttributeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A table of categorical values with a designated class attribute.
///
/// `rows[row][attribute]` holds the value of `attribute` for `row`. Every row
/// has exactly one value per attribute, including the class attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataGrid {
    attribute_names: Vec<String>,
    class_attribute: AttributeIndex,
    rows: Vec<Vec<String>>,
}

impl DataGrid {
    /// Build a grid, validating its shape.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::EmptyDataset`] | zero attributes |
    /// | [`ForestError::ClassAttributeOutOfRange`] | `class_attribute >= attribute_names.len()` |
    /// | [`ForestError::NoNonClassAttributes`] | the class is the only attribute |
    /// | [`ForestError::DuplicateAttributeName`] | two attributes share a name |
    /// | [`ForestError::RaggedRow`] | a row length differs from the attribute count |
    pub fn new(
        attribute_names: Vec<String>,
        class_attribute: usize,
        rows: Vec<Vec<String>>,
    ) -> Result<Self, ForestError> {
        let n_attributes = attribute_names.len();
        if n_attributes == 0 {
            return Err(ForestError::EmptyDataset);
        }
        if class_attribute >= n_attributes {
            return Err(ForestError::ClassAttributeOutOfRange {
                class_attribute,
                n_attributes,
            });
        }
        if n_attributes == 1 {
            return Err(ForestError::NoNonClassAttributes);
        }

        let mut seen = HashSet::with_capacity(n_attributes);
        for name in &attribute_names {
            if !seen.insert(name.as_str()) {
                return Err(ForestError::DuplicateAttributeName { name: name.clone() });
            }
        }

        for (row, values) in rows.iter().enumerate() {
            if values.len() != n_attributes {
                return Err(ForestError::RaggedRow {
                    row,
                    expected: n_attributes,
                    got: values.len(),
                });
            }
        }

        Ok(Self {
            attribute_names,
            class_attribute: AttributeIndex(class_attribute),
            rows,
        })
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of attributes, including the class attribute.
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.attribute_names.len()
    }

    /// Return all attribute names in column order.
    #[must_use]
    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    /// Return the name of an attribute, if it exists.
    #[must_use]
    pub fn attribute_name(&self, attribute: AttributeIndex) -> Option<&str> {
        self.attribute_names.get(attribute.0).map(String::as_str)
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn attribute_index(&self, name: &str) -> Option<AttributeIndex> {
        self.attribute_names
            .iter()
            .position(|n| n == name)
            .map(AttributeIndex)
    }

    /// Return the class attribute.
    #[must_use]
    pub fn class_attribute(&self) -> AttributeIndex {
        self.class_attribute
    }

    /// Return every non-class attribute in column order.
    #[must_use]
    pub fn non_class_attributes(&self) -> Vec<AttributeIndex> {
        (0..self.attribute_names.len())
            .filter(|&i| i != self.class_attribute.0)
            .map(AttributeIndex)
            .collect()
    }

    /// Return the number of non-class attributes.
    #[must_use]
    pub fn n_non_class_attributes(&self) -> usize {
        self.attribute_names.len() - 1
    }

    /// Return the class value of a row, or `None` if the row does not exist.
    #[must_use]
    pub fn class_value(&self, row: usize) -> Option<&str> {
        self.rows
            .get(row)
            .map(|values| values[self.class_attribute.0].as_str())
    }

    /// Borrow a row as an [`Instance`], or `None` if the row does not exist.
    #[must_use]
    pub fn instance(&self, row: usize) -> Option<Instance<'_>> {
        self.rows.get(row).map(|values| Instance { values })
    }

    /// Return the distinct class values, sorted.
    #[must_use]
    pub fn class_labels(&self) -> Vec<String> {
        let labels: BTreeSet<&str> = self
            .rows
            .iter()
            .map(|values| values[self.class_attribute.0].as_str())
            .collect();
        labels.into_iter().map(String::from).collect()
    }

    /// Restrict the grid to a multiset of rows and a set of non-class columns.
    ///
    /// Rows may repeat (bootstrap samples). Columns are kept in the order given.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::RowOutOfRange`] | a row index is `>= n_rows` |
    /// | [`ForestError::InvalidViewColumn`] | a column is the class attribute or does not exist |
    pub fn view(
        &self,
        rows: Vec<usize>,
        columns: Vec<AttributeIndex>,
    ) -> Result<GridView<'_>, ForestError> {
        if let Some(&row) = rows.iter().find(|&&r| r >= self.rows.len()) {
            return Err(ForestError::RowOutOfRange {
                row,
                n_rows: self.rows.len(),
            });
        }
        if let Some(&column) = columns
            .iter()
            .find(|&&c| c == self.class_attribute || c.0 >= self.attribute_names.len())
        {
            return Err(ForestError::InvalidViewColumn {
                attribute: column.0,
            });
        }
        Ok(GridView {
            grid: self,
            rows,
            columns,
        })
    }

    /// Return a copy of the grid with the class column replaced by `labels`.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionCountMismatch`] when `labels.len() != n_rows`.
    pub fn with_class_values(&self, labels: Vec<String>) -> Result<DataGrid, ForestError> {
        if labels.len() != self.rows.len() {
            return Err(ForestError::PredictionCountMismatch {
                expected: self.rows.len(),
                got: labels.len(),
            });
        }
        let class = self.class_attribute.0;
        let rows = self
            .rows
            .iter()
            .zip(labels)
            .map(|(values, label)| {
                let mut values = values.clone();
                values[class] = label;
                values
            })
            .collect();
        Ok(DataGrid {
            attribute_names: self.attribute_names.clone(),
            class_attribute: self.class_attribute,
            rows,
        })
    }

    /// Iterate rows as [`Instance`]s.
    pub fn instances(&self) -> impl Iterator<Item = Instance<'_>> {
        self.rows.iter().map(|values| Instance { values })
    }
}

/// A borrowed row of a [`DataGrid`].
#[derive(Debug, Clone, Copy)]
pub struct Instance<'a> {
    values: &'a [String],
}

impl<'a> Instance<'a> {
    /// Return the value of `attribute`, or `None` if the row has no such column.
    #[must_use]
    pub fn value(&self, attribute: AttributeIndex) -> Option<&'a str> {
        self.values.get(attribute.0).map(String::as_str)
    }

    /// Return all values of the row in column order.
    #[must_use]
    pub fn values(&self) -> &'a [String] {
        self.values
    }
}

/// A row/column-restricted view of a [`DataGrid`].
///
/// Row indices and columns refer to the parent grid's coordinates, so models
/// trained on a view can be applied to full instances.
#[derive(Debug, Clone)]
pub struct GridView<'a> {
    grid: &'a DataGrid,
    rows: Vec<usize>,
    columns: Vec<AttributeIndex>,
}

impl<'a> GridView<'a> {
    /// Return the sampled row indices (may contain repeats).
    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Return the columns visible through this view.
    #[must_use]
    pub fn columns(&self) -> &[AttributeIndex] {
        &self.columns
    }

    /// Return the number of sampled rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return the value at `row` (a parent grid row) for a visible column.
    ///
    /// Returns `None` for columns outside the view.
    #[must_use]
    pub fn value(&self, row: usize, attribute: AttributeIndex) -> Option<&'a str> {
        if !self.columns.contains(&attribute) {
            return None;
        }
        self.grid
            .rows
            .get(row)
            .map(|values| values[attribute.0].as_str())
    }

    /// Return the class value at `row` (a parent grid row).
    #[must_use]
    pub fn class_value(&self, row: usize) -> Option<&'a str> {
        self.grid.class_value(row)
    }

    /// Return the name of a visible column.
    #[must_use]
    pub fn attribute_name(&self, attribute: AttributeIndex) -> Option<&'a str> {
        self.grid.attribute_name(attribute)
    }
}

/// Attribute layout captured at fit time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Schema {
    attribute_names: Vec<String>,
    class_attribute: AttributeIndex,
}

impl Schema {
    /// Capture the layout of a grid.
    #[must_use]
    pub fn of(grid: &DataGrid) -> Self {
        Self {
            attribute_names: grid.attribute_names.clone(),
            class_attribute: grid.class_attribute,
        }
    }

    /// Return the attribute names in column order.
    #[must_use]
    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    /// Return the class attribute.
    #[must_use]
    pub fn class_attribute(&self) -> AttributeIndex {
        self.class_attribute
    }

    /// Check that `grid` has the same layout.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::SchemaMismatch`] | attribute count or class attribute differs |
    /// | [`ForestError::AttributeMismatch`] | an attribute name differs at some index |
    pub fn check(&self, grid: &DataGrid) -> Result<(), ForestError> {
        if grid.n_attributes() != self.attribute_names.len() {
            return Err(ForestError::SchemaMismatch {
                reason: format!(
                    "grid has {} attributes, model was fitted on {}",
                    grid.n_attributes(),
                    self.attribute_names.len()
                ),
            });
        }
        if grid.class_attribute != self.class_attribute {
            return Err(ForestError::SchemaMismatch {
                reason: format!(
                    "class attribute is {}, model was fitted with {}",
                    grid.class_attribute, self.class_attribute
                ),
            });
        }
        for (index, (expected, got)) in self
            .attribute_names
            .iter()
            .zip(&grid.attribute_names)
            .enumerate()
        {
            if expected != got {
                return Err(ForestError::AttributeMismatch {
                    index,
                    expected: expected.clone(),
                    got: got.clone(),
                });
            }
        }
        Ok(())
    }
}
