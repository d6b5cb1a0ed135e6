use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use tracing::{debug, instrument};

use crate::{
    ForestError,
    grid::{AttributeIndex, GridView, Instance},
    inducer::TreeInducer,
    node::{Branch, Node, NodeIndex},
    split::{SplitCriterion, find_best_split},
};

/// ID3 induction of multiway categorical decision trees.
///
/// Construct via [`Id3Inducer::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter   | Default   |
/// |-------------|-----------|
/// | `min_gain`  | 0.0       |
/// | `criterion` | `Entropy` |
///
/// With `min_gain = 0.0` no split is ever rejected for low gain: a node only
/// becomes a leaf when it is pure or has no attributes left to test.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Id3Inducer {
    pub(crate) min_gain: f64,
    pub(crate) criterion: SplitCriterion,
}

impl Id3Inducer {
    /// Create an inducer with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_gain: 0.0,
            criterion: SplitCriterion::Entropy,
        }
    }

    /// Set the minimum impurity decrease a split must reach.
    #[must_use]
    pub fn with_min_gain(mut self, min_gain: f64) -> Self {
        self.min_gain = min_gain;
        self
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Return the minimum impurity decrease.
    #[must_use]
    pub fn min_gain(&self) -> f64 {
        self.min_gain
    }

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }
}

impl Default for Id3Inducer {
    fn default() -> Self {
        Self::new()
    }
}

/// A view re-encoded as dense ids, column-major.
struct Encoded {
    attributes: Vec<AttributeIndex>,
    /// `values[column][sample]` indexes into `dictionaries[column]`.
    values: Vec<Vec<usize>>,
    /// Sorted distinct values per column.
    dictionaries: Vec<Vec<String>>,
    n_values: Vec<usize>,
    labels: Vec<usize>,
    /// Sorted distinct class labels.
    classes: Vec<String>,
}

impl Encoded {
    fn from_view(view: &GridView<'_>) -> Result<Self, ForestError> {
        let rows = view.rows();

        let mut class_values = Vec::with_capacity(rows.len());
        for &row in rows {
            let class = view.class_value(row).ok_or(ForestError::RowOutOfRange {
                row,
                n_rows: rows.len(),
            })?;
            class_values.push(class);
        }
        let classes: Vec<&str> = class_values
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let labels = class_values
            .iter()
            .map(|c| classes.binary_search(c).unwrap_or_default())
            .collect();

        let mut values = Vec::with_capacity(view.columns().len());
        let mut dictionaries = Vec::with_capacity(view.columns().len());
        for &attribute in view.columns() {
            let mut raw = Vec::with_capacity(rows.len());
            for &row in rows {
                let value = view.value(row, attribute).ok_or(
                    ForestError::MissingAttributeValue {
                        attribute: attribute.index(),
                    },
                )?;
                raw.push(value);
            }
            let dictionary: Vec<&str> = raw
                .iter()
                .copied()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            values.push(
                raw.iter()
                    .map(|v| dictionary.binary_search(v).unwrap_or_default())
                    .collect(),
            );
            dictionaries.push(dictionary.into_iter().map(String::from).collect());
        }

        Ok(Self {
            attributes: view.columns().to_vec(),
            values,
            n_values: dictionaries.iter().map(Vec::len).collect(),
            dictionaries,
            labels,
            classes: classes.into_iter().map(String::from).collect(),
        })
    }
}

impl TreeInducer for Id3Inducer {
    type Model = Id3Tree;

    /// Grow an ID3 tree over the view's rows and columns.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`ForestError::EmptyDataset`] | the view has zero rows |
    /// | [`ForestError::InvalidMinGain`] | `min_gain` is negative or not finite |
    #[instrument(skip_all, fields(n_rows = view.n_rows(), n_columns = view.columns().len()))]
    fn train(&self, view: &GridView<'_>) -> Result<Id3Tree, ForestError> {
        if view.n_rows() == 0 {
            return Err(ForestError::EmptyDataset);
        }
        if !self.min_gain.is_finite() || self.min_gain < 0.0 {
            return Err(ForestError::InvalidMinGain {
                min_gain: self.min_gain,
            });
        }

        let encoded = Encoded::from_view(view)?;
        let sample_indices: Vec<usize> = (0..view.n_rows()).collect();
        let candidates: Vec<usize> = (0..encoded.attributes.len()).collect();
        let mut arena: Vec<Node> = Vec::new();

        let root = build_tree(&encoded, self, &sample_indices, &candidates, &mut arena);

        debug!(
            root_index = root.index(),
            n_nodes = arena.len(),
            n_classes = encoded.classes.len(),
            "id3 tree built"
        );

        Ok(Id3Tree {
            nodes: arena,
            attributes: encoded.attributes,
        })
    }

    fn predict(&self, model: &Id3Tree, instance: Instance<'_>) -> Result<String, ForestError> {
        model.predict(instance)
    }
}

/// Recursively build the arena-based tree.
///
/// Returns the [`NodeIndex`] of the node just created in `arena`.
fn build_tree(
    encoded: &Encoded,
    config: &Id3Inducer,
    sample_indices: &[usize],
    candidates: &[usize],
    arena: &mut Vec<Node>,
) -> NodeIndex {
    let n_samples = sample_indices.len();
    let n_classes = encoded.classes.len();

    let mut class_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        class_counts[encoded.labels[si]] += 1;
    }
    let impurity = config.criterion.impurity(&class_counts, n_samples);

    // Classes are sorted, so keeping the first maximum picks the lowest label on ties.
    let majority_id = class_counts
        .iter()
        .enumerate()
        .fold((0usize, 0usize), |best, (id, &count)| {
            if count > best.1 { (id, count) } else { best }
        })
        .0;
    let majority = encoded.classes[majority_id].clone();

    let make_leaf = |arena: &mut Vec<Node>, prediction: String| -> NodeIndex {
        let idx = arena.len();
        arena.push(Node::Leaf {
            prediction,
            impurity,
            n_samples,
        });
        NodeIndex::new(idx)
    };

    let pure = class_counts.iter().filter(|&&c| c > 0).count() <= 1;
    if pure || candidates.is_empty() {
        return make_leaf(arena, majority);
    }

    let split = match find_best_split(
        &encoded.values,
        &encoded.n_values,
        &encoded.labels,
        sample_indices,
        candidates,
        n_classes,
        &config.criterion,
    ) {
        Some(s) if s.impurity_decrease >= config.min_gain => s,
        _ => return make_leaf(arena, majority),
    };

    // Arena pattern: reserve index, recurse, then overwrite with the split.
    let node_idx = arena.len();
    arena.push(Node::Leaf {
        prediction: majority.clone(),
        impurity,
        n_samples,
    });

    let remaining: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&c| c != split.column)
        .collect();

    let mut branches = Vec::with_capacity(split.partitions.len());
    for (value_id, samples) in &split.partitions {
        let child = build_tree(encoded, config, samples, &remaining, arena);
        branches.push(Branch {
            value: encoded.dictionaries[split.column][*value_id].clone(),
            child,
        });
    }

    arena[node_idx] = Node::Split {
        attribute: encoded.attributes[split.column],
        branches,
        majority,
        impurity,
        n_samples,
        impurity_decrease: split.impurity_decrease,
    };

    NodeIndex::new(node_idx)
}

/// A fitted ID3 decision tree.
///
/// Stored as an arena-based `Vec<Node>` with index references. Split
/// attributes use parent grid coordinates, so the tree predicts directly on
/// full-width instances.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Id3Tree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) attributes: Vec<AttributeIndex>,
}

impl Id3Tree {
    /// Predict the class label for a single instance.
    ///
    /// Follows the branch matching the instance's value at each split; a
    /// value never seen in training resolves to that split's majority class.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MissingAttributeValue`] when the instance has no
    /// value for an attribute the tree tests.
    pub fn predict(&self, instance: Instance<'_>) -> Result<String, ForestError> {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { prediction, .. } => return Ok(prediction.clone()),
                Node::Split {
                    attribute,
                    branches,
                    majority,
                    ..
                } => {
                    let value = instance.value(*attribute).ok_or(
                        ForestError::MissingAttributeValue {
                            attribute: attribute.index(),
                        },
                    )?;
                    match branches.binary_search_by(|b| b.value.as_str().cmp(value)) {
                        Ok(pos) => idx = branches[pos].child.index(),
                        Err(_) => return Ok(majority.clone()),
                    }
                }
            }
        }
    }

    /// Return the attributes this tree was allowed to split on.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeIndex] {
        &self.attributes
    }

    /// Return the arena nodes; index 0 is the root.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }

        // BFS: (node_index, current_depth)
        let mut max_depth = 0usize;
        let mut queue = VecDeque::new();
        queue.push_back((0usize, 0usize));

        while let Some((node_idx, d)) = queue.pop_front() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { branches, .. } => {
                    for branch in branches {
                        queue.push_back((branch.child.index(), d + 1));
                    }
                }
            }
        }

        max_depth
    }
}

impl fmt::Display for Id3Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Id3Tree(nodes: {}, leaves: {}, depth: {})",
            self.n_nodes(),
            self.n_leaves(),
            self.depth()
        )
    }
}
