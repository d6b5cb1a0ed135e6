//! Random forest training with parallel tree construction.

use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{OobMode, RandomForestConfig};
use crate::error::ForestError;
use crate::grid::{AttributeIndex, DataGrid, Schema};
use crate::inducer::TreeInducer;
use crate::oob::{OobScore, compute_oob};
use crate::result::TrainingSummary;
use crate::sampler::{out_of_bag, sample_features, sample_rows};

/// One trained tree and the attributes it was allowed to split on.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Member<M> {
    pub(crate) model: M,
    pub(crate) features: Vec<AttributeIndex>,
}

impl<M> Member<M> {
    /// Borrow the trained model.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Return the sampled feature subset, sorted by column.
    #[must_use]
    pub fn features(&self) -> &[AttributeIndex] {
        &self.features
    }
}

/// The trained members of a forest plus what is needed to apply them.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ensemble<M> {
    pub(crate) members: Vec<Member<M>>,
    pub(crate) features: usize,
    pub(crate) schema: Schema,
    pub(crate) summary: TrainingSummary,
}

impl<M> Ensemble<M> {
    /// Return the members in tree index order.
    #[must_use]
    pub fn members(&self) -> &[Member<M>] {
        &self.members
    }

    /// Return the per-tree feature count used to build the members.
    #[must_use]
    pub fn features(&self) -> usize {
        self.features
    }

    /// Return the attribute layout the ensemble was fitted on.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Return the training summary.
    #[must_use]
    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }
}

/// A bagged ensemble of trees trained by a [`TreeInducer`].
///
/// Unfitted until [`RandomForest::fit`] succeeds; prediction calls made
/// before then return [`ForestError::NotFitted`].
pub struct RandomForest<I: TreeInducer> {
    pub(crate) config: RandomForestConfig,
    pub(crate) inducer: I,
    pub(crate) ensemble: Option<Ensemble<I::Model>>,
}

impl<I: TreeInducer> RandomForest<I> {
    /// Create an unfitted forest.
    #[must_use]
    pub fn new(config: RandomForestConfig, inducer: I) -> Self {
        Self {
            config,
            inducer,
            ensemble: None,
        }
    }

    /// Train `forest_size` trees, each on a bootstrap sample of the rows
    /// restricted to `features` randomly chosen non-class attributes.
    ///
    /// Replaces any previously fitted ensemble on success. On error the
    /// previous ensemble, if any, is left untouched.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`ForestError::EmptyDataset`] | `grid` has zero rows |
    /// | [`ForestError::TooManyFeatures`] | `features` exceeds the non-class attribute count |
    /// | [`ForestError::OobEvaluationFailed`] | OOB enabled but no row was left out of any sample |
    /// | any inducer error | propagated unchanged from the first failing tree |
    #[instrument(skip_all, fields(forest_size = self.config.forest_size, n_rows = grid.n_rows()))]
    pub fn fit(&mut self, grid: &DataGrid) -> Result<(), ForestError> {
        let n_rows = grid.n_rows();
        if n_rows == 0 {
            return Err(ForestError::EmptyDataset);
        }
        let available = grid.non_class_attributes();
        let features = self.config.features;
        if features > available.len() {
            return Err(ForestError::TooManyFeatures {
                requested: features,
                available: available.len(),
            });
        }

        info!(
            forest_size = self.config.forest_size,
            features,
            n_rows,
            n_non_class_attributes = available.len(),
            seed = self.config.seed,
            "training random forest"
        );

        // Generate per-tree seeds from master RNG.
        let mut master_rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let tree_seeds: Vec<u64> = (0..self.config.forest_size)
            .map(|_| master_rng.r#gen())
            .collect();

        let inducer = &self.inducer;
        let trained: Vec<(Member<I::Model>, Vec<usize>)> = tree_seeds
            .into_par_iter()
            .map(|seed| -> Result<_, ForestError> {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let rows = sample_rows(n_rows, &mut rng);
                let oob_indices = out_of_bag(n_rows, &rows);
                let subset = sample_features(&available, features, &mut rng)?;
                let view = grid.view(rows, subset.clone())?;
                let model = inducer.train(&view)?;
                Ok((
                    Member {
                        model,
                        features: subset,
                    },
                    oob_indices,
                ))
            })
            .collect::<Result<_, ForestError>>()?;

        let mut members = Vec::with_capacity(trained.len());
        let mut oob_indices_per_tree = Vec::with_capacity(trained.len());
        for (member, oob) in trained {
            members.push(member);
            oob_indices_per_tree.push(oob);
        }

        debug!(n_trees_trained = members.len(), "tree training complete");

        let oob = if self.config.oob_mode == OobMode::Enabled {
            Some(compute_oob(
                &self.inducer,
                &members,
                &oob_indices_per_tree,
                grid,
            )?)
        } else {
            None
        };

        let summary = TrainingSummary {
            n_rows,
            n_attributes: grid.n_attributes(),
            n_non_class_attributes: available.len(),
            class_labels: grid.class_labels(),
            forest_size: self.config.forest_size,
            features,
            oob,
        };

        info!(
            oob_accuracy = summary.oob.as_ref().map(|s| s.accuracy),
            "random forest training complete"
        );

        self.ensemble = Some(Ensemble {
            members,
            features,
            schema: Schema::of(grid),
            summary,
        });
        Ok(())
    }

    /// Return the training configuration.
    #[must_use]
    pub fn config(&self) -> &RandomForestConfig {
        &self.config
    }

    /// Return the tree inducer.
    #[must_use]
    pub fn inducer(&self) -> &I {
        &self.inducer
    }

    /// Return `true` once a fit has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.ensemble.is_some()
    }

    /// Return the fitted ensemble, if any.
    #[must_use]
    pub fn ensemble(&self) -> Option<&Ensemble<I::Model>> {
        self.ensemble.as_ref()
    }

    /// Return the number of trained trees (zero before fitting).
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.ensemble.as_ref().map_or(0, |e| e.members.len())
    }

    /// Return the trained members (empty before fitting).
    #[must_use]
    pub fn members(&self) -> &[Member<I::Model>] {
        self.ensemble.as_ref().map_or(&[], |e| e.members.as_slice())
    }

    /// Return the training summary, if fitted.
    #[must_use]
    pub fn summary(&self) -> Option<&TrainingSummary> {
        self.ensemble.as_ref().map(|e| &e.summary)
    }

    /// Return the OOB score, if fitted with OOB evaluation enabled.
    #[must_use]
    pub fn oob_score(&self) -> Option<&OobScore> {
        self.summary().and_then(|s| s.oob.as_ref())
    }

    pub(crate) fn fitted(&self) -> Result<&Ensemble<I::Model>, ForestError> {
        self.ensemble.as_ref().ok_or(ForestError::NotFitted)
    }
}

impl<I> fmt::Debug for RandomForest<I>
where
    I: TreeInducer + fmt::Debug,
    I::Model: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomForest")
            .field("config", &self.config)
            .field("inducer", &self.inducer)
            .field("ensemble", &self.ensemble)
            .finish()
    }
}

impl<I> fmt::Display for RandomForest<I>
where
    I: TreeInducer,
    I::Model: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RandomForest(ForestSize: {}, Features: {}, ",
            self.config.forest_size, self.config.features
        )?;
        match &self.ensemble {
            None => write!(f, "Ensemble(unfitted)")?,
            Some(ensemble) => {
                writeln!(f, "Ensemble(")?;
                let names = ensemble.schema.attribute_names();
                for (i, member) in ensemble.members.iter().enumerate() {
                    let subset: Vec<&str> = member
                        .features
                        .iter()
                        .map(|a| names.get(a.index()).map_or("?", String::as_str))
                        .collect();
                    writeln!(f, "  {i}: [{}] {}", subset.join(", "), member.model)?;
                }
                write!(f, ")")?;
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{OobMode, RandomForestConfig};
    use crate::error::ForestError;
    use crate::grid::DataGrid;

    /// Three categorical attributes; `shape` determines the class.
    fn make_grid() -> DataGrid {
        let mut rows = Vec::new();
        for i in 0..30 {
            let (shape, class) = match i % 3 {
                0 => ("round", "apple"),
                1 => ("long", "banana"),
                _ => ("tiny", "grape"),
            };
            let color = ["red", "green", "yellow"][(i / 3) % 3];
            let size = ["s", "m"][i % 2];
            rows.push(vec![
                shape.to_string(),
                color.to_string(),
                size.to_string(),
                class.to_string(),
            ]);
        }
        let names = ["shape", "color", "size", "fruit"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        DataGrid::new(names, 3, rows).unwrap()
    }

    #[test]
    fn fit_builds_forest_size_members() {
        let grid = make_grid();
        let mut forest = RandomForestConfig::new(12, 2).unwrap().build_id3();
        forest.fit(&grid).unwrap();
        assert!(forest.is_fitted());
        assert_eq!(forest.n_trees(), 12);
        for member in forest.members() {
            assert_eq!(member.features().len(), 2);
            assert!(member.features().windows(2).all(|w| w[0] < w[1]));
            assert!(member.features().iter().all(|a| a.index() < 3));
        }
    }

    #[test]
    fn too_many_features_builds_nothing() {
        let grid = make_grid();
        let mut forest = RandomForestConfig::new(4, 5).unwrap().build_id3();
        let err = forest.fit(&grid).unwrap_err();
        assert!(matches!(
            err,
            ForestError::TooManyFeatures { requested: 5, available: 3 }
        ));
        assert!(!forest.is_fitted());
    }

    #[test]
    fn failed_refit_keeps_previous_ensemble() {
        let grid = make_grid();
        let mut forest = RandomForestConfig::new(3, 3).unwrap().build_id3();
        forest.fit(&grid).unwrap();

        let narrow = DataGrid::new(
            vec!["a".into(), "fruit".into()],
            1,
            vec![vec!["x".into(), "apple".into()]],
        )
        .unwrap();
        assert!(forest.fit(&narrow).is_err());
        assert_eq!(forest.n_trees(), 3);
        assert_eq!(forest.summary().unwrap().n_rows, 30);
    }

    #[test]
    fn refit_replaces_ensemble() {
        let grid = make_grid();
        let mut forest = RandomForestConfig::new(3, 1).unwrap().build_id3();
        forest.fit(&grid).unwrap();
        let half = DataGrid::new(
            grid.attribute_names().to_vec(),
            3,
            grid.instances()
                .take(15)
                .map(|i| i.values().to_vec())
                .collect(),
        )
        .unwrap();
        forest.fit(&half).unwrap();
        assert_eq!(forest.summary().unwrap().n_rows, 15);
    }

    #[test]
    fn empty_grid_rejected() {
        let grid = DataGrid::new(vec!["a".into(), "class".into()], 1, Vec::new()).unwrap();
        let mut forest = RandomForestConfig::new(2, 1).unwrap().build_id3();
        assert!(matches!(forest.fit(&grid), Err(ForestError::EmptyDataset)));
    }

    #[test]
    fn deterministic_members_with_same_seed() {
        let grid = make_grid();
        let mut a = RandomForestConfig::new(8, 2).unwrap().with_seed(99).build_id3();
        let mut b = RandomForestConfig::new(8, 2).unwrap().with_seed(99).build_id3();
        a.fit(&grid).unwrap();
        b.fit(&grid).unwrap();
        assert_eq!(a.ensemble(), b.ensemble());
    }

    #[test]
    fn members_draw_different_subsets() {
        let grid = make_grid();
        let mut forest = RandomForestConfig::new(20, 1).unwrap().build_id3();
        forest.fit(&grid).unwrap();
        let first = forest.members()[0].features().to_vec();
        assert!(forest.members().iter().any(|m| m.features() != first));
    }

    #[test]
    fn oob_score_computed() {
        let grid = make_grid();
        let mut forest = RandomForestConfig::new(30, 3)
            .unwrap()
            .with_oob_mode(OobMode::Enabled)
            .build_id3();
        forest.fit(&grid).unwrap();
        let oob = forest.oob_score().expect("OOB should be computed");
        assert!(oob.accuracy > 0.9, "oob accuracy = {}", oob.accuracy);
        assert!(oob.n_oob_samples > 0);
    }

    #[test]
    fn oob_fails_when_every_row_is_in_bag() {
        let grid = DataGrid::new(
            vec!["a".into(), "class".into()],
            1,
            vec![vec!["x".into(), "yes".into()]],
        )
        .unwrap();
        let mut forest = RandomForestConfig::new(5, 1)
            .unwrap()
            .with_oob_mode(OobMode::Enabled)
            .build_id3();
        let err = forest.fit(&grid).unwrap_err();
        assert!(matches!(err, ForestError::OobEvaluationFailed { .. }));
        assert!(!forest.is_fitted());
    }

    #[test]
    fn summary_records_grid_shape() {
        let grid = make_grid();
        let mut forest = RandomForestConfig::new(2, 2).unwrap().build_id3();
        forest.fit(&grid).unwrap();
        let summary = forest.summary().unwrap();
        assert_eq!(summary.n_rows, 30);
        assert_eq!(summary.n_attributes, 4);
        assert_eq!(summary.n_non_class_attributes, 3);
        assert_eq!(summary.class_labels, vec!["apple", "banana", "grape"]);
        assert_eq!(summary.forest_size, 2);
        assert_eq!(summary.features, 2);
        assert!(summary.oob.is_none());
    }

    #[test]
    fn display_reports_size_and_features() {
        let grid = make_grid();
        let mut forest = RandomForestConfig::new(2, 1).unwrap().build_id3();
        assert_eq!(
            forest.to_string(),
            "RandomForest(ForestSize: 2, Features: 1, Ensemble(unfitted))"
        );
        forest.fit(&grid).unwrap();
        let text = forest.to_string();
        assert!(text.starts_with("RandomForest(ForestSize: 2, Features: 1, Ensemble(\n"));
        assert!(text.contains("  0: ["));
        assert!(text.contains("  1: ["));
        assert!(text.ends_with("))"));
    }
}
