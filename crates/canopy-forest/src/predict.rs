//! Prediction methods for the random forest ensemble.

use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, instrument};

use crate::error::ForestError;
use crate::forest::{Ensemble, RandomForest};
use crate::grid::{DataGrid, Instance};
use crate::inducer::TreeInducer;
use crate::vote::{VoteRatioMap, VoteTally};

impl<I: TreeInducer> RandomForest<I> {
    /// Label every row of `grid` with the plurality vote of the ensemble.
    ///
    /// Returns a copy of `grid` with the class attribute overwritten; all
    /// other values are unchanged. Ties resolve to the label that sorts first.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`ForestError::NotFitted`] | no fit has succeeded |
    /// | [`ForestError::SchemaMismatch`] | attribute count or class attribute differs from fit time |
    /// | [`ForestError::AttributeMismatch`] | an attribute name differs from fit time |
    /// | any inducer error | propagated from the first failing tree prediction |
    #[instrument(skip_all, fields(n_rows = grid.n_rows()))]
    pub fn predict(&self, grid: &DataGrid) -> Result<DataGrid, ForestError> {
        let ensemble = self.checked_ensemble(grid)?;
        let instances: Vec<Instance<'_>> = grid.instances().collect();
        let labels: Vec<String> = instances
            .par_iter()
            .enumerate()
            .map(|(row, &instance)| {
                let tally = self.tally(ensemble, instance)?;
                resolve(row, &tally)
            })
            .collect::<Result<_, ForestError>>()?;

        debug!(n_predicted = labels.len(), "prediction complete");
        grid.with_class_values(labels)
    }

    /// Return the full vote distribution for every row of `grid`.
    ///
    /// Each tree casts exactly one vote per row, so every tally sums to the
    /// number of trees. The map is keyed by row index and is not retained.
    ///
    /// # Errors
    ///
    /// Same as [`RandomForest::predict`].
    #[instrument(skip_all, fields(n_rows = grid.n_rows()))]
    pub fn predict_ratio(&self, grid: &DataGrid) -> Result<VoteRatioMap, ForestError> {
        let ensemble = self.checked_ensemble(grid)?;
        let instances: Vec<Instance<'_>> = grid.instances().collect();
        let tallies: Vec<(usize, VoteTally)> = instances
            .par_iter()
            .enumerate()
            .map(|(row, &instance)| -> Result<_, ForestError> {
                Ok((row, self.tally(ensemble, instance)?))
            })
            .collect::<Result<_, ForestError>>()?;

        Ok(tallies.into_iter().collect())
    }

    /// Label every row of `grid` from a previously computed vote ratio map.
    ///
    /// Uses the same tie-break as [`RandomForest::predict`], so
    /// `generate_max_ratio(grid, &predict_ratio(grid)?)` equals `predict(grid)`.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`ForestError::NotFitted`] | no fit has succeeded |
    /// | [`ForestError::SchemaMismatch`] | attribute count or class attribute differs from fit time |
    /// | [`ForestError::AttributeMismatch`] | an attribute name differs from fit time |
    /// | [`ForestError::RowOutOfRange`] | `ratios` has an entry past the last row |
    /// | [`ForestError::MissingVotes`] | a row has no entry in `ratios` |
    /// | [`ForestError::EmptyVoteTally`] | a row's tally holds no votes |
    #[instrument(skip_all, fields(n_rows = grid.n_rows(), n_ratios = ratios.len()))]
    pub fn generate_max_ratio(
        &self,
        grid: &DataGrid,
        ratios: &VoteRatioMap,
    ) -> Result<DataGrid, ForestError> {
        self.checked_ensemble(grid)?;
        if let Some(row) = ratios.max_row()
            && row >= grid.n_rows()
        {
            return Err(ForestError::RowOutOfRange {
                row,
                n_rows: grid.n_rows(),
            });
        }

        let labels = (0..grid.n_rows())
            .map(|row| {
                let tally = ratios.get(row).ok_or(ForestError::MissingVotes { row })?;
                resolve(row, tally)
            })
            .collect::<Result<Vec<_>, ForestError>>()?;

        grid.with_class_values(labels)
    }

    fn checked_ensemble(&self, grid: &DataGrid) -> Result<&Ensemble<I::Model>, ForestError> {
        let ensemble = self.fitted()?;
        ensemble.schema.check(grid)?;
        Ok(ensemble)
    }

    fn tally(
        &self,
        ensemble: &Ensemble<I::Model>,
        instance: Instance<'_>,
    ) -> Result<VoteTally, ForestError> {
        let mut tally = VoteTally::new();
        for member in &ensemble.members {
            tally.add(self.inducer.predict(&member.model, instance)?);
        }
        Ok(tally)
    }
}

fn resolve(row: usize, tally: &VoteTally) -> Result<String, ForestError> {
    tally
        .winner()
        .map(String::from)
        .ok_or(ForestError::EmptyVoteTally { row })
}
