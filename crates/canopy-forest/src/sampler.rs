//! Bootstrap row sampling and random feature subsetting.

use rand::Rng;
use rand::seq::index;

use crate::error::ForestError;
use crate::grid::AttributeIndex;

/// Draw `n` row indices uniformly from `0..n` with replacement.
pub fn sample_rows(n: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

/// Return the rows of `0..n` that do not appear in `sample`, ascending.
#[must_use]
pub fn out_of_bag(n: usize, sample: &[usize]) -> Vec<usize> {
    let mut in_bag = vec![false; n];
    for &row in sample {
        in_bag[row] = true;
    }
    (0..n).filter(|&i| !in_bag[i]).collect()
}

/// Draw `k` distinct attributes uniformly from `available`.
///
/// The result is sorted by column index so downstream tie-breaks follow
/// column order rather than draw order.
///
/// # Errors
///
/// Returns [`ForestError::TooManyFeatures`] when `k > available.len()`.
pub fn sample_features(
    available: &[AttributeIndex],
    k: usize,
    rng: &mut impl Rng,
) -> Result<Vec<AttributeIndex>, ForestError> {
    if k > available.len() {
        return Err(ForestError::TooManyFeatures {
            requested: k,
            available: available.len(),
        });
    }
    let mut chosen: Vec<AttributeIndex> = index::sample(rng, available.len(), k)
        .into_iter()
        .map(|i| available[i])
        .collect();
    chosen.sort_unstable();
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn attrs(n: usize) -> Vec<AttributeIndex> {
        (0..n).map(AttributeIndex::new).collect()
    }

    #[test]
    fn rows_have_input_size_and_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let rows = sample_rows(50, &mut rng);
        assert_eq!(rows.len(), 50);
        assert!(rows.iter().all(|&r| r < 50));
    }

    #[test]
    fn rows_repeat_with_replacement() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let rows = sample_rows(200, &mut rng);
        let distinct: HashSet<_> = rows.iter().collect();
        // Expected distinct fraction is about 1 - 1/e.
        assert!(distinct.len() < 200);
    }

    #[test]
    fn empty_rows() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(sample_rows(0, &mut rng).is_empty());
    }

    #[test]
    fn out_of_bag_is_complement() {
        assert_eq!(out_of_bag(5, &[0, 0, 3, 1, 3]), vec![2, 4]);
        assert!(out_of_bag(3, &[2, 1, 0]).is_empty());
    }

    #[test]
    fn features_are_distinct_and_sorted() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let available = vec![
            AttributeIndex::new(0),
            AttributeIndex::new(2),
            AttributeIndex::new(3),
            AttributeIndex::new(5),
        ];
        let chosen = sample_features(&available, 3, &mut rng).unwrap();
        assert_eq!(chosen.len(), 3);
        assert!(chosen.windows(2).all(|w| w[0] < w[1]));
        assert!(chosen.iter().all(|a| available.contains(a)));
    }

    #[test]
    fn all_features_is_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(sample_features(&attrs(4), 4, &mut rng).unwrap(), attrs(4));
    }

    #[test]
    fn too_many_features_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let err = sample_features(&attrs(3), 5, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ForestError::TooManyFeatures { requested: 5, available: 3 }
        ));
    }

    #[test]
    fn fresh_draws_differ() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let draws: HashSet<Vec<AttributeIndex>> = (0..20)
            .map(|_| sample_features(&attrs(10), 3, &mut rng).unwrap())
            .collect();
        assert!(draws.len() > 1);
    }

    #[test]
    fn features_cover_every_attribute_eventually() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.extend(sample_features(&attrs(6), 1, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 6);
    }
}
