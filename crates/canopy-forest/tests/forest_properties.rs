//! Behavioural properties of fit, predict, predict_ratio and generate_max_ratio.

use canopy_forest::{
    DataGrid, ForestError, GridView, Id3Inducer, Instance, RandomForestConfig, TreeInducer,
    VoteTally,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Four instances, two non-class attributes, class in the last column.
fn four_by_two() -> DataGrid {
    DataGrid::new(
        strings(&["windy", "humid", "play"]),
        2,
        vec![
            strings(&["yes", "high", "no"]),
            strings(&["yes", "low", "no"]),
            strings(&["no", "high", "yes"]),
            strings(&["no", "low", "yes"]),
        ],
    )
    .unwrap()
}

/// Three non-class attributes with the class in the middle column.
fn three_attributes() -> DataGrid {
    DataGrid::new(
        strings(&["a", "class", "b", "c"]),
        1,
        vec![
            strings(&["x", "pos", "x", "x"]),
            strings(&["y", "neg", "y", "x"]),
            strings(&["x", "pos", "y", "y"]),
            strings(&["y", "neg", "x", "y"]),
        ],
    )
    .unwrap()
}

#[test]
fn four_instance_scenario() {
    let grid = four_by_two();
    let mut forest = RandomForestConfig::new(3, 1).unwrap().build_id3();
    forest.fit(&grid).unwrap();
    assert_eq!(forest.n_trees(), 3);

    let labeled = forest.predict(&grid).unwrap();
    assert_eq!(labeled.n_rows(), 4);
    for row in 0..4 {
        assert!(matches!(labeled.class_value(row), Some("yes" | "no")));
    }

    let ratios = forest.predict_ratio(&grid).unwrap();
    assert_eq!(ratios.len(), 4);
    for (_, tally) in ratios.iter() {
        assert_eq!(tally.total(), 3);
    }
}

#[test]
fn features_above_available_is_configuration_error() {
    let grid = three_attributes();
    let mut forest = RandomForestConfig::new(10, 5).unwrap().build_id3();
    let err = forest.fit(&grid).unwrap_err();
    assert!(matches!(
        err,
        ForestError::TooManyFeatures { requested: 5, available: 3 }
    ));
    assert_eq!(
        err.to_string(),
        "random forest with 5 features cannot fit data grid with 3 non-class attributes"
    );
    assert_eq!(forest.n_trees(), 0);
}

#[test]
fn all_features_never_samples_the_class() {
    let grid = three_attributes();
    let mut forest = RandomForestConfig::new(6, 3).unwrap().build_id3();
    forest.fit(&grid).unwrap();
    for member in forest.members() {
        let columns: Vec<usize> = member.features().iter().map(|a| a.index()).collect();
        assert_eq!(columns, vec![0, 2, 3]);
    }
}

#[test]
fn single_tree_casts_one_vote() {
    let grid = three_attributes();
    let mut forest = RandomForestConfig::new(1, 2).unwrap().build_id3();
    forest.fit(&grid).unwrap();
    let ratios = forest.predict_ratio(&grid).unwrap();
    for (_, tally) in ratios.iter() {
        assert_eq!(tally.iter().count(), 1);
        assert_eq!(tally.total(), 1);
    }
}

#[test]
fn predict_matches_generate_max_ratio_across_seeds() {
    let grid = three_attributes();
    for seed in 0..10 {
        let mut forest = RandomForestConfig::new(4, 1).unwrap().with_seed(seed).build_id3();
        forest.fit(&grid).unwrap();
        let ratios = forest.predict_ratio(&grid).unwrap();
        assert_eq!(
            forest.generate_max_ratio(&grid, &ratios).unwrap(),
            forest.predict(&grid).unwrap(),
            "seed {seed}"
        );
    }
}

#[test]
fn same_seed_same_predictions() {
    let grid = four_by_two();
    let config = RandomForestConfig::new(9, 1).unwrap().with_seed(2024);
    let mut first = config.clone().build_id3();
    let mut second = config.build_id3();
    first.fit(&grid).unwrap();
    second.fit(&grid).unwrap();
    assert_eq!(first.predict(&grid).unwrap(), second.predict(&grid).unwrap());
}

#[test]
fn even_split_resolves_to_lowest_label() {
    let mut tally = VoteTally::new();
    tally.set("zebra", 2);
    tally.set("aardvark", 2);
    tally.set("mole", 1);
    assert_eq!(tally.winner(), Some("aardvark"));
}

/// Inducer that always fails, for checking that errors abort the fit.
struct Failing;

impl TreeInducer for Failing {
    type Model = ();

    fn train(&self, _view: &GridView<'_>) -> Result<(), ForestError> {
        Err(ForestError::EmptyDataset)
    }

    fn predict(&self, _model: &(), _instance: Instance<'_>) -> Result<String, ForestError> {
        Ok(String::new())
    }
}

#[test]
fn inducer_error_aborts_fit() {
    let grid = four_by_two();
    let mut forest = RandomForestConfig::new(3, 1).unwrap().build(Failing);
    assert!(matches!(forest.fit(&grid), Err(ForestError::EmptyDataset)));
    assert!(!forest.is_fitted());
}

/// Inducer that memorizes the class of the first row it is shown.
struct FirstRow;

impl TreeInducer for FirstRow {
    type Model = String;

    fn train(&self, view: &GridView<'_>) -> Result<String, ForestError> {
        let first = view.rows().first().and_then(|&row| view.class_value(row));
        Ok(first.unwrap_or_default().to_string())
    }

    fn predict(&self, model: &String, _instance: Instance<'_>) -> Result<String, ForestError> {
        Ok(model.clone())
    }
}

#[test]
fn any_inducer_can_serve_as_member() {
    let grid = four_by_two();
    let mut forest = RandomForestConfig::new(11, 2).unwrap().build(FirstRow);
    forest.fit(&grid).unwrap();
    let ratios = forest.predict_ratio(&grid).unwrap();
    let first = ratios.get(0).unwrap();
    assert_eq!(first.count("yes") + first.count("no"), 11);
    // Every row sees the same ensemble, so every tally is identical.
    for (_, tally) in ratios.iter() {
        assert_eq!(tally, first);
    }
}

#[test]
fn id3_inducer_with_min_gain_is_usable() {
    let grid = four_by_two();
    let mut forest = RandomForestConfig::new(5, 2)
        .unwrap()
        .build(Id3Inducer::new().with_min_gain(10.0));
    forest.fit(&grid).unwrap();
    for member in forest.members() {
        assert_eq!(member.model().n_nodes(), 1);
    }
}
