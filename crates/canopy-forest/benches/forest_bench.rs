//! Criterion benchmarks for canopy-forest: random forest training and prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use canopy_forest::{DataGrid, RandomForestConfig};

fn make_classification(n_rows: usize, n_attributes: usize, n_classes: usize, seed: u64) -> DataGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n_rows);
    for i in 0..n_rows {
        let class = i % n_classes;
        let mut row: Vec<String> = (0..n_attributes)
            .map(|a| {
                let code = if a < 3 && rng.r#gen::<f64>() > 0.1 {
                    class
                } else {
                    rng.gen_range(0..n_classes)
                };
                format!("v{code}")
            })
            .collect();
        row.push(format!("c{class}"));
        rows.push(row);
    }
    let mut names: Vec<String> = (0..n_attributes).map(|a| format!("a{a}")).collect();
    names.push("class".to_string());
    DataGrid::new(names, n_attributes, rows).unwrap()
}

fn bench_forest_fit(c: &mut Criterion) {
    let grid = make_classification(500, 20, 5, 42);
    let config = RandomForestConfig::new(50, 4).unwrap().with_seed(42);

    c.bench_function("forest_fit_500x20_5class_50trees", |b| {
        b.iter(|| {
            let mut forest = config.clone().build_id3();
            forest.fit(&grid).unwrap();
            forest
        });
    });
}

fn bench_forest_predict(c: &mut Criterion) {
    let grid = make_classification(500, 20, 5, 42);
    let mut forest = RandomForestConfig::new(50, 4).unwrap().with_seed(42).build_id3();
    forest.fit(&grid).unwrap();

    c.bench_function("forest_predict_500x20_50trees", |b| {
        b.iter(|| forest.predict(&grid).unwrap());
    });
}

fn bench_predict_ratio(c: &mut Criterion) {
    let grid = make_classification(500, 20, 5, 42);
    let mut forest = RandomForestConfig::new(50, 4).unwrap().with_seed(42).build_id3();
    forest.fit(&grid).unwrap();

    c.bench_function("forest_predict_ratio_500x20_50trees", |b| {
        b.iter(|| forest.predict_ratio(&grid).unwrap());
    });
}

fn bench_single_tree(c: &mut Criterion) {
    // Proxy for split-finding: train a single-tree forest on all attributes.
    let grid = make_classification(500, 20, 5, 42);
    let config = RandomForestConfig::new(1, 20).unwrap().with_seed(42);

    c.bench_function("forest_single_tree_500x20_5class", |b| {
        b.iter(|| {
            let mut forest = config.clone().build_id3();
            forest.fit(&grid).unwrap();
            forest
        });
    });
}

criterion_group!(
    benches,
    bench_forest_fit,
    bench_forest_predict,
    bench_predict_ratio,
    bench_single_tree
);
criterion_main!(benches);
