use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use canopy_forest::{Id3Inducer, OobMode, RandomForest, RandomForestConfig, SplitCriterion};
use canopy_io::{ClassColumn, ExperimentName, GridReader, ResultWriter};

#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "Random forest classification of categorical CSV data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Input CSV location and class column selection.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Path to the input CSV file (header row required)
    #[arg(long)]
    data: PathBuf,

    /// Name of the class column (defaults to the last column)
    #[arg(long)]
    class_column: Option<String>,
}

/// Experiment naming and output location.
#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
    #[arg(long)]
    experiment: String,

    /// Output directory for result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Train a random forest and save the model
    Fit {
        #[command(flatten)]
        input: DataArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 10)]
        forest_size: usize,

        /// Number of non-class attributes sampled per tree
        #[arg(long)]
        features: usize,

        /// Minimum impurity decrease for a tree to split (0 = never prune)
        #[arg(long, default_value_t = 0.0)]
        min_gain: f64,

        /// Split criterion: "entropy" (information gain) or "gini"
        #[arg(long, default_value = "entropy")]
        criterion: String,

        /// Compute out-of-bag accuracy
        #[arg(long, default_value_t = false)]
        oob: bool,
    },

    /// Label rows of a CSV file with a trained model
    Predict {
        /// Path to the trained model binary
        #[arg(long)]
        model: PathBuf,

        #[command(flatten)]
        input: DataArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Also write per-row vote counts
        #[arg(long, default_value_t = false)]
        votes: bool,
    },

    /// Print the configuration and ensemble of a trained model
    Describe {
        /// Path to the trained model binary
        #[arg(long)]
        model: PathBuf,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct FitOutput {
    experiment: String,
    n_rows: usize,
    n_non_class_attributes: usize,
    forest_size: usize,
    features: usize,
    class_labels: Vec<String>,
    oob_accuracy: Option<f64>,
    model_path: PathBuf,
}

#[derive(Serialize)]
struct PredictOutput {
    experiment: String,
    n_rows: usize,
    model_n_trees: usize,
    predictions_path: PathBuf,
    votes_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct DescribeOutput {
    forest_size: usize,
    features: usize,
    seed: u64,
    min_gain: f64,
    criterion: SplitCriterion,
    class_labels: Vec<String>,
    oob_accuracy: Option<f64>,
    members: Vec<MemberOutput>,
    description: String,
}

#[derive(Serialize)]
struct MemberOutput {
    features: Vec<String>,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
}

fn parse_criterion(s: &str) -> Result<SplitCriterion> {
    match s {
        "entropy" => Ok(SplitCriterion::Entropy),
        "gini" => Ok(SplitCriterion::Gini),
        other => anyhow::bail!("unknown split criterion: {other} (expected entropy or gini)"),
    }
}

fn read_grid(input: &DataArgs) -> Result<canopy_forest::DataGrid> {
    GridReader::new(&input.data)
        .with_class_column(ClassColumn::from_option(input.class_column.clone()))
        .read()
        .with_context(|| format!("failed to read {}", input.data.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Fit {
            input,
            output,
            forest_size,
            features,
            min_gain,
            criterion,
            oob,
        } => {
            let experiment_name = ExperimentName::new(output.experiment.clone())?;

            // 1. Read training grid
            let grid = read_grid(&input)?;

            // 2. Fit
            let inducer = Id3Inducer::new()
                .with_min_gain(min_gain)
                .with_criterion(parse_criterion(&criterion)?);
            let oob_mode = if oob { OobMode::Enabled } else { OobMode::Disabled };
            let mut forest = RandomForestConfig::new(forest_size, features)?
                .with_seed(cli.seed)
                .with_oob_mode(oob_mode)
                .build(inducer);
            forest.fit(&grid).context("random forest training failed")?;

            // 3. Save model and fit summary
            let writer = ResultWriter::new(&output.output_dir, experiment_name)?;
            forest
                .save(writer.model_path())
                .context("failed to save model")?;
            let summary = forest
                .summary()
                .context("fitted forest has no training summary")?;
            writer.write_fit(summary, cli.seed)?;

            // 4. Print summary
            let output = FitOutput {
                experiment: output.experiment,
                n_rows: summary.n_rows,
                n_non_class_attributes: summary.n_non_class_attributes,
                forest_size: summary.forest_size,
                features: summary.features,
                class_labels: summary.class_labels.clone(),
                oob_accuracy: summary.oob.as_ref().map(|s| s.accuracy),
                model_path: writer.model_path(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            model,
            input,
            output,
            votes,
        } => {
            let experiment_name = ExperimentName::new(output.experiment.clone())?;

            // 1. Load model
            let forest = RandomForest::<Id3Inducer>::load(&model)
                .context("failed to load model")?;
            info!(n_trees = forest.n_trees(), "model loaded");

            // 2. Read grid to label
            let grid = read_grid(&input)?;

            // 3. Predict and write
            let writer = ResultWriter::new(&output.output_dir, experiment_name)?;
            let labeled = forest.predict(&grid).context("prediction failed")?;
            let predictions_path = writer.write_predictions(&labeled)?;

            let votes_path = if votes {
                let ratios = forest
                    .predict_ratio(&grid)
                    .context("vote ratio computation failed")?;
                Some(writer.write_votes(&ratios)?)
            } else {
                None
            };

            // 4. Print summary
            let output = PredictOutput {
                experiment: output.experiment,
                n_rows: labeled.n_rows(),
                model_n_trees: forest.n_trees(),
                predictions_path,
                votes_path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Describe { model } => {
            let forest = RandomForest::<Id3Inducer>::load(&model)
                .context("failed to load model")?;
            let ensemble = forest
                .ensemble()
                .context("loaded model has no ensemble")?;
            info!(n_trees = forest.n_trees(), "model loaded");

            let names = ensemble.schema().attribute_names();
            let members = ensemble
                .members()
                .iter()
                .map(|m| MemberOutput {
                    features: m
                        .features()
                        .iter()
                        .filter_map(|a| names.get(a.index()).cloned())
                        .collect(),
                    n_nodes: m.model().n_nodes(),
                    n_leaves: m.model().n_leaves(),
                    depth: m.model().depth(),
                })
                .collect();

            let summary = ensemble.summary();
            let output = DescribeOutput {
                forest_size: forest.config().forest_size(),
                features: forest.config().features(),
                seed: forest.config().seed(),
                min_gain: forest.inducer().min_gain(),
                criterion: forest.inducer().criterion(),
                class_labels: summary.class_labels.clone(),
                oob_accuracy: summary.oob.as_ref().map(|s| s.accuracy),
                members,
                description: forest.to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
