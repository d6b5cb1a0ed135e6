//! Random forest classification over categorical data grids.
//!
//! Provides a bagged ensemble of decision trees: bootstrap row sampling,
//! per-tree random feature subsets, parallel training via rayon, plurality
//! and vote-ratio prediction, out-of-bag evaluation, and model serialization.
//! Members are trained through the [`TreeInducer`] trait; [`Id3Inducer`]
//! grows multiway ID3 trees.

mod config;
mod error;
mod forest;
mod grid;
mod inducer;
mod node;
mod oob;
mod predict;
mod result;
mod sampler;
mod serialize;
mod split;
mod tree;
mod vote;

pub use config::{OobMode, RandomForestConfig};
pub use error::ForestError;
pub use forest::{Ensemble, Member, RandomForest};
pub use grid::{AttributeIndex, DataGrid, GridView, Instance, Schema};
pub use inducer::TreeInducer;
pub use node::{Branch, Impurity, Node, NodeIndex};
pub use oob::OobScore;
pub use result::TrainingSummary;
pub use sampler::{out_of_bag, sample_features, sample_rows};
pub use split::SplitCriterion;
pub use tree::{Id3Inducer, Id3Tree};
pub use vote::{VoteRatioMap, VoteTally};
