//! CSV loading and result writing for the canopy pipeline.

mod domain;
mod error;
mod grid_reader;
mod writer;

pub use domain::{ClassColumn, ExperimentName};
pub use error::IoError;
pub use grid_reader::GridReader;
pub use writer::ResultWriter;
