//! QC analysis core
//!
//! Metric extraction, the consistency checks, and the decision engine that
//! ties them together. Everything here is pure; probing and reporting live
//! in `probe` and `batch`.

pub mod checks;
mod engine;
mod metrics;

pub use engine::{evaluate, evaluate_batch, evaluate_outcome};
pub use metrics::{count_markers, extract};
