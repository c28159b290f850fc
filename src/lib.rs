//! audioqc - automated QC for preservation audio files
//!
//! This library checks broadcast WAV files against a configurable QC policy:
//! peak levels, phase, checksum, BEXT coding history and conformance, and
//! produces one pass/fail report record per file.

pub mod analysis;
pub mod batch;
pub mod config;
pub mod error;
pub mod model;
pub mod probe;

pub use analysis::{evaluate, evaluate_batch, evaluate_outcome};
pub use batch::QcPipeline;
pub use config::PolicyConfig;
