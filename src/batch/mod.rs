//! Batch orchestration: configuration, discovery, probing and reporting

pub mod config;
pub mod discovery;
pub mod pipeline;
pub mod report;

pub use config::{ConfigOverrides, RunConfig};
pub use discovery::discover_targets;
pub use pipeline::QcPipeline;
pub use report::{write_report, ReportFormat};
