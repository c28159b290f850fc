//! Data model for the QC engine
//!
//! These types are independent of both the external probing tools
//! and the report output format.

mod probe;
mod report;
mod stats;
mod warning;

pub use probe::{Conformance, ConformanceVerdict, PeakLevels, ProbeOutcome, ProbeResult};
pub use report::{ChecksumStatus, ReportMeasurements, ReportRecord, Status};
pub use stats::{CodingHistoryMarkers, DerivedStatistics};
pub use warning::Warning;
