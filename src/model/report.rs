use super::{ConformanceVerdict, Warning};
use serde::Serialize;
use std::path::PathBuf;

/// One output row per analyzed file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    pub file_path: PathBuf,

    pub status: Status,

    /// Warnings in canonical check order
    pub warnings: Vec<Warning>,

    /// Why the file could not be scanned (only set for `Status::ScanError`)
    pub scan_error: Option<String>,

    /// Measured and derived values (None for `Status::ScanError`)
    pub measurements: Option<ReportMeasurements>,
}

impl ReportRecord {
    /// Record for a file whose measurements could not be obtained
    pub fn scan_error(file_path: PathBuf, reason: String) -> Self {
        Self {
            file_path,
            status: Status::ScanError,
            warnings: Vec::new(),
            scan_error: Some(reason),
            measurements: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == Status::Pass
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMeasurements {
    pub channel_count: u32,
    pub duration_seconds: f64,
    pub overall_peak_max: Option<f64>,
    pub channel_one_peak_max: Option<f64>,
    pub channel_two_peak_max: Option<f64>,
    pub over_threshold_frame_count: usize,
    pub mean_phase_deviation: f64,
    pub integrated_loudness: Option<f64>,
    pub checksum_status: ChecksumStatus,
    pub conformance_status: ConformanceVerdict,
    pub conformance_failed_rules: Vec<String>,
    pub coding_history: Option<String>,
}

/// Final verdict for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pass,
    Fail,
    ScanError,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
            Status::ScanError => "SCAN_ERROR",
        }
    }
}

/// Result of comparing the stored and recomputed checksums
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ChecksumStatus {
    Pass,
    Missing,
    Failed { actual: String },
}

impl ChecksumStatus {
    /// Text for the report's MD5 column
    pub fn describe(&self) -> String {
        match self {
            ChecksumStatus::Pass => "Pass".to_string(),
            ChecksumStatus::Missing => "No MD5".to_string(),
            ChecksumStatus::Failed { actual } => format!("Failed: {}", actual),
        }
    }
}
