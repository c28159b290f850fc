use serde::Serialize;
use std::fmt;

/// A single QC finding
///
/// Variants are declared in check order; `rank` follows the same order and
/// is what the decision engine sorts on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    NoStoredChecksum,
    ChecksumMismatch {
        expected: String,
        actual: String,
    },
    PhaseWarning {
        measured: f64,
        threshold: f64,
    },
    HighVolumeWarning {
        measured: f64,
        threshold: f64,
    },
    NoCodingHistory,
    CodingHistoryMismatch {
        expected_count: i64,
        actual_count: i64,
    },
    ConformanceFail {
        rule_names: Vec<String>,
    },
}

impl Warning {
    /// Position of the producing check in the canonical check order
    pub fn rank(&self) -> u8 {
        match self {
            Warning::NoStoredChecksum | Warning::ChecksumMismatch { .. } => 1,
            Warning::PhaseWarning { .. } => 2,
            Warning::HighVolumeWarning { .. } => 3,
            Warning::NoCodingHistory => 4,
            Warning::CodingHistoryMismatch { .. } => 5,
            Warning::ConformanceFail { .. } => 6,
        }
    }

    /// Short label used in tabular reports
    pub fn label(&self) -> &'static str {
        match self {
            Warning::NoStoredChecksum => "No Stored MD5",
            Warning::ChecksumMismatch { .. } => "Failed MD5 Verification",
            Warning::PhaseWarning { .. } => "Phase Warning",
            Warning::HighVolumeWarning { .. } => "High Volume",
            Warning::NoCodingHistory => "No BEXT Coding History",
            Warning::CodingHistoryMismatch { .. } => {
                "BEXT Coding History channels don't match file"
            }
            Warning::ConformanceFail { .. } => "Mediaconch Fail",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ChecksumMismatch { expected, actual } => {
                write!(f, "{} (stored {}, computed {})", self.label(), expected, actual)
            }
            Warning::PhaseWarning {
                measured,
                threshold,
            } => write!(f, "{} ({:.2} < {:.2})", self.label(), measured, threshold),
            Warning::HighVolumeWarning {
                measured,
                threshold,
            } => write!(f, "{} ({:.2} dB > {:.2} dB)", self.label(), measured, threshold),
            Warning::CodingHistoryMismatch {
                expected_count,
                actual_count,
            } => write!(
                f,
                "{} (expected {}, found {})",
                self.label(),
                expected_count,
                actual_count
            ),
            Warning::ConformanceFail { rule_names } if !rule_names.is_empty() => {
                write!(f, "{} ({})", self.label(), rule_names.join(", "))
            }
            _ => f.write_str(self.label()),
        }
    }
}
