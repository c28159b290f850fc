use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw measurements for a single audio file
///
/// Built entirely by a prober before analysis starts and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Absolute path of the analyzed file
    pub file_path: PathBuf,

    /// Number of audio channels reported by the metadata probe
    pub channel_count: u32,

    /// Duration in seconds
    pub duration_seconds: f64,

    /// Per-frame peak levels in dB
    pub peak_levels: PeakLevels,

    /// Integrated loudness (LUFS), if the loudness meter reported one
    #[serde(default)]
    pub integrated_loudness: Option<f64>,

    /// Per-frame inter-channel correlation samples
    #[serde(default)]
    pub phase_samples: Vec<f64>,

    /// MD5 stored in the file's metadata
    #[serde(default)]
    pub stored_checksum: Option<String>,

    /// MD5 recomputed from the audio data
    pub recomputed_checksum: String,

    /// BEXT coding history text
    #[serde(default)]
    pub coding_history: Option<String>,

    /// Conformance policy result
    pub conformance: Conformance,
}

/// Per-frame peak levels, one sequence per channel plus the overall mix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakLevels {
    #[serde(default)]
    pub channel_one: Vec<f64>,
    #[serde(default)]
    pub channel_two: Vec<f64>,
    #[serde(default)]
    pub overall: Vec<f64>,
}

/// Outcome of the conformance policy scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conformance {
    pub verdict: ConformanceVerdict,

    /// Names of the rules that failed, in the order the scanner reported them
    #[serde(default)]
    pub failed_rules: Vec<String>,
}

impl Conformance {
    pub fn pass() -> Self {
        Self {
            verdict: ConformanceVerdict::Pass,
            failed_rules: Vec::new(),
        }
    }

    /// Failing result; duplicate rule names are dropped, first occurrence wins
    pub fn fail<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut failed_rules: Vec<String> = Vec::new();
        for rule in rules {
            let rule = rule.into();
            if !failed_rules.contains(&rule) {
                failed_rules.push(rule);
            }
        }
        Self {
            verdict: ConformanceVerdict::Fail,
            failed_rules,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConformanceVerdict {
    Pass,
    Fail,
}

impl ConformanceVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConformanceVerdict::Pass => "pass",
            ConformanceVerdict::Fail => "fail",
        }
    }
}

/// What a prober hands to the decision engine for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// All measurements were obtained
    Measured(ProbeResult),

    /// Measurements could not be obtained at all
    Failed { file_path: PathBuf, reason: String },
}

impl ProbeOutcome {
    pub fn failed(file_path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ProbeOutcome::Failed {
            file_path: file_path.into(),
            reason: reason.into(),
        }
    }

    pub fn file_path(&self) -> &Path {
        match self {
            ProbeOutcome::Measured(probe) => &probe.file_path,
            ProbeOutcome::Failed { file_path, .. } => file_path,
        }
    }
}

impl From<ProbeResult> for ProbeOutcome {
    fn from(probe: ProbeResult) -> Self {
        ProbeOutcome::Measured(probe)
    }
}
