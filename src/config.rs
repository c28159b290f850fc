//! QC policy configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default high-volume threshold in dBFS
pub const DEFAULT_HIGH_VOLUME_DB: f64 = -2.0;

/// Default minimum mean correlation for stereo material
pub const DEFAULT_STEREO_PHASE: f64 = -0.25;

/// Default minimum mean correlation for dual-mono material
pub const DEFAULT_DUAL_MONO_PHASE: f64 = 0.5;

/// Thresholds used by every check
///
/// Passed by reference into each evaluation; never mutated during a run.
/// The values are not validated here, see `batch::config` for that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Peak level (dB) above which a frame counts as too loud
    pub high_volume_threshold_db: f64,

    /// Mean phase below this fails stereo (or undetermined) material
    pub stereo_phase_threshold: f64,

    /// Mean phase below this fails material documented as dual mono
    pub dual_mono_phase_threshold: f64,

    /// Conformance policy handed to the conformance scanner
    pub conformance_policy_path: PathBuf,
}

impl PolicyConfig {
    /// Create a policy with default thresholds
    pub fn new(conformance_policy_path: PathBuf) -> Self {
        Self {
            high_volume_threshold_db: DEFAULT_HIGH_VOLUME_DB,
            stereo_phase_threshold: DEFAULT_STEREO_PHASE,
            dual_mono_phase_threshold: DEFAULT_DUAL_MONO_PHASE,
            conformance_policy_path,
        }
    }

    pub fn with_high_volume(mut self, db: f64) -> Self {
        self.high_volume_threshold_db = db;
        self
    }

    pub fn with_phase_thresholds(mut self, stereo: f64, dual_mono: f64) -> Self {
        self.stereo_phase_threshold = stereo;
        self.dual_mono_phase_threshold = dual_mono;
        self
    }
}
