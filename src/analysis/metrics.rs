//! Metric extraction
//!
//! Reduces the per-frame arrays of a `ProbeResult` into `DerivedStatistics`.
//! Nothing in here fails: missing data yields `None` maxima, a zero mean,
//! or zero counts.

use crate::config::PolicyConfig;
use crate::model::{CodingHistoryMarkers, DerivedStatistics, ProbeResult};

/// Compute the summary statistics for one probe result
pub fn extract(config: &PolicyConfig, probe: &ProbeResult) -> DerivedStatistics {
    let peaks = &probe.peak_levels;

    DerivedStatistics {
        channel_one_peak_max: peak_max(&peaks.channel_one),
        channel_two_peak_max: peak_max(&peaks.channel_two),
        overall_peak_max: peak_max(&peaks.overall),
        over_threshold_frame_count: count_above(&peaks.overall, config.high_volume_threshold_db),
        mean_phase_deviation: mean(&probe.phase_samples),
        markers: probe
            .coding_history
            .as_deref()
            .map(count_markers)
            .unwrap_or_default(),
    }
}

/// Maximum of a sequence, ignoring NaN. `None` if nothing is left.
fn peak_max(levels: &[f64]) -> Option<f64> {
    levels
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |max, v| match max {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
}

fn count_above(levels: &[f64], threshold: f64) -> usize {
    levels.iter().filter(|&&v| v > threshold).count()
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Count channel-layout keywords and signal-chain entries in a coding history
pub fn count_markers(history: &str) -> CodingHistoryMarkers {
    let lower = history.to_ascii_lowercase();

    CodingHistoryMarkers {
        mono: lower.matches("mono").count(),
        stereo: lower.matches("stereo").count(),
        // lowercase "dual-sided" describes the tape, not the channel layout
        dual: history
            .replace("dual-sided", "")
            .to_ascii_lowercase()
            .matches("dual")
            .count(),
        signal_chain: history.matches("A=").count(),
    }
}
