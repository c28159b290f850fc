//! Decision engine
//!
//! Turns one file's probe outcome into a report record. Pure and
//! deterministic: no I/O, no shared state, safe to call from many threads.

use super::checks::ALL_CHECKS;
use super::metrics::extract;
use crate::config::PolicyConfig;
use crate::model::{
    ChecksumStatus, DerivedStatistics, ProbeOutcome, ProbeResult, ReportMeasurements,
    ReportRecord, Status, Warning,
};
use rayon::prelude::*;

/// Evaluate a fully measured file
pub fn evaluate(config: &PolicyConfig, probe: &ProbeResult) -> ReportRecord {
    let stats = extract(config, probe);

    let mut warnings: Vec<Warning> = ALL_CHECKS
        .iter()
        .filter_map(|check| check(config, probe, &stats))
        .collect();
    // Canonical order does not depend on the order the checks ran in
    warnings.sort_by_key(Warning::rank);

    let status = if warnings.is_empty() {
        Status::Pass
    } else {
        Status::Fail
    };

    log::debug!(
        "{}: {} ({} warning(s))",
        probe.file_path.display(),
        status.as_str(),
        warnings.len()
    );

    ReportRecord {
        file_path: probe.file_path.clone(),
        status,
        measurements: Some(measurements(probe, &stats, &warnings)),
        warnings,
        scan_error: None,
    }
}

/// Evaluate a probe outcome; failed probes become `SCAN_ERROR` records
pub fn evaluate_outcome(config: &PolicyConfig, outcome: &ProbeOutcome) -> ReportRecord {
    match outcome {
        ProbeOutcome::Measured(probe) => evaluate(config, probe),
        ProbeOutcome::Failed { file_path, reason } => {
            log::debug!("{}: SCAN_ERROR ({})", file_path.display(), reason);
            ReportRecord::scan_error(file_path.clone(), reason.clone())
        }
    }
}

/// Evaluate many outcomes in parallel, keeping input order
pub fn evaluate_batch(config: &PolicyConfig, outcomes: &[ProbeOutcome]) -> Vec<ReportRecord> {
    outcomes
        .par_iter()
        .map(|outcome| evaluate_outcome(config, outcome))
        .collect()
}

fn measurements(
    probe: &ProbeResult,
    stats: &DerivedStatistics,
    warnings: &[Warning],
) -> ReportMeasurements {
    let checksum_status = warnings
        .iter()
        .find_map(|w| match w {
            Warning::NoStoredChecksum => Some(ChecksumStatus::Missing),
            Warning::ChecksumMismatch { actual, .. } => Some(ChecksumStatus::Failed {
                actual: actual.clone(),
            }),
            _ => None,
        })
        .unwrap_or(ChecksumStatus::Pass);

    ReportMeasurements {
        channel_count: probe.channel_count,
        duration_seconds: probe.duration_seconds,
        overall_peak_max: stats.overall_peak_max,
        channel_one_peak_max: stats.channel_one_peak_max,
        channel_two_peak_max: stats.channel_two_peak_max,
        over_threshold_frame_count: stats.over_threshold_frame_count,
        mean_phase_deviation: stats.mean_phase_deviation,
        integrated_loudness: probe.integrated_loudness,
        checksum_status,
        conformance_status: probe.conformance.verdict,
        conformance_failed_rules: probe.conformance.failed_rules.clone(),
        coding_history: probe.coding_history.clone(),
    }
}
