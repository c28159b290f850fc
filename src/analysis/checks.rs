//! Consistency checks
//!
//! Each check looks at the policy, the raw probe result and the derived
//! statistics and produces at most one warning. Checks are independent of
//! each other; `ALL_CHECKS` lists them in canonical order.

use crate::config::PolicyConfig;
use crate::model::{ConformanceVerdict, DerivedStatistics, ProbeResult, Warning};

/// Signature shared by every check
pub type Check = fn(&PolicyConfig, &ProbeResult, &DerivedStatistics) -> Option<Warning>;

/// Every check, in the order their warnings appear in a report
pub const ALL_CHECKS: [Check; 6] = [
    check_checksum,
    check_phase,
    check_volume,
    check_coding_history_present,
    check_coding_history_channels,
    check_conformance,
];

/// Stored vs recomputed MD5
pub fn check_checksum(
    _config: &PolicyConfig,
    probe: &ProbeResult,
    _stats: &DerivedStatistics,
) -> Option<Warning> {
    let stored = match probe.stored_checksum.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Some(Warning::NoStoredChecksum),
    };
    let actual = probe.recomputed_checksum.trim();

    if stored.eq_ignore_ascii_case(actual) {
        None
    } else {
        Some(Warning::ChecksumMismatch {
            expected: stored.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// Threshold the phase check uses for this file
///
/// Dual-mono material should be strongly correlated, so it gets its own
/// limit. Stereo and undetermined material share the stereo limit.
pub fn phase_threshold(config: &PolicyConfig, stats: &DerivedStatistics) -> f64 {
    if stats.markers.dual > 0 {
        config.dual_mono_phase_threshold
    } else {
        config.stereo_phase_threshold
    }
}

pub fn check_phase(
    config: &PolicyConfig,
    _probe: &ProbeResult,
    stats: &DerivedStatistics,
) -> Option<Warning> {
    let threshold = phase_threshold(config, stats);
    (stats.mean_phase_deviation < threshold).then(|| Warning::PhaseWarning {
        measured: stats.mean_phase_deviation,
        threshold,
    })
}

pub fn check_volume(
    config: &PolicyConfig,
    _probe: &ProbeResult,
    stats: &DerivedStatistics,
) -> Option<Warning> {
    let threshold = config.high_volume_threshold_db;
    let loudest = [
        stats.channel_one_peak_max,
        stats.overall_peak_max,
        stats.channel_two_peak_max,
    ]
    .into_iter()
    .flatten()
    .fold(None, |max: Option<f64>, v| Some(max.map_or(v, |m| m.max(v))))?;

    (loudest > threshold).then_some(Warning::HighVolumeWarning {
        measured: loudest,
        threshold,
    })
}

pub fn check_coding_history_present(
    _config: &PolicyConfig,
    probe: &ProbeResult,
    _stats: &DerivedStatistics,
) -> Option<Warning> {
    probe
        .coding_history
        .is_none()
        .then_some(Warning::NoCodingHistory)
}

/// Coding history channel keywords vs the file's real channel count
///
/// Only mono and stereo files are checked.
pub fn check_coding_history_channels(
    _config: &PolicyConfig,
    probe: &ProbeResult,
    stats: &DerivedStatistics,
) -> Option<Warning> {
    probe.coding_history.as_ref()?;

    let m = &stats.markers;
    let expected = m.signal_chain as i64;
    let actual = match probe.channel_count {
        1 => m.mono as i64 - m.dual as i64,
        2 => m.stereo as i64 + m.dual as i64,
        _ => return None,
    };

    (actual != expected).then_some(Warning::CodingHistoryMismatch {
        expected_count: expected,
        actual_count: actual,
    })
}

pub fn check_conformance(
    _config: &PolicyConfig,
    probe: &ProbeResult,
    _stats: &DerivedStatistics,
) -> Option<Warning> {
    match probe.conformance.verdict {
        ConformanceVerdict::Pass => None,
        ConformanceVerdict::Fail => Some(Warning::ConformanceFail {
            rule_names: probe.conformance.failed_rules.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::extract;
    use crate::model::{Conformance, PeakLevels};
    use std::path::PathBuf;

    fn config() -> PolicyConfig {
        PolicyConfig::new(PathBuf::from("policy.xml"))
            .with_high_volume(-2.0)
            .with_phase_thresholds(-0.25, 0.5)
    }

    fn probe() -> ProbeResult {
        ProbeResult {
            file_path: PathBuf::from("/tmp/test.wav"),
            channel_count: 2,
            duration_seconds: 30.0,
            peak_levels: PeakLevels {
                channel_one: vec![-9.0],
                channel_two: vec![-9.5],
                overall: vec![-9.0],
            },
            integrated_loudness: Some(-20.0),
            phase_samples: vec![0.8],
            stored_checksum: Some("d41d8cd98f00b204e9800998ecf8427e".to_string()),
            recomputed_checksum: "D41D8CD98F00B204E9800998ECF8427E".to_string(),
            coding_history: Some("A=ANALOGUE,M=stereo;A=PCM,M=stereo;".to_string()),
            conformance: Conformance::pass(),
        }
    }

    fn run(check: Check, config: &PolicyConfig, probe: &ProbeResult) -> Option<Warning> {
        let stats = extract(config, probe);
        check(config, probe, &stats)
    }

    #[test]
    fn test_checksum_match_ignores_case_and_whitespace() {
        let mut p = probe();
        p.stored_checksum = Some(" d41d8cd98f00b204e9800998ecf8427e\n".to_string());
        assert_eq!(run(check_checksum, &config(), &p), None);
    }

    #[test]
    fn test_checksum_missing() {
        let mut p = probe();
        p.stored_checksum = None;
        assert_eq!(run(check_checksum, &config(), &p), Some(Warning::NoStoredChecksum));

        p.stored_checksum = Some("   ".to_string());
        assert_eq!(run(check_checksum, &config(), &p), Some(Warning::NoStoredChecksum));
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut p = probe();
        p.recomputed_checksum = "00000000000000000000000000000000".to_string();
        assert_eq!(
            run(check_checksum, &config(), &p),
            Some(Warning::ChecksumMismatch {
                expected: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
                actual: "00000000000000000000000000000000".to_string(),
            })
        );
    }

    #[test]
    fn test_phase_uses_stereo_threshold_by_default() {
        let mut p = probe();
        p.phase_samples = vec![-0.3, -0.3];
        assert_eq!(
            run(check_phase, &config(), &p),
            Some(Warning::PhaseWarning {
                measured: -0.3,
                threshold: -0.25
            })
        );

        p.phase_samples = vec![0.1];
        assert_eq!(run(check_phase, &config(), &p), None);
    }

    #[test]
    fn test_phase_uses_dual_mono_threshold() {
        let mut p = probe();
        p.coding_history = Some("A=ANALOGUE,M=dual-mono;A=PCM,M=stereo;".to_string());
        p.phase_samples = vec![0.1];
        assert_eq!(
            run(check_phase, &config(), &p),
            Some(Warning::PhaseWarning {
                measured: 0.1,
                threshold: 0.5
            })
        );
    }

    #[test]
    fn test_phase_equal_to_threshold_passes() {
        let mut p = probe();
        p.phase_samples = vec![-0.25];
        assert_eq!(run(check_phase, &config(), &p), None);
    }

    #[test]
    fn test_volume_on_overall_only() {
        let mut p = probe();
        p.peak_levels = PeakLevels {
            channel_one: vec![-3.0],
            channel_two: vec![],
            overall: vec![-1.5],
        };
        assert_eq!(
            run(check_volume, &config(), &p),
            Some(Warning::HighVolumeWarning {
                measured: -1.5,
                threshold: -2.0
            })
        );
    }

    #[test]
    fn test_volume_on_channel_two() {
        let mut p = probe();
        p.peak_levels.channel_two = vec![-0.5];
        assert!(matches!(
            run(check_volume, &config(), &p),
            Some(Warning::HighVolumeWarning { measured, .. }) if measured == -0.5
        ));
    }

    #[test]
    fn test_volume_without_any_peaks() {
        let mut p = probe();
        p.peak_levels = PeakLevels::default();
        assert_eq!(run(check_volume, &config(), &p), None);
    }

    #[test]
    fn test_missing_coding_history() {
        let mut p = probe();
        p.coding_history = None;
        assert_eq!(
            run(check_coding_history_present, &config(), &p),
            Some(Warning::NoCodingHistory)
        );
        assert_eq!(run(check_coding_history_channels, &config(), &p), None);
    }

    #[test]
    fn test_stereo_history_balanced() {
        assert_eq!(run(check_coding_history_channels, &config(), &probe()), None);
    }

    #[test]
    fn test_stereo_file_with_mono_history() {
        let mut p = probe();
        p.coding_history = Some("A=ANALOGUE,M=mono;A=PCM,M=mono;".to_string());
        assert_eq!(
            run(check_coding_history_channels, &config(), &p),
            Some(Warning::CodingHistoryMismatch {
                expected_count: 2,
                actual_count: 0
            })
        );
    }

    #[test]
    fn test_mono_history_with_dual_entries() {
        let mut p = probe();
        p.channel_count = 1;
        // mono(3) - dual(1) == signal chain(2)
        p.coding_history = Some("A=ANALOGUE,M=dual-mono;A=PCM,M=mono,T=mono;".to_string());
        assert_eq!(run(check_coding_history_channels, &config(), &p), None);
    }

    #[test]
    fn test_multichannel_history_not_checked() {
        let mut p = probe();
        p.channel_count = 6;
        p.coding_history = Some("A=PCM,M=mono;".to_string());
        assert_eq!(run(check_coding_history_channels, &config(), &p), None);
    }

    #[test]
    fn test_conformance_fail_passes_rules_through() {
        let mut p = probe();
        p.conformance = Conformance::fail(["Valid bit depth?", "BEXT Exist?"]);
        assert_eq!(
            run(check_conformance, &config(), &p),
            Some(Warning::ConformanceFail {
                rule_names: vec!["Valid bit depth?".to_string(), "BEXT Exist?".to_string()]
            })
        );
    }

    #[test]
    fn test_clean_file_triggers_nothing() {
        let p = probe();
        let cfg = config();
        let stats = extract(&cfg, &p);
        assert!(ALL_CHECKS.iter().all(|check| check(&cfg, &p, &stats).is_none()));
    }
}
