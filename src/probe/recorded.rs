//! Prober that replays previously captured results
//!
//! Used to re-evaluate a batch under a different policy without running the
//! external tools again, and by tests.

use super::traits::Prober;
use crate::error::ProbeError;
use crate::model::{ProbeOutcome, ProbeResult};
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub struct RecordedProber {
    outcomes: HashMap<PathBuf, ProbeOutcome>,
}

impl RecordedProber {
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
        }
    }

    pub fn from_outcomes(outcomes: impl IntoIterator<Item = ProbeOutcome>) -> Self {
        let mut prober = Self::new();
        for outcome in outcomes {
            prober.record(outcome);
        }
        prober
    }

    /// Add an outcome; a later outcome for the same path replaces the earlier one
    pub fn record(&mut self, outcome: impl Into<ProbeOutcome>) {
        let outcome = outcome.into();
        let path = outcome.file_path().to_path_buf();
        if let Some(previous) = self.outcomes.insert(path, outcome) {
            log::warn!("Replacing recorded outcome for {:?}", previous.file_path());
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl Default for RecordedProber {
    fn default() -> Self {
        Self::new()
    }
}

impl Prober for RecordedProber {
    fn probe(&self, path: &Path) -> Result<ProbeResult, ProbeError> {
        match self.outcomes.get(path) {
            Some(ProbeOutcome::Measured(result)) => Ok(result.clone()),
            Some(ProbeOutcome::Failed { reason, .. }) => Err(ProbeError::Recorded(reason.clone())),
            None => Err(ProbeError::NotRecorded(path.to_path_buf())),
        }
    }

    fn probe_outcome(&self, path: &Path) -> ProbeOutcome {
        // Recorded failures keep their original reason
        match self.outcomes.get(path) {
            Some(outcome) => outcome.clone(),
            None => {
                let reason = ProbeError::NotRecorded(path.to_path_buf()).to_string();
                ProbeOutcome::failed(path, reason)
            }
        }
    }
}

/// Load probe outcomes saved with `save_outcomes`, in file order
///
/// Duplicate paths are kept as separate outcomes.
pub fn load_outcomes(path: &Path) -> Result<Vec<ProbeOutcome>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read probe results: {:?}", path))?;
    let outcomes: Vec<ProbeOutcome> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse probe results: {:?}", path))?;

    let unique: HashSet<&Path> = outcomes.iter().map(ProbeOutcome::file_path).collect();
    if unique.len() < outcomes.len() {
        log::warn!(
            "{} saved outcome(s) repeat an earlier path in {:?}",
            outcomes.len() - unique.len(),
            path
        );
    }
    Ok(outcomes)
}

/// Save probe outcomes as JSON so a batch can be re-evaluated later
pub fn save_outcomes(path: &Path, outcomes: &[ProbeOutcome]) -> Result<()> {
    let json =
        serde_json::to_string_pretty(outcomes).context("Failed to serialize probe results")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write probe results: {:?}", path))?;
    log::info!("Probe results saved to: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Conformance, PeakLevels};

    fn result(path: &str) -> ProbeResult {
        ProbeResult {
            file_path: PathBuf::from(path),
            channel_count: 1,
            duration_seconds: 1.0,
            peak_levels: PeakLevels::default(),
            integrated_loudness: None,
            phase_samples: vec![],
            stored_checksum: None,
            recomputed_checksum: "00".to_string(),
            coding_history: None,
            conformance: Conformance::pass(),
        }
    }

    #[test]
    fn test_replays_recorded_results() {
        let prober = RecordedProber::from_outcomes(vec![
            result("/a/one.wav").into(),
            ProbeOutcome::failed("/a/two.wav", "ffprobe crashed"),
        ]);

        assert_eq!(prober.len(), 2);
        assert!(prober.probe(Path::new("/a/one.wav")).is_ok());
        assert_eq!(
            prober.probe_outcome(Path::new("/a/two.wav")),
            ProbeOutcome::failed("/a/two.wav", "ffprobe crashed")
        );
        assert!(matches!(
            prober.probe(Path::new("/a/three.wav")),
            Err(ProbeError::NotRecorded(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("probes.json");
        let outcomes = vec![
            ProbeOutcome::from(result("/a/one.wav")),
            ProbeOutcome::failed("/a/two.wav", "mediainfo timed out"),
        ];

        save_outcomes(&file, &outcomes).unwrap();
        assert_eq!(load_outcomes(&file).unwrap(), outcomes);
    }

    #[test]
    fn test_load_keeps_repeated_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("probes.json");
        let stereo = ProbeResult {
            channel_count: 2,
            ..result("/a.wav")
        };
        let outcomes = vec![
            ProbeOutcome::from(result("/a.wav")),
            ProbeOutcome::from(stereo),
        ];

        save_outcomes(&file, &outcomes).unwrap();
        let loaded = load_outcomes(&file).unwrap();

        assert_eq!(loaded, outcomes);
        assert_eq!(RecordedProber::from_outcomes(loaded).len(), 1);
    }
}
