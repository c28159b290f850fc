//! Batch QC pipeline orchestration

use crate::analysis::evaluate_batch;
use crate::config::PolicyConfig;
use crate::model::{ProbeOutcome, ReportRecord};
use crate::probe::Prober;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Probes every target and evaluates it against the policy
pub struct QcPipeline<P: Prober> {
    policy: PolicyConfig,
    prober: P,
    /// Worker threads for probing (None = one per CPU core)
    jobs: Option<usize>,
}

impl<P: Prober> QcPipeline<P> {
    pub fn new(policy: PolicyConfig, prober: P) -> Self {
        Self {
            policy,
            prober,
            jobs: None,
        }
    }

    /// Limit the number of files probed at the same time
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs.max(1));
        self
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Probe and evaluate every target; one record per target, in target order
    pub fn run(&self, targets: &[PathBuf]) -> Result<Vec<ReportRecord>> {
        let outcomes = self.probe_all(targets)?;
        Ok(self.evaluate(&outcomes))
    }

    /// Probe every target on a bounded worker pool
    ///
    /// Output order is the target order, not completion order.
    pub fn probe_all(&self, targets: &[PathBuf]) -> Result<Vec<ProbeOutcome>> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(jobs) = self.jobs {
            builder = builder.num_threads(jobs);
        }
        let pool = builder
            .build()
            .context("Failed to create probe worker pool")?;

        log::info!(
            "Probing {} file(s) with {} worker(s)",
            targets.len(),
            pool.current_num_threads()
        );

        let done = AtomicUsize::new(0);
        let total = targets.len();
        let outcomes: Vec<ProbeOutcome> = pool.install(|| {
            targets
                .par_iter()
                .map(|target| {
                    let outcome = self.prober.probe_outcome(target);
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    log::info!("[{}/{}] Probed: {:?}", n, total, target);
                    outcome
                })
                .collect()
        });

        Ok(outcomes)
    }

    /// Run the decision engine over already probed files
    pub fn evaluate(&self, outcomes: &[ProbeOutcome]) -> Vec<ReportRecord> {
        let records = evaluate_batch(&self.policy, outcomes);

        let failed = records.iter().filter(|r| !r.passed()).count();
        log::info!(
            "QC complete: {} file(s), {} passed, {} flagged",
            records.len(),
            records.len() - failed,
            failed
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::model::{Conformance, PeakLevels, ProbeResult, Status};
    use std::path::Path;

    /// Fails every file whose name contains "broken"
    struct FakeProber;

    impl Prober for FakeProber {
        fn probe(&self, path: &Path) -> Result<ProbeResult, ProbeError> {
            if path.to_string_lossy().contains("broken") {
                return Err(ProbeError::parse("ffprobe", "unexpected end of input"));
            }
            Ok(ProbeResult {
                file_path: path.to_path_buf(),
                channel_count: 1,
                duration_seconds: 10.0,
                peak_levels: PeakLevels {
                    channel_one: vec![-12.0],
                    channel_two: vec![],
                    overall: vec![-12.0],
                },
                integrated_loudness: Some(-24.0),
                phase_samples: vec![1.0],
                stored_checksum: Some("AA".to_string()),
                recomputed_checksum: "AA".to_string(),
                coding_history: Some("A=ANALOGUE,M=mono;A=PCM,M=mono;".to_string()),
                conformance: Conformance::pass(),
            })
        }
    }

    #[test]
    fn test_run_keeps_target_order_and_reports_failures() {
        let targets: Vec<PathBuf> = (0..20)
            .map(|i| {
                let name = if i % 5 == 0 { "broken" } else { "ok" };
                PathBuf::from(format!("/batch/{:02}_{}.wav", i, name))
            })
            .collect();

        let pipeline = QcPipeline::new(PolicyConfig::new(PathBuf::from("p.xml")), FakeProber)
            .with_jobs(4);
        let records = pipeline.run(&targets).unwrap();

        assert_eq!(records.len(), targets.len());
        for (record, target) in records.iter().zip(&targets) {
            assert_eq!(&record.file_path, target);
            let expected = if target.to_string_lossy().contains("broken") {
                Status::ScanError
            } else {
                Status::Pass
            };
            assert_eq!(record.status, expected);
        }
    }

    #[test]
    fn test_empty_target_list() {
        let pipeline = QcPipeline::new(PolicyConfig::new(PathBuf::from("p.xml")), FakeProber);
        assert!(pipeline.run(&[]).unwrap().is_empty());
    }
}
