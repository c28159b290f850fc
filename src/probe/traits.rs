//! Prober trait definition

use crate::error::ProbeError;
use crate::model::{ProbeOutcome, ProbeResult};
use std::path::Path;

/// Measures one file - allows swapping between the real tools and recorded results
///
/// Implementations are shared across worker threads.
pub trait Prober: Sync {
    /// Obtain every measurement for `path`, or fail as a whole
    fn probe(&self, path: &Path) -> Result<ProbeResult, ProbeError>;

    /// Like `probe`, but folds a failure into a `ProbeOutcome::Failed`
    fn probe_outcome(&self, path: &Path) -> ProbeOutcome {
        match self.probe(path) {
            Ok(result) => ProbeOutcome::Measured(result),
            Err(e) => {
                log::warn!("Probe failed for {:?}: {}", path, e);
                ProbeOutcome::failed(path, e.to_string())
            }
        }
    }
}
