//! Probe execution layer
//!
//! Obtains the raw measurements for a file through a trait-based
//! abstraction: `ExternalProber` runs the real tools, `RecordedProber`
//! replays results captured earlier.

mod checksum;
mod external;
pub mod parse;
mod recorded;
mod traits;

pub use checksum::{audio_data_md5, audio_data_md5_from};
pub use external::{ExternalProber, ToolPaths};
pub use recorded::{load_outcomes, save_outcomes, RecordedProber};
pub use traits::Prober;

/// Conformance policy used when none is configured
///
/// Derived from the MediaConch public WAV policy (CC-BY-4.0+).
pub const DEFAULT_POLICY_XML: &str = include_str!("default_policy.xml");
