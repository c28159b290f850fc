//! Run configuration
//!
//! Merges the optional TOML config file with command-line overrides,
//! validates the thresholds once, and resolves every path the run needs.

use crate::config::{
    PolicyConfig, DEFAULT_DUAL_MONO_PHASE, DEFAULT_HIGH_VOLUME_DB, DEFAULT_STEREO_PHASE,
};
use crate::error::ConfigError;
use crate::probe::{ToolPaths, DEFAULT_POLICY_XML};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default directory for report files
pub const DEFAULT_OUTPUT_DIR: &str = "~/Desktop";

/// Contents of the TOML config file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QcConfigFile {
    pub high_volume_threshold_db: Option<f64>,
    pub stereo_phase_threshold: Option<f64>,
    pub dual_mono_phase_threshold: Option<f64>,
    pub conformance_policy: Option<String>,
    pub output_dir: Option<String>,
    pub tools: ToolsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsSection {
    pub ffmpeg: Option<String>,
    pub ffprobe: Option<String>,
    pub mediainfo: Option<String>,
    pub mediaconch: Option<String>,
}

impl QcConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line; these win over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub high_volume_threshold_db: Option<f64>,
    pub stereo_phase_threshold: Option<f64>,
    pub dual_mono_phase_threshold: Option<f64>,
    pub conformance_policy: Option<String>,
    pub output_dir: Option<String>,
}

/// Fully resolved configuration for one run
#[derive(Debug)]
pub struct RunConfig {
    pub policy: PolicyConfig,
    pub tools: ToolPaths,
    pub output_dir: PathBuf,

    /// Embedded policy written to disk; removed when the run ends
    embedded_policy: Option<NamedTempFile>,
}

impl RunConfig {
    /// Load the config file (if any), apply overrides and validate
    pub fn load(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let file = match file {
            Some(path) => {
                log::info!("Loading config from {:?}", path);
                QcConfigFile::load(path)?
            }
            None => QcConfigFile::default(),
        };
        Self::resolve(file, overrides)
    }

    pub fn resolve(file: QcConfigFile, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let high_volume = finite(
            "high_volume_threshold_db",
            overrides
                .high_volume_threshold_db
                .or(file.high_volume_threshold_db)
                .unwrap_or(DEFAULT_HIGH_VOLUME_DB),
        )?;
        let stereo_phase = finite(
            "stereo_phase_threshold",
            overrides
                .stereo_phase_threshold
                .or(file.stereo_phase_threshold)
                .unwrap_or(DEFAULT_STEREO_PHASE),
        )?;
        let dual_mono_phase = finite(
            "dual_mono_phase_threshold",
            overrides
                .dual_mono_phase_threshold
                .or(file.dual_mono_phase_threshold)
                .unwrap_or(DEFAULT_DUAL_MONO_PHASE),
        )?;

        let configured_policy = overrides
            .conformance_policy
            .as_deref()
            .or(file.conformance_policy.as_deref());
        let (policy_path, embedded_policy) = match configured_policy {
            Some(p) => {
                let path = expand(p);
                if !path.is_file() {
                    return Err(ConfigError::MissingPolicy(path));
                }
                (path, None)
            }
            None => {
                let temp = write_embedded_policy()?;
                log::debug!("Using embedded conformance policy at {:?}", temp.path());
                (temp.path().to_path_buf(), Some(temp))
            }
        };

        let output_dir = expand(
            overrides
                .output_dir
                .as_deref()
                .or(file.output_dir.as_deref())
                .unwrap_or(DEFAULT_OUTPUT_DIR),
        );

        let defaults = ToolPaths::default();
        let tools = ToolPaths {
            ffmpeg: tool_path(file.tools.ffmpeg.as_deref(), defaults.ffmpeg),
            ffprobe: tool_path(file.tools.ffprobe.as_deref(), defaults.ffprobe),
            mediainfo: tool_path(file.tools.mediainfo.as_deref(), defaults.mediainfo),
            mediaconch: tool_path(file.tools.mediaconch.as_deref(), defaults.mediaconch),
        };

        let policy = PolicyConfig::new(policy_path)
            .with_high_volume(high_volume)
            .with_phase_thresholds(stereo_phase, dual_mono_phase);

        Ok(Self {
            policy,
            tools,
            output_dir,
            embedded_policy,
        })
    }

    /// Whether the conformance policy is the built-in one
    pub fn uses_embedded_policy(&self) -> bool {
        self.embedded_policy.is_some()
    }
}

fn finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Use a configured tool path only if it exists; otherwise rely on PATH
fn tool_path(configured: Option<&str>, fallback: PathBuf) -> PathBuf {
    match configured.map(expand) {
        Some(path) if path.exists() => path,
        Some(path) => {
            log::debug!("Tool not found at {:?}, using {:?} from PATH", path, fallback);
            fallback
        }
        None => fallback,
    }
}

fn write_embedded_policy() -> Result<NamedTempFile, ConfigError> {
    let mut temp = tempfile::Builder::new()
        .prefix("mediaConch")
        .suffix(".xml")
        .tempfile()
        .map_err(ConfigError::EmbeddedPolicy)?;
    temp.write_all(DEFAULT_POLICY_XML.as_bytes())
        .and_then(|_| temp.flush())
        .map_err(ConfigError::EmbeddedPolicy)?;
    Ok(temp)
}
