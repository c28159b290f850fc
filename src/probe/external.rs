//! Prober backed by the external analysis tools
//!
//! Runs ffprobe (levels, loudness), ffmpeg piped into ffprobe (phase),
//! mediainfo (channels, duration, BEXT, stored MD5) and mediaconch
//! (conformance policy), and hashes the audio data natively.

use super::checksum::audio_data_md5;
use super::parse::{
    parse_level_frames, parse_mediaconch_csv, parse_mediainfo, parse_phase_frames, LevelData,
    MediaInfoData,
};
use super::traits::Prober;
use crate::error::ProbeError;
use crate::model::{Conformance, ProbeResult};
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

const LEVEL_TAGS: &str = "frame_tags=lavfi.astats.1.Peak_level,lavfi.astats.2.Peak_level,\
                          lavfi.astats.Overall.Peak_level,lavfi.r128.I";
const PHASE_TAGS: &str = "frame_tags=lavfi.astats.1.DC_offset";

/// Locations of the external programs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub mediainfo: PathBuf,
    pub mediaconch: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            mediainfo: PathBuf::from("mediainfo"),
            mediaconch: PathBuf::from("mediaconch"),
        }
    }
}

pub struct ExternalProber {
    tools: ToolPaths,
    policy_path: PathBuf,
}

impl ExternalProber {
    pub fn new(tools: ToolPaths, policy_path: PathBuf) -> Self {
        Self { tools, policy_path }
    }

    fn levels(&self, path: &Path) -> Result<LevelData, ProbeError> {
        let graph = format!(
            "amovie='{}',astats=reset=1:metadata=1,ebur128=metadata=1",
            escape_filter_path(path)
        );
        let out = run(
            Command::new(&self.tools.ffprobe).args([
                "-print_format",
                "json",
                "-threads",
                "auto",
                "-show_entries",
                LEVEL_TAGS,
                "-f",
                "lavfi",
                "-i",
                graph.as_str(),
            ]),
            "ffprobe",
        )?;
        parse_level_frames(&out)
    }

    /// Split the channels, cross-correlate them and read the result back
    /// through astats, one value per frame
    fn phase(&self, path: &Path) -> Result<Vec<f64>, ProbeError> {
        let mut ffmpeg = Command::new(&self.tools.ffmpeg)
            .args([OsStr::new("-nostdin"), OsStr::new("-i"), path.as_os_str()])
            .args([
                "-af",
                "aformat=dblp,channelsplit,axcorrelate=size=1024:algo=fast",
                "-f",
                "wav",
                "-",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ProbeError::Launch {
                tool: "ffmpeg".to_string(),
                source,
            })?;

        let pipe = ffmpeg
            .stdout
            .take()
            .ok_or_else(|| ProbeError::parse("ffmpeg", "no stdout pipe"))?;

        let probed = run(
            Command::new(&self.tools.ffprobe)
                .args([
                    "-print_format",
                    "json",
                    "-threads",
                    "auto",
                    "-show_entries",
                    PHASE_TAGS,
                    "-f",
                    "lavfi",
                    "-i",
                    "amovie=pipe\\:0,astats=reset=1:metadata=1",
                ])
                .stdin(Stdio::from(pipe)),
            "ffprobe",
        );

        let status = ffmpeg.wait()?;
        let out = probed?;
        if !status.success() {
            return Err(ProbeError::ToolFailed {
                tool: "ffmpeg".to_string(),
                status: status.to_string(),
                stderr: String::new(),
            });
        }
        parse_phase_frames(&out)
    }

    fn mediainfo(&self, path: &Path) -> Result<MediaInfoData, ProbeError> {
        let out = run(
            Command::new(&self.tools.mediainfo)
                .arg("--Output=JSON")
                .arg(path),
            "mediainfo",
        )?;
        parse_mediainfo(&out)
    }

    fn conformance(&self, path: &Path) -> Result<Conformance, ProbeError> {
        let mut policy_arg = OsString::from("--Policy=");
        policy_arg.push(&self.policy_path);

        let out = run(
            Command::new(&self.tools.mediaconch)
                .arg(policy_arg)
                .arg("--Format=csv")
                .arg(path),
            "mediaconch",
        )?;
        parse_mediaconch_csv(&out)
    }
}

impl Prober for ExternalProber {
    fn probe(&self, path: &Path) -> Result<ProbeResult, ProbeError> {
        log::debug!("Probing: {:?}", path);

        let info = self.mediainfo(path)?;
        let levels = self.levels(path)?;
        let phase_samples = self.phase(path)?;
        let conformance = self.conformance(path)?;
        let recomputed_checksum = audio_data_md5(path)?;

        log::debug!(
            "Probed {:?}: {} channel(s), {} level frame(s), {} phase frame(s)",
            path,
            info.channel_count,
            levels.peak_levels.overall.len(),
            phase_samples.len()
        );

        Ok(ProbeResult {
            file_path: path.to_path_buf(),
            channel_count: info.channel_count,
            duration_seconds: info.duration_seconds,
            peak_levels: levels.peak_levels,
            integrated_loudness: levels.integrated_loudness,
            phase_samples,
            stored_checksum: info.stored_checksum,
            recomputed_checksum,
            coding_history: info.coding_history,
            conformance,
        })
    }
}

/// Run a tool to completion and return its stdout
fn run(command: &mut Command, tool: &str) -> Result<String, ProbeError> {
    let Output {
        status,
        stdout,
        stderr,
    } = command
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| ProbeError::Launch {
            tool: tool.to_string(),
            source,
        })?;

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr);
        return Err(ProbeError::ToolFailed {
            tool: tool.to_string(),
            status: status.to_string(),
            stderr: last_line(&stderr).to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .trim()
}

/// Escape a path for use inside a quoted lavfi `amovie` argument
fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "'\\''")
}
