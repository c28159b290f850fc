//! Parsers for the external tools' output
//!
//! All functions take the raw text a tool printed and return typed data;
//! none of them touch the filesystem.

use crate::error::ProbeError;
use crate::model::{Conformance, PeakLevels};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

const TAG_CHANNEL_ONE_PEAK: &str = "lavfi.astats.1.Peak_level";
const TAG_CHANNEL_TWO_PEAK: &str = "lavfi.astats.2.Peak_level";
const TAG_OVERALL_PEAK: &str = "lavfi.astats.Overall.Peak_level";
const TAG_INTEGRATED_LOUDNESS: &str = "lavfi.r128.I";
const TAG_PHASE: &str = "lavfi.astats.1.DC_offset";

/// `ffprobe -print_format json -show_entries frame_tags=...` output
#[derive(Debug, Deserialize)]
struct FfprobeFrames {
    #[serde(default)]
    frames: Vec<FfprobeFrame>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFrame {
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl FfprobeFrame {
    fn value(&self, tag: &str) -> Option<f64> {
        self.tags.get(tag).and_then(|v| v.trim().parse::<f64>().ok())
    }
}

fn parse_frames(json: &str) -> Result<FfprobeFrames, ProbeError> {
    serde_json::from_str(json).map_err(|e| ProbeError::parse("ffprobe", e.to_string()))
}

/// Peak levels and loudness from the astats/ebur128 pass
#[derive(Debug, Clone, PartialEq)]
pub struct LevelData {
    pub peak_levels: PeakLevels,
    pub integrated_loudness: Option<f64>,
}

/// Parse the level pass
///
/// Frames where either channel is digital silence (`-inf`) are skipped.
/// Peaks are rounded to two decimals. The integrated loudness is the last
/// finite value the meter reported, since it converges over the file.
pub fn parse_level_frames(json: &str) -> Result<LevelData, ProbeError> {
    let parsed = parse_frames(json)?;
    let mut peak_levels = PeakLevels::default();
    let mut integrated_loudness = None;

    for frame in &parsed.frames {
        if let Some(lufs) = frame.value(TAG_INTEGRATED_LOUDNESS).filter(|v| v.is_finite()) {
            integrated_loudness = Some(lufs);
        }

        let one = frame.value(TAG_CHANNEL_ONE_PEAK);
        let two = frame.value(TAG_CHANNEL_TWO_PEAK);
        if [one, two].iter().flatten().any(|v| v.is_infinite()) {
            continue;
        }

        if let Some(v) = one {
            peak_levels.channel_one.push(round2(v));
        }
        if let Some(v) = two {
            peak_levels.channel_two.push(round2(v));
        }
        if let Some(v) = frame.value(TAG_OVERALL_PEAK).filter(|v| v.is_finite()) {
            peak_levels.overall.push(round2(v));
        }
    }

    Ok(LevelData {
        peak_levels,
        integrated_loudness,
    })
}

/// Parse the cross-correlation pass into per-frame phase samples
pub fn parse_phase_frames(json: &str) -> Result<Vec<f64>, ProbeError> {
    let parsed = parse_frames(json)?;
    Ok(parsed
        .frames
        .iter()
        .filter_map(|frame| frame.value(TAG_PHASE))
        .filter(|v| v.is_finite())
        .collect())
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Fields taken from `mediainfo --Output=JSON`
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfoData {
    pub channel_count: u32,
    pub duration_seconds: f64,
    pub coding_history: Option<String>,
    pub stored_checksum: Option<String>,
}

pub fn parse_mediainfo(json: &str) -> Result<MediaInfoData, ProbeError> {
    let root: Value =
        serde_json::from_str(json).map_err(|e| ProbeError::parse("mediainfo", e.to_string()))?;
    let tracks = root
        .pointer("/media/track")
        .and_then(Value::as_array)
        .ok_or_else(|| ProbeError::parse("mediainfo", "no media tracks"))?;

    let track_of = |kind: &str| {
        tracks
            .iter()
            .find(|t| t.get("@type").and_then(Value::as_str) == Some(kind))
    };
    let general = track_of("General")
        .ok_or_else(|| ProbeError::parse("mediainfo", "no General track"))?;
    let audio =
        track_of("Audio").ok_or_else(|| ProbeError::parse("mediainfo", "no Audio track"))?;

    let channel_count = str_field(audio, "Channels")
        .and_then(|c| c.trim().parse::<u32>().ok())
        .ok_or_else(|| ProbeError::parse("mediainfo", "missing channel count"))?;

    let duration_seconds = str_field(general, "Duration")
        .and_then(|d| d.trim().parse::<f64>().ok())
        .unwrap_or(0.0);

    let bext_present = general
        .pointer("/extra/bext_Present")
        .and_then(Value::as_str)
        == Some("Yes");
    let coding_history = if bext_present {
        str_field(general, "Encoded_Library_Settings").map(str::to_string)
    } else {
        None
    };

    let stored_checksum = audio
        .pointer("/extra/MD5")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(MediaInfoData {
        channel_count,
        duration_seconds,
        coding_history,
        stored_checksum,
    })
}

fn str_field<'a>(track: &'a Value, key: &str) -> Option<&'a str> {
    track.get(key).and_then(Value::as_str)
}

/// Parse `mediaconch --Format=csv` output
///
/// The second column of the second row holds the overall verdict. On
/// failure, every column whose value is `fail` names a failed rule.
pub fn parse_mediaconch_csv(text: &str) -> Result<Conformance, ProbeError> {
    let rows: Vec<Vec<String>> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(split_csv_line)
        .collect();

    let (header, values) = match rows.as_slice() {
        [header, values, ..] => (header, values),
        _ => return Err(ProbeError::parse("mediaconch", "expected a header and a result row")),
    };
    let verdict = values
        .get(1)
        .ok_or_else(|| ProbeError::parse("mediaconch", "result row has no verdict column"))?;

    if verdict.trim() == "pass" {
        return Ok(Conformance::pass());
    }

    Ok(Conformance::fail(
        header
            .iter()
            .zip(values)
            .skip(2)
            .filter(|(_, value)| value.trim() == "fail")
            .map(|(name, _)| name.trim().to_string()),
    ))
}

/// Split one CSV line, honouring double-quoted fields
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
