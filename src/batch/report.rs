//! Report persistence
//!
//! Renders report records as CSV (one row per file, same columns the QC
//! sheets have always used) or as JSON.

use crate::model::{ReportRecord, Status};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: [&str; 14] = [
    "Path",
    "Warnings",
    "Channels",
    "Duration",
    "Volume max",
    "Channel 1 max",
    "Channel 2 max",
    "Number of High Volume Frames",
    "Average Phase",
    "Integrated Loudness",
    "MD5 check",
    "Mediaconch Status",
    "Mediaconch Failures",
    "Coding History",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

/// `<dir>/audioqc-out_<YYYY-MM-DD_HH-MM-SS>.<ext>`
pub fn timestamped_path<Tz>(dir: &Path, format: ReportFormat, now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dir.join(format!(
        "audioqc-out_{}.{}",
        now.format("%Y-%m-%d_%H-%M-%S"),
        format.extension()
    ))
}

/// Write records to `path`, creating parent directories as needed
pub fn write_report(path: &Path, records: &[ReportRecord], format: ReportFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {:?}", parent))?;
    }

    let content = match format {
        ReportFormat::Csv => render_csv(records),
        ReportFormat::Json => render_json(records)?,
    };
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report: {:?}", path))?;

    log::info!("Report written to: {:?}", path);
    Ok(())
}

pub fn render_json(records: &[ReportRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).context("Failed to serialize report records")
}

pub fn render_csv(records: &[ReportRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADER.iter().map(|h| h.to_string()));
    for record in records {
        push_row(&mut out, csv_row(record));
    }
    out
}

/// Cells for one record, in `CSV_HEADER` order
pub fn csv_row(record: &ReportRecord) -> Vec<String> {
    let path = record.file_path.to_string_lossy().into_owned();

    let m = match (&record.status, &record.measurements) {
        (Status::ScanError, _) | (_, None) => {
            let reason = match &record.scan_error {
                Some(reason) => format!("Failed to Scan: {}", reason),
                None => "Failed to Scan".to_string(),
            };
            let mut row = vec![path, reason];
            row.resize(CSV_HEADER.len(), String::new());
            return row;
        }
        (_, Some(m)) => m,
    };

    let warnings: Vec<&str> = record.warnings.iter().map(|w| w.label()).collect();

    vec![
        path,
        warnings.join(", "),
        m.channel_count.to_string(),
        format_duration(m.duration_seconds),
        opt(m.overall_peak_max),
        opt(m.channel_one_peak_max),
        opt(m.channel_two_peak_max),
        m.over_threshold_frame_count.to_string(),
        format!("{:.2}", m.mean_phase_deviation),
        opt(m.integrated_loudness),
        m.checksum_status.describe(),
        m.conformance_status.as_str().to_string(),
        m.conformance_failed_rules.join(", "),
        m.coding_history.clone().unwrap_or_default(),
    ]
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Whole seconds as HH:MM:SS (hours keep counting past 24)
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn push_row(out: &mut String, cells: impl IntoIterator<Item = String>) {
    let line: Vec<String> = cells.into_iter().map(|c| escape_csv(&c)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

/// Quote a field when it contains a delimiter, quote or line break
fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
