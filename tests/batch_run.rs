use audioqc::batch::report::{render_csv, CSV_HEADER};
use audioqc::batch::{discover_targets, write_report, ReportFormat};
use audioqc::model::{Conformance, PeakLevels, ProbeOutcome, ProbeResult, Status};
use audioqc::probe::{load_outcomes, save_outcomes, RecordedProber};
use audioqc::{evaluate_batch, PolicyConfig, QcPipeline};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn measured(path: &Path, stored: Option<&str>) -> ProbeResult {
    ProbeResult {
        file_path: path.to_path_buf(),
        channel_count: 2,
        duration_seconds: 600.0,
        peak_levels: PeakLevels {
            channel_one: vec![-12.0, -8.0],
            channel_two: vec![-11.0, -7.5],
            overall: vec![-11.0, -7.5],
        },
        integrated_loudness: Some(-24.2),
        phase_samples: vec![0.8],
        stored_checksum: stored.map(str::to_string),
        recomputed_checksum: "C3FCD3D76192E4007DFB496CCA67E13B".to_string(),
        coding_history: Some("A=ANALOGUE,M=stereo;A=PCM,M=stereo;".to_string()),
        conformance: Conformance::pass(),
    }
}

/// Create a collection folder with three transfers
fn create_collection() -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let root = dir.path();
    fs::create_dir_all(root.join("box_01")).unwrap();
    for name in ["box_01/a.wav", "box_01/b.wav", "box_01/c.WAV"] {
        fs::write(root.join(name), b"RIFF").unwrap();
    }
    fs::write(root.join("box_01/notes.txt"), b"not audio").unwrap();

    let targets = discover_targets(&[root.to_path_buf()], "wav");
    (dir, targets)
}

#[test]
fn test_recorded_batch_produces_one_record_per_file() {
    let (_dir, targets) = create_collection();
    assert_eq!(targets.len(), 3);

    let prober = RecordedProber::from_outcomes(vec![
        measured(&targets[0], Some("c3fcd3d76192e4007dfb496cca67e13b")).into(),
        measured(&targets[1], None).into(),
        ProbeOutcome::failed(&targets[2], "mediaconch exited with exit status: 2"),
    ]);

    let pipeline =
        QcPipeline::new(PolicyConfig::new(PathBuf::from("policy.xml")), prober).with_jobs(2);
    let records = pipeline.run(&targets).unwrap();

    let statuses: Vec<Status> = records.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![Status::Pass, Status::Fail, Status::ScanError]);
    for (record, target) in records.iter().zip(&targets) {
        assert_eq!(&record.file_path, target);
    }

    let csv = render_csv(&records);
    let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 1 + targets.len());
    assert!(lines[2].contains("No Stored MD5"));
    assert!(lines[3].contains("Failed to Scan: mediaconch exited"));
}

#[test]
fn test_unrecorded_file_becomes_scan_error() {
    let pipeline = QcPipeline::new(
        PolicyConfig::new(PathBuf::from("policy.xml")),
        RecordedProber::new(),
    );
    let records = pipeline.run(&[PathBuf::from("/nowhere/x.wav")]).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, Status::ScanError);
}

#[test]
fn test_saved_probes_can_be_reevaluated_with_a_stricter_policy() {
    let dir = TempDir::new().unwrap();
    let probes_path = dir.path().join("probes.json");
    let target = PathBuf::from("/archive/loud.wav");
    let outcomes = vec![ProbeOutcome::from(measured(
        &target,
        Some("C3FCD3D76192E4007DFB496CCA67E13B"),
    ))];
    save_outcomes(&probes_path, &outcomes).unwrap();

    let reloaded = load_outcomes(&probes_path).unwrap();
    let lenient = QcPipeline::new(
        PolicyConfig::new(PathBuf::from("policy.xml")),
        RecordedProber::from_outcomes(reloaded.clone()),
    );
    let strict = QcPipeline::new(
        PolicyConfig::new(PathBuf::from("policy.xml")).with_high_volume(-9.0),
        RecordedProber::from_outcomes(reloaded.clone()),
    );

    assert_eq!(lenient.evaluate(&reloaded)[0].status, Status::Pass);
    assert_eq!(strict.evaluate(&reloaded)[0].status, Status::Fail);
}

#[test]
fn test_replayed_outcomes_for_the_same_path_each_get_a_record() {
    let dir = TempDir::new().unwrap();
    let probes_path = dir.path().join("probes.json");
    let target = PathBuf::from("/a.wav");
    let mono = ProbeResult {
        channel_count: 1,
        coding_history: Some("A=ANALOGUE,M=mono;A=PCM,M=mono;".to_string()),
        ..measured(&target, Some("C3FCD3D76192E4007DFB496CCA67E13B"))
    };
    let stereo = ProbeResult {
        channel_count: 2,
        ..mono.clone()
    };
    save_outcomes(&probes_path, &[mono.into(), stereo.into()]).unwrap();

    let outcomes = load_outcomes(&probes_path).unwrap();
    let records = evaluate_batch(&PolicyConfig::new(PathBuf::from("policy.xml")), &outcomes);

    let summary: Vec<(Status, u32)> = records
        .iter()
        .map(|r| (r.status, r.measurements.as_ref().unwrap().channel_count))
        .collect();
    assert_eq!(summary, vec![(Status::Pass, 1), (Status::Fail, 2)]);
}

#[test]
fn test_csv_report_written_to_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reports/audioqc-out.csv");
    let pipeline = QcPipeline::new(
        PolicyConfig::new(PathBuf::from("policy.xml")),
        RecordedProber::from_outcomes(vec![ProbeOutcome::failed("/a/b.wav", "boom")]),
    );
    let records = pipeline.run(&[PathBuf::from("/a/b.wav")]).unwrap();

    write_report(&path, &records, ReportFormat::Csv).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with(&CSV_HEADER.join(",")));
    assert!(content.contains("/a/b.wav,Failed to Scan: boom"));
}
