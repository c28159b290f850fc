use anyhow::Result;
use audioqc::batch::report::timestamped_path;
use audioqc::batch::{discover_targets, write_report, ConfigOverrides, ReportFormat, RunConfig};
use audioqc::model::ReportRecord;
use audioqc::model::ProbeOutcome;
use audioqc::probe::{load_outcomes, save_outcomes, ExternalProber, Prober};
use audioqc::{evaluate_batch, QcPipeline};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "audioqc")]
#[command(about = "Quality control for preservation audio files", long_about = None)]
struct Args {
    /// Files or directories to check (directories are searched recursively)
    #[arg(required_unless_present = "from_probes")]
    inputs: Vec<PathBuf>,

    /// TOML config file with thresholds, tool paths and output directory
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// MediaConch policy file (default: built-in WAV policy)
    #[arg(short = 'p', long)]
    policy: Option<String>,

    /// Target file extension (not case sensitive)
    #[arg(short = 'e', long, default_value = "wav")]
    extension: String,

    /// Report file (default: timestamped file in the output directory)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Directory for timestamped reports (default: ~/Desktop)
    #[arg(long)]
    output_dir: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value = "csv")]
    format: ReportFormat,

    /// Number of files probed in parallel (default: number of CPU cores)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// High volume threshold in dB
    #[arg(long, allow_hyphen_values = true)]
    high_volume: Option<f64>,

    /// Minimum mean phase for stereo material
    #[arg(long, allow_hyphen_values = true)]
    stereo_phase: Option<f64>,

    /// Minimum mean phase for dual-mono material
    #[arg(long, allow_hyphen_values = true)]
    dual_mono_phase: Option<f64>,

    /// Re-evaluate probe results saved by --save-probes instead of running the tools
    #[arg(long, conflicts_with = "inputs")]
    from_probes: Option<PathBuf>,

    /// Save raw probe results as JSON
    #[arg(long)]
    save_probes: Option<PathBuf>,

    /// Only print QC Pass!/QC Fail! and exit with 0/1, no report file
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let overrides = ConfigOverrides {
        high_volume_threshold_db: args.high_volume,
        stereo_phase_threshold: args.stereo_phase,
        dual_mono_phase_threshold: args.dual_mono_phase,
        conformance_policy: args.policy.clone(),
        output_dir: args.output_dir.clone(),
    };
    let config = RunConfig::load(args.config.as_deref(), &overrides)?;

    log::info!(
        "Policy: high volume {} dB, stereo phase {}, dual-mono phase {}",
        config.policy.high_volume_threshold_db,
        config.policy.stereo_phase_threshold,
        config.policy.dual_mono_phase_threshold
    );
    if config.uses_embedded_policy() {
        log::info!("Using built-in WAV conformance policy");
    }

    let records = if let Some(ref probes_path) = args.from_probes {
        log::info!("Re-evaluating saved probe results from {:?}", probes_path);
        // One record per saved outcome, even when a path was probed more than once
        let outcomes = load_outcomes(probes_path)?;
        save_probes(&outcomes, &args)?;
        let records = evaluate_batch(&config.policy, &outcomes);
        log::info!("Re-evaluated {} saved outcome(s)", records.len());
        records
    } else {
        let targets = discover_targets(&args.inputs, &args.extension);
        if targets.is_empty() {
            anyhow::bail!("No targets found!");
        }
        let prober = ExternalProber::new(
            config.tools.clone(),
            config.policy.conformance_policy_path.clone(),
        );
        run(QcPipeline::new(config.policy.clone(), prober), &targets, &args)?
    };

    if args.quiet {
        let flagged: Vec<&ReportRecord> = records.iter().filter(|r| !r.passed()).collect();
        if flagged.is_empty() {
            println!("QC Pass!");
            return Ok(());
        }
        println!("QC Fail!");
        for record in flagged {
            println!("{}", record.file_path.display());
            match &record.scan_error {
                Some(reason) => println!("  Failed to Scan: {}", reason),
                None => {
                    for warning in &record.warnings {
                        println!("  {}", warning);
                    }
                }
            }
        }
        // exit() skips destructors
        drop(config);
        std::process::exit(1);
    }

    let output = args.output.clone().unwrap_or_else(|| {
        timestamped_path(&config.output_dir, args.format, &chrono::Local::now())
    });
    write_report(&output, &records, args.format)?;

    log::info!("QC finished: {} record(s) written to {:?}", records.len(), output);
    Ok(())
}

fn run<P: Prober>(
    pipeline: QcPipeline<P>,
    targets: &[PathBuf],
    args: &Args,
) -> Result<Vec<ReportRecord>> {
    let pipeline = match args.jobs {
        Some(jobs) => pipeline.with_jobs(jobs),
        None => pipeline,
    };

    let outcomes = pipeline.probe_all(targets)?;
    save_probes(&outcomes, args)?;
    Ok(pipeline.evaluate(&outcomes))
}

fn save_probes(outcomes: &[ProbeOutcome], args: &Args) -> Result<()> {
    if let Some(ref path) = args.save_probes {
        save_outcomes(path, outcomes)?;
    }
    Ok(())
}
