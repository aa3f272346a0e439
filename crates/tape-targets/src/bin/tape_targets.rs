//! tape-targets CLI: run the tape target pipeline on image files.

use clap::{Args, Parser, Subcommand};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use tape_targets::io::{write_reports, FrameReport, TapeTargetsConfig};
use tape_targets::logging::init_logging;
use tape_targets::overlay::draw_overlay;
use tape_targets::worker::{load_rgb, DirectoryFrameSource, FrameWorker, JsonLinesTable};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "tape-targets")]
#[command(about = "Locate retro-reflective tape targets and report offset, distance and bearing")]
#[command(version)]
struct Cli {
    /// Log level: off, error, warn, info, debug, trace.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Structured JSON log lines (with the `tracing` feature).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect targets in one or more images and print a JSON report per image.
    Detect(DetectArgs),

    /// Run the frame worker over the images of a directory.
    ///
    /// The run ends when every frame has been processed. Stopping between
    /// frames is only available to library callers, through the stop flag
    /// passed to `FrameWorker::run`; interrupting this command kills it
    /// mid-frame.
    Run(RunArgs),

    /// Print the default configuration.
    Config,
}

#[derive(Debug, Args)]
struct DetectArgs {
    /// Input images.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// JSON configuration (calibration + pipeline). Defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write all reports to this file as a JSON array.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write `<name>_overlay.png` with the fitted strips and targets drawn
    /// into this directory.
    #[arg(long)]
    overlay: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Directory of frames, processed in file name order.
    #[arg(long)]
    frames: PathBuf,

    /// JSON configuration (calibration + pipeline). Defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append measurement records (JSON lines) to this file instead of stdout.
    #[arg(long)]
    table: Option<PathBuf>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json);

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Run(args) => run_worker(&args),
        Commands::Config => run_config(),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<TapeTargetsConfig> {
    match path {
        Some(path) => {
            log::info!("loading config {}", path.display());
            TapeTargetsConfig::load_json(path).map_err(|e| -> CliError {
                format!("failed to load config {}: {e}", path.display()).into()
            })
        }
        None => Ok(TapeTargetsConfig::default()),
    }
}

// ── detect ─────────────────────────────────────────────────────────────

fn overlay_path(dir: &Path, image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    dir.join(format!("{stem}_overlay.png"))
}

fn run_detect(args: &DetectArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let detector = config.build_detector()?;
    if let Some(dir) = &args.overlay {
        std::fs::create_dir_all(dir)?;
    }

    let mut reports = Vec::with_capacity(args.images.len());
    let stdout = std::io::stdout();
    for path in &args.images {
        let mut report = FrameReport::new(path);
        match load_rgb(path) {
            Ok(frame) => match detector.process(&frame) {
                Ok(result) => {
                    log::info!(
                        "{}: {} rects, {} targets",
                        path.display(),
                        result.rects.len(),
                        result.targets.len()
                    );
                    if let Some(dir) = &args.overlay {
                        let out = overlay_path(dir, path);
                        draw_overlay(&frame, &result).save(&out)?;
                        log::debug!("overlay written to {}", out.display());
                    }
                    report.set_result(result);
                }
                Err(err) => {
                    log::warn!("{}: {err}", path.display());
                    report.set_error(err);
                }
            },
            Err(err) => {
                log::warn!("failed to open image {}: {err}", path.display());
                report.set_error(err);
            }
        }
        writeln!(stdout.lock(), "{}", report.to_json_pretty()?)?;
        reports.push(report);
    }

    if let Some(out) = &args.report {
        write_reports(out, &reports)?;
        log::info!("reports written to {}", out.display());
    }
    Ok(())
}

// ── run ────────────────────────────────────────────────────────────────

fn run_worker(args: &RunArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let detector = config.build_detector()?;
    let source = DirectoryFrameSource::open(&args.frames).map_err(|e| -> CliError {
        format!("failed to open frame directory {}: {e}", args.frames.display()).into()
    })?;

    let writer: Box<dyn Write> = match &args.table {
        Some(path) => Box::new(OpenOptions::new().create(true).append(true).open(path)?),
        None => Box::new(std::io::stdout()),
    };
    let table = JsonLinesTable::new(config.table_name.clone(), writer);

    let stop = AtomicBool::new(false);
    let mut worker = FrameWorker::new(&detector, source, table);
    let stats = worker.run(&stop)?;
    log::info!("{}", serde_json::to_string(&stats)?);
    Ok(())
}

// ── config ─────────────────────────────────────────────────────────────

fn run_config() -> CliResult<()> {
    println!("{}", TapeTargetsConfig::default().to_json_pretty()?);
    Ok(())
}
