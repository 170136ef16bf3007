use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use tracing::info;

// Import from stylesplit-core
use stylesplit_core::{MigrationConfig, MigrationProcessor, MigrationReport, PipelineStages, StepProfiler};

#[derive(Parser)]
#[command(name = "stylesplit")]
#[command(about = "Split a monolithic stylesheet into page-scoped stylesheets and rewrite their imports")]
struct Args {
    /// Project directory; overrides `root` from the config file
    #[arg(short, long)]
    root: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Compute everything but leave files on disk untouched
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<String>,

    /// Dump parsed blocks and the bucket split to a directory
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output
    #[arg(long, default_value = "stylesplit_stages")]
    stages_dir: String,

    /// Log timings of each pipeline step
    #[arg(long)]
    profile: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = MigrationConfig::load(args.config.as_deref())?;
    if let Some(root) = &args.root {
        config.root = root.into();
    }
    info!(root = %config.root.display(), config = ?args.config, "starting migration");

    let processor = if args.dry_run {
        MigrationProcessor::new_dry_run()?
    } else {
        MigrationProcessor::new()?
    };

    let mut profiler = StepProfiler::new(args.profile);
    let report = if args.dump_stages {
        let stages = processor.run_capture_stages(&config, &mut profiler)?;
        save_stages(&stages, &args.stages_dir)?;
        stages.report
    } else {
        processor.run_with_profiler(&config, &mut profiler)?
    };

    if let Some(path) = &args.report {
        save_report(&report, path)?;
    }

    Ok(())
}

/// Logs go to stderr and default to warnings only, so a clean run is silent.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn save_stages(stages: &PipelineStages, output_dir: &str) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create stages directory {output_dir}"))?;

    // Stage 1: Parsed top-level blocks
    let blocks_path = Path::new(output_dir).join("stage1_blocks.json");
    fs::write(&blocks_path, serde_json::to_string_pretty(&stages.blocks)?)?;
    info!(path = %blocks_path.display(), blocks = stages.blocks.len(), "saved stage");

    // Stage 2: Blocks grouped by bucket
    let split_path = Path::new(output_dir).join("stage2_split.json");
    fs::write(&split_path, serde_json::to_string_pretty(&stages.split)?)?;
    info!(path = %split_path.display(), "saved stage");

    // Stage 3: Run report
    save_report(&stages.report, &Path::new(output_dir).join("stage3_report.json").to_string_lossy())
}

fn save_report(report: &MigrationReport, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("Failed to write report {path}"))?;
    info!(path, run_id = %report.run_id, "saved report");
    Ok(())
}
