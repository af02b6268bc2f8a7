//! BMKG-OFS plotter.
//!
//! Renders the forecast maps of one model cycle:
//!
//! ```text
//! plotter inawaves 2024102000
//! plotter inaflows 2024102000 --out-dir /tmp/maps
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use catalog::{Boundaries, RegionCatalog, RegionSet, VariableCatalog};
use chrono::{DateTime, Utc};
use clap::Parser;
use netcdf_parser::ForecastDataset;
use ofs_common::parse_model_cycle;
use renderer::{Fonts, DEFAULT_FONT_PATH};
use tracing::{info, warn};

use plotter::logging;
use plotter::{log_file_path, run_batch, BatchContext, Model, RunPlan};

const BANNER: &str = "================\nBMKG-OFS Plotter\n================";

#[derive(Parser, Debug)]
#[command(name = "plotter")]
#[command(about = "BMKG-OFS Plotter")]
#[command(after_help = "Example: plotter inawaves 2024102000")]
struct Args {
    /// Model. options: inawaves and inaflows
    model: Model,

    /// Base run to process, YYYYMMDDHH
    #[arg(value_parser = parse_cycle)]
    modelcycle: DateTime<Utc>,

    /// Output directory
    #[arg(long = "out-dir", alias = "out_dir")]
    out_dir: Option<PathBuf>,

    /// Forecast file, instead of the model's production path
    #[arg(long, env = "OFS_INPUT")]
    input: Option<PathBuf>,

    /// Directory with regions.yaml and variables.yaml (built-in when unset)
    #[arg(long, env = "OFS_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Provincial waters boundary layer (GeoJSON)
    #[arg(long, env = "OFS_BOUNDARY")]
    boundary: Option<PathBuf>,

    /// Directory of per-station outline files
    #[arg(long, env = "OFS_OUTLINE_DIR")]
    outline_dir: Option<PathBuf>,

    /// TrueType font for annotations
    #[arg(long, env = "OFS_FONT", default_value = DEFAULT_FONT_PATH)]
    font: PathBuf,

    /// Root directory of log files
    #[arg(long, env = "OFS_LOG_DIR", default_value = "/home/model-admin/logs/inawaves")]
    log_dir: PathBuf,

    /// Disable the log file
    #[arg(long)]
    no_log_file: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// JSON console logs
    #[arg(long)]
    log_json: bool,

    /// Worker threads
    #[arg(long, default_value = "48")]
    jobs: usize,

    /// Regions to plot (comma-separated), default: the whole region set
    #[arg(long, value_delimiter = ',')]
    regions: Vec<String>,

    /// Variable codes to plot (comma-separated), default: the model's list
    #[arg(long, value_delimiter = ',')]
    variables: Vec<String>,

    /// Region set, wilpro or wilpel
    #[arg(long, default_value = "wilpro")]
    region_set: RegionSet,
}

fn parse_cycle(s: &str) -> Result<DateTime<Utc>, String> {
    parse_model_cycle(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let started = Instant::now();

    let level = logging::parse_level(&args.log_level);
    let log_file = (!args.no_log_file).then(|| log_file_path(&args.log_dir, args.model, Utc::now()));
    let (_guard, log_file_error) = match logging::init(level, args.log_json, log_file.as_deref()) {
        Ok(guard) => (guard, None),
        Err(e) => (logging::init(level, args.log_json, None)?, Some(e)),
    };
    if let Some(e) = log_file_error {
        warn!(error = %e, "Log file unavailable, logging to console only");
    }

    info!("\n{}", BANNER);
    info!(model = %args.model, "======Running plotter for {}======", args.model);

    let mut plan = RunPlan::new(args.model, args.modelcycle)
        .with_region_set(args.region_set)
        .with_variables(args.variables.clone());
    if let Some(input) = &args.input {
        plan = plan.with_input(input.clone());
    }
    if let Some(out_dir) = &args.out_dir {
        plan = plan.with_out_dir(out_dir.clone());
    }

    fs::create_dir_all(&plan.out_dir)
        .with_context(|| format!("creating output directory {}", plan.out_dir.display()))?;

    let (regions, variables) = match &args.config_dir {
        Some(dir) => (
            RegionCatalog::load_from_directory(dir)?,
            VariableCatalog::load_from_directory(dir)?,
        ),
        None => (RegionCatalog::builtin()?, VariableCatalog::builtin()?),
    };
    let boundaries = Boundaries::load(args.boundary.as_deref(), args.outline_dir.clone())
        .context("loading boundary layer")?;
    let fonts = Fonts::load(&args.font);

    info!(path = %plan.input.display(), "======Opening data======");
    let dataset = ForecastDataset::open(&plan.input)
        .with_context(|| format!("opening forecast file {}", plan.input.display()))?;

    let region_names: Vec<String> = if args.regions.is_empty() {
        regions
            .names(plan.region_set)
            .into_iter()
            .map(String::from)
            .collect()
    } else {
        args.regions.clone()
    };
    let tasks = plan.tasks(dataset.times().len(), &region_names);
    info!(
        times = dataset.times().len(),
        variables = plan.variables.len(),
        regions = region_names.len(),
        depths = plan.depths.len(),
        tasks = tasks.len(),
        out_dir = %plan.out_dir.display(),
        "Plan ready"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.max(1))
        .build()
        .context("building worker pool")?;

    let ctx = BatchContext {
        plan: &plan,
        dataset: &dataset,
        variables: &variables,
        regions: &regions,
        boundaries: &boundaries,
        fonts: &fonts,
    };
    let summary = pool.install(|| run_batch(&ctx, &tasks));

    info!(
        rendered = summary.rendered,
        failed = summary.failed,
        elapsed_s = started.elapsed().as_secs_f64(),
        "Plotting finished"
    );
    Ok(())
}
