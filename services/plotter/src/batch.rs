//! Rendering one task, and fanning a run's tasks out over rayon.

use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::time::Instant;

use catalog::{region_slug, Boundaries, RegionCatalog, VariableCatalog};
use netcdf_parser::ForecastDataset;
use ofs_common::{ForecastStep, PlotError, PlotResult};
use rayon::prelude::*;
use renderer::text::format_g;
use renderer::{render_map, write_png, Fonts, MapSpec};
use tracing::{debug, error, info};

use crate::derive::{derive_field, DatasetWindow, ZeroFilled};
use crate::plan::{PlotTask, RunPlan};

/// Read-only state shared by every task of a run.
pub struct BatchContext<'a> {
    pub plan: &'a RunPlan,
    pub dataset: &'a ForecastDataset,
    pub variables: &'a VariableCatalog,
    pub regions: &'a RegionCatalog,
    pub boundaries: &'a Boundaries,
    pub fonts: &'a Fonts,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rendered: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn merge(self, other: Self) -> Self {
        Self {
            rendered: self.rendered + other.rendered,
            failed: self.failed + other.failed,
        }
    }

    pub fn total(&self) -> usize {
        self.rendered + self.failed
    }
}

/// `{out_dir}/{region}/{savename}[_{depth}]_{YYYYMMDDHH}.png`
pub fn output_path(
    out_dir: &Path,
    region_title: &str,
    savename: &str,
    depth: Option<f64>,
    step: &ForecastStep,
) -> PathBuf {
    let file_name = match depth {
        Some(depth) => format!("{}_{}_{}.png", savename, format_g(depth), step.file_stamp()),
        None => format!("{}_{}.png", savename, step.file_stamp()),
    };
    out_dir.join(region_slug(region_title)).join(file_name)
}

/// Render and write a single map. Returns the path written.
pub fn run_task(ctx: &BatchContext<'_>, task: &PlotTask) -> PlotResult<PathBuf> {
    let def = ctx.variables.get(&task.variable)?;
    let scale = ctx.variables.scale(&def.scale)?;
    let region = ctx
        .regions
        .resolve(ctx.plan.region_set, &task.region, ctx.boundaries)?;

    let valid_time = ctx
        .dataset
        .times()
        .get(task.time_index)
        .copied()
        .ok_or_else(|| PlotError::DataRead(format!("no time step {}", task.time_index)))?;
    let step = ForecastStep::new(ctx.plan.base_run, valid_time);

    let window = DatasetWindow::new(ctx.dataset, region.bbox);
    let source = ZeroFilled::new(&window, &ctx.plan.fill_zero);
    let derived = derive_field(def, &source, task.time_index, task.depth)?;

    let mut spec = MapSpec::new(&region, def, scale, &derived.magnitude, step);
    if let Some((u, v)) = &derived.arrows {
        spec = spec.with_arrows(u, v);
    }

    let img = render_map(&spec, ctx.fonts)?;
    let path = output_path(
        &ctx.plan.out_dir,
        &region.title,
        &def.savename,
        task.depth,
        &step,
    );
    let bytes = write_png(&path, &img)?;
    debug!(path = %path.display(), bytes, "Encoded map");
    Ok(path)
}

/// `outer: inner: innermost`
fn error_chain(err: &dyn StdError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Run every task on the current rayon pool. Failures are logged and
/// counted; they never stop the other tasks.
pub fn run_batch(ctx: &BatchContext<'_>, tasks: &[PlotTask]) -> BatchSummary {
    let start = Instant::now();
    info!(tasks = tasks.len(), threads = rayon::current_num_threads(), "Starting batch");

    let summary = tasks
        .par_iter()
        .map(|task| match run_task(ctx, task) {
            Ok(path) => {
                info!(path = %path.display(), "File saved");
                BatchSummary {
                    rendered: 1,
                    failed: 0,
                }
            }
            Err(err) => {
                error!(
                    variable = %task.variable,
                    region = %task.region,
                    time_index = task.time_index,
                    depth = ?task.depth,
                    kind = err.kind(),
                    error = %error_chain(&err),
                    "Plot failed"
                );
                BatchSummary {
                    rendered: 0,
                    failed: 1,
                }
            }
        })
        .reduce(BatchSummary::default, BatchSummary::merge);

    info!(
        rendered = summary.rendered,
        failed = summary.failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Batch finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use ofs_common::parse_model_cycle;

    #[test]
    fn test_output_path() {
        let base = parse_model_cycle("2024102000").unwrap();
        let step = ForecastStep::new(base, base + Duration::hours(6));
        let out = Path::new("/out");

        assert_eq!(
            output_path(out, "DKI Jakarta - Jawa Barat", "swh", None, &step),
            PathBuf::from("/out/dki_jakarta_jawa_barat/swh_2024102006.png")
        );
        assert_eq!(
            output_path(out, "Kep. Riau", "csd", Some(10.0), &step),
            PathBuf::from("/out/kep_riau/csd_10_2024102006.png")
        );
        assert_eq!(
            output_path(out, "Bali", "s", Some(0.0), &step),
            PathBuf::from("/out/bali/s_0_2024102006.png")
        );
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = PlotError::Io(io);
        let chain = error_chain(&err);
        assert!(chain.starts_with("I/O error: read-only"));
    }

    #[test]
    fn test_summary_merge() {
        let a = BatchSummary {
            rendered: 2,
            failed: 1,
        };
        let b = BatchSummary {
            rendered: 3,
            failed: 0,
        };
        let total = a.merge(b);
        assert_eq!(total.rendered, 5);
        assert_eq!(total.total(), 6);
    }
}
