//! BMKG-OFS map plotter.
//!
//! A run plots every (time step, variable, region[, depth]) combination of
//! one forecast file. Each combination is independent: it reads its own
//! slices, renders a PNG and logs its own failure without affecting the
//! others.

pub mod batch;
pub mod derive;
pub mod logging;
pub mod plan;

pub use batch::{output_path, run_batch, run_task, BatchContext, BatchSummary};
pub use derive::{derive_field, DatasetWindow, Derived, FieldSource, ZeroFilled, ARROW_LENGTH};
pub use plan::{log_file_path, Model, PlotTask, RunPlan, UnknownModel};
