//! NetCDF reader for gridded ocean forecast output.
//!
//! Wave (WAVEWATCH III post-processed) and ocean-flow forecast files share the
//! same layout: 1-D `lon`/`lat`/`time` coordinates, an optional `depth`
//! coordinate, and physical variables dimensioned `[time, lat, lon]` or
//! `[time, depth, lat, lon]`.
//!
//! ```ignore
//! use netcdf_parser::ForecastDataset;
//!
//! let ds = ForecastDataset::open("w3g_hires_20241020_0000.nc")?;
//! let hs = ds.read_field("hs", 0, None)?;
//! ```

pub mod cf_time;
pub mod error;
pub mod grid;
pub mod native;

pub use cf_time::TimeUnits;
pub use error::{NetCdfError, NetCdfResult};
pub use grid::{axis_window, Grid2D};
pub use native::{silence_hdf5_errors, ForecastDataset};
