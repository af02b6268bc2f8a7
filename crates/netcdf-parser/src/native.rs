//! Native NetCDF reading using the netcdf library.
//!
//! A forecast file is opened once. Coordinates and the variable inventory
//! are read up front; field slices are read on demand through the same handle,
//! one reader at a time, so [`ForecastDataset`] can be shared across worker
//! threads.

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use chrono::{DateTime, Utc};
use ofs_common::BoundingBox;
use tracing::{debug, info};

use crate::cf_time::TimeUnits;
use crate::error::{NetCdfError, NetCdfResult};
use crate::grid::{axis_window, Grid2D};

const LON_NAMES: [&str; 3] = ["lon", "longitude", "x"];
const LAT_NAMES: [&str; 3] = ["lat", "latitude", "y"];
const DEPTH_NAMES: [&str; 3] = ["depth", "lev", "z"];

/// Tolerance when matching a requested depth against the depth coordinate.
const DEPTH_TOLERANCE: f64 = 1e-6;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This function disables that output by calling
/// H5Eset_auto2 with null handlers. It only needs to be called once per process,
/// but is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// An open gridded forecast file with its coordinates and variable inventory.
pub struct ForecastDataset {
    path: PathBuf,
    file: Mutex<netcdf::File>,
    lon: Vec<f64>,
    lat: Vec<f64>,
    times: Vec<DateTime<Utc>>,
    depths: Vec<f64>,
    variables: Vec<String>,
    lon_name: String,
    lat_name: String,
    depth_name: Option<String>,
}

impl ForecastDataset {
    /// Open a forecast file and read its coordinates.
    pub fn open<P: AsRef<Path>>(path: P) -> NetCdfResult<Self> {
        silence_hdf5_errors();

        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(NetCdfError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }

        let nc_file = netcdf::open(&path)?;

        let (lon_name, lon) = read_coordinate(&nc_file, &LON_NAMES)?;
        let (lat_name, lat) = read_coordinate(&nc_file, &LAT_NAMES)?;
        let times = read_times(&nc_file)?;
        let (depth_name, depths) = match read_coordinate(&nc_file, &DEPTH_NAMES) {
            Ok((name, values)) => (Some(name), values),
            Err(_) => (None, Vec::new()),
        };

        let variables: Vec<String> = nc_file.variables().map(|v| v.name()).collect();

        info!(
            path = %path.display(),
            n_lon = lon.len(),
            n_lat = lat.len(),
            n_time = times.len(),
            n_depth = depths.len(),
            "Opened forecast dataset"
        );

        Ok(Self {
            path,
            file: Mutex::new(nc_file),
            lon,
            lat,
            times,
            depths,
            variables,
            lon_name,
            lat_name,
            depth_name,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    /// Index of `depth` in the depth coordinate.
    pub fn depth_index(&self, depth: f64) -> NetCdfResult<usize> {
        self.depths
            .iter()
            .position(|&d| (d - depth).abs() <= DEPTH_TOLERANCE)
            .ok_or_else(|| NetCdfError::MissingData(format!("depth {} not in dataset", depth)))
    }

    /// Read one horizontal slice of `name` at a time step (and depth, for 4-D
    /// variables).
    ///
    /// Packed values are unpacked with `scale_factor`/`add_offset`; fill and
    /// missing values become NaN.
    pub fn read_field(
        &self,
        name: &str,
        time_index: usize,
        depth: Option<f64>,
    ) -> NetCdfResult<Grid2D> {
        self.read_slice(name, time_index, depth, 0..self.lat.len(), 0..self.lon.len())
    }

    /// Like [`read_field`](Self::read_field), limited to the cells whose
    /// centres fall inside `bbox`.
    pub fn read_window(
        &self,
        name: &str,
        time_index: usize,
        depth: Option<f64>,
        bbox: &BoundingBox,
    ) -> NetCdfResult<Grid2D> {
        let rows = axis_window(&self.lat, bbox.min_y, bbox.max_y);
        let cols = axis_window(&self.lon, bbox.min_x, bbox.max_x);
        match (rows, cols) {
            (Some(rows), Some(cols)) => self.read_slice(name, time_index, depth, rows, cols),
            _ => Err(NetCdfError::MissingData(format!(
                "grid points inside ({}, {}, {}, {})",
                bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y
            ))),
        }
    }

    fn read_slice(
        &self,
        name: &str,
        time_index: usize,
        depth: Option<f64>,
        rows: Range<usize>,
        cols: Range<usize>,
    ) -> NetCdfResult<Grid2D> {
        if time_index >= self.times.len() {
            return Err(NetCdfError::MissingData(format!(
                "time index {} out of range (0..{})",
                time_index,
                self.times.len()
            )));
        }

        let nc_file = self.file.lock().map_err(|_| {
            NetCdfError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("{} handle poisoned by a panicked reader", self.path.display()),
            ))
        })?;
        let var = nc_file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))?;

        // Dimensions must end in (lat, lon) so the slice is row-major lat x lon
        let dim_names: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let tail: Vec<&str> = dim_names.iter().rev().take(2).map(|s| s.as_str()).collect();
        if tail != [self.lon_name.as_str(), self.lat_name.as_str()] {
            return Err(NetCdfError::InvalidFormat(format!(
                "{} dimensions {:?} do not end in ({}, {})",
                name, dim_names, self.lat_name, self.lon_name
            )));
        }

        let expected = rows.len() * cols.len();
        let raw: Vec<f32> = match dim_names.len() {
            3 => var.get_values::<f32, _>((time_index, rows.clone(), cols.clone()))?,
            4 => {
                let depth_index = match depth {
                    Some(d) => self.depth_index(d)?,
                    None if self.depths.len() <= 1 => 0,
                    None => {
                        return Err(NetCdfError::MissingData(format!(
                            "{} has a depth dimension but no depth was requested",
                            name
                        )))
                    }
                };
                var.get_values::<f32, _>((time_index, depth_index, rows.clone(), cols.clone()))?
            }
            2 => var.get_values::<f32, _>((rows.clone(), cols.clone()))?,
            n => {
                return Err(NetCdfError::InvalidFormat(format!(
                    "{} has {} dimensions, expected 2 to 4",
                    name, n
                )))
            }
        };

        if raw.len() != expected {
            return Err(NetCdfError::InvalidFormat(format!(
                "{} slice has {} values, expected {}",
                name,
                raw.len(),
                expected
            )));
        }

        let scale_factor = get_f32_attr(&var, "scale_factor").unwrap_or(1.0);
        let add_offset = get_f32_attr(&var, "add_offset").unwrap_or(0.0);
        let fill_value = get_f32_attr(&var, "_FillValue");
        let missing_value = get_f32_attr(&var, "missing_value");

        let data: Vec<f32> = raw
            .into_iter()
            .map(|val| {
                if !val.is_finite()
                    || fill_value.map_or(false, |f| val == f)
                    || missing_value.map_or(false, |m| val == m)
                {
                    f32::NAN
                } else {
                    val * scale_factor + add_offset
                }
            })
            .collect();

        debug!(
            variable = name,
            time_index = time_index,
            depth = ?depth,
            rows = rows.len(),
            cols = cols.len(),
            "Read field slice"
        );

        Grid2D::new(self.lon[cols].to_vec(), self.lat[rows].to_vec(), data)
            .ok_or_else(|| NetCdfError::InvalidFormat(format!("{} grid shape mismatch", name)))
    }

    /// The depth coordinate name, if the dataset has one.
    pub fn depth_name(&self) -> Option<&str> {
        self.depth_name.as_deref()
    }
}

impl fmt::Debug for ForecastDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastDataset")
            .field("path", &self.path)
            .field("n_lon", &self.lon.len())
            .field("n_lat", &self.lat.len())
            .field("times", &self.times.len())
            .field("depths", &self.depths)
            .field("variables", &self.variables)
            .finish()
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn read_coordinate(nc_file: &netcdf::File, names: &[&str]) -> NetCdfResult<(String, Vec<f64>)> {
    for name in names {
        if let Some(var) = nc_file.variable(name) {
            let values: Vec<f64> = var.get_values(..)?;
            return Ok((name.to_string(), values));
        }
    }
    Err(NetCdfError::MissingData(format!(
        "coordinate variable ({})",
        names.join(" or ")
    )))
}

fn read_times(nc_file: &netcdf::File) -> NetCdfResult<Vec<DateTime<Utc>>> {
    let var = nc_file
        .variable("time")
        .ok_or_else(|| NetCdfError::MissingData("time variable".to_string()))?;
    let units = get_string_attr(&var, "units")
        .ok_or_else(|| NetCdfError::MissingData("time units attribute".to_string()))?;
    let units = TimeUnits::parse(&units)?;
    let values: Vec<f64> = var.get_values(..)?;
    Ok(values.into_iter().map(|v| units.decode(v)).collect())
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get f32 attribute.
fn get_f32_attr(var: &netcdf::Variable, name: &str) -> Option<f32> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f32::try_from(attr_value).ok()
}

fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
