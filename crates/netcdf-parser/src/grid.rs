//! Regular lon/lat grid slices.

use std::ops::Range;

use ofs_common::BoundingBox;

/// A 2-D field on a regular lon/lat grid.
///
/// `data` is row-major with `lat.len()` rows of `lon.len()` values. Missing
/// values are NaN. Coordinates keep the order they had in the file and may be
/// ascending or descending.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2D {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub data: Vec<f32>,
}

impl Grid2D {
    /// Build a grid, checking that the data matches the coordinate sizes.
    pub fn new(lon: Vec<f64>, lat: Vec<f64>, data: Vec<f32>) -> Option<Self> {
        if data.len() != lon.len() * lat.len() {
            return None;
        }
        Some(Self { lon, lat, data })
    }

    pub fn width(&self) -> usize {
        self.lon.len()
    }

    pub fn height(&self) -> usize {
        self.lat.len()
    }

    /// Value at row `j` (latitude index), column `i` (longitude index).
    pub fn get(&self, j: usize, i: usize) -> f32 {
        self.data[j * self.lon.len() + i]
    }

    /// Replace NaN cells with a constant.
    pub fn fill_nan(&mut self, value: f32) {
        for v in self.data.iter_mut() {
            if v.is_nan() {
                *v = value;
            }
        }
    }

    /// Apply a function to every cell.
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Grid2D {
        Grid2D {
            lon: self.lon.clone(),
            lat: self.lat.clone(),
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two grids cell by cell. Both grids must share coordinates.
    pub fn zip_map<F: Fn(f32, f32) -> f32>(&self, other: &Grid2D, f: F) -> Option<Grid2D> {
        if self.lon.len() != other.lon.len() || self.lat.len() != other.lat.len() {
            return None;
        }
        Some(Grid2D {
            lon: self.lon.clone(),
            lat: self.lat.clone(),
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Geographic extent covered by the cell centres.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let (lon_min, lon_max) = min_max(&self.lon)?;
        let (lat_min, lat_max) = min_max(&self.lat)?;
        Some(BoundingBox::new(lon_min, lat_min, lon_max, lat_max))
    }

    /// Crop to the cells whose centres fall inside `bbox` (inclusive).
    ///
    /// Returns None when no cell lies inside the box.
    pub fn subset(&self, bbox: &BoundingBox) -> Option<Grid2D> {
        let cols = axis_window(&self.lon, bbox.min_x, bbox.max_x)?;
        let rows = axis_window(&self.lat, bbox.min_y, bbox.max_y)?;

        let mut data = Vec::with_capacity(cols.len() * rows.len());
        for j in rows.clone() {
            for i in cols.clone() {
                data.push(self.get(j, i));
            }
        }

        Some(Grid2D {
            lon: self.lon[cols].to_vec(),
            lat: self.lat[rows].to_vec(),
            data,
        })
    }

    /// Minimum and maximum of the finite values.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Index range of the values of a monotonic axis inside `[lo, hi]`.
pub fn axis_window(axis: &[f64], lo: f64, hi: f64) -> Option<Range<usize>> {
    let inside = |v: f64| v >= lo && v <= hi;
    let first = axis.iter().position(|&v| inside(v))?;
    let last = axis.iter().rposition(|&v| inside(v))?;
    Some(first..last + 1)
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}
