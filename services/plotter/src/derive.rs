//! Turning dataset variables into the colored field and arrow components
//! of a plot.

use catalog::{VariableDef, VariableKind};
use netcdf_parser::{ForecastDataset, Grid2D};
use ofs_common::{BoundingBox, PlotError, PlotResult};
use tracing::warn;

/// Arrows are drawn from components of this length; the renderer scales
/// them by the region's arrow scale.
pub const ARROW_LENGTH: f32 = 2.0;

/// Somewhere fields can be read from.
pub trait FieldSource: Sync {
    fn has_variable(&self, name: &str) -> bool;

    fn read(&self, name: &str, time_index: usize, depth: Option<f64>) -> PlotResult<Grid2D>;

    /// Whether `read` replaces missing cells of `name`.
    fn fills(&self, _name: &str) -> bool {
        false
    }

    /// `read` without any replacement of missing cells.
    fn read_unfilled(
        &self,
        name: &str,
        time_index: usize,
        depth: Option<f64>,
    ) -> PlotResult<Grid2D> {
        self.read(name, time_index, depth)
    }
}

impl FieldSource for ForecastDataset {
    fn has_variable(&self, name: &str) -> bool {
        ForecastDataset::has_variable(self, name)
    }

    fn read(&self, name: &str, time_index: usize, depth: Option<f64>) -> PlotResult<Grid2D> {
        Ok(self.read_field(name, time_index, depth)?)
    }
}

/// A dataset read only inside a box.
pub struct DatasetWindow<'a> {
    dataset: &'a ForecastDataset,
    bbox: BoundingBox,
}

impl<'a> DatasetWindow<'a> {
    pub fn new(dataset: &'a ForecastDataset, bbox: BoundingBox) -> Self {
        Self { dataset, bbox }
    }
}

impl FieldSource for DatasetWindow<'_> {
    fn has_variable(&self, name: &str) -> bool {
        self.dataset.has_variable(name)
    }

    fn read(&self, name: &str, time_index: usize, depth: Option<f64>) -> PlotResult<Grid2D> {
        Ok(self.dataset.read_window(name, time_index, depth, &self.bbox)?)
    }
}

/// Source wrapper that replaces missing values of selected variables with
/// zero. The no-data mask stays available through `read_unfilled`.
pub struct ZeroFilled<'a, S: ?Sized> {
    inner: &'a S,
    names: &'a [String],
}

impl<'a, S: FieldSource + ?Sized> ZeroFilled<'a, S> {
    pub fn new(inner: &'a S, names: &'a [String]) -> Self {
        Self { inner, names }
    }
}

impl<S: FieldSource + ?Sized> FieldSource for ZeroFilled<'_, S> {
    fn has_variable(&self, name: &str) -> bool {
        self.inner.has_variable(name)
    }

    fn read(&self, name: &str, time_index: usize, depth: Option<f64>) -> PlotResult<Grid2D> {
        let mut grid = self.inner.read(name, time_index, depth)?;
        if self.names.iter().any(|n| n == name) {
            grid.fill_nan(0.0);
        }
        Ok(grid)
    }

    fn fills(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name) || self.inner.fills(name)
    }

    fn read_unfilled(
        &self,
        name: &str,
        time_index: usize,
        depth: Option<f64>,
    ) -> PlotResult<Grid2D> {
        self.inner.read_unfilled(name, time_index, depth)
    }
}

/// Fields ready for rendering.
#[derive(Debug, Clone)]
pub struct Derived {
    /// Colored field, in the variable's display unit
    pub magnitude: Grid2D,
    /// Arrow components (east, north) on the same grid
    pub arrows: Option<(Grid2D, Grid2D)>,
}

fn read_scaled<S: FieldSource + ?Sized>(
    source: &S,
    name: &str,
    factor: f64,
    time_index: usize,
    depth: Option<f64>,
) -> PlotResult<Grid2D> {
    let grid = source.read(name, time_index, depth)?;
    if factor == 1.0 {
        return Ok(grid);
    }
    let factor = factor as f32;
    Ok(grid.map(|x| x * factor))
}

fn shape_error(def: &VariableDef) -> PlotError {
    PlotError::DataRead(format!(
        "{} and {} of '{}' have different shapes",
        def.var1,
        def.var2.as_deref().unwrap_or("?"),
        def.code
    ))
}

/// Read and combine the fields of one variable at a time step.
///
/// Cells with no data in the fields behind the colored field stay NaN even
/// when the source fills them, and carry no arrow.
pub fn derive_field<S: FieldSource + ?Sized>(
    def: &VariableDef,
    source: &S,
    time_index: usize,
    depth: Option<f64>,
) -> PlotResult<Derived> {
    let var2 = match (&def.var2, def.kind) {
        (Some(name), VariableKind::Vector | VariableKind::Direction) if source.has_variable(name) => {
            Some(name.as_str())
        }
        (Some(name), VariableKind::Vector) => {
            return Err(PlotError::DataRead(format!(
                "no variable '{}' for the second component of '{}'",
                name, def.code
            )))
        }
        (Some(name), VariableKind::Direction) => {
            warn!(
                variable = %def.code,
                missing = %name,
                "Direction variable not in dataset, plotting magnitude only"
            );
            None
        }
        _ => None,
    };

    let mut derived = match (def.kind, var2) {
        (VariableKind::Vector, Some(var2)) => {
            let u = read_scaled(source, &def.var1, def.factor, time_index, depth)?;
            let v = read_scaled(source, var2, def.factor, time_index, depth)?;
            let speed = u
                .zip_map(&v, |u, v| (u * u + v * v).sqrt())
                .ok_or_else(|| shape_error(def))?;
            let (au, av) = unit_arrows(&u, &v, &speed).ok_or_else(|| shape_error(def))?;

            let magnitude = match &def.mag {
                Some(mag) => read_scaled(source, mag, def.factor, time_index, depth)?,
                None => speed,
            };
            Derived {
                magnitude,
                arrows: Some((au, av)),
            }
        }
        (VariableKind::Direction, Some(var2)) => {
            let magnitude = read_scaled(source, &def.var1, def.factor, time_index, depth)?;
            let direction = source.read(var2, time_index, depth)?;
            Derived {
                magnitude,
                arrows: Some(direction_arrows(&direction)),
            }
        }
        _ => Derived {
            magnitude: read_scaled(source, def.magnitude_var(), def.factor, time_index, depth)?,
            arrows: None,
        },
    };

    let colored_from: Vec<&str> = match (def.kind, var2, &def.mag) {
        (VariableKind::Vector, Some(var2), None) => vec![def.var1.as_str(), var2],
        _ => vec![def.magnitude_var()],
    };
    for name in colored_from {
        if source.fills(name) {
            let unfilled = source.read_unfilled(name, time_index, depth)?;
            derived.mask_missing(&unfilled).ok_or_else(|| shape_error(def))?;
        }
    }
    derived.clear_arrows_on_missing();
    Ok(derived)
}

impl Derived {
    /// Set the colored field to NaN wherever `mask` is NaN.
    fn mask_missing(&mut self, mask: &Grid2D) -> Option<()> {
        self.magnitude = self
            .magnitude
            .zip_map(mask, |m, raw| if raw.is_nan() { f32::NAN } else { m })?;
        Some(())
    }

    /// Drop arrows over cells without a colored value.
    fn clear_arrows_on_missing(&mut self) {
        let Some((u, v)) = &mut self.arrows else {
            return;
        };
        for ((m, u), v) in self
            .magnitude
            .data
            .iter()
            .zip(u.data.iter_mut())
            .zip(v.data.iter_mut())
        {
            if m.is_nan() {
                *u = f32::NAN;
                *v = f32::NAN;
            }
        }
    }
}

/// Unit vectors of (u, v) times [`ARROW_LENGTH`]. Calm cells get NaN so no
/// arrow is drawn.
fn unit_arrows(u: &Grid2D, v: &Grid2D, speed: &Grid2D) -> Option<(Grid2D, Grid2D)> {
    let normalise = |c: f32, s: f32| {
        if s > 0.0 && s.is_finite() {
            ARROW_LENGTH * c / s
        } else {
            f32::NAN
        }
    };
    Some((
        u.zip_map(speed, normalise)?,
        v.zip_map(speed, normalise)?,
    ))
}

/// Arrow components `(2 cos d, 2 sin d)` of a direction field in degrees.
fn direction_arrows(direction: &Grid2D) -> (Grid2D, Grid2D) {
    let u = direction.map(|d| ARROW_LENGTH * d.to_radians().cos());
    let v = direction.map(|d| ARROW_LENGTH * d.to_radians().sin());
    (u, v)
}
