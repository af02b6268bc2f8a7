//! Test fixtures: synthetic forecast files and boundary layers.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::generators::{axis, create_constant_grid, create_current_u_grid, create_direction_grid, create_wave_height_grid};

/// A variable to be written into a fixture file.
#[derive(Debug, Clone)]
pub struct FixtureVariable {
    pub name: String,
    /// One horizontal slice per time step (and per depth, depth-major within
    /// a time step, when the fixture has depths).
    pub slices: Vec<Vec<f32>>,
    pub fill_value: Option<f32>,
}

/// Builder for small CF-style forecast NetCDF files.
#[derive(Debug, Clone)]
pub struct ForecastFixture {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub base_run: DateTime<Utc>,
    /// Lead hours of each time step
    pub lead_hours: Vec<f64>,
    pub depths: Option<Vec<f64>>,
    pub variables: Vec<FixtureVariable>,
}

impl ForecastFixture {
    /// 1-degree grid over the Indonesian domain, 90E..145E by 15S..15N.
    pub fn indonesia(base_run: DateTime<Utc>, lead_hours: Vec<f64>) -> Self {
        Self {
            lon: axis(90.0, 145.0, 56),
            lat: axis(-15.0, 15.0, 31),
            base_run,
            lead_hours,
            depths: None,
            variables: Vec::new(),
        }
    }

    pub fn with_depths(mut self, depths: Vec<f64>) -> Self {
        self.depths = Some(depths);
        self
    }

    /// Add a variable whose every slice is `slice`.
    pub fn with_variable(mut self, name: &str, slice: Vec<f32>) -> Self {
        let n_slices = self.lead_hours.len() * self.depths.as_ref().map_or(1, |d| d.len());
        self.variables.push(FixtureVariable {
            name: name.to_string(),
            slices: vec![slice; n_slices],
            fill_value: None,
        });
        self
    }

    /// Add a variable with a `_FillValue` attribute.
    pub fn with_filled_variable(mut self, name: &str, slice: Vec<f32>, fill: f32) -> Self {
        self = self.with_variable(name, slice);
        if let Some(var) = self.variables.last_mut() {
            var.fill_value = Some(fill);
        }
        self
    }

    pub fn width(&self) -> usize {
        self.lon.len()
    }

    pub fn height(&self) -> usize {
        self.lat.len()
    }

    /// Write the fixture as a NetCDF file.
    pub fn write(&self, path: &Path) -> Result<(), netcdf::Error> {
        let mut file = netcdf::create(path)?;

        file.add_dimension("time", self.lead_hours.len())?;
        if let Some(depths) = &self.depths {
            file.add_dimension("depth", depths.len())?;
        }
        file.add_dimension("lat", self.lat.len())?;
        file.add_dimension("lon", self.lon.len())?;

        {
            let mut time_var = file.add_variable::<f64>("time", &["time"])?;
            time_var.put_attribute(
                "units",
                format!("hours since {}", self.base_run.format("%Y-%m-%d %H:%M:%S")),
            )?;
            time_var.put_values(&self.lead_hours, ..)?;
        }
        {
            let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
            lat_var.put_attribute("units", "degrees_north")?;
            lat_var.put_values(&self.lat, ..)?;
        }
        {
            let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
            lon_var.put_attribute("units", "degrees_east")?;
            lon_var.put_values(&self.lon, ..)?;
        }
        if let Some(depths) = &self.depths {
            let mut depth_var = file.add_variable::<f64>("depth", &["depth"])?;
            depth_var.put_attribute("units", "m")?;
            depth_var.put_values(depths, ..)?;
        }

        for var in &self.variables {
            let dims: Vec<&str> = if self.depths.is_some() {
                vec!["time", "depth", "lat", "lon"]
            } else {
                vec!["time", "lat", "lon"]
            };
            let mut nc_var = file.add_variable::<f32>(&var.name, &dims)?;
            if let Some(fill) = var.fill_value {
                nc_var.put_attribute("_FillValue", fill)?;
            }
            let flat: Vec<f32> = var.slices.iter().flatten().copied().collect();
            nc_var.put_values(&flat, ..)?;
        }

        Ok(())
    }

    /// Wave forecast with the variables the wave run plan reads.
    pub fn wave(base_run: DateTime<Utc>, lead_hours: Vec<f64>) -> Self {
        let f = Self::indonesia(base_run, lead_hours);
        let (w, h) = (f.width(), f.height());
        f.with_variable("hs", create_wave_height_grid(w, h, 4.0))
            .with_variable("hmax", create_wave_height_grid(w, h, 7.0))
            .with_variable("dir", create_direction_grid(w, h, 45.0))
            .with_variable("t01", create_constant_grid(w, h, 8.0))
            .with_variable("lm", create_constant_grid(w, h, 60.0))
            .with_variable("uwnd", create_constant_grid(w, h, 5.0))
            .with_variable("vwnd", create_constant_grid(w, h, -3.0))
            .with_variable("phs01", create_wave_height_grid(w, h, 2.0))
            .with_variable("pdi01", create_direction_grid(w, h, 200.0))
            .with_variable("ptp01", create_constant_grid(w, h, 12.0))
            .with_variable("phs00", create_wave_height_grid(w, h, 1.5))
            .with_variable("pdi00", create_direction_grid(w, h, 90.0))
            .with_variable("ptp00", create_constant_grid(w, h, 5.0))
    }

    /// Flow forecast with currents, salinity, temperature and sea level.
    pub fn flow(base_run: DateTime<Utc>, lead_hours: Vec<f64>, depths: Vec<f64>) -> Self {
        let f = Self::indonesia(base_run, lead_hours).with_depths(depths);
        let (w, h) = (f.width(), f.height());
        f.with_variable("u", create_current_u_grid(w, h))
            .with_variable("v", create_constant_grid(w, h, 0.2))
            .with_variable("S", create_constant_grid(w, h, 33.7))
            .with_variable("T", create_constant_grid(w, h, 28.4))
            .with_variable("zeta", create_constant_grid(w, h, 0.3))
    }
}

/// Boundary layer with a handful of provincial waters, in GeoJSON.
///
/// Features: `Aceh`, `Bali`, `DKI Jakarta`, `Jawa Barat` (a MultiPolygon)
/// with a `Met_Area`, and one open-sea feature without one.
pub const BOUNDARY_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "Perairan": "Aceh", "Met_Area": "A.01" },
      "geometry": { "type": "Polygon", "coordinates": [[[94.0, 2.0], [98.0, 2.0], [98.0, 6.0], [94.0, 6.0], [94.0, 2.0]]] }
    },
    {
      "type": "Feature",
      "properties": { "Perairan": "Bali", "Met_Area": "M.05" },
      "geometry": { "type": "Polygon", "coordinates": [[[114.5, -9.0], [116.0, -9.0], [116.0, -8.0], [114.5, -8.0], [114.5, -9.0]]] }
    },
    {
      "type": "Feature",
      "properties": { "Perairan": "DKI Jakarta", "Met_Area": "M.01" },
      "geometry": { "type": "Polygon", "coordinates": [[[106.0, -6.2], [107.0, -6.2], [107.0, -5.5], [106.0, -5.5], [106.0, -6.2]]] }
    },
    {
      "type": "Feature",
      "properties": { "Perairan": "Jawa Barat", "Met_Area": "M.02" },
      "geometry": { "type": "MultiPolygon", "coordinates": [
        [[[106.0, -8.0], [108.5, -8.0], [108.5, -6.5], [106.0, -6.5], [106.0, -8.0]]],
        [[[107.5, -6.3], [108.0, -6.3], [108.0, -6.0], [107.5, -6.0], [107.5, -6.3]]]
      ] }
    },
    {
      "type": "Feature",
      "properties": { "Perairan": "Laut Lepas", "Met_Area": null },
      "geometry": { "type": "Polygon", "coordinates": [[[130.0, 0.0], [131.0, 0.0], [131.0, 1.0], [130.0, 0.0]]] }
    }
  ]
}"#;

/// Write [`BOUNDARY_GEOJSON`] into `dir` and return its path.
pub fn write_boundary_fixture(dir: &Path) -> std::io::Result<std::path::PathBuf> {
    let path = dir.join("METOS_WILPRO.geojson");
    std::fs::write(&path, BOUNDARY_GEOJSON)?;
    Ok(path)
}
