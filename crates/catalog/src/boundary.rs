//! Boundary layer: provincial-waters polygons read from GeoJSON.
//!
//! Features carry a `Perairan` property (the waters name a region refers to)
//! and a `Met_Area` code; features without a `Met_Area` are open sea and are
//! skipped by the `*` selector.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use ofs_common::{BoundingBox, PlotError, PlotResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// Waters name that selects every feature with a `Met_Area`.
pub const ALL_WATERS: &str = "*";

/// A closed ring of (lon, lat) points.
pub type Ring = Vec<(f64, f64)>;

/// One polygon feature of the boundary layer.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub perairan: Option<String>,
    pub met_area: Option<String>,
    /// Polygons, each an exterior ring followed by any holes.
    pub polygons: Vec<Vec<Ring>>,
}

impl BoundaryFeature {
    /// Bounds of all rings, `None` for an empty geometry.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let mut points = self.polygons.iter().flatten().flatten();
        let &(x0, y0) = points.next()?;
        let mut bbox = BoundingBox::new(x0, y0, x0, y0);
        for &(x, y) in points {
            bbox.include_point(x, y);
        }
        Some(bbox)
    }
}

#[derive(Debug, Deserialize)]
struct GeoJsonCollection {
    features: Vec<GeoJsonFeature>,
}

#[derive(Debug, Deserialize)]
struct GeoJsonFeature {
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    geometry: Option<GeoJsonGeometry>,
}

#[derive(Debug, Deserialize)]
struct GeoJsonGeometry {
    #[serde(rename = "type")]
    geometry_type: String,
    #[serde(default)]
    coordinates: Value,
}

/// Polygon features of a boundary file.
#[derive(Debug, Clone, Default)]
pub struct BoundaryLayer {
    features: Vec<BoundaryFeature>,
}

impl BoundaryLayer {
    pub fn from_path<P: AsRef<Path>>(path: P) -> PlotResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let layer = Self::from_geojson_str(&contents)
            .map_err(|e| PlotError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = ?path, features = layer.len(), "Loaded boundary layer");
        Ok(layer)
    }

    /// Parse a GeoJSON FeatureCollection. Geometries other than `Polygon`
    /// and `MultiPolygon` are ignored.
    pub fn from_geojson_str(contents: &str) -> PlotResult<Self> {
        let collection: GeoJsonCollection = serde_json::from_str(contents)?;
        let mut features = Vec::with_capacity(collection.features.len());

        for feature in collection.features {
            let Some(geometry) = feature.geometry else {
                continue;
            };
            let polygons = match geometry.geometry_type.as_str() {
                "Polygon" => vec![parse_polygon(&geometry.coordinates)?],
                "MultiPolygon" => geometry
                    .coordinates
                    .as_array()
                    .ok_or_else(|| invalid("MultiPolygon coordinates must be an array"))?
                    .iter()
                    .map(parse_polygon)
                    .collect::<PlotResult<Vec<_>>>()?,
                other => {
                    debug!(geometry = other, "Skipping non-polygon boundary feature");
                    continue;
                }
            };

            let properties = feature.properties.unwrap_or_default();
            features.push(BoundaryFeature {
                perairan: string_property(&properties, "Perairan"),
                met_area: string_property(&properties, "Met_Area"),
                polygons,
            });
        }

        Ok(Self { features })
    }

    pub fn features(&self) -> &[BoundaryFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features whose `Perairan` equals one of `waters`, or every feature
    /// with a `Met_Area` when `waters` contains `*`.
    pub fn select<S: AsRef<str>>(&self, waters: &[S]) -> Vec<&BoundaryFeature> {
        let all = waters.iter().any(|w| w.as_ref() == ALL_WATERS);
        self.features
            .iter()
            .filter(|f| {
                if all {
                    f.met_area.is_some()
                } else {
                    f.perairan
                        .as_deref()
                        .is_some_and(|p| waters.iter().any(|w| w.as_ref() == p))
                }
            })
            .collect()
    }
}

/// Combined bounds of the given features.
pub fn total_bounds<'a, I>(features: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a BoundaryFeature>,
{
    features
        .into_iter()
        .filter_map(BoundaryFeature::bounds)
        .reduce(|a, b| a.union(&b))
}

/// Every ring (exterior and holes) of the given features, as polylines.
pub fn outlines<'a, I>(features: I) -> Vec<Ring>
where
    I: IntoIterator<Item = &'a BoundaryFeature>,
{
    features
        .into_iter()
        .flat_map(|f| f.polygons.iter().flatten().cloned())
        .collect()
}

fn invalid(message: &str) -> PlotError {
    PlotError::Config(format!("invalid GeoJSON geometry: {}", message))
}

fn string_property(properties: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match properties.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_polygon(coordinates: &Value) -> PlotResult<Vec<Ring>> {
    let rings = coordinates
        .as_array()
        .ok_or_else(|| invalid("Polygon coordinates must be an array of rings"))?;
    rings.iter().map(parse_ring).collect()
}

fn parse_ring(ring: &Value) -> PlotResult<Ring> {
    let points = ring
        .as_array()
        .ok_or_else(|| invalid("ring must be an array of positions"))?;
    points
        .iter()
        .map(|p| {
            let lon = p.get(0).and_then(Value::as_f64);
            let lat = p.get(1).and_then(Value::as_f64);
            match (lon, lat) {
                (Some(lon), Some(lat)) => Ok((lon, lat)),
                _ => Err(invalid("position must hold two numbers")),
            }
        })
        .collect()
}

/// Boundary sources available to region resolution.
#[derive(Debug, Clone, Default)]
pub struct Boundaries {
    /// Provincial-waters layer used for boundary extents and outlines
    pub layer: Option<BoundaryLayer>,
    /// Directory holding per-station outline files
    pub outline_dir: Option<PathBuf>,
    /// Parsed outline files keyed by full path, shared between clones
    outline_cache: Arc<Mutex<HashMap<PathBuf, Vec<Ring>>>>,
}

impl Boundaries {
    pub fn new(layer: Option<BoundaryLayer>, outline_dir: Option<PathBuf>) -> Self {
        Self {
            layer,
            outline_dir,
            outline_cache: Arc::default(),
        }
    }

    /// Outline rings of `file` under the outline directory.
    ///
    /// Each file is parsed once; later calls are served from the cache.
    /// Returns `Ok(None)` when no directory is configured or the file does
    /// not exist.
    pub fn outline_file(&self, file: &Path) -> PlotResult<Option<Vec<Ring>>> {
        let Some(dir) = &self.outline_dir else {
            return Ok(None);
        };
        let path = dir.join(file);
        let mut cache = self
            .outline_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(rings) = cache.get(&path) {
            return Ok(Some(rings.clone()));
        }
        if !path.exists() {
            return Ok(None);
        }
        let layer = BoundaryLayer::from_path(&path)?;
        let rings = outlines(layer.features());
        debug!(path = ?path, rings = rings.len(), "Outline file cached");
        cache.insert(path, rings.clone());
        Ok(Some(rings))
    }

    /// Load the boundary layer from `path` when one is given.
    pub fn load(path: Option<&Path>, outline_dir: Option<PathBuf>) -> PlotResult<Self> {
        let layer = match path {
            Some(path) => {
                let layer = BoundaryLayer::from_path(path)?;
                info!(path = ?path, features = layer.len(), "Boundary layer ready");
                Some(layer)
            }
            None => None,
        };
        Ok(Self::new(layer, outline_dir))
    }
}
