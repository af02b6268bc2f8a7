//! Region catalogue.
//!
//! Two region sets are defined in `regions.yaml`: `wilpro` (provincial
//! waters, extents taken from the boundary layer) and `wilpel` (maritime
//! stations with fixed boxes). The order of each list is the batch order.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ofs_common::{BoundingBox, PlotError, PlotResult};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::boundary::{self, Boundaries, Ring};

const BUILTIN_REGIONS: &str = include_str!("../../../config/regions.yaml");

/// Named set of regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionSet {
    /// Provincial waters
    #[default]
    Wilpro,
    /// Maritime stations
    Wilpel,
}

impl RegionSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionSet::Wilpro => "wilpro",
            RegionSet::Wilpel => "wilpel",
        }
    }
}

impl fmt::Display for RegionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wilpro" => Ok(RegionSet::Wilpro),
            "wilpel" => Ok(RegionSet::Wilpel),
            other => Err(format!("unknown region set '{}'", other)),
        }
    }
}

/// Degrees added around boundary bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Pad {
    #[serde(default)]
    pub west: f64,
    #[serde(default)]
    pub east: f64,
    #[serde(default)]
    pub south: f64,
    #[serde(default)]
    pub north: f64,
}

/// Where a region's map extent comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Extent {
    Fixed(BoundingBox),
    /// Total bounds of the named waters, padded
    Boundary { waters: Vec<String>, pad: Pad },
}

/// Which outline, if any, is drawn over the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    None,
    /// Features of the boundary layer selected by waters name
    Waters(Vec<String>),
    /// Standalone GeoJSON file relative to the outline directory
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionDef {
    pub name: String,
    pub title: String,
    pub set: RegionSet,
    pub extent: Extent,
    pub outline: Outline,
    /// Arrow scale; larger values draw shorter arrows
    pub arrow_scale: f64,
    /// Every n-th grid point gets an arrow
    pub arrow_density: usize,
    /// Degrees between graticule lines
    pub label_spacing: f64,
    /// Part of a full batch run
    pub in_batch: bool,
}

/// A region with its extent and outlines worked out.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRegion {
    pub name: String,
    pub title: String,
    pub bbox: BoundingBox,
    pub outlines: Vec<Ring>,
    pub arrow_scale: f64,
    pub arrow_density: usize,
    pub label_spacing: f64,
}

impl RegionDef {
    /// Work out the map extent and outlines against the loaded boundaries.
    pub fn resolve(&self, boundaries: &Boundaries) -> PlotResult<ResolvedRegion> {
        let bbox = match &self.extent {
            Extent::Fixed(bbox) => *bbox,
            Extent::Boundary { waters, pad } => {
                let layer = boundaries.layer.as_ref().ok_or_else(|| {
                    PlotError::BoundaryNotFound {
                        region: self.name.clone(),
                        message: "no boundary layer loaded".to_string(),
                    }
                })?;
                let bounds = boundary::total_bounds(layer.select(waters)).ok_or_else(|| {
                    PlotError::BoundaryNotFound {
                        region: self.name.clone(),
                        message: format!("no features named {:?}", waters),
                    }
                })?;
                bounds.padded(pad.west, pad.east, pad.south, pad.north)
            }
        };

        Ok(ResolvedRegion {
            name: self.name.clone(),
            title: self.title.clone(),
            bbox,
            outlines: self.outlines(boundaries)?,
            arrow_scale: self.arrow_scale,
            arrow_density: self.arrow_density,
            label_spacing: self.label_spacing,
        })
    }

    fn outlines(&self, boundaries: &Boundaries) -> PlotResult<Vec<Ring>> {
        match &self.outline {
            Outline::None => Ok(Vec::new()),
            Outline::Waters(waters) => match &boundaries.layer {
                Some(layer) => Ok(boundary::outlines(layer.select(waters))),
                None => {
                    warn!(region = %self.name, "No boundary layer loaded, drawing without outline");
                    Ok(Vec::new())
                }
            },
            Outline::File(file) => {
                if boundaries.outline_dir.is_none() {
                    debug!(region = %self.name, "No outline directory configured");
                    return Ok(Vec::new());
                }
                match boundaries.outline_file(file)? {
                    Some(rings) => Ok(rings),
                    None => {
                        warn!(region = %self.name, file = ?file, "Outline file not found");
                        Ok(Vec::new())
                    }
                }
            }
        }
    }
}

/// Output directory name for a region title.
///
/// `DKI Jakarta - Jawa Barat` becomes `dki_jakarta_jawa_barat`, `Kep. Riau`
/// becomes `kep_riau`.
pub fn region_slug(title: &str) -> String {
    title
        .to_lowercase()
        .replace(" - ", "_")
        .replace('.', "")
        .replace(' ', "_")
}

#[derive(Debug, Deserialize)]
struct YamlRegionFile {
    #[serde(default)]
    wilpro: Vec<YamlRegion>,
    #[serde(default)]
    wilpel: Vec<YamlRegion>,
}

#[derive(Debug, Deserialize)]
struct YamlRegion {
    name: String,
    title: String,
    #[serde(default)]
    lon: Option<[f64; 2]>,
    #[serde(default)]
    lat: Option<[f64; 2]>,
    #[serde(default)]
    waters: Option<Vec<String>>,
    #[serde(default)]
    pad: Option<Pad>,
    #[serde(default)]
    outline: Option<bool>,
    #[serde(default)]
    outline_file: Option<String>,
    sv: f64,
    density: usize,
    spacing: f64,
    #[serde(default = "default_batch")]
    batch: bool,
}

fn default_batch() -> bool {
    true
}

impl YamlRegion {
    fn into_def(self, set: RegionSet) -> PlotResult<RegionDef> {
        let bad = |msg: &str| PlotError::Config(format!("region '{}': {}", self.name, msg));

        if self.density == 0 {
            return Err(bad("density must be at least 1"));
        }
        if self.sv <= 0.0 || self.spacing <= 0.0 {
            return Err(bad("sv and spacing must be positive"));
        }

        let extent = match (self.lon, self.lat) {
            (Some(lon), Some(lat)) => {
                let bbox = BoundingBox::from_lon_lat(lon, lat);
                if !bbox.is_valid() {
                    return Err(bad("empty lon/lat box"));
                }
                Extent::Fixed(bbox)
            }
            (None, None) => Extent::Boundary {
                waters: self
                    .waters
                    .clone()
                    .unwrap_or_else(|| vec![self.title.clone()]),
                pad: self.pad.unwrap_or_default(),
            },
            _ => return Err(bad("lon and lat must be given together")),
        };

        let outline = if self.outline == Some(false) {
            Outline::None
        } else if let Some(file) = &self.outline_file {
            Outline::File(PathBuf::from(file))
        } else {
            match &extent {
                Extent::Boundary { waters, .. } => Outline::Waters(waters.clone()),
                Extent::Fixed(_) => match &self.waters {
                    Some(waters) => Outline::Waters(waters.clone()),
                    None => Outline::None,
                },
            }
        };

        Ok(RegionDef {
            name: self.name,
            title: self.title,
            set,
            extent,
            outline,
            arrow_scale: self.sv,
            arrow_density: self.density,
            label_spacing: self.spacing,
            in_batch: self.batch,
        })
    }
}

/// Registry of both region sets.
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    wilpro: Vec<RegionDef>,
    wilpel: Vec<RegionDef>,
}

impl RegionCatalog {
    /// Catalogue compiled into the binary.
    pub fn builtin() -> PlotResult<Self> {
        Self::from_yaml_str(BUILTIN_REGIONS)
    }

    /// Load `regions.yaml` from a config directory, falling back to the
    /// built-in catalogue when the file does not exist.
    pub fn load_from_directory<P: AsRef<Path>>(config_dir: P) -> PlotResult<Self> {
        let path = config_dir.as_ref().join("regions.yaml");
        if !path.exists() {
            warn!(path = ?path, "Region catalogue not found, using built-in");
            return Self::builtin();
        }
        let contents = fs::read_to_string(&path)?;
        let catalog = Self::from_yaml_str(&contents)?;
        debug!(
            path = ?path,
            wilpro = catalog.wilpro.len(),
            wilpel = catalog.wilpel.len(),
            "Loaded region catalogue"
        );
        Ok(catalog)
    }

    pub fn from_yaml_str(contents: &str) -> PlotResult<Self> {
        let yaml: YamlRegionFile = serde_yaml::from_str(contents)?;
        Ok(Self {
            wilpro: convert_set(yaml.wilpro, RegionSet::Wilpro)?,
            wilpel: convert_set(yaml.wilpel, RegionSet::Wilpel)?,
        })
    }

    /// All regions of a set, in catalogue order.
    pub fn regions(&self, set: RegionSet) -> &[RegionDef] {
        match set {
            RegionSet::Wilpro => &self.wilpro,
            RegionSet::Wilpel => &self.wilpel,
        }
    }

    /// Look up a region by name, ignoring case.
    pub fn get(&self, set: RegionSet, name: &str) -> PlotResult<&RegionDef> {
        self.regions(set)
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| PlotError::RegionNotFound(format!("{}/{}", set, name)))
    }

    /// Names of the regions a full batch run plots, in order.
    pub fn names(&self, set: RegionSet) -> Vec<&str> {
        self.regions(set)
            .iter()
            .filter(|r| r.in_batch)
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Look up and resolve a region in one step.
    pub fn resolve(
        &self,
        set: RegionSet,
        name: &str,
        boundaries: &Boundaries,
    ) -> PlotResult<ResolvedRegion> {
        self.get(set, name)?.resolve(boundaries)
    }
}

fn convert_set(regions: Vec<YamlRegion>, set: RegionSet) -> PlotResult<Vec<RegionDef>> {
    let mut defs: Vec<RegionDef> = Vec::with_capacity(regions.len());
    for region in regions {
        let def = region.into_def(set)?;
        if defs.iter().any(|d| d.name.eq_ignore_ascii_case(&def.name)) {
            return Err(PlotError::Config(format!(
                "region '{}' is defined twice in {}",
                def.name, set
            )));
        }
        defs.push(def);
    }
    Ok(defs)
}
