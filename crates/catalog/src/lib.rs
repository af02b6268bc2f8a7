//! Region and variable catalogues for the ocean forecast plotter.
//!
//! Both catalogues ship as YAML under `config/` and are compiled in; a config
//! directory with the same file names overrides them at runtime.
//!
//! ```ignore
//! use catalog::{Boundaries, RegionCatalog, RegionSet, VariableCatalog};
//!
//! let regions = RegionCatalog::builtin()?;
//! let variables = VariableCatalog::builtin()?;
//! let bali = regions.resolve(RegionSet::Wilpro, "bali", &boundaries)?;
//! let swh = variables.get("swh")?;
//! ```

pub mod boundary;
pub mod region;
pub mod scale;
pub mod variable;

pub use boundary::{outlines, total_bounds, Boundaries, BoundaryFeature, BoundaryLayer, Ring, ALL_WATERS};
pub use region::{
    region_slug, Extent, Outline, Pad, RegionCatalog, RegionDef, RegionSet, ResolvedRegion,
};
pub use scale::{hex_to_rgb, Category, ColorScale, DEFAULT_OVER_COLOR};
pub use variable::{VariableCatalog, VariableDef, VariableKind};
