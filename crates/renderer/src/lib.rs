//! Map rendering for ocean forecast fields.
//!
//! Implements the pieces of a forecast map:
//! - Filled fields binned through a color scale
//! - Quiver-style direction arrows
//! - Contour lines (marching squares)
//! - Graticule, outlines, color bars and text annotations
//! - PNG encoding

pub mod arrows;
pub mod colorbar;
pub mod colormap;
pub mod contour;
pub mod error;
pub mod frame;
pub mod layout;
pub mod png;
pub mod text;
pub mod viewport;

pub use colormap::{Color, ColorMode, Colormap, Extend};
pub use error::{RendererError, RendererResult};
pub use layout::{render_map, ArrowField, Layout, MapSpec};
pub use png::write_png;
pub use text::{Fonts, DEFAULT_FONT_PATH};
pub use viewport::Viewport;
