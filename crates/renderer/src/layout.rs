//! Full map composition: panel, furniture, annotations and color bar.
//!
//! Vector drawing goes onto a tiny-skia canvas first; the result is then
//! copied into an `RgbaImage` for text, which always sits on top.

use catalog::{ColorScale, ResolvedRegion, Ring, VariableDef, VariableKind};
use chrono::{Datelike, Utc};
use image::{Rgba, RgbaImage};
use netcdf_parser::Grid2D;
use ofs_common::{BoundingBox, ForecastStep};
use tiny_skia::{IntSize, Pixmap, PixmapPaint, Transform};
use tracing::debug;

use crate::arrows::{draw_legend_arrow, render_arrows, ArrowConfig};
use crate::colorbar::{Colorbar, Orientation};
use crate::colormap::{render_filled, Color, ColorMode, Colormap};
use crate::contour::{render_contours, ContourConfig};
use crate::error::{RendererError, RendererResult};
use crate::frame::{
    draw_border, draw_graticule, draw_outlines, fill_panel, format_lat, format_lon, graticule_ticks,
};
use crate::text::{format_g, Fonts, HAlign, TextStyle, VAlign};
use crate::viewport::Viewport;

/// Longer side of the map panel in pixels (10 inches at 100 dpi).
pub const MAP_SIZE: u32 = 1000;

pub const HEADER_LINE: &str = "BADAN METEOROLOGI KLIMATOLOGI DAN GEOFISIKA";
pub const FOOTER_SOURCE: &str = "Source: BMKG Ocean Forecast System (BMKG-OFS)";
pub const WARNING_SOURCE: &str = "Source: INAWAVES";

const MARGIN_LEFT: u32 = 70;
const MARGIN_RIGHT: u32 = 40;
const MARGIN_RIGHT_WARNING: u32 = 200;
const HEADER_HEIGHT: u32 = 80;
const FOOTER_HEIGHT: u32 = 160;
const FOOTER_HEIGHT_WARNING: u32 = 40;

const TITLE_SIZE: f32 = 15.0;
const INFO_SIZE: f32 = 13.0;
const TICK_SIZE: f32 = 11.0;
const FOOTER_SIZE: f32 = 10.0;

const COLORBAR_THICKNESS: f32 = 16.0;
const VERTICAL_BAR_WIDTH: f32 = 20.0;
const LEGEND_ARROW_LENGTH: f32 = 24.0;

/// U/V arrow components on the same grid as the colored field.
#[derive(Debug, Clone, Copy)]
pub struct ArrowField<'a> {
    pub u: &'a Grid2D,
    pub v: &'a Grid2D,
}

/// Everything one map image needs.
#[derive(Debug, Clone)]
pub struct MapSpec<'a> {
    pub kind: VariableKind,
    pub title: String,
    pub area: String,
    pub bbox: BoundingBox,
    pub outlines: &'a [Ring],
    /// Degrees between graticule lines
    pub label_spacing: f64,
    pub arrow_scale: f64,
    pub arrow_density: usize,
    pub scale: &'a ColorScale,
    pub magnitude: &'a Grid2D,
    pub arrows: Option<ArrowField<'a>>,
    pub step: ForecastStep,
    pub colorbar_label: String,
    pub unit: String,
    pub direction_label: Option<String>,
    /// Year in the copyright line
    pub created_year: i32,
}

impl<'a> MapSpec<'a> {
    pub fn new(
        region: &'a ResolvedRegion,
        variable: &VariableDef,
        scale: &'a ColorScale,
        magnitude: &'a Grid2D,
        step: ForecastStep,
    ) -> Self {
        Self {
            kind: variable.kind,
            title: variable.figtitle.clone(),
            area: region.title.clone(),
            bbox: region.bbox,
            outlines: &region.outlines,
            label_spacing: region.label_spacing,
            arrow_scale: region.arrow_scale,
            arrow_density: region.arrow_density,
            scale,
            magnitude,
            arrows: None,
            step,
            colorbar_label: variable.colorbar_label(),
            unit: variable.unit.clone(),
            direction_label: variable.dirtitle.clone(),
            created_year: Utc::now().year(),
        }
    }

    pub fn with_arrows(mut self, u: &'a Grid2D, v: &'a Grid2D) -> Self {
        self.arrows = Some(ArrowField { u, v });
        self
    }

    fn is_warning(&self) -> bool {
        self.kind == VariableKind::Warning
    }

    /// Palette spreading and extension of this map.
    pub fn color_mode(&self) -> ColorMode {
        ColorMode::for_plot(self.kind, self.arrows.is_some())
    }

    /// Upper-left header block.
    pub fn header_text(&self) -> String {
        if self.is_warning() {
            format!("{}\n{}", self.title.to_uppercase(), self.step.warning_period())
        } else {
            format!("{}\n{}\n{}", HEADER_LINE, self.title, self.area)
        }
    }

    /// Upper-right info block.
    pub fn info_text(&self) -> String {
        if self.is_warning() {
            format!("{}\n{}", self.area, WARNING_SOURCE)
        } else {
            format!("{}\n{}", self.step.initial_label(), self.step.valid_label())
        }
    }

    pub fn footer_text(&self) -> String {
        format!(
            "{}\nCreated by Center for Marine Meteorology. ©{}",
            FOOTER_SOURCE, self.created_year
        )
    }
}

/// Canvas geometry for one map.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub map: Viewport,
}

impl Layout {
    pub fn compute(bbox: &BoundingBox, kind: VariableKind) -> Self {
        let (map_w, map_h) = Viewport::fit(bbox, MAP_SIZE);
        let (right, footer) = if kind == VariableKind::Warning {
            (MARGIN_RIGHT_WARNING, FOOTER_HEIGHT_WARNING)
        } else {
            (MARGIN_RIGHT, FOOTER_HEIGHT)
        };
        Self {
            width: MARGIN_LEFT + map_w + right,
            height: HEADER_HEIGHT + map_h + footer,
            map: Viewport::new(
                *bbox,
                MARGIN_LEFT as f32,
                HEADER_HEIGHT as f32,
                map_w,
                map_h,
            ),
        }
    }

    fn colorbar<'c>(&self, colormap: &'c Colormap, kind: VariableKind) -> Colorbar<'c> {
        let map = &self.map;
        if kind == VariableKind::Warning {
            Colorbar::new(
                colormap,
                map.right() + 6.0,
                map.y,
                VERTICAL_BAR_WIDTH,
                map.height as f32,
                Orientation::Vertical,
            )
        } else {
            let half = map.width as f32 / 2.0;
            // Leave room for the extension triangles inside the panel width
            let length = half / 1.1;
            Colorbar::new(
                colormap,
                map.x + half,
                map.bottom() + 56.0,
                length,
                COLORBAR_THICKNESS,
                Orientation::Horizontal,
            )
        }
    }
}

/// Render one complete map image.
pub fn render_map(spec: &MapSpec<'_>, fonts: &Fonts) -> RendererResult<RgbaImage> {
    let grid = spec.magnitude;
    if grid.width() == 0 || grid.height() == 0 || grid.data.len() != grid.width() * grid.height() {
        return Err(RendererError::InvalidGrid { name: "magnitude" });
    }
    if !spec.bbox.is_valid() {
        return Err(RendererError::CanvasSize {
            width: 0,
            height: 0,
        });
    }

    let layout = Layout::compute(&spec.bbox, spec.kind);
    let map = layout.map;
    let mut pixmap = Pixmap::new(layout.width, layout.height).ok_or(RendererError::CanvasSize {
        width: layout.width,
        height: layout.height,
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let colormap = Colormap::new(spec.scale, spec.color_mode());

    // Field layer
    fill_panel(&mut pixmap, &map, Color::WHITE);
    let field = render_filled(grid, &map, &colormap, Color::LAND);
    let size = IntSize::from_wh(map.width, map.height).ok_or(RendererError::CanvasSize {
        width: map.width,
        height: map.height,
    })?;
    let field = Pixmap::from_vec(field, size).ok_or(RendererError::CanvasSize {
        width: map.width,
        height: map.height,
    })?;
    pixmap.draw_pixmap(
        map.x as i32,
        map.y as i32,
        field.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );

    if spec.is_warning() {
        let config = ContourConfig {
            levels: spec.scale.levels.iter().map(|&l| l as f32).collect(),
            ..Default::default()
        };
        let segments = render_contours(&mut pixmap, grid, &map, &config);
        debug!(segments, "Drew warning contours");
    }

    draw_outlines(&mut pixmap, &map, spec.outlines, Color::BLACK, 1.0);
    draw_graticule(&mut pixmap, &map, spec.label_spacing, Color::WHITE, 0.5);

    let arrow_config = ArrowConfig::new(spec.arrow_scale, spec.arrow_density);
    if let Some(arrows) = spec.arrows {
        let drawn = render_arrows(&mut pixmap, arrows.u, arrows.v, &map, &arrow_config)?;
        debug!(arrows = drawn, "Drew direction arrows");
    }

    draw_border(&mut pixmap, &map);

    let colorbar = layout.colorbar(&colormap, spec.kind);
    colorbar.draw(&mut pixmap);

    let legend_anchor = (colorbar.x - 70.0, colorbar.y + COLORBAR_THICKNESS / 2.0);
    if spec.arrows.is_some() && spec.direction_label.is_some() {
        draw_legend_arrow(
            &mut pixmap,
            legend_anchor.0,
            legend_anchor.1,
            LEGEND_ARROW_LENGTH,
            &arrow_config,
        );
    }

    let mut img = to_image(&pixmap);
    annotate(&mut img, spec, &layout, &colorbar, legend_anchor, fonts);
    Ok(img)
}

/// Copy a canvas into an image, undoing premultiplied alpha.
fn to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

fn annotate(
    img: &mut RgbaImage,
    spec: &MapSpec<'_>,
    layout: &Layout,
    colorbar: &Colorbar<'_>,
    legend_anchor: (f32, f32),
    fonts: &Fonts,
) {
    let map = &layout.map;

    fonts.draw(
        img,
        &spec.header_text(),
        map.x,
        map.y - 6.0,
        &TextStyle::new(TITLE_SIZE).align(HAlign::Left, VAlign::Bottom),
    );
    fonts.draw(
        img,
        &spec.info_text(),
        map.right(),
        map.y - 6.0,
        &TextStyle::new(INFO_SIZE).align(HAlign::Right, VAlign::Bottom),
    );

    // Degree labels on the left and bottom edges
    let bbox = map.bbox;
    for lon in graticule_ticks(bbox.min_x, bbox.max_x, spec.label_spacing) {
        let (x, _) = map.to_pixel(lon, bbox.min_y);
        fonts.draw(
            img,
            &format_lon(lon),
            x,
            map.bottom() + 4.0,
            &TextStyle::new(TICK_SIZE).align(HAlign::Center, VAlign::Top),
        );
    }
    for lat in graticule_ticks(bbox.min_y, bbox.max_y, spec.label_spacing) {
        let (_, y) = map.to_pixel(bbox.min_x, lat);
        fonts.draw(
            img,
            &format_lat(lat),
            map.x - 5.0,
            y,
            &TextStyle::new(TICK_SIZE).align(HAlign::Right, VAlign::Middle),
        );
    }

    if spec.is_warning() {
        let labels: Vec<String> = spec
            .scale
            .levels
            .iter()
            .map(|&l| format!("{} {}", format_g(l), spec.unit))
            .collect();
        colorbar.draw_tick_labels(img, fonts, &labels, TICK_SIZE);
        colorbar.draw_categories(img, fonts, &spec.scale.categories, TICK_SIZE);
        return;
    }

    let labels: Vec<String> = spec.scale.levels.iter().map(|&l| format_g(l)).collect();
    colorbar.draw_tick_labels(img, fonts, &labels, TICK_SIZE);
    colorbar.draw_title(img, fonts, &spec.colorbar_label, INFO_SIZE);

    if spec.arrows.is_some() {
        if let Some(label) = &spec.direction_label {
            fonts.draw(
                img,
                label,
                legend_anchor.0 - LEGEND_ARROW_LENGTH,
                legend_anchor.1,
                &TextStyle::new(TICK_SIZE).align(HAlign::Right, VAlign::Middle),
            );
        }
    }

    fonts.draw(
        img,
        &spec.footer_text(),
        map.x,
        layout.height as f32 - 8.0,
        &TextStyle::new(FOOTER_SIZE).align(HAlign::Left, VAlign::Bottom),
    );
}
