//! Contour line (isoline) rendering using marching squares algorithm.
//!
//! Segments come out in fractional grid index space and are mapped onto the
//! canvas through the grid's coordinate axes.

use netcdf_parser::Grid2D;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::colormap::Color;
use crate::viewport::Viewport;

/// A point in fractional grid index space (x = column, y = row)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A line segment between two points
#[derive(Debug, Clone)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// Configuration for contour rendering
#[derive(Debug, Clone)]
pub struct ContourConfig {
    /// Contour levels to draw
    pub levels: Vec<f32>,
    /// Line width in pixels
    pub line_width: f32,
    pub line_color: Color,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            levels: vec![],
            line_width: 0.5,
            line_color: Color::BLACK,
        }
    }
}

/// Marching squares algorithm to generate contour lines
///
/// # Arguments
/// * `data` - Grid data in row-major order
/// * `width` - Grid width
/// * `height` - Grid height
/// * `level` - Contour level to extract
///
/// # Returns
/// Vector of line segments representing the contour
pub fn march_squares(data: &[f32], width: usize, height: usize, level: f32) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height {
        return vec![];
    }

    let mut segments = Vec::new();

    for y in 0..(height - 1) {
        for x in 0..(width - 1) {
            let tl = data[y * width + x];
            let tr = data[y * width + x + 1];
            let bl = data[(y + 1) * width + x];
            let br = data[(y + 1) * width + x + 1];

            // Cells touching land have no contour
            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut cell_index = 0;
            if tl >= level {
                cell_index |= 1;
            }
            if tr >= level {
                cell_index |= 2;
            }
            if br >= level {
                cell_index |= 4;
            }
            if bl >= level {
                cell_index |= 8;
            }

            let corners = Corners { tl, tr, br, bl };
            segments.extend(get_cell_segments(cell_index, x as f32, y as f32, &corners, level));
        }
    }

    segments
}

struct Corners {
    tl: f32,
    tr: f32,
    br: f32,
    bl: f32,
}

/// Line segments for one marching squares cell, with the crossing point on
/// each edge found by linear interpolation.
fn get_cell_segments(cell_index: u8, x: f32, y: f32, c: &Corners, level: f32) -> Vec<Segment> {
    let top = interpolate_edge((x, y), (x + 1.0, y), c.tl, c.tr, level);
    let right = interpolate_edge((x + 1.0, y), (x + 1.0, y + 1.0), c.tr, c.br, level);
    let bottom = interpolate_edge((x, y + 1.0), (x + 1.0, y + 1.0), c.bl, c.br, level);
    let left = interpolate_edge((x, y), (x, y + 1.0), c.tl, c.bl, level);

    let seg = |start, end| Segment { start, end };
    match cell_index {
        0 | 15 => vec![],
        1 | 14 => vec![seg(left, top)],
        2 | 13 => vec![seg(top, right)],
        3 | 12 => vec![seg(left, right)],
        4 | 11 => vec![seg(right, bottom)],
        // Saddles
        5 => vec![seg(left, top), seg(right, bottom)],
        10 => vec![seg(top, right), seg(left, bottom)],
        6 | 9 => vec![seg(top, bottom)],
        7 | 8 => vec![seg(left, bottom)],
        _ => vec![],
    }
}

/// Linearly interpolate between two edge points based on data values
fn interpolate_edge(p1: (f32, f32), p2: (f32, f32), val1: f32, val2: f32, level: f32) -> Point {
    if (val2 - val1).abs() < 1e-6 {
        return Point::new((p1.0 + p2.0) / 2.0, (p1.1 + p2.1) / 2.0);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);

    Point::new(p1.0 + t * (p2.0 - p1.0), p1.1 + t * (p2.1 - p1.1))
}

/// Coordinate at a fractional index along an axis.
fn axis_value(axis: &[f64], pos: f32) -> f64 {
    let last = axis.len().saturating_sub(1);
    let i0 = (pos.floor().max(0.0) as usize).min(last);
    let i1 = (i0 + 1).min(last);
    let frac = (pos as f64 - i0 as f64).clamp(0.0, 1.0);
    axis[i0] + (axis[i1] - axis[i0]) * frac
}

/// Generate segments for every configured level.
pub fn generate_all_contours(grid: &Grid2D, config: &ContourConfig) -> Vec<(f32, Vec<Segment>)> {
    config
        .levels
        .iter()
        .map(|&level| {
            (
                level,
                march_squares(&grid.data, grid.width(), grid.height(), level),
            )
        })
        .collect()
}

/// Stroke the isolines of `grid` onto the canvas. Returns the number of
/// segments drawn.
pub fn render_contours(pixmap: &mut Pixmap, grid: &Grid2D, viewport: &Viewport, config: &ContourConfig) -> usize {
    if grid.width() < 2 || grid.height() < 2 {
        return 0;
    }

    let mut pb = PathBuilder::new();
    let mut count = 0;
    for (_, segments) in generate_all_contours(grid, config) {
        for seg in segments {
            let (x0, y0) = viewport.to_pixel(
                axis_value(&grid.lon, seg.start.x),
                axis_value(&grid.lat, seg.start.y),
            );
            let (x1, y1) = viewport.to_pixel(
                axis_value(&grid.lon, seg.end.x),
                axis_value(&grid.lat, seg.end.y),
            );
            pb.move_to(x0, y0);
            pb.line_to(x1, y1);
            count += 1;
        }
    }

    let Some(path) = pb.finish() else {
        return 0;
    };

    let mut paint = Paint::default();
    let c = config.line_color;
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = true;

    let stroke = Stroke {
        width: config.line_width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_cell_crossing() {
        // 2x2: left column 0, right column 2; level 1 crosses mid-cell
        let data = [0.0, 2.0, 0.0, 2.0];
        let segments = march_squares(&data, 2, 2, 1.0);
        assert_eq!(segments.len(), 1);
        let seg = &segments[0];
        assert!((seg.start.x - 0.5).abs() < 1e-6);
        assert!((seg.end.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_nan_cells_skipped() {
        let data = [0.0, 2.0, f32::NAN, 2.0];
        assert!(march_squares(&data, 2, 2, 1.0).is_empty());
    }

    #[test]
    fn test_axis_value_interpolates() {
        let axis = [10.0, 12.0, 14.0];
        assert_eq!(axis_value(&axis, 0.0), 10.0);
        assert_eq!(axis_value(&axis, 1.5), 13.0);
        assert_eq!(axis_value(&axis, 2.0), 14.0);
    }
}
