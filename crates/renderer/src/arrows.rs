//! Quiver-style direction arrows drawn with tiny-skia.
//!
//! Arrow length is proportional to the vector magnitude: a vector of length
//! `scale` spans one inch. Head dimensions are multiples of the shaft width,
//! and arrows pivot about their midpoint.

use std::f64::consts::PI;

use netcdf_parser::Grid2D;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

use crate::colormap::Color;
use crate::error::{RendererError, RendererResult};
use crate::viewport::Viewport;

/// Output resolution the arrow geometry is expressed against.
pub const PIXELS_PER_INCH: f32 = 100.0;

/// Arrow geometry and color.
#[derive(Debug, Clone)]
pub struct ArrowConfig {
    /// Vector length that spans one inch
    pub scale: f32,
    /// Every n-th grid point, along both axes, gets an arrow
    pub density: usize,
    /// Shaft width in pixels
    pub shaft_width: f32,
    /// Head width, in shaft widths
    pub head_width: f32,
    /// Head length, in shaft widths
    pub head_length: f32,
    /// Head length where it meets the shaft, in shaft widths
    pub head_axis_length: f32,
    pub color: Color,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            scale: 16.0,
            density: 5,
            shaft_width: 1.0,
            head_width: 5.5,
            head_length: 6.0,
            head_axis_length: 4.0,
            color: Color::BLACK,
        }
    }
}

impl ArrowConfig {
    pub fn new(scale: f64, density: usize) -> Self {
        Self {
            scale: scale as f32,
            density: density.max(1),
            ..Default::default()
        }
    }

    /// Arrow length in pixels for a vector.
    pub fn length_px(&self, u: f32, v: f32) -> f32 {
        (u * u + v * v).sqrt() / self.scale * PIXELS_PER_INCH
    }
}

/// Convert U and V components to speed and the direction the vector points
/// TO, in radians clockwise from north.
pub fn uv_to_speed_direction(u: f32, v: f32) -> (f64, f64) {
    let u = u as f64;
    let v = v as f64;

    let speed = (u * u + v * v).sqrt();

    let mut direction = u.atan2(v);

    // Normalize to [0, 2π)
    if direction < 0.0 {
        direction += 2.0 * PI;
    }

    (speed, direction)
}

/// Fixed-length arrow components for a heading in degrees clockwise from
/// north.
pub fn direction_to_uv(degrees: f32, length: f32) -> (f32, f32) {
    let theta = degrees.to_radians();
    (length * theta.sin(), length * theta.cos())
}

/// Grid indices that get an arrow: every `density`-th point from the origin.
pub fn arrow_positions(width: usize, height: usize, density: usize) -> Vec<(usize, usize)> {
    let step = density.max(1);
    let mut positions = Vec::new();
    for j in (0..height).step_by(step) {
        for i in (0..width).step_by(step) {
            positions.push((j, i));
        }
    }
    positions
}

/// Outline of an arrow pointing along +x with its midpoint at the origin.
fn arrow_outline(length: f32, config: &ArrowConfig) -> Vec<(f32, f32)> {
    let w = config.shaft_width;
    let mut head_length = config.head_length * w;
    let mut head_axis = config.head_axis_length * w;
    let mut head_half = config.head_width * w / 2.0;

    // Short arrows shrink their head so it never overshoots the tail
    if length < head_length {
        let k = length / head_length;
        head_length *= k;
        head_axis *= k;
        head_half *= k;
    }

    let tip = length / 2.0;
    let tail = -length / 2.0;
    let base = tip - head_length;
    let notch = tip - head_axis;
    let shaft_half = w / 2.0;

    vec![
        (tail, -shaft_half),
        (notch, -shaft_half),
        (base, -head_half),
        (tip, 0.0),
        (base, head_half),
        (notch, shaft_half),
        (tail, shaft_half),
    ]
}

/// Add one arrow centred at (`x`, `y`) pointing along the screen vector
/// (`dx`, `dy`) to `pb`.
fn push_arrow(pb: &mut PathBuilder, x: f32, y: f32, dx: f32, dy: f32, length: f32, config: &ArrowConfig) {
    let norm = (dx * dx + dy * dy).sqrt();
    if norm == 0.0 || length <= 0.0 {
        return;
    }
    let (cos, sin) = (dx / norm, dy / norm);
    let outline = arrow_outline(length, config);

    for (k, &(ax, ay)) in outline.iter().enumerate() {
        let px = x + ax * cos - ay * sin;
        let py = y + ax * sin + ay * cos;
        if k == 0 {
            pb.move_to(px, py);
        } else {
            pb.line_to(px, py);
        }
    }
    pb.close();
}

fn arrow_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

/// Draw arrows for a U/V field onto the canvas.
///
/// Points outside the viewport, missing components and zero vectors are
/// skipped. Returns the number of arrows drawn.
pub fn render_arrows(
    pixmap: &mut Pixmap,
    u: &Grid2D,
    v: &Grid2D,
    viewport: &Viewport,
    config: &ArrowConfig,
) -> RendererResult<usize> {
    if u.width() != v.width() || u.height() != v.height() {
        return Err(RendererError::ArrowShape {
            u_w: u.width(),
            u_h: u.height(),
            v_w: v.width(),
            v_h: v.height(),
        });
    }

    let mut pb = PathBuilder::new();
    let mut drawn = 0;

    for (j, i) in arrow_positions(u.width(), u.height(), config.density) {
        let (uu, vv) = (u.get(j, i), v.get(j, i));
        if !uu.is_finite() || !vv.is_finite() || (uu == 0.0 && vv == 0.0) {
            continue;
        }
        let (x, y) = viewport.to_pixel(u.lon[i], u.lat[j]);
        if !viewport.contains(x, y) {
            continue;
        }
        // Screen y grows downward
        push_arrow(&mut pb, x, y, uu, -vv, config.length_px(uu, vv), config);
        drawn += 1;
    }

    if let Some(path) = pb.finish() {
        pixmap.fill_path(
            &path,
            &arrow_paint(config.color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    Ok(drawn)
}

/// Draw a single legend arrow of `length` pixels centred at (`x`, `y`).
pub fn draw_legend_arrow(pixmap: &mut Pixmap, x: f32, y: f32, length: f32, config: &ArrowConfig) {
    let mut pb = PathBuilder::new();
    push_arrow(&mut pb, x, y, 2.0, -1.0, length, config);
    if let Some(path) = pb.finish() {
        pixmap.fill_path(
            &path,
            &arrow_paint(config.color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_to_speed_direction() {
        let (speed, dir) = uv_to_speed_direction(0.0, 5.0);
        assert!((speed - 5.0).abs() < 1e-9);
        assert!(dir.abs() < 1e-9);

        let (_, dir) = uv_to_speed_direction(3.0, 0.0);
        assert!((dir - PI / 2.0).abs() < 1e-9);

        let (_, dir) = uv_to_speed_direction(-1.0, 0.0);
        assert!((dir - 3.0 * PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_direction_to_uv() {
        let (u, v) = direction_to_uv(90.0, 2.0);
        assert!((u - 2.0).abs() < 1e-6);
        assert!(v.abs() < 1e-6);

        let (u, v) = direction_to_uv(180.0, 2.0);
        assert!(u.abs() < 1e-6);
        assert!((v + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_arrow_positions_start_at_origin() {
        let positions = arrow_positions(10, 7, 3);
        assert_eq!(positions.len(), 4 * 3);
        assert_eq!(positions[0], (0, 0));
        assert_eq!(positions[1], (0, 3));
        assert!(positions.contains(&(6, 9)));
    }

    #[test]
    fn test_length_scales_with_magnitude() {
        let config = ArrowConfig::new(16.0, 5);
        assert!((config.length_px(0.0, 2.0) - 12.5).abs() < 1e-4);
        assert!((config.length_px(0.0, 4.0) - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_short_arrow_head_shrinks() {
        let config = ArrowConfig::default();
        let outline = arrow_outline(3.0, &config);
        let tail = outline[0].0;
        let base = outline[2].0;
        assert!(base >= tail);
    }
}
