//! Map furniture: graticule, coastline-style outlines and the panel border.

use catalog::Ring;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::colormap::Color;
use crate::text::format_g;
use crate::viewport::Viewport;

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// Multiples of `spacing` within `[min, max]`.
pub fn graticule_ticks(min: f64, max: f64, spacing: f64) -> Vec<f64> {
    if spacing <= 0.0 || !min.is_finite() || !max.is_finite() || max < min {
        return Vec::new();
    }
    let eps = spacing * 1e-9;
    let first = ((min - eps) / spacing).ceil() as i64;
    let last = ((max + eps) / spacing).floor() as i64;
    (first..=last).map(|k| k as f64 * spacing).collect()
}

/// `105°E`, `20°W`, `0°`
pub fn format_lon(lon: f64) -> String {
    let lon = if lon > 180.0 { lon - 360.0 } else { lon };
    if lon.abs() < 1e-9 || (lon.abs() - 180.0).abs() < 1e-9 {
        format!("{}°", format_g(lon.abs()))
    } else if lon > 0.0 {
        format!("{}°E", format_g(lon))
    } else {
        format!("{}°W", format_g(-lon))
    }
}

/// `5°S`, `10°N`, `0°`
pub fn format_lat(lat: f64) -> String {
    if lat.abs() < 1e-9 {
        "0°".to_string()
    } else if lat > 0.0 {
        format!("{}°N", format_g(lat))
    } else {
        format!("{}°S", format_g(-lat))
    }
}

/// Fill the whole panel with one color.
pub fn fill_panel(pixmap: &mut Pixmap, viewport: &Viewport, color: Color) {
    if let Some(rect) = Rect::from_xywh(
        viewport.x,
        viewport.y,
        viewport.width as f32,
        viewport.height as f32,
    ) {
        pixmap.fill_rect(rect, &paint(color), Transform::identity(), None);
    }
}

/// Thin graticule lines at multiples of `spacing` degrees.
pub fn draw_graticule(pixmap: &mut Pixmap, viewport: &Viewport, spacing: f64, color: Color, width: f32) {
    let bbox = viewport.bbox;
    let mut pb = PathBuilder::new();

    for lon in graticule_ticks(bbox.min_x, bbox.max_x, spacing) {
        let (x, _) = viewport.to_pixel(lon, bbox.max_y);
        pb.move_to(x, viewport.y);
        pb.line_to(x, viewport.bottom());
    }
    for lat in graticule_ticks(bbox.min_y, bbox.max_y, spacing) {
        let (_, y) = viewport.to_pixel(bbox.min_x, lat);
        pb.move_to(viewport.x, y);
        pb.line_to(viewport.right(), y);
    }

    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint(color), &stroke(width), Transform::identity(), None);
    }
}

/// Stroke boundary rings, clipped to the panel.
pub fn draw_outlines(pixmap: &mut Pixmap, viewport: &Viewport, rings: &[Ring], color: Color, width: f32) {
    let mut pb = PathBuilder::new();
    for ring in rings {
        let mut points = ring.iter().map(|&(lon, lat)| viewport.to_pixel(lon, lat));
        let Some((x0, y0)) = points.next() else {
            continue;
        };
        pb.move_to(x0, y0);
        for (x, y) in points {
            pb.line_to(x, y);
        }
    }

    let Some(path) = pb.finish() else {
        return;
    };
    let clip = panel_mask(pixmap, viewport);
    pixmap.stroke_path(
        &path,
        &paint(color),
        &stroke(width),
        Transform::identity(),
        clip.as_ref(),
    );
}

fn panel_mask(pixmap: &Pixmap, viewport: &Viewport) -> Option<tiny_skia::Mask> {
    let mut mask = tiny_skia::Mask::new(pixmap.width(), pixmap.height())?;
    let rect = Rect::from_xywh(
        viewport.x,
        viewport.y,
        viewport.width as f32,
        viewport.height as f32,
    )?;
    let path = PathBuilder::from_rect(rect);
    mask.fill_path(&path, tiny_skia::FillRule::Winding, false, Transform::identity());
    Some(mask)
}

/// Black frame around the panel.
pub fn draw_border(pixmap: &mut Pixmap, viewport: &Viewport) {
    if let Some(rect) = Rect::from_xywh(
        viewport.x,
        viewport.y,
        viewport.width as f32,
        viewport.height as f32,
    ) {
        let path = PathBuilder::from_rect(rect);
        let mut s = stroke(1.0);
        s.line_join = LineJoin::Miter;
        pixmap.stroke_path(&path, &paint(Color::BLACK), &s, Transform::identity(), None);
    }
}
