//! Filled rendering of gridded fields through a color scale.

use catalog::{ColorScale, VariableKind};
use netcdf_parser::Grid2D;
use rayon::prelude::*;

use crate::viewport::Viewport;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    /// Land and missing cells
    pub const LAND: Color = Color::new(128, 128, 128, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    let mix = |a: u8, b: u8| ((a as f32 * t_inv) + (b as f32 * t)).round() as u8;
    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Which ends of a scale are painted when values fall outside its levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extend {
    Neither,
    Min,
    Max,
    Both,
}

impl Extend {
    pub fn has_min(&self) -> bool {
        matches!(self, Extend::Min | Extend::Both)
    }

    pub fn has_max(&self) -> bool {
        matches!(self, Extend::Max | Extend::Both)
    }
}

/// How the palette of a scale is spread over its intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Palette entry `k` fills interval `k`; a spare entry past the last
    /// interval colors values above the top level.
    Discrete,
    /// The palette is a continuous ramp sampled once per interval.
    Continuous,
    /// The palette is a listed map sampled at each interval midpoint.
    Listed,
}

impl ColorMode {
    /// Mode of a map: warnings are listed, maps with direction arrows use
    /// the palette as is, plain scalar maps use it as a ramp.
    pub fn for_plot(kind: VariableKind, has_arrows: bool) -> Self {
        match (kind, has_arrows) {
            (VariableKind::Warning, _) => ColorMode::Listed,
            (_, true) => ColorMode::Discrete,
            (_, false) => ColorMode::Continuous,
        }
    }

    /// Ends of the scale painted in this mode.
    pub fn extend(&self) -> Extend {
        match self {
            ColorMode::Discrete => Extend::Max,
            ColorMode::Continuous => Extend::Both,
            ColorMode::Listed => Extend::Neither,
        }
    }
}

/// A color scale resolved to one color per interval.
#[derive(Debug, Clone)]
pub struct Colormap {
    scale: ColorScale,
    interval_colors: Vec<Color>,
    over: Option<Color>,
    under: Option<Color>,
}

impl Colormap {
    pub fn new(scale: &ColorScale, mode: ColorMode) -> Self {
        let n = scale.interval_count();
        let palette: Vec<Color> = scale.colors.iter().copied().map(Color::rgb).collect();
        let last = palette.last().copied().unwrap_or(Color::BLACK);

        let interval_colors: Vec<Color> = match mode {
            ColorMode::Discrete => (0..n)
                .map(|k| palette.get(k).copied().unwrap_or(last))
                .collect(),
            ColorMode::Continuous => (0..n)
                .map(|k| {
                    let t = if n > 1 { k as f32 / (n - 1) as f32 } else { 0.0 };
                    sample_ramp(&palette, t)
                })
                .collect(),
            ColorMode::Listed => listed_colors(scale, &palette),
        };

        let extend = mode.extend();
        let over = extend.has_max().then(|| match mode {
            ColorMode::Discrete => palette.get(n).copied().unwrap_or(Color::rgb(scale.over)),
            _ => Color::rgb(scale.over),
        });
        let under = extend.has_min().then(|| Color::rgb(scale.under));

        Self {
            scale: scale.clone(),
            interval_colors,
            over,
            under,
        }
    }

    pub fn levels(&self) -> &[f64] {
        &self.scale.levels
    }

    pub fn interval_colors(&self) -> &[Color] {
        &self.interval_colors
    }

    pub fn over(&self) -> Option<Color> {
        self.over
    }

    pub fn under(&self) -> Option<Color> {
        self.under
    }

    /// Color of a value; transparent when it falls outside a non-extended
    /// end of the scale or is missing.
    pub fn color_for(&self, value: f32) -> Color {
        let v = value as f64;
        if !v.is_finite() {
            return Color::transparent();
        }
        if let Some(k) = self.scale.interval_of(v) {
            return self.interval_colors[k];
        }
        if v > self.scale.max() {
            self.over.unwrap_or(Color::transparent())
        } else {
            self.under.unwrap_or(Color::transparent())
        }
    }
}

/// Evenly spaced palette entries, linearly interpolated.
fn sample_ramp(palette: &[Color], t: f32) -> Color {
    match palette.len() {
        0 => Color::BLACK,
        1 => palette[0],
        len => {
            let pos = t.clamp(0.0, 1.0) * (len - 1) as f32;
            let i = (pos.floor() as usize).min(len - 2);
            interpolate_color(palette[i], palette[i + 1], pos - i as f32)
        }
    }
}

/// Interval midpoints normalised over their own range pick palette entries.
fn listed_colors(scale: &ColorScale, palette: &[Color]) -> Vec<Color> {
    let mids: Vec<f64> = scale.levels.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    let (lo, hi) = match (mids.first(), mids.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => return Vec::new(),
    };
    let n = palette.len();
    mids.iter()
        .map(|&m| {
            let t = if hi > lo { (m - lo) / (hi - lo) } else { 0.0 };
            let idx = ((t * n as f64).floor() as usize).min(n.saturating_sub(1));
            palette.get(idx).copied().unwrap_or(Color::BLACK)
        })
        .collect()
}

/// Index of the axis value nearest to `v`, `None` beyond half a cell past
/// either end. Works for ascending and descending axes.
pub fn nearest_index(axis: &[f64], v: f64) -> Option<usize> {
    let n = axis.len();
    if n == 0 || !v.is_finite() {
        return None;
    }
    if n == 1 {
        return Some(0);
    }

    let ascending = axis[n - 1] >= axis[0];
    let (first, last) = if ascending {
        (axis[0], axis[n - 1])
    } else {
        (axis[n - 1], axis[0])
    };
    let half_lo = (axis[1] - axis[0]).abs() / 2.0;
    let half_hi = (axis[n - 1] - axis[n - 2]).abs() / 2.0;
    let (half_first, half_last) = if ascending {
        (half_lo, half_hi)
    } else {
        (half_hi, half_lo)
    };
    if v < first - half_first || v > last + half_last {
        return None;
    }

    let idx = if ascending {
        axis.partition_point(|&a| a < v)
    } else {
        axis.partition_point(|&a| a > v)
    };
    let candidates = [idx.checked_sub(1), (idx < n).then_some(idx)];
    candidates
        .into_iter()
        .flatten()
        .min_by(|&a, &b| {
            (axis[a] - v)
                .abs()
                .partial_cmp(&(axis[b] - v).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Render a field into an RGBA buffer the size of the viewport.
///
/// Each pixel takes the value of the nearest grid cell. Missing cells are
/// painted `nodata`; pixels outside the grid stay transparent.
pub fn render_filled(grid: &Grid2D, viewport: &Viewport, colormap: &Colormap, nodata: Color) -> Vec<u8> {
    let width = viewport.width as usize;
    let height = viewport.height as usize;
    let mut pixels = vec![0u8; width * height * 4];
    if width == 0 || height == 0 {
        return pixels;
    }

    let cols: Vec<Option<usize>> = (0..width)
        .map(|px| nearest_index(&grid.lon, viewport.to_geo(px as f64 + 0.5, 0.0).0))
        .collect();

    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(py, row)| {
            let lat = viewport.to_geo(0.0, py as f64 + 0.5).1;
            let Some(j) = nearest_index(&grid.lat, lat) else {
                return;
            };
            for (px, col) in cols.iter().enumerate() {
                let Some(i) = *col else {
                    continue;
                };
                let value = grid.get(j, i);
                let color = if value.is_nan() {
                    nodata
                } else {
                    colormap.color_for(value)
                };
                row[px * 4..px * 4 + 4].copy_from_slice(&color.to_rgba());
            }
        });

    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_color_endpoints() {
        let a = Color::new(0, 0, 0, 255);
        let b = Color::new(200, 100, 50, 255);
        assert_eq!(interpolate_color(a, b, 0.0), a);
        assert_eq!(interpolate_color(a, b, 1.0), b);
        assert_eq!(interpolate_color(a, b, 0.5), Color::new(100, 50, 25, 255));
        assert_eq!(interpolate_color(a, b, 2.0), b);
    }

    #[test]
    fn test_nearest_index_ascending() {
        let axis = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(nearest_index(&axis, 0.2), Some(0));
        assert_eq!(nearest_index(&axis, 1.6), Some(2));
        assert_eq!(nearest_index(&axis, -0.4), Some(0));
        assert_eq!(nearest_index(&axis, 3.49), Some(3));
        assert_eq!(nearest_index(&axis, 3.6), None);
        assert_eq!(nearest_index(&axis, -0.6), None);
    }

    #[test]
    fn test_nearest_index_descending() {
        let axis = [5.0, 4.0, 3.0];
        assert_eq!(nearest_index(&axis, 4.9), Some(0));
        assert_eq!(nearest_index(&axis, 3.2), Some(2));
        assert_eq!(nearest_index(&axis, 5.6), None);
    }

    #[test]
    fn test_mode_follows_plot_style() {
        assert_eq!(ColorMode::for_plot(VariableKind::Vector, true), ColorMode::Discrete);
        assert_eq!(ColorMode::for_plot(VariableKind::Direction, true), ColorMode::Discrete);
        // Direction maps that lost their arrows are drawn like scalars
        assert_eq!(ColorMode::for_plot(VariableKind::Direction, false), ColorMode::Continuous);
        assert_eq!(ColorMode::for_plot(VariableKind::Magnitude, false), ColorMode::Continuous);
        assert_eq!(ColorMode::for_plot(VariableKind::Warning, false), ColorMode::Listed);

        assert_eq!(ColorMode::Discrete.extend(), Extend::Max);
        assert_eq!(ColorMode::Continuous.extend(), Extend::Both);
        assert_eq!(ColorMode::Listed.extend(), Extend::Neither);
    }

    #[test]
    fn test_sample_ramp() {
        let palette = [Color::new(0, 0, 0, 255), Color::new(255, 255, 255, 255)];
        assert_eq!(sample_ramp(&palette, 0.0), palette[0]);
        assert_eq!(sample_ramp(&palette, 1.0), palette[1]);
    }
}
